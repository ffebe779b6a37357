/// Numeric conversion helpers.
///
/// Subscripts and sizes are plain `f64` values in the language. These helpers
/// convert them to `usize` positions, truncating toward zero and rejecting
/// negative or non-finite input.
pub mod num;
/// Literal and table-file helpers.
///
/// Extracts the text of `["..."]` string literals, parses `[1,2,3]` and
/// `[[1,2],[3,4]]` numeric literals, and reads and writes the comma-separated
/// table files used by `readf` and `writef`.
pub mod table;
