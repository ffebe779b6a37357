/// Core evaluation logic and context management.
///
/// Contains the runtime context, the block runner and the statement
/// dispatcher.
pub mod core;

/// Control flow.
///
/// Implements `if`/`elif`/`else` chains, the three counted loops, `while`,
/// and function declaration and calls.
pub mod control;

/// Commands.
///
/// Implements every statement that only has side effects: declarations,
/// assignments, math builtins, list and matrix operations, console output,
/// input and table files.
pub mod command;
