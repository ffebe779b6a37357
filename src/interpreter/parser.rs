/// Block structure.
///
/// Holds the parser state and nests statement sequences up to their closing
/// `]`, rejecting stray or missing block ends and misplaced branches.
pub mod core;

/// Statement parsing.
///
/// Converts a single line into a statement, one rule per keyword.
pub mod statement;

/// Utility functions for the parser.
///
/// Operand access, name validation and string-literal extraction shared by
/// the statement rules.
pub mod utils;
