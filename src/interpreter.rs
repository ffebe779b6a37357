/// Per-line shape validation.
///
/// The syntax checker runs after tokenization and before parsing. It matches
/// every line against the operand count and literal rules of its keyword and
/// reports all offending lines together.
///
/// # Responsibilities
/// - Validates operand counts and block-opener shapes.
/// - Validates string, list and matrix literals and file paths.
/// - Produces the verbose report used by `sqbra --check`.
pub mod checker;
/// The evaluator module executes parsed statements.
///
/// The evaluator walks the statement tree, runs loops, branches and function
/// calls, and performs the side effects of every command against the
/// program's symbol tables and console streams.
///
/// # Responsibilities
/// - Holds the runtime [`Context`](evaluator::core::Context).
/// - Propagates `leave` and `exit` as explicit signals.
/// - Reports runtime errors such as out-of-bounds subscripts.
pub mod evaluator;
/// The expression engine.
///
/// Scans expression text into trees, simplifies them, and evaluates them
/// against the current variable values.
///
/// # Responsibilities
/// - Operator precedence and associativity.
/// - Constant folding and algebraic identities.
/// - Subscript resolution with bounds checks.
pub mod expression;
/// The lexer module splits source text into lines of tokens.
///
/// Source code is line oriented: each non-blank line becomes one
/// [`SourceLine`](lexer::SourceLine) whose first token is the statement
/// keyword. The module also defines the token set of the expression language.
///
/// # Responsibilities
/// - Splits lines on whitespace outside parentheses and brackets.
/// - Normalises case and splits keywords glued onto their operand.
/// - Rejects carriage returns.
pub mod lexer;
/// The parser module builds the statement tree from checked lines.
///
/// # Responsibilities
/// - Converts each line into a [`Statement`](crate::ast::Statement).
/// - Nests block bodies up to their closing `]`.
/// - Declares and resolves names, reporting duplicates and unknown names.
pub mod parser;
/// Symbol tables for scalars, lists and matrices.
///
/// Names are bound once to stable handles, so the statement tree never needs
/// to look anything up by name at run time.
pub mod symbols;
