/// A single syntax violation found by the syntax checker.
///
/// The checker collects one `SyntaxError` per offending line and reports them
/// all at once instead of stopping at the first problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// The source line of the offending statement.
    pub line:    usize,
    /// What is wrong, including the correct usage where one exists.
    pub message: String,
}

impl SyntaxError {
    /// Creates a diagnostic for `line`.
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line,
               message: message.into() }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Syntax error on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}
