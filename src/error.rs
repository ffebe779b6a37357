/// Errors raised before execution starts.
///
/// Covers lexical problems, malformed expressions and literals, name
/// resolution failures during parsing, and the batched syntax diagnostics
/// produced by the syntax checker.
pub mod parse_error;
/// Errors raised while a program is running.
///
/// Includes unknown functions, out-of-bounds subscripts, domain violations of
/// math builtins, malformed user input and file I/O failures.
pub mod runtime_error;
/// Per-line diagnostics produced by the syntax checker.
pub mod syntax_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
pub use syntax_error::SyntaxError;

/// The error taxonomy of the language.
///
/// Every concrete error variant maps onto exactly one kind. The kind decides
/// the process exit status of the `sqbra` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Illegal bytes in the source text (carriage returns).
    Lex,
    /// Malformed literal or expression.
    Format,
    /// Statement arity or shape mismatch.
    Syntax,
    /// Redeclared or undeclared name.
    Name,
    /// Subscript out of bounds.
    Index,
    /// Argument outside the domain of a math builtin.
    Domain,
    /// File or console I/O failure.
    Io,
}

impl ErrorKind {
    /// Returns the process exit status used for this kind of error.
    ///
    /// # Example
    /// ```
    /// use sqbra::error::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::Syntax.exit_code(), 4);
    /// assert_ne!(ErrorKind::Name.exit_code(), ErrorKind::Index.exit_code());
    /// ```
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Lex => 2,
            Self::Format => 3,
            Self::Syntax => 4,
            Self::Name => 5,
            Self::Index => 6,
            Self::Domain => 7,
            Self::Io => 8,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lex => "LexError",
            Self::Format => "FormatError",
            Self::Syntax => "SyntaxError",
            Self::Name => "NameError",
            Self::Index => "IndexError",
            Self::Domain => "DomainError",
            Self::Io => "IoError",
        };
        f.write_str(name)
    }
}

/// Any error produced by the interpreter pipeline.
#[derive(Debug)]
pub enum Error {
    /// The program could not be tokenized, checked or parsed.
    Parse(ParseError),
    /// The program failed while executing.
    Runtime(RuntimeError),
}

impl Error {
    /// Classifies the error within the language's error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(e) => e.kind(),
            Self::Runtime(e) => e.kind(),
        }
    }
}

impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<RuntimeError> for Error {
    fn from(value: RuntimeError) -> Self {
        Self::Runtime(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Runtime(e) => Some(e),
        }
    }
}
