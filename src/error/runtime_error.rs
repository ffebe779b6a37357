use crate::error::ErrorKind;

#[derive(Debug)]
/// Represents all errors that can occur during execution.
pub enum RuntimeError {
    /// Called a function that has not been declared yet.
    UnknownFunction {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Declared a function whose name is already taken.
    FunctionAlreadyDefined {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to access a list or matrix entry outside its bounds.
    IndexOutOfBounds {
        /// The list or matrix name.
        name:  String,
        /// The requested subscript(s), already formatted.
        index: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Tried to pop from an empty list.
    EmptyList {
        /// The list name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A math builtin received an argument outside its domain.
    DomainError {
        /// The builtin that failed.
        function: &'static str,
        /// The offending argument.
        value:    f64,
        /// Why the argument is rejected.
        details:  &'static str,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A size, duration or count is negative or not finite.
    InvalidSize {
        /// The offending value.
        value: f64,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The console input could not be read as a number.
    InvalidInput {
        /// The text that was read.
        text: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A table file is not in the expected format.
    MalformedTable {
        /// The path of the file.
        path:    String,
        /// What went wrong.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Reading from or writing to a file or the console failed.
    Io {
        /// Details from the operating system.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Program output could not be flushed after the last statement ran.
    OutputFlush {
        /// Details from the operating system.
        details: String,
    },
}

impl RuntimeError {
    /// Classifies the error within the language's error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFunction { .. } | Self::FunctionAlreadyDefined { .. } => ErrorKind::Name,
            Self::IndexOutOfBounds { .. } | Self::EmptyList { .. } => ErrorKind::Index,
            Self::DomainError { .. } | Self::InvalidSize { .. } => ErrorKind::Domain,
            Self::InvalidInput { .. } | Self::MalformedTable { .. } => ErrorKind::Format,
            Self::Io { .. } | Self::OutputFlush { .. } => ErrorKind::Io,
        }
    }

    /// Wraps an I/O failure that happened while executing `line`.
    #[must_use]
    pub fn io(error: &std::io::Error, line: usize) -> Self {
        Self::Io { details: error.to_string(),
                   line }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFunction { name, line } => {
                write!(f, "Error on line {line}: Function <{name}> is not defined.")
            },
            Self::FunctionAlreadyDefined { name, line } => {
                write!(f, "Error on line {line}: Function <{name}> is already defined.")
            },
            Self::IndexOutOfBounds { name, index, line } => write!(f,
                                                                   "Error on line {line}: Index out of bounds for <{name}> at <{index}>."),
            Self::EmptyList { name, line } => {
                write!(f, "Error on line {line}: Cannot pop from empty list <{name}>.")
            },
            Self::DomainError { function,
                                value,
                                details,
                                line, } => write!(f,
                                                  "Error on line {line}: {function} is undefined for {value}: {details}."),
            Self::InvalidSize { value, line } => write!(f,
                                                        "Error on line {line}: {value} is not a valid size."),
            Self::InvalidInput { text, line } => {
                write!(f, "Error on line {line}: Input <{text}> is not a number.")
            },
            Self::MalformedTable { path, details, line } => {
                write!(f, "Error on line {line}: File <{path}> is malformed: {details}.")
            },
            Self::Io { details, line } => write!(f, "Error on line {line}: I/O failure: {details}."),
            Self::OutputFlush { details } => write!(f, "Error: Failed to flush output: {details}."),
        }
    }
}

impl std::error::Error for RuntimeError {}
