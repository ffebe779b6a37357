use crate::{error::ErrorKind, interpreter::symbols::SymbolKind};

use super::SyntaxError;

#[derive(Debug)]
/// Represents all errors that can occur before a program starts executing.
pub enum ParseError {
    /// The source uses carriage-return line endings.
    CarriageReturn {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An expression contains a character the expression scanner rejects.
    InvalidCharacter {
        /// The offending character(s).
        found: String,
        /// The whole expression text.
        expr:  String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Parentheses or subscript brackets do not balance.
    UnbalancedExpression {
        /// The whole expression text.
        expr: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The expression is structurally broken (missing operand, empty, ...).
    MalformedExpression {
        /// The whole expression text.
        expr:    String,
        /// What went wrong.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An identifier carries more than two subscripts.
    TooManySubscripts {
        /// The whole expression text.
        expr: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A scalar, list entry or matrix entry was required.
    ExpectedReference {
        /// The expression text found instead.
        expr: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A string, list or matrix literal is malformed.
    MalformedLiteral {
        /// The literal text.
        literal: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A name was declared twice.
    AlreadyDefined {
        /// Which table the name lives in.
        kind: SymbolKind,
        /// The name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A name was used before it was declared.
    Undefined {
        /// Which table the name was looked up in.
        kind: SymbolKind,
        /// The name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The syntax checker rejected one or more lines.
    Syntax(Vec<SyntaxError>),
    /// A `]` appeared without an open block.
    UnexpectedBlockEnd {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A block was opened but the file ended before its `]`.
    UnterminatedBlock {
        /// The source line of the statement that opened the block.
        line: usize,
    },
    /// `elif` or `else` does not directly follow an `if` or `elif`.
    DanglingBranch {
        /// The branch keyword.
        keyword: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl ParseError {
    /// Classifies the error within the language's error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CarriageReturn { .. } => ErrorKind::Lex,
            Self::InvalidCharacter { .. }
            | Self::UnbalancedExpression { .. }
            | Self::MalformedExpression { .. }
            | Self::TooManySubscripts { .. }
            | Self::ExpectedReference { .. }
            | Self::MalformedLiteral { .. } => ErrorKind::Format,
            Self::AlreadyDefined { .. } | Self::Undefined { .. } => ErrorKind::Name,
            Self::Syntax(_)
            | Self::UnexpectedBlockEnd { .. }
            | Self::UnterminatedBlock { .. }
            | Self::DanglingBranch { .. } => ErrorKind::Syntax,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CarriageReturn { line } => write!(f,
                                                    "Error on line {line}: CRLF line endings are not accepted."),
            Self::InvalidCharacter { found, expr, line } => write!(f,
                                                                   "Error on line {line}: Invalid character '{found}' in expression <{expr}>."),
            Self::UnbalancedExpression { expr, line } => write!(f,
                                                                "Error on line {line}: Unbalanced brackets in expression <{expr}>."),
            Self::MalformedExpression { expr, details, line } => {
                write!(f, "Error on line {line}: Expression <{expr}> is incorrect: {details}.")
            },
            Self::TooManySubscripts { expr, line } => write!(f,
                                                             "Error on line {line}: <{expr}> has more than two subscripts."),
            Self::ExpectedReference { expr, line } => write!(f,
                                                             "Error on line {line}: <{expr}> must be a variable, list entry or matrix entry."),
            Self::MalformedLiteral { literal, line } => {
                write!(f, "Error on line {line}: Literal <{literal}> is not in the correct format.")
            },
            Self::AlreadyDefined { kind, name, line } => {
                write!(f, "Error on line {line}: {kind} <{name}> is already defined.")
            },
            Self::Undefined { kind, name, line } => {
                write!(f, "Error on line {line}: {kind} <{name}> is not defined.")
            },
            Self::Syntax(errors) => {
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            },
            Self::UnexpectedBlockEnd { line } => {
                write!(f, "Error on line {line}: ']' closes a block that was never opened.")
            },
            Self::UnterminatedBlock { line } => write!(f,
                                                       "Error on line {line}: Block is never closed with ']'."),
            Self::DanglingBranch { keyword, line } => write!(f,
                                                             "Error on line {line}: '{keyword}' must directly follow an 'if' or 'elif' block."),
        }
    }
}

impl std::error::Error for ParseError {}
