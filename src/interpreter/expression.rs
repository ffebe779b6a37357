use crate::{
    ast::{Expr, Reference},
    error::ParseError,
    interpreter::{parser::core::ParseResult, symbols::Symbols},
};

/// Evaluation of expression trees and resolution of storage locations.
///
/// Adds `evaluate`, `locate`, `load`, `store` and `assign` to
/// [`Symbols`](crate::interpreter::symbols::Symbols).
pub mod eval;
/// Constant folding and algebraic simplification.
pub mod optimizer;
/// Text to tree conversion.
///
/// Validates the character set and bracket balance of an expression, then
/// builds the tree with a two-stack precedence parser. Names are bound to
/// symbol-table handles on the way.
pub mod scanner;

use optimizer::optimize;
use scanner::Scanner;

/// Parses and simplifies an arithmetic or boolean expression.
///
/// # Errors
/// Any format or name error raised by the scanner.
///
/// # Example
/// ```
/// use sqbra::{
///     ast::Expr,
///     interpreter::{expression::parse_expression, symbols::Symbols},
/// };
///
/// let symbols = Symbols::new();
/// assert_eq!(parse_expression("(1 + 2) * 4", &symbols, 1).unwrap(), Expr::Constant(12.0));
/// assert!(parse_expression("1 +* 2", &symbols, 1).is_err());
/// ```
pub fn parse_expression(text: &str, symbols: &Symbols, line: usize) -> ParseResult<Expr> {
    Scanner::new(text, symbols, line).scan().map(optimize)
}

/// Parses text that must name a scalar, a list entry or a matrix entry.
///
/// # Errors
/// [`ParseError::ExpectedReference`] when the text is any other kind of
/// expression, plus every error [`parse_expression`] can return.
///
/// # Example
/// ```
/// use sqbra::interpreter::{expression::parse_reference, symbols::Symbols};
///
/// let mut symbols = Symbols::new();
/// symbols.declare_scalar("x", 1).unwrap();
/// assert!(parse_reference("x", &symbols, 2).is_ok());
/// assert!(parse_reference("x + 1", &symbols, 2).is_err());
/// ```
pub fn parse_reference(text: &str, symbols: &Symbols, line: usize) -> ParseResult<Reference> {
    match parse_expression(text, symbols, line)? {
        Expr::Reference(reference) => Ok(reference),
        _ => Err(ParseError::ExpectedReference { expr: text.to_string(),
                                                 line }),
    }
}
