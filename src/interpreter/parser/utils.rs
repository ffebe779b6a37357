use crate::{
    ast::{Expr, Reference},
    error::{ParseError, SyntaxError},
    interpreter::{
        expression::{parse_expression, parse_reference},
        lexer::SourceLine,
        parser::core::{ParseResult, Parser},
        symbols::{ListId, MatrixId},
    },
    util::table::extract_string,
};

/// Returns the token at `position`, failing with a syntax error when the
/// line is too short.
pub(in crate::interpreter::parser) fn operand(line: &SourceLine,
                                              position: usize)
                                              -> ParseResult<&str> {
    line.tokens.get(position).map(String::as_str).ok_or_else(|| {
        ParseError::Syntax(vec![SyntaxError::new(line.number,
                                                 format!("Missing operand {position} of '{}'",
                                                         line.keyword()))])
    })
}

/// Returns the token at `position` if it is a valid name: ASCII letters,
/// digits and underscores, not starting with a digit.
pub(in crate::interpreter::parser) fn name(line: &SourceLine,
                                           position: usize)
                                           -> ParseResult<&str> {
    let token = operand(line, position)?;
    let valid = token.chars()
                     .next()
                     .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(token)
    } else {
        Err(ParseError::MalformedExpression { expr:    token.to_string(),
                                              details: "not a valid name".to_string(),
                                              line:    line.number, })
    }
}

/// Joins the tokens from `start` on and returns the text inside the `["`
/// and `"]` delimiters.
pub(in crate::interpreter::parser) fn string_literal(line: &SourceLine,
                                                     start: usize)
                                                     -> ParseResult<String> {
    let literal = line.rest(start);
    extract_string(&literal).map(str::to_string)
                            .ok_or(ParseError::MalformedLiteral { literal,
                                                                  line: line.number })
}

impl Parser<'_> {
    /// Parses the token at `position` as an expression.
    pub(in crate::interpreter::parser) fn expression(&self,
                                                     line: &SourceLine,
                                                     position: usize)
                                                     -> ParseResult<Expr> {
        parse_expression(operand(line, position)?, self.symbols, line.number)
    }

    /// Parses the token at `position` as an assignable reference.
    pub(in crate::interpreter::parser) fn reference(&self,
                                                    line: &SourceLine,
                                                    position: usize)
                                                    -> ParseResult<Reference> {
        parse_reference(operand(line, position)?, self.symbols, line.number)
    }

    /// Resolves the token at `position` as a declared list.
    pub(in crate::interpreter::parser) fn list(&self,
                                               line: &SourceLine,
                                               position: usize)
                                               -> ParseResult<ListId> {
        self.symbols.resolve_list(operand(line, position)?, line.number)
    }

    /// Resolves the token at `position` as a declared matrix.
    pub(in crate::interpreter::parser) fn matrix(&self,
                                                 line: &SourceLine,
                                                 position: usize)
                                                 -> ParseResult<MatrixId> {
        self.symbols.resolve_matrix(operand(line, position)?, line.number)
    }
}
