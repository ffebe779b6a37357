//! # sqbra
//!
//! sqbra is an interpreter for SquareBracket, a small line-oriented scripting
//! language with scalar, list and matrix variables, counted loops,
//! parameterless functions and a handful of math builtins.
//!
//! A program runs through four stages: tokenization, a syntax check, parsing
//! into a statement tree, and execution against a [`Context`].

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use tracing::debug;

use crate::{
    ast::Program,
    error::Error,
    interpreter::{
        checker::check_syntax,
        evaluator::core::Context,
        lexer::{SourceLine, repair, tokenize},
        parser::core::{ParseResult, Parser},
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the expression tree (`Expr`, `Reference`,
/// `BinaryOperator`) and the statement tree (`Statement`, `StatementKind`,
/// `Block`). The tree is built by the parser and walked by the evaluator.
///
/// # Responsibilities
/// - Defines one statement variant per language keyword.
/// - Attaches the source line to every statement for error reporting.
/// - Holds names as resolved handles rather than strings.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during tokenizing,
/// checking, parsing or executing code, and maps each of them onto the
/// language's error kinds and the binary's exit codes.
///
/// # Responsibilities
/// - Defines error enums for all failure modes.
/// - Attaches line numbers and detailed messages for context.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together the lexer, syntax checker, expression engine,
/// parser and evaluator.
///
/// # Responsibilities
/// - Coordinates all core components.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for numeric conversion, literals and table files.
pub mod util;

/// Splits source text into normalised lines of tokens.
///
/// # Errors
/// Returns a lex error if the source contains carriage returns.
///
/// # Example
/// ```
/// use sqbra::tokenize_program;
///
/// let lines = tokenize_program("CVAR X 1\nIF(X) [\n]").unwrap();
/// assert_eq!(lines[0].tokens, ["cvar", "x", "1"]);
/// assert_eq!(lines[1].tokens, ["if", "(x)", "["]);
/// ```
pub fn tokenize_program(source: &str) -> ParseResult<Vec<SourceLine>> {
    let mut lines = tokenize(source)?;
    repair(&mut lines);
    debug!(lines = lines.len(), "tokenized program");
    Ok(lines)
}

/// Tokenizes, checks and parses a program.
///
/// Declarations are registered in the symbol tables of `context`, and
/// functions it already knows count as declared.
///
/// # Errors
/// Returns the first lex, name or format error, or every syntax error found
/// by the checker.
pub fn parse_program(source: &str, context: &mut Context) -> Result<Program, Error> {
    let lines = tokenize_program(source)?;
    check_syntax(&lines)?;
    let known = context.functions.keys().cloned().collect::<Vec<_>>();
    let program = Parser::new(&lines, &mut context.symbols).with_functions(known)
                                                           .parse_program()?;
    debug!(statements = program.statements.len(), "parsed program");
    Ok(program)
}

/// Parses and runs a program against an existing context.
///
/// # Errors
/// Returns the first error raised by any stage.
///
/// # Example
/// ```
/// use std::io::Cursor;
///
/// use sqbra::{interpreter::evaluator::core::Context, run_with_context};
///
/// let mut context = Context::with_io(Cursor::new(""), Vec::new());
/// run_with_context("cvar x 0\nsloop 4 [\ninc x\n]", &mut context).unwrap();
/// assert_eq!(context.symbols.scalar_value("x"), Some(4.0));
/// ```
pub fn run_with_context(source: &str, context: &mut Context) -> Result<(), Error> {
    let program = parse_program(source, context)?;
    context.execute_program(&program)?;
    Ok(())
}

/// Parses and runs a program on standard input and output.
///
/// # Errors
/// Returns the first error raised by any stage.
///
/// # Examples
/// ```
/// use sqbra::run;
///
/// assert!(run("cvar x 2\nset x x*x").is_ok());
///
/// // `y` is never declared.
/// assert!(run("cvar x y").is_err());
/// ```
pub fn run(source: &str) -> Result<(), Error> {
    let mut context = Context::new();
    run_with_context(source, &mut context)
}
