use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::{Adjustment, Statement, StatementKind, TrigFunction},
    error::{ParseError, SyntaxError},
    interpreter::{
        parser::{
            core::{ParseResult, Parser},
            utils::{name, operand, string_literal},
        },
        symbols::SymbolKind,
    },
    util::table::{parse_nested_numeric_sequence, parse_numeric_sequence},
};

impl Parser<'_> {
    /// Parses the statement on line `index`.
    ///
    /// Block openers consume their body as well.
    ///
    /// # Returns
    /// The statement and the index of the first line after it.
    pub(in crate::interpreter::parser) fn parse_statement(&mut self,
                                                          index: usize)
                                                          -> ParseResult<(Statement, usize)> {
        let lines = self.lines;
        let line = &lines[index];
        let number = line.number;
        let keyword = line.keyword();
        let mut next = index + 1;

        let kind = match keyword {
            "cvar" => {
                let value = self.expression(line, 2)?;
                let target = self.symbols.declare_scalar(name(line, 1)?, number)?;
                StatementKind::DeclareScalar { target, value }
            },
            "clist" => {
                let length = self.expression(line, 2)?;
                let list = self.symbols.declare_list(name(line, 1)?, number)?;
                StatementKind::DeclareList { list, length }
            },
            "cmat" => {
                let rows = self.expression(line, 2)?;
                let columns = self.expression(line, 3)?;
                let matrix = self.symbols.declare_matrix(name(line, 1)?, number)?;
                StatementKind::DeclareMatrix { matrix, rows, columns }
            },
            "mvar" => {
                let last = line.tokens.len().saturating_sub(1);
                let value = self.expression(line, last)?;
                let mut targets = Vec::with_capacity(last.saturating_sub(1));
                for position in 1..last {
                    targets.push(self.symbols.declare_scalar(name(line, position)?, number)?);
                }
                StatementKind::DeclareScalars { targets, value }
            },
            "ldef" => {
                let literal = operand(line, 2)?;
                let values = parse_numeric_sequence(literal).ok_or_else(|| {
                                 ParseError::MalformedLiteral { literal: literal.to_string(),
                                                                line:    number, }
                             })?;
                let list = self.symbols.declare_list(name(line, 1)?, number)?;
                StatementKind::DefineList { list, values }
            },
            "mdef" => {
                let literal = operand(line, 2)?;
                let rows = parse_nested_numeric_sequence(literal).ok_or_else(|| {
                               ParseError::MalformedLiteral { literal: literal.to_string(),
                                                              line:    number, }
                           })?;
                let matrix = self.symbols.declare_matrix(name(line, 1)?, number)?;
                StatementKind::DefineMatrix { matrix, rows }
            },
            "set" => StatementKind::Assign { target: self.reference(line, 1)?,
                                             value:  self.expression(line, 2)?, },
            "inc" => StatementKind::Increment { target: self.reference(line, 1)? },
            "dec" => StatementKind::Decrement { target: self.reference(line, 1)? },
            "ceil" | "floor" | "abs" => {
                let adjustment = match keyword {
                    "ceil" => Adjustment::Ceil,
                    "floor" => Adjustment::Floor,
                    _ => Adjustment::Abs,
                };
                StatementKind::Adjust { target: self.reference(line, 1)?,
                                        adjustment }
            },
            "round" => StatementKind::Round { target:    self.reference(line, 1)?,
                                              precision: self.expression(line, 2)?, },
            "print" => StatementKind::PrintLine { text: string_literal(line, 1)? },
            "printb" => StatementKind::PrintInline { text: string_literal(line, 1)? },
            "printv" => StatementKind::PrintValue { value: self.expression(line, 1)? },
            "printm" => StatementKind::PrintMatrix { matrix: self.matrix(line, 1)? },
            "input" => StatementKind::Input { target: self.reference(line, 1)?,
                                              prompt: string_literal(line, 2)?, },
            "loop" => {
                let counter = self.reference(line, 1)?;
                let (body, after) = self.parse_body(index)?;
                next = after;
                StatementKind::Loop { counter, body }
            },
            "sloop" => {
                let count = self.expression(line, 1)?;
                let (body, after) = self.parse_body(index)?;
                next = after;
                StatementKind::SilentLoop { count, body }
            },
            "autoloop" => {
                let counter = self.reference(line, 1)?;
                let initial = self.expression(line, 2)?;
                let (body, after) = self.parse_body(index)?;
                next = after;
                StatementKind::InitLoop { counter, initial, body }
            },
            "while" | "if" | "elif" => {
                let condition = self.expression(line, 1)?;
                let (body, after) = self.parse_body(index)?;
                next = after;
                match keyword {
                    "while" => StatementKind::While { condition, body },
                    "if" => StatementKind::If { condition, body },
                    _ => StatementKind::Elif { condition, body },
                }
            },
            "else" => {
                let (body, after) = self.parse_body(index)?;
                next = after;
                StatementKind::Else { body }
            },
            "funct" => {
                let function = name(line, 1)?.to_string();
                if !self.functions.insert(function.clone()) {
                    return Err(ParseError::AlreadyDefined { kind: SymbolKind::Function,
                                                            name: function,
                                                            line: number, });
                }
                let (body, after) = self.parse_body(index)?;
                next = after;
                StatementKind::DeclareFunction { name: function,
                                                 body: Rc::new(body) }
            },
            "call" => StatementKind::Call { name: name(line, 1)?.to_string() },
            "sin" | "cos" | "tan" | "csc" | "sec" | "cot" | "asin" | "acos" | "atan" => {
                let function = TrigFunction::from_keyword(keyword).ok_or_else(|| {
                                                                      unknown_command(number,
                                                                                      keyword)
                                                                  })?;
                StatementKind::Trig { function,
                                      target: self.reference(line, 1)?,
                                      argument: self.expression(line, 2)? }
            },
            "log" => StatementKind::Log { target: self.reference(line, 1)?,
                                          value:  self.expression(line, 2)?,
                                          base:   self.expression(line, 3)?, },
            "xroot" => StatementKind::Root { target: self.reference(line, 1)?,
                                             value:  self.expression(line, 2)?,
                                             degree: self.expression(line, 3)?, },
            "random" => StatementKind::Random { target:  self.reference(line, 1)?,
                                                maximum: self.expression(line, 2)?,
                                                minimum: self.expression(line, 3)?, },
            "getl" => StatementKind::ListLength { target: self.reference(line, 1)?,
                                                  list:   self.list(line, 2)?, },
            "getdim" => StatementKind::MatrixDims { rows:    self.reference(line, 1)?,
                                                    columns: self.reference(line, 2)?,
                                                    matrix:  self.matrix(line, 3)?, },
            "push" => StatementKind::Push { value: self.expression(line, 1)?,
                                            list:  self.list(line, 2)?, },
            "pop" => StatementKind::Pop { target: self.reference(line, 1)?,
                                          list:   self.list(line, 2)?, },
            "chsl" => StatementKind::Resize { list:   self.list(line, 1)?,
                                              length: self.expression(line, 2)?, },
            "readf" => StatementKind::ReadTable { matrix: self.matrix(line, 1)?,
                                                  path:   string_literal(line, 2)?, },
            "writef" => StatementKind::WriteTable { matrix: self.matrix(line, 1)?,
                                                    path:   string_literal(line, 2)?, },
            "sleep" => StatementKind::Sleep { millis: self.expression(line, 1)? },
            "newl" => StatementKind::NewLine,
            "exit" => StatementKind::Exit,
            "leave" => StatementKind::Leave,
            other => return Err(unknown_command(number, other)),
        };

        trace!(line = number, keyword, "parsed statement");
        Ok((Statement { kind, line: number }, next))
    }
}

fn unknown_command(line: usize, keyword: &str) -> ParseError {
    ParseError::Syntax(vec![SyntaxError::new(line, format!("Unknown command ({keyword})"))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Block, Expr, Reference},
        interpreter::{
            lexer::{repair, tokenize},
            symbols::Symbols,
        },
    };

    fn parse_with(source: &str, symbols: &mut Symbols) -> ParseResult<Block> {
        let mut lines = tokenize(source).unwrap();
        repair(&mut lines);
        Parser::new(&lines, symbols).parse_program()
    }

    fn parse(source: &str) -> ParseResult<Block> {
        parse_with(source, &mut Symbols::new())
    }

    #[test]
    fn declarations_register_names() {
        let mut symbols = Symbols::new();
        parse_with("cvar x 1\nclist xs 3\ncmat m 2 2\nmvar a b c 0\nldef ys [1,2]\nmdef n [[1]]",
                   &mut symbols).unwrap();
        assert!(symbols.resolve_scalar("x", 1).is_ok());
        assert!(symbols.resolve_scalar("c", 1).is_ok());
        assert!(symbols.resolve_list("ys", 1).is_ok());
        assert!(symbols.resolve_matrix("n", 1).is_ok());
    }

    #[test]
    fn redeclaration_is_a_name_error() {
        let err = parse("cvar x 1\ncvar x 2").unwrap_err();
        assert!(matches!(err,
                         ParseError::AlreadyDefined { kind: SymbolKind::Scalar,
                                                      line: 2,
                                                      .. }));
        let err = parse("funct f [\n]\nfunct f [\n]").unwrap_err();
        assert!(matches!(err,
                         ParseError::AlreadyDefined { kind: SymbolKind::Function,
                                                      line: 3,
                                                      .. }));
    }

    #[test]
    fn use_before_declaration_is_a_name_error() {
        assert!(matches!(parse("set x 1\ncvar x 0"), Err(ParseError::Undefined { line: 1, .. })));
        assert!(matches!(parse("cvar x x"), Err(ParseError::Undefined { .. })));
    }

    #[test]
    fn set_requires_a_reference() {
        assert!(matches!(parse("cvar x 1\nset (x+1) 2"),
                         Err(ParseError::ExpectedReference { .. })));
    }

    #[test]
    fn expressions_are_folded_at_parse_time() {
        let program = parse("cvar x 2*3+1").unwrap();
        assert!(matches!(program.statements[0].kind,
                         StatementKind::DeclareScalar { value: Expr::Constant(7.0), .. }));
    }

    #[test]
    fn loops_keep_their_counter_reference() {
        let program = parse("clist xs 2\nloop xs[1] do [\n]").unwrap();
        assert!(matches!(program.statements[1].kind,
                         StatementKind::Loop { counter: Reference::ListEntry { .. }, .. }));
    }

    #[test]
    fn literals_are_parsed_up_front() {
        let program = parse("ldef xs [1, 2.5]\nmdef m [[1,2],[3,4]]").unwrap();
        assert!(matches!(&program.statements[0].kind,
                         StatementKind::DefineList { values, .. } if values == &[1.0, 2.5]));
        assert!(matches!(parse("ldef xs [1,a]"), Err(ParseError::MalformedLiteral { .. })));
    }

    #[test]
    fn print_text_keeps_spacing_and_case() {
        let program = parse("print [\"Hello,   World\"]").unwrap();
        assert_eq!(program.statements[0].kind,
                   StatementKind::PrintLine { text: "Hello,   World".to_string() });
    }
}
