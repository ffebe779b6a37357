use std::collections::HashSet;

use tracing::debug;

use crate::{
    ast::{Block, Program},
    error::ParseError,
    interpreter::{lexer::SourceLine, symbols::Symbols},
};

/// Result type used by the parser and everything that runs before execution.
pub type ParseResult<T> = Result<T, ParseError>;

/// Builds the statement tree from checked source lines.
///
/// Declarations are registered in the symbol tables while parsing, so every
/// name in the tree is already resolved to a handle and using a name before
/// its declaration is reported here rather than at run time.
pub struct Parser<'a> {
    pub(in crate::interpreter::parser) lines:     &'a [SourceLine],
    pub(in crate::interpreter::parser) symbols:   &'a mut Symbols,
    pub(in crate::interpreter::parser) functions: HashSet<String>,
}

impl<'a> Parser<'a> {
    /// Creates a parser that declares into `symbols`.
    #[must_use]
    pub fn new(lines: &'a [SourceLine], symbols: &'a mut Symbols) -> Self {
        Self { lines,
               symbols,
               functions: HashSet::new() }
    }

    /// Marks function names that already exist, so declaring them again is
    /// reported as a duplicate.
    #[must_use]
    pub fn with_functions(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.functions.extend(names);
        self
    }

    /// Parses every line into the top-level block.
    ///
    /// # Errors
    /// - [`ParseError::UnexpectedBlockEnd`] for a `]` with no open block.
    /// - [`ParseError::UnterminatedBlock`] for a block left open at the end.
    /// - [`ParseError::DanglingBranch`] for a misplaced `elif` or `else`.
    /// - Every name and format error raised for individual statements.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let (program, _) = self.parse_block(0, None)?;
        Ok(program)
    }

    /// Parses statements from line `start` until the `]` that closes the
    /// block, or until the end of input for the top level.
    ///
    /// # Parameters
    /// - `start`: Index of the first line of the block.
    /// - `opener`: Source line of the statement that opened the block, or
    ///   `None` at top level.
    ///
    /// # Returns
    /// The block and the index of the first line after it.
    pub fn parse_block(&mut self,
                       start: usize,
                       opener: Option<usize>)
                       -> ParseResult<(Block, usize)> {
        let lines = self.lines;
        let mut block = Block::default();
        let mut index = start;

        while let Some(line) = lines.get(index) {
            let keyword = line.keyword();
            if keyword.starts_with('#') {
                index += 1;
                continue;
            }
            if keyword == "]" {
                return match opener {
                    Some(_) => {
                        debug!(line = line.number,
                               statements = block.statements.len(),
                               "parsed block");
                        Ok((block, index + 1))
                    },
                    None => Err(ParseError::UnexpectedBlockEnd { line: line.number }),
                };
            }

            let (statement, next) = self.parse_statement(index)?;
            if statement.kind.is_branch()
               && !block.statements
                        .last()
                        .is_some_and(|previous| previous.kind.opens_chain())
            {
                return Err(ParseError::DanglingBranch { keyword: keyword.to_string(),
                                                        line:    line.number, });
            }
            block.statements.push(statement);
            index = next;
        }

        match opener {
            Some(line) => Err(ParseError::UnterminatedBlock { line }),
            None => Ok((block, index)),
        }
    }

    /// Parses the body of the block opened on line `index`.
    pub(in crate::interpreter::parser) fn parse_body(&mut self,
                                                     index: usize)
                                                     -> ParseResult<(Block, usize)> {
        let opener = self.lines[index].number;
        self.parse_block(index + 1, Some(opener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::StatementKind,
        interpreter::lexer::{repair, tokenize},
    };

    fn parse(source: &str) -> ParseResult<Program> {
        let mut lines = tokenize(source).unwrap();
        repair(&mut lines);
        let mut symbols = Symbols::new();
        Parser::new(&lines, &mut symbols).parse_program()
    }

    #[test]
    fn nested_blocks_resume_after_their_end() {
        let program = parse("cvar x 2\nloop x [\nif x [\nnewl\n]\nprintv x\n]\nexit").unwrap();
        assert_eq!(program.statements.len(), 3);
        let StatementKind::Loop { body, .. } = &program.statements[1].kind else {
            panic!("expected a loop");
        };
        assert_eq!(body.statements.len(), 2);
        assert_eq!(program.statements[2].line, 8);
    }

    #[test]
    fn stray_block_end_is_rejected() {
        assert!(matches!(parse("newl\n]"), Err(ParseError::UnexpectedBlockEnd { line: 2 })));
    }

    #[test]
    fn unclosed_block_reports_its_opener() {
        assert!(matches!(parse("newl\nwhile 1 [\nnewl"),
                         Err(ParseError::UnterminatedBlock { line: 2 })));
    }

    #[test]
    fn branches_must_follow_if() {
        assert!(matches!(parse("else [\n]"), Err(ParseError::DanglingBranch { line: 1, .. })));
        assert!(matches!(parse("if 1 [\n]\nnewl\nelif 1 [\n]"),
                         Err(ParseError::DanglingBranch { line: 4, .. })));
        assert!(parse("if 1 [\n]\n# note\nelif 0 [\n]\nelse [\n]").is_ok());
    }

    #[test]
    fn comments_are_not_statements() {
        let program = parse("# heading\nnewl\n#trailing").unwrap();
        assert_eq!(program.statements.len(), 1);
    }
}
