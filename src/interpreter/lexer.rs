use logos::Logos;
use tracing::trace;

use crate::{error::ParseError, interpreter::parser::core::ParseResult};

/// One non-blank line of source code, split into whitespace-separated
/// tokens.
///
/// `tokens` is never empty and `tokens[0]` is the statement keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The 1-based line number in the source file.
    pub number: usize,
    /// The tokens of the line.
    pub tokens: Vec<String>,
}

impl SourceLine {
    /// The first token of the line.
    #[must_use]
    pub fn keyword(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    /// The tokens from `start` on, joined back together with single spaces.
    #[must_use]
    pub fn rest(&self, start: usize) -> String {
        self.tokens.get(start..).map_or_else(String::new, |t| t.join(" "))
    }
}

/// Keywords that may be glued onto their first operand, in the order they
/// are tried. `printb` comes before `print` so the longer match wins.
const GLUED_KEYWORDS: [&str; 6] = ["printb", "print", "elif", "else", "if", "while"];

/// Splits source text into lines of tokens.
///
/// Whitespace separates tokens except inside parentheses or square brackets,
/// where it stays part of the token. A `)` that closes the outermost
/// parenthesis ends the token it belongs to. Blank lines are skipped, while
/// the remaining lines keep their original line numbers.
///
/// # Errors
/// Returns [`ParseError::CarriageReturn`] for any line containing `\r`.
///
/// # Example
/// ```
/// use sqbra::interpreter::lexer::tokenize;
///
/// let lines = tokenize("cvar x (1 + 2)\n\n  set x x*2\n").unwrap();
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].tokens, ["cvar", "x", "(1 + 2)"]);
/// assert_eq!(lines[1].number, 3);
/// ```
pub fn tokenize(source: &str) -> ParseResult<Vec<SourceLine>> {
    let mut lines = Vec::new();
    for (i, text) in source.split('\n').enumerate() {
        let number = i + 1;
        if text.contains('\r') {
            return Err(ParseError::CarriageReturn { line: number });
        }
        let tokens = split_line(text);
        if !tokens.is_empty() {
            trace!(line = number, ?tokens, "tokenized line");
            lines.push(SourceLine { number, tokens });
        }
    }
    Ok(lines)
}

fn split_line(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut parens = 0usize;
    let mut brackets = 0usize;

    for c in text.chars() {
        match c {
            ' ' | '\t' if parens == 0 && brackets == 0 => {
                if !token.is_empty() {
                    tokens.push(std::mem::take(&mut token));
                }
            },
            '(' => {
                parens += 1;
                token.push(c);
            },
            ')' => {
                parens = parens.saturating_sub(1);
                token.push(c);
                if parens == 0 && brackets == 0 {
                    tokens.push(std::mem::take(&mut token));
                }
            },
            '[' => {
                brackets += 1;
                token.push(c);
            },
            ']' => {
                brackets = brackets.saturating_sub(1);
                token.push(c);
            },
            _ => token.push(c),
        }
    }
    if !token.is_empty() {
        tokens.push(token);
    }
    tokens
}

/// Normalises tokenized lines in place.
///
/// Letters are folded to lower case up to the first string literal of a line,
/// so the text of `print ["Hello"]` keeps its case. A keyword glued onto its
/// operand (`if(x>1)`, `print["hi"]`) is split into two tokens.
///
/// # Example
/// ```
/// use sqbra::interpreter::lexer::{repair, tokenize};
///
/// let mut lines = tokenize("PRINT[\"Hi\"]\nIf(X>1) [").unwrap();
/// repair(&mut lines);
/// assert_eq!(lines[0].tokens, ["print", "[\"Hi\"]"]);
/// assert_eq!(lines[1].tokens, ["if", "(x>1)", "["]);
/// ```
pub fn repair(lines: &mut [SourceLine]) {
    for line in lines {
        fold_case(&mut line.tokens);
        split_glued_keyword(&mut line.tokens);
    }
}

fn fold_case(tokens: &mut [String]) {
    for token in tokens {
        if let Some(start) = token.find("[\"") {
            let folded = token[..start].to_ascii_lowercase();
            token.replace_range(..start, &folded);
            return;
        }
        token.make_ascii_lowercase();
    }
}

fn split_glued_keyword(tokens: &mut Vec<String>) {
    let Some(first) = tokens.first() else {
        return;
    };
    if first.starts_with("printv") || first.starts_with("printm") {
        return;
    }
    if let Some(keyword) = GLUED_KEYWORDS.iter().find(|k| first.starts_with(*k))
       && first.len() > keyword.len()
    {
        let operand = first[keyword.len()..].to_string();
        tokens[0] = (*keyword).to_string();
        tokens.insert(1, operand);
    }
}

/// A token of the expression language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t]+")]
pub enum ExprToken {
    /// Numeric literals such as `42`, `3.14`, `.5` or `2.1e-10`.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_number)]
    #[regex(r"[0-9]+", parse_number)]
    Number(f64),
    /// Variable, list or matrix names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `^`
    #[token("^")]
    Caret,
    /// `&` or `&&`
    #[token("&")]
    #[token("&&")]
    And,
    /// `|` or `||`
    #[token("|")]
    #[token("||")]
    Or,
    /// `=` or `==`
    #[token("=")]
    #[token("==")]
    Equal,
    /// `!=`
    #[token("!=")]
    NotEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
}

fn parse_number(lex: &logos::Lexer<ExprToken>) -> Option<f64> {
    lex.slice().parse().ok()
}
