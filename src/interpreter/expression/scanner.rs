use logos::Logos;

use crate::{
    ast::{BinaryOperator, Expr, Reference},
    error::ParseError,
    interpreter::{
        lexer::ExprToken,
        parser::core::ParseResult,
        symbols::Symbols,
    },
};

/// Operators waiting on the operator stack.
#[derive(Debug, Clone, Copy)]
enum Pending {
    /// An open parenthesis.
    Open,
    /// A prefix minus, binding tighter than every binary operator.
    Negate,
    Binary(BinaryOperator),
}

/// Turns the text of one expression into an unoptimised tree.
///
/// Names are resolved against `symbols` while scanning, so the resulting tree
/// only holds handles.
pub struct Scanner<'a> {
    text:    &'a str,
    symbols: &'a Symbols,
    line:    usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for `text`, reporting errors on `line`.
    #[must_use]
    pub const fn new(text: &'a str, symbols: &'a Symbols, line: usize) -> Self {
        Self { text, symbols, line }
    }

    /// Scans the whole expression.
    ///
    /// # Errors
    /// - [`ParseError::UnbalancedExpression`] for mismatched `(` `)` or `[`
    ///   `]`.
    /// - [`ParseError::InvalidCharacter`] for characters outside the
    ///   expression alphabet.
    /// - [`ParseError::MalformedExpression`] for missing operands or
    ///   operators.
    /// - [`ParseError::TooManySubscripts`] for more than two subscripts.
    /// - [`ParseError::Undefined`] for names that were never declared.
    pub fn scan(&self) -> ParseResult<Expr> {
        self.check_balance()?;
        let tokens = self.lex()?;
        self.parse_tokens(&tokens)
    }

    fn check_balance(&self) -> ParseResult<()> {
        let mut parens = 0i64;
        let mut brackets = 0i64;
        for c in self.text.chars() {
            match c {
                '(' => parens += 1,
                ')' => parens -= 1,
                '[' => brackets += 1,
                ']' => brackets -= 1,
                _ => {},
            }
            if parens < 0 || brackets < 0 {
                return Err(self.unbalanced());
            }
        }
        if parens != 0 || brackets != 0 {
            return Err(self.unbalanced());
        }
        Ok(())
    }

    fn lex(&self) -> ParseResult<Vec<ExprToken>> {
        let mut lexer = ExprToken::lexer(self.text);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next() {
            match token {
                Ok(token) => tokens.push(token),
                Err(()) => {
                    return Err(ParseError::InvalidCharacter { found: lexer.slice().to_string(),
                                                              expr:  self.text.to_string(),
                                                              line:  self.line, });
                },
            }
        }
        Ok(tokens)
    }

    /// Two-stack operator precedence parsing over a token slice.
    fn parse_tokens(&self, tokens: &[ExprToken]) -> ParseResult<Expr> {
        let mut operands: Vec<Expr> = Vec::new();
        let mut operators: Vec<Pending> = Vec::new();
        let mut expect_operand = true;
        let mut i = 0;

        while i < tokens.len() {
            match &tokens[i] {
                ExprToken::Number(value) => {
                    self.require_operator_slot(expect_operand)?;
                    operands.push(Expr::Constant(*value));
                    expect_operand = false;
                },
                ExprToken::Identifier(name) => {
                    self.require_operator_slot(expect_operand)?;
                    let (reference, consumed) = self.parse_reference(name, &tokens[i + 1..])?;
                    operands.push(Expr::Reference(reference));
                    i += consumed;
                    expect_operand = false;
                },
                ExprToken::LParen => {
                    self.require_operator_slot(expect_operand)?;
                    operators.push(Pending::Open);
                },
                ExprToken::RParen => {
                    if expect_operand {
                        return Err(self.malformed("missing operand before ')'"));
                    }
                    loop {
                        match operators.pop() {
                            Some(Pending::Open) => break,
                            Some(pending) => self.reduce(pending, &mut operands)?,
                            None => return Err(self.unbalanced()),
                        }
                    }
                },
                ExprToken::LBracket | ExprToken::RBracket => {
                    return Err(self.malformed("subscript without a list or matrix name"));
                },
                ExprToken::Minus if expect_operand => {
                    if let Some(ExprToken::Number(value)) = tokens.get(i + 1) {
                        operands.push(Expr::Constant(-value));
                        i += 1;
                        expect_operand = false;
                    } else {
                        operators.push(Pending::Negate);
                    }
                },
                token => {
                    let op = binary_operator(token).ok_or_else(|| {
                                                        self.malformed("unexpected token")
                                                    })?;
                    if expect_operand {
                        return Err(self.malformed(&format!("missing operand before '{}'",
                                                           op.symbol())));
                    }
                    while let Some(&top) = operators.last() {
                        let reduce = match top {
                            Pending::Open => false,
                            Pending::Negate => true,
                            Pending::Binary(top_op) => {
                                top_op.precedence() > op.precedence()
                                || (top_op.precedence() == op.precedence()
                                    && !op.is_right_associative())
                            },
                        };
                        if !reduce {
                            break;
                        }
                        operators.pop();
                        self.reduce(top, &mut operands)?;
                    }
                    operators.push(Pending::Binary(op));
                    expect_operand = true;
                },
            }
            i += 1;
        }

        if expect_operand {
            let details = if tokens.is_empty() {
                "empty expression"
            } else {
                "expression ends with an operator"
            };
            return Err(self.malformed(details));
        }
        while let Some(pending) = operators.pop() {
            if matches!(pending, Pending::Open) {
                return Err(self.unbalanced());
            }
            self.reduce(pending, &mut operands)?;
        }
        match (operands.pop(), operands.is_empty()) {
            (Some(expr), true) => Ok(expr),
            _ => Err(self.malformed("missing operator")),
        }
    }

    /// Parses the subscripts following `name`, returning the reference and
    /// how many tokens the subscripts used.
    fn parse_reference(&self, name: &str, rest: &[ExprToken]) -> ParseResult<(Reference, usize)> {
        let mut subscripts = Vec::new();
        let mut consumed = 0;
        while rest.get(consumed) == Some(&ExprToken::LBracket) {
            let close = matching_bracket(rest, consumed).ok_or_else(|| self.unbalanced())?;
            let inner = &rest[consumed + 1..close];
            if inner.is_empty() {
                return Err(self.malformed(&format!("empty subscript on <{name}>")));
            }
            subscripts.push(self.parse_tokens(inner)?);
            consumed = close + 1;
        }

        let reference = match subscripts.len() {
            0 => Reference::Scalar(self.symbols.resolve_scalar(name, self.line)?),
            1 => {
                let list = self.symbols.resolve_list(name, self.line)?;
                let index = subscripts.pop().map(Box::new).ok_or_else(|| {
                                                                 self.malformed("missing subscript")
                                                             })?;
                Reference::ListEntry { list, index }
            },
            2 => {
                let matrix = self.symbols.resolve_matrix(name, self.line)?;
                let mut subscripts = subscripts.into_iter().map(Box::new);
                match (subscripts.next(), subscripts.next()) {
                    (Some(row), Some(column)) => Reference::MatrixEntry { matrix, row, column },
                    _ => return Err(self.malformed("missing subscript")),
                }
            },
            _ => {
                return Err(ParseError::TooManySubscripts { expr: self.text.to_string(),
                                                           line: self.line, });
            },
        };
        Ok((reference, consumed))
    }

    fn reduce(&self, pending: Pending, operands: &mut Vec<Expr>) -> ParseResult<()> {
        let missing = || self.malformed("missing operand");
        let expr = match pending {
            Pending::Open => return Err(self.unbalanced()),
            Pending::Negate => {
                let operand = operands.pop().ok_or_else(missing)?;
                Expr::binary(BinaryOperator::Sub, Expr::Constant(0.0), operand)
            },
            Pending::Binary(op) => {
                let right = operands.pop().ok_or_else(missing)?;
                let left = operands.pop().ok_or_else(missing)?;
                Expr::binary(op, left, right)
            },
        };
        operands.push(expr);
        Ok(())
    }

    fn require_operator_slot(&self, expect_operand: bool) -> ParseResult<()> {
        if expect_operand {
            Ok(())
        } else {
            Err(self.malformed("missing operator between operands"))
        }
    }

    fn malformed(&self, details: &str) -> ParseError {
        ParseError::MalformedExpression { expr:    self.text.to_string(),
                                          details: details.to_string(),
                                          line:    self.line, }
    }

    fn unbalanced(&self) -> ParseError {
        ParseError::UnbalancedExpression { expr: self.text.to_string(),
                                           line: self.line, }
    }
}

fn matching_bracket(tokens: &[ExprToken], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            ExprToken::LBracket => depth += 1,
            ExprToken::RBracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            },
            _ => {},
        }
    }
    None
}

fn binary_operator(token: &ExprToken) -> Option<BinaryOperator> {
    Some(match token {
        ExprToken::Plus => BinaryOperator::Add,
        ExprToken::Minus => BinaryOperator::Sub,
        ExprToken::Star => BinaryOperator::Mul,
        ExprToken::Slash => BinaryOperator::Div,
        ExprToken::Percent => BinaryOperator::Mod,
        ExprToken::Caret => BinaryOperator::Pow,
        ExprToken::And => BinaryOperator::And,
        ExprToken::Or => BinaryOperator::Or,
        ExprToken::Equal => BinaryOperator::Equal,
        ExprToken::NotEqual => BinaryOperator::NotEqual,
        ExprToken::Less => BinaryOperator::Less,
        ExprToken::LessEqual => BinaryOperator::LessEqual,
        ExprToken::Greater => BinaryOperator::Greater,
        ExprToken::GreaterEqual => BinaryOperator::GreaterEqual,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> ParseResult<Expr> {
        let mut symbols = Symbols::new();
        symbols.declare_scalar("x", 1).unwrap();
        symbols.declare_list("xs", 1).unwrap();
        symbols.declare_matrix("m", 1).unwrap();
        Scanner::new(text, &symbols, 7).scan()
    }

    fn constant(value: f64) -> Box<Expr> {
        Box::new(Expr::Constant(value))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = scan("1+2*3").unwrap();
        assert_eq!(expr,
                   Expr::binary(BinaryOperator::Add,
                                Expr::Constant(1.0),
                                Expr::binary(BinaryOperator::Mul,
                                             Expr::Constant(2.0),
                                             Expr::Constant(3.0))));
    }

    #[test]
    fn power_is_right_associative() {
        let expr = scan("2^3^2").unwrap();
        let Expr::BinaryOp { op, left, right } = expr else {
            panic!("expected a binary node");
        };
        assert_eq!(op, BinaryOperator::Pow);
        assert_eq!(left, constant(2.0));
        assert!(matches!(*right, Expr::BinaryOp { op: BinaryOperator::Pow, .. }));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = scan("8-4-2").unwrap();
        let Expr::BinaryOp { left, right, .. } = expr else {
            panic!("expected a binary node");
        };
        assert!(matches!(*left, Expr::BinaryOp { op: BinaryOperator::Sub, .. }));
        assert_eq!(right, constant(2.0));
    }

    #[test]
    fn unary_minus_before_number_is_a_constant() {
        assert_eq!(scan("-3").unwrap(), Expr::Constant(-3.0));
        assert_eq!(scan("(-3)").unwrap(), Expr::Constant(-3.0));
        assert_eq!(scan("2*-3").unwrap(),
                   Expr::binary(BinaryOperator::Mul, Expr::Constant(2.0), Expr::Constant(-3.0)));
    }

    #[test]
    fn unary_minus_before_name_subtracts_from_zero() {
        let expr = scan("-x").unwrap();
        assert!(matches!(expr,
                         Expr::BinaryOp { op: BinaryOperator::Sub, ref left, .. }
                         if **left == Expr::Constant(0.0)));
    }

    #[test]
    fn subscripts_pick_the_namespace() {
        assert!(matches!(scan("x").unwrap(), Expr::Reference(Reference::Scalar(_))));
        assert!(matches!(scan("xs[x+1]").unwrap(),
                         Expr::Reference(Reference::ListEntry { .. })));
        assert!(matches!(scan("m[1][xs[0]]").unwrap(),
                         Expr::Reference(Reference::MatrixEntry { .. })));
    }

    #[test]
    fn three_subscripts_are_rejected() {
        assert!(matches!(scan("m[1][2][3]"), Err(ParseError::TooManySubscripts { line: 7, .. })));
    }

    #[test]
    fn unknown_names_are_name_errors() {
        assert!(matches!(scan("y+1"), Err(ParseError::Undefined { .. })));
        assert!(matches!(scan("x[1]"), Err(ParseError::Undefined { .. })));
    }

    #[test]
    fn malformed_expressions() {
        assert!(matches!(scan("(1+2"), Err(ParseError::UnbalancedExpression { .. })));
        assert!(matches!(scan("1+2)"), Err(ParseError::UnbalancedExpression { .. })));
        assert!(matches!(scan("1+"), Err(ParseError::MalformedExpression { .. })));
        assert!(matches!(scan("1 2"), Err(ParseError::MalformedExpression { .. })));
        assert!(matches!(scan("()"), Err(ParseError::MalformedExpression { .. })));
        assert!(matches!(scan(""), Err(ParseError::MalformedExpression { .. })));
        assert!(matches!(scan("x $ 1"), Err(ParseError::InvalidCharacter { .. })));
    }

    #[test]
    fn double_character_operators_are_aliases() {
        assert_eq!(scan("1&&2").unwrap(), scan("1&2").unwrap());
        assert_eq!(scan("1||2").unwrap(), scan("1|2").unwrap());
        assert_eq!(scan("1==2").unwrap(), scan("1=2").unwrap());
    }
}
