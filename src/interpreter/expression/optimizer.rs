use crate::ast::{BinaryOperator, Expr, Reference};

/// Simplifies an expression tree bottom-up.
///
/// Subtrees whose operands are both constants are folded into a single
/// constant. A handful of algebraic identities drop neutral operands:
///
/// | pattern            | result  |
/// |--------------------|---------|
/// | `x * 0`, `0 * x`   | `0`     |
/// | `x * 1`, `1 * x`   | `x`     |
/// | `x + 0`, `0 + x`   | `x`     |
/// | `x - 0`            | `x`     |
/// | `x * -1`, `-1 * x` | `0 - x` |
/// | `x / 1`            | `x`     |
///
/// Subscripts inside references are simplified as well. The result always
/// evaluates to the same value as the input for finite operands.
///
/// # Example
/// ```
/// use sqbra::{ast::Expr, interpreter::expression::optimizer::optimize};
/// use sqbra::ast::BinaryOperator;
///
/// let expr = Expr::binary(BinaryOperator::Add,
///                         Expr::Constant(2.0),
///                         Expr::binary(BinaryOperator::Mul,
///                                      Expr::Constant(3.0),
///                                      Expr::Constant(4.0)));
/// assert_eq!(optimize(expr), Expr::Constant(14.0));
/// ```
#[must_use]
pub fn optimize(expr: Expr) -> Expr {
    match expr {
        Expr::Constant(_) => expr,
        Expr::Reference(reference) => Expr::Reference(optimize_reference(reference)),
        Expr::BinaryOp { op, left, right } => simplify(op, optimize(*left), optimize(*right)),
    }
}

fn optimize_reference(reference: Reference) -> Reference {
    match reference {
        Reference::Scalar(_) => reference,
        Reference::ListEntry { list, index } => {
            Reference::ListEntry { list,
                                   index: Box::new(optimize(*index)) }
        },
        Reference::MatrixEntry { matrix, row, column } => {
            Reference::MatrixEntry { matrix,
                                     row: Box::new(optimize(*row)),
                                     column: Box::new(optimize(*column)) }
        },
    }
}

#[allow(clippy::float_cmp)]
fn simplify(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    use BinaryOperator::{Add, Div, Mul, Sub};

    match (op, left.as_constant(), right.as_constant()) {
        (_, Some(a), Some(b)) => Expr::Constant(op.apply(a, b)),
        (Mul, _, Some(b)) if b == 0.0 => Expr::Constant(0.0),
        (Mul, Some(a), _) if a == 0.0 => Expr::Constant(0.0),
        (Mul, _, Some(b)) if b == 1.0 => left,
        (Mul, Some(a), _) if a == 1.0 => right,
        (Mul, _, Some(b)) if b == -1.0 => Expr::binary(Sub, Expr::Constant(0.0), left),
        (Mul, Some(a), _) if a == -1.0 => Expr::binary(Sub, Expr::Constant(0.0), right),
        (Add | Sub, _, Some(b)) if b == 0.0 => left,
        (Add, Some(a), _) if a == 0.0 => right,
        (Div, _, Some(b)) if b == 1.0 => left,
        _ => Expr::binary(op, left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{expression::scanner::Scanner, symbols::Symbols};

    fn variable() -> (Symbols, Expr) {
        let mut symbols = Symbols::new();
        let x = symbols.declare_scalar("x", 1).unwrap();
        (symbols, Expr::Reference(Reference::Scalar(x)))
    }

    #[test]
    fn folds_constant_subtrees() {
        let expr = Expr::binary(BinaryOperator::Pow,
                                Expr::Constant(2.0),
                                Expr::binary(BinaryOperator::Pow,
                                             Expr::Constant(3.0),
                                             Expr::Constant(2.0)));
        assert_eq!(optimize(expr), Expr::Constant(512.0));
    }

    #[test]
    fn neutral_operands_are_dropped() {
        let (_symbols, x) = variable();
        for (op, constant, on_left) in [(BinaryOperator::Mul, 1.0, false),
                                        (BinaryOperator::Mul, 1.0, true),
                                        (BinaryOperator::Add, 0.0, false),
                                        (BinaryOperator::Add, 0.0, true),
                                        (BinaryOperator::Sub, 0.0, false),
                                        (BinaryOperator::Div, 1.0, false)]
        {
            let expr = if on_left {
                Expr::binary(op, Expr::Constant(constant), x.clone())
            } else {
                Expr::binary(op, x.clone(), Expr::Constant(constant))
            };
            assert_eq!(optimize(expr), x, "{op:?} with {constant} on_left={on_left}");
        }
    }

    #[test]
    fn multiplication_by_zero_is_zero() {
        let (_symbols, x) = variable();
        let expr = Expr::binary(BinaryOperator::Mul, Expr::Constant(0.0), x.clone());
        assert_eq!(optimize(expr), Expr::Constant(0.0));
        let expr = Expr::binary(BinaryOperator::Mul, x, Expr::Constant(0.0));
        assert_eq!(optimize(expr), Expr::Constant(0.0));
    }

    #[test]
    fn simplified_trees_evaluate_to_the_same_value() {
        let mut symbols = Symbols::new();
        let x = symbols.declare_scalar("x", 1).unwrap();
        symbols.set_scalar(x, 3.5);
        let y = symbols.declare_scalar("y", 1).unwrap();
        symbols.set_scalar(y, -2.0);
        let xs = symbols.declare_list("xs", 1).unwrap();
        *symbols.list_mut(xs) = vec![10.0, 20.0, 30.0];
        let m = symbols.declare_matrix("m", 1).unwrap();
        *symbols.matrix_mut(m) = vec![vec![1.0, 2.0], vec![3.0, 4.0]];

        for text in ["x*0",
                     "0*x",
                     "x*1",
                     "1*x",
                     "x+0",
                     "0+x",
                     "x-0",
                     "0-x",
                     "x/1",
                     "x*-1",
                     "-1*x",
                     "-x^2",
                     "2^3^2*x",
                     "(1+2)*(3-4)/x",
                     "((2*3)+(4/2))*y-1",
                     "x>3 & y<0",
                     "x*1 = 3.5 | 0",
                     "x%2 != y*0",
                     "xs[1+1]*1",
                     "xs[x-2.5+0]+m[1*1][0*y]",
                     "m[2-1][xs[0]/10]-0"]
        {
            let raw = Scanner::new(text, &symbols, 1).scan().unwrap();
            let expected = symbols.evaluate(&raw, 1).unwrap();
            let simplified = symbols.evaluate(&optimize(raw), 1).unwrap();
            assert_eq!(simplified, expected, "<{text}> changed value when simplified");
        }
    }

    #[test]
    fn multiplication_by_minus_one_negates() {
        let (_symbols, x) = variable();
        let expr = Expr::binary(BinaryOperator::Mul, x.clone(), Expr::Constant(-1.0));
        assert_eq!(optimize(expr),
                   Expr::binary(BinaryOperator::Sub, Expr::Constant(0.0), x));
    }

    #[test]
    fn zero_minus_x_is_kept() {
        let (_symbols, x) = variable();
        let expr = Expr::binary(BinaryOperator::Sub, Expr::Constant(0.0), x);
        assert_eq!(optimize(expr.clone()), expr);
    }

    #[test]
    fn subscripts_are_folded() {
        let mut symbols = Symbols::new();
        let list = symbols.declare_list("xs", 1).unwrap();
        let expr = Expr::Reference(Reference::ListEntry { list,
                                                          index:
                                                              Box::new(Expr::binary(BinaryOperator::Add,
                                                                                    Expr::Constant(1.0),
                                                                                    Expr::Constant(1.0))) });
        assert_eq!(optimize(expr),
                   Expr::Reference(Reference::ListEntry { list,
                                                          index: Box::new(Expr::Constant(2.0)) }));
    }
}
