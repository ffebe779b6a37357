use crate::{
    ast::{BinaryOperator, Expr, Reference, is_truthy},
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        symbols::{ListId, MatrixId, ScalarId, Symbols},
    },
    util::num::f64_to_index,
};

/// A reference whose subscripts have been evaluated and bounds-checked.
///
/// Resolving first and storing second means a statement whose subscript is
/// out of range fails before it changes anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// A scalar slot.
    Scalar(ScalarId),
    /// An entry of a list.
    ListEntry(ListId, usize),
    /// An entry of a matrix, by row then column.
    MatrixEntry(MatrixId, usize, usize),
}

impl Symbols {
    /// Evaluates an expression against the current variable values.
    ///
    /// `&` and `|` short-circuit: the right operand is not evaluated when the
    /// left one already decides the result.
    ///
    /// # Errors
    /// Returns [`RuntimeError::IndexOutOfBounds`] when a subscript is
    /// negative, not a number, or past the end of its list or matrix.
    pub fn evaluate(&self, expr: &Expr, line: usize) -> EvalResult<f64> {
        match expr {
            Expr::Constant(value) => Ok(*value),
            Expr::Reference(reference) => {
                let location = self.locate(reference, line)?;
                self.load(location, line)
            },
            Expr::BinaryOp { op: BinaryOperator::And,
                             left,
                             right, } => {
                let result = is_truthy(self.evaluate(left, line)?)
                             && is_truthy(self.evaluate(right, line)?);
                Ok(f64::from(u8::from(result)))
            },
            Expr::BinaryOp { op: BinaryOperator::Or,
                             left,
                             right, } => {
                let result = is_truthy(self.evaluate(left, line)?)
                             || is_truthy(self.evaluate(right, line)?);
                Ok(f64::from(u8::from(result)))
            },
            Expr::BinaryOp { op, left, right } => {
                let left = self.evaluate(left, line)?;
                let right = self.evaluate(right, line)?;
                Ok(op.apply(left, right))
            },
        }
    }

    /// Evaluates the subscripts of a reference and checks them against the
    /// current list or matrix size.
    pub fn locate(&self, reference: &Reference, line: usize) -> EvalResult<Location> {
        match reference {
            Reference::Scalar(id) => Ok(Location::Scalar(*id)),
            Reference::ListEntry { list, index } => {
                let raw = self.evaluate(index, line)?;
                let entries = self.list(*list);
                match f64_to_index(raw) {
                    Some(i) if i < entries.len() => Ok(Location::ListEntry(*list, i)),
                    _ => Err(RuntimeError::IndexOutOfBounds { name: self.list_name(*list)
                                                                        .to_string(),
                                                              index: raw.to_string(),
                                                              line }),
                }
            },
            Reference::MatrixEntry { matrix, row, column } => {
                let raw_row = self.evaluate(row, line)?;
                let raw_column = self.evaluate(column, line)?;
                let rows = self.matrix(*matrix);
                let position = f64_to_index(raw_row).zip(f64_to_index(raw_column));
                match position {
                    Some((r, c)) if rows.get(r).is_some_and(|entries| c < entries.len()) => {
                        Ok(Location::MatrixEntry(*matrix, r, c))
                    },
                    _ => Err(RuntimeError::IndexOutOfBounds { name: self.matrix_name(*matrix)
                                                                        .to_string(),
                                                              index: format!("{raw_row}, {raw_column}"),
                                                              line }),
                }
            },
        }
    }

    /// Reads the value stored at a location.
    pub fn load(&self, location: Location, line: usize) -> EvalResult<f64> {
        match location {
            Location::Scalar(id) => Ok(self.scalar(id)),
            Location::ListEntry(list, i) => {
                self.list(list)
                    .get(i)
                    .copied()
                    .ok_or_else(|| self.stale_list(list, i, line))
            },
            Location::MatrixEntry(matrix, r, c) => {
                self.matrix(matrix)
                    .get(r)
                    .and_then(|row| row.get(c))
                    .copied()
                    .ok_or_else(|| self.stale_matrix(matrix, r, c, line))
            },
        }
    }

    /// Writes a value to a location.
    pub fn store(&mut self, location: Location, value: f64, line: usize) -> EvalResult<()> {
        match location {
            Location::Scalar(id) => {
                self.set_scalar(id, value);
                Ok(())
            },
            Location::ListEntry(list, i) => {
                if let Some(entry) = self.list_mut(list).get_mut(i) {
                    *entry = value;
                    return Ok(());
                }
                Err(self.stale_list(list, i, line))
            },
            Location::MatrixEntry(matrix, r, c) => {
                if let Some(entry) = self.matrix_mut(matrix)
                                         .get_mut(r)
                                         .and_then(|row| row.get_mut(c))
                {
                    *entry = value;
                    return Ok(());
                }
                Err(self.stale_matrix(matrix, r, c, line))
            },
        }
    }

    /// Resolves a reference and stores a value there.
    pub fn assign(&mut self, reference: &Reference, value: f64, line: usize) -> EvalResult<()> {
        let location = self.locate(reference, line)?;
        self.store(location, value, line)
    }

    fn stale_list(&self, list: ListId, i: usize, line: usize) -> RuntimeError {
        RuntimeError::IndexOutOfBounds { name: self.list_name(list).to_string(),
                                         index: i.to_string(),
                                         line }
    }

    fn stale_matrix(&self, matrix: MatrixId, r: usize, c: usize, line: usize) -> RuntimeError {
        RuntimeError::IndexOutOfBounds { name: self.matrix_name(matrix).to_string(),
                                         index: format!("{r}, {c}"),
                                         line }
    }
}
