use std::{
    io::{BufRead, Write},
    thread,
    time::Duration,
};

use rand::Rng;
use tracing::debug;

use crate::{
    ast::{Adjustment, Reference, StatementKind, TrigFunction},
    error::RuntimeError,
    interpreter::evaluator::core::{Context, EvalResult},
    util::{
        num::{f64_to_size, grow, usize_to_f64, zeroed, zeroed_matrix},
        table::{read_table, write_table},
    },
};

impl Context {
    /// Executes a statement that neither opens a block nor changes control
    /// flow.
    pub(in crate::interpreter::evaluator) fn execute_command(&mut self,
                                                             kind: &StatementKind,
                                                             line: usize)
                                                             -> EvalResult<()> {
        match kind {
            StatementKind::DeclareScalar { target, value } => {
                let value = self.symbols.evaluate(value, line)?;
                self.symbols.set_scalar(*target, value);
            },
            StatementKind::DeclareScalars { targets, value } => {
                let value = self.symbols.evaluate(value, line)?;
                for target in targets {
                    self.symbols.set_scalar(*target, value);
                }
            },
            StatementKind::DeclareList { list, length } => {
                let requested = self.symbols.evaluate(length, line)?;
                let values = zeroed(f64_to_size(requested, line)?, requested, line)?;
                *self.symbols.list_mut(*list) = values;
            },
            StatementKind::DeclareMatrix { matrix, rows, columns } => {
                let requested_rows = self.symbols.evaluate(rows, line)?;
                let requested_columns = self.symbols.evaluate(columns, line)?;
                let entries = zeroed_matrix(f64_to_size(requested_rows, line)?,
                                            f64_to_size(requested_columns, line)?,
                                            requested_rows * requested_columns,
                                            line)?;
                *self.symbols.matrix_mut(*matrix) = entries;
            },
            StatementKind::DefineList { list, values } => {
                self.symbols.list_mut(*list).clone_from(values);
            },
            StatementKind::DefineMatrix { matrix, rows } => {
                self.symbols.matrix_mut(*matrix).clone_from(rows);
            },
            StatementKind::Assign { target, value } => {
                let location = self.symbols.locate(target, line)?;
                let value = self.symbols.evaluate(value, line)?;
                self.symbols.store(location, value, line)?;
            },
            StatementKind::Increment { target } => self.update(target, line, |v| Ok(v + 1.0))?,
            StatementKind::Decrement { target } => self.update(target, line, |v| Ok(v - 1.0))?,
            StatementKind::Adjust { target, adjustment } => {
                self.update(target, line, |v| {
                        Ok(match adjustment {
                            Adjustment::Ceil => v.ceil(),
                            Adjustment::Floor => v.floor(),
                            Adjustment::Abs => v.abs(),
                        })
                    })?;
            },
            StatementKind::Round { target, precision } => {
                let step = self.symbols.evaluate(precision, line)?;
                self.update(target, line, |v| Ok((v / step).round() * step))?;
            },
            StatementKind::Trig { function,
                                  target,
                                  argument, } => {
                let x = self.symbols.evaluate(argument, line)?;
                let value = trig(*function, x, line)?;
                self.symbols.assign(target, value, line)?;
            },
            StatementKind::Log { target, value, base } => {
                let x = self.symbols.evaluate(value, line)?;
                let base = self.symbols.evaluate(base, line)?;
                self.symbols.assign(target, x.log10() / base.log10(), line)?;
            },
            StatementKind::Root { target, value, degree } => {
                let x = self.symbols.evaluate(value, line)?;
                let degree = self.symbols.evaluate(degree, line)?;
                self.symbols.assign(target, x.powf(degree.recip()), line)?;
            },
            StatementKind::Random { target,
                                    maximum,
                                    minimum, } => {
                let maximum = self.symbols.evaluate(maximum, line)?;
                let minimum = self.symbols.evaluate(minimum, line)?;
                let location = self.symbols.locate(target, line)?;
                let value = random_between(minimum, maximum, line)?;
                self.symbols.store(location, value, line)?;
            },
            StatementKind::ListLength { target, list } => {
                let length = usize_to_f64(self.symbols.list(*list).len());
                self.symbols.assign(target, length, line)?;
            },
            StatementKind::MatrixDims { rows,
                                        columns,
                                        matrix, } => {
                let entries = self.symbols.matrix(*matrix);
                let row_count = usize_to_f64(entries.len());
                let column_count = usize_to_f64(entries.first().map_or(0, Vec::len));
                let rows = self.symbols.locate(rows, line)?;
                let columns = self.symbols.locate(columns, line)?;
                self.symbols.store(rows, row_count, line)?;
                self.symbols.store(columns, column_count, line)?;
            },
            StatementKind::Push { value, list } => {
                let value = self.symbols.evaluate(value, line)?;
                self.symbols.list_mut(*list).push(value);
            },
            StatementKind::Pop { target, list } => {
                let value = self.symbols.list_mut(*list).pop().ok_or_else(|| {
                                RuntimeError::EmptyList { name: self.symbols
                                                                    .list_name(*list)
                                                                    .to_string(),
                                                          line }
                            })?;
                // The target may be an entry of the popped list, so it is
                // resolved against the shortened list.
                if let Err(e) = self.symbols.assign(target, value, line) {
                    self.symbols.list_mut(*list).push(value);
                    return Err(e);
                }
            },
            StatementKind::Resize { list, length } => {
                let requested = self.symbols.evaluate(length, line)?;
                let length = f64_to_size(requested, line)?;
                grow(self.symbols.list_mut(*list), length, requested, line)?;
            },
            StatementKind::ReadTable { matrix, path } => {
                let rows = read_table(path).map_err(|e| table_error(&e, path, line))?;
                debug!(path = path.as_str(), rows = rows.len(), "read table");
                *self.symbols.matrix_mut(*matrix) = rows;
            },
            StatementKind::WriteTable { matrix, path } => {
                write_table(path, self.symbols.matrix(*matrix)).map_err(|e| {
                                                                   RuntimeError::io(&e, line)
                                                               })?;
                debug!(path = path.as_str(), "wrote table");
            },
            StatementKind::Sleep { millis } => {
                let millis = self.symbols.evaluate(millis, line)?;
                let duration = Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| {
                                   RuntimeError::InvalidSize { value: millis,
                                                               line }
                               })?;
                self.flush(line)?;
                thread::sleep(duration);
            },
            StatementKind::PrintLine { .. }
            | StatementKind::PrintInline { .. }
            | StatementKind::PrintValue { .. }
            | StatementKind::PrintMatrix { .. }
            | StatementKind::Input { .. }
            | StatementKind::NewLine => self.execute_console(kind, line)?,
            StatementKind::Loop { .. }
            | StatementKind::SilentLoop { .. }
            | StatementKind::InitLoop { .. }
            | StatementKind::While { .. }
            | StatementKind::If { .. }
            | StatementKind::Elif { .. }
            | StatementKind::Else { .. }
            | StatementKind::DeclareFunction { .. }
            | StatementKind::Call { .. }
            | StatementKind::Exit
            | StatementKind::Leave => {},
        }
        Ok(())
    }

    fn execute_console(&mut self, kind: &StatementKind, line: usize) -> EvalResult<()> {
        let io_error = |e: std::io::Error| RuntimeError::io(&e, line);
        match kind {
            StatementKind::PrintLine { text } => writeln!(self.output, "{text}").map_err(io_error)?,
            StatementKind::PrintInline { text } => write!(self.output, "{text}").map_err(io_error)?,
            StatementKind::PrintValue { value } => {
                let value = self.symbols.evaluate(value, line)?;
                write!(self.output, "{value}").map_err(io_error)?;
            },
            StatementKind::PrintMatrix { matrix } => {
                for row in self.symbols.matrix(*matrix) {
                    let entries = row.iter().map(f64::to_string).collect::<Vec<_>>();
                    writeln!(self.output, "[{}]", entries.join(", ")).map_err(io_error)?;
                }
            },
            StatementKind::NewLine => writeln!(self.output).map_err(io_error)?,
            StatementKind::Input { target, prompt } => {
                let location = self.symbols.locate(target, line)?;
                write!(self.output, "{prompt}").map_err(io_error)?;
                self.flush(line)?;
                let mut text = String::new();
                let read = self.input.read_line(&mut text).map_err(io_error)?;
                let text = text.trim();
                let value = text.parse::<f64>()
                                .ok()
                                .filter(|_| read > 0)
                                .ok_or_else(|| RuntimeError::InvalidInput { text: text.to_string(),
                                                                            line })?;
                self.symbols.store(location, value, line)?;
            },
            _ => {},
        }
        Ok(())
    }

    /// Reads a location, applies `f` and writes the result back to the same
    /// location.
    fn update(&mut self,
              target: &Reference,
              line: usize,
              f: impl FnOnce(f64) -> EvalResult<f64>)
              -> EvalResult<()> {
        let location = self.symbols.locate(target, line)?;
        let value = f(self.symbols.load(location, line)?)?;
        self.symbols.store(location, value, line)
    }

    fn flush(&mut self, line: usize) -> EvalResult<()> {
        self.output.flush().map_err(|e| RuntimeError::io(&e, line))
    }
}

fn trig(function: TrigFunction, x: f64, line: usize) -> EvalResult<f64> {
    let inverse = matches!(function,
                           TrigFunction::Asin | TrigFunction::Acos | TrigFunction::Atan);
    if inverse && !(-1.0..=1.0).contains(&x) {
        return Err(RuntimeError::DomainError { function: function.keyword(),
                                               value: x,
                                               details: "argument must lie in [-1, 1]",
                                               line });
    }
    Ok(match function {
        TrigFunction::Sin => x.sin(),
        TrigFunction::Cos => x.cos(),
        TrigFunction::Tan => x.tan(),
        TrigFunction::Csc => x.sin().recip(),
        TrigFunction::Sec => x.cos().recip(),
        TrigFunction::Cot => x.cos() / x.sin(),
        TrigFunction::Asin => x.asin(),
        TrigFunction::Acos => x.acos(),
        TrigFunction::Atan => x.atan(),
    })
}

#[allow(clippy::float_cmp)]
fn random_between(minimum: f64, maximum: f64, line: usize) -> EvalResult<f64> {
    let (low, high) = if minimum <= maximum {
        (minimum, maximum)
    } else {
        (maximum, minimum)
    };
    if !low.is_finite() || !high.is_finite() {
        let value = if low.is_finite() { high } else { low };
        return Err(RuntimeError::DomainError { function: "random",
                                               value,
                                               details: "bounds must be finite",
                                               line });
    }
    if low == high {
        return Ok(low);
    }
    if !(high - low).is_finite() {
        return Err(RuntimeError::DomainError { function: "random",
                                               value: high - low,
                                               details: "the range between the bounds is too wide",
                                               line });
    }
    Ok(rand::thread_rng().gen_range(low..=high))
}

fn table_error(error: &std::io::Error, path: &str, line: usize) -> RuntimeError {
    if error.kind() == std::io::ErrorKind::InvalidData {
        RuntimeError::MalformedTable { path: path.to_string(),
                                       details: error.to_string(),
                                       line }
    } else {
        RuntimeError::io(error, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_trig_checks_its_domain() {
        assert!(matches!(trig(TrigFunction::Asin, 1.5, 3),
                         Err(RuntimeError::DomainError { function: "asin", line: 3, .. })));
        assert!(trig(TrigFunction::Acos, -1.0, 3).is_ok());
        assert!(trig(TrigFunction::Sin, 100.0, 3).is_ok());
    }

    #[test]
    fn reciprocal_functions() {
        let x = 0.7_f64;
        assert!((trig(TrigFunction::Csc, x, 1).unwrap() - 1.0 / x.sin()).abs() < 1e-12);
        assert!((trig(TrigFunction::Sec, x, 1).unwrap() - 1.0 / x.cos()).abs() < 1e-12);
        assert!((trig(TrigFunction::Cot, x, 1).unwrap() - 1.0 / x.tan()).abs() < 1e-12);
    }

    #[test]
    fn random_stays_within_swapped_bounds() {
        for _ in 0..200 {
            let value = random_between(10.0, 2.0, 1).unwrap();
            assert!((2.0..=10.0).contains(&value));
        }
        assert_eq!(random_between(4.0, 4.0, 1).unwrap(), 4.0);
        assert!(random_between(0.0, f64::INFINITY, 1).is_err());
        assert!(random_between(f64::NAN, 1.0, 1).is_err());
    }

    #[test]
    fn random_rejects_ranges_wider_than_f64() {
        assert!(matches!(random_between(-1e308, 1e308, 5),
                         Err(RuntimeError::DomainError { function: "random", line: 5, .. })));
        let value = random_between(-1e307, 1e307, 5).unwrap();
        assert!((-1e307..=1e307).contains(&value));
    }
}
