use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;

/// Converts a subscript value to a position by truncating toward zero.
///
/// # Parameters
/// - `value`: The evaluated subscript.
///
/// # Returns
/// - `Some(usize)`: The truncated position.
/// - `None`: If the value is negative after truncation, not finite, or too
///   large to address anything.
///
/// # Example
/// ```
/// use sqbra::util::num::f64_to_index;
///
/// assert_eq!(f64_to_index(2.0), Some(2));
/// assert_eq!(f64_to_index(2.9), Some(2));
/// assert_eq!(f64_to_index(-0.5), Some(0));
/// assert_eq!(f64_to_index(-1.0), None);
/// assert_eq!(f64_to_index(f64::NAN), None);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
pub fn f64_to_index(value: f64) -> Option<usize> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < 0.0 || truncated > MAX_SAFE_U64_INT as f64 {
        return None;
    }
    usize::try_from(truncated as u64).ok()
}

/// Converts a requested length or count to a `usize`.
///
/// Fractions are truncated like subscripts are.
///
/// # Errors
/// Returns [`RuntimeError::InvalidSize`] for negative or non-finite values.
///
/// # Example
/// ```
/// use sqbra::{error::RuntimeError, util::num::f64_to_size};
///
/// assert_eq!(f64_to_size(3.7, 1).unwrap(), 3);
/// let err = f64_to_size(-2.0, 4).unwrap_err();
/// assert!(matches!(err, RuntimeError::InvalidSize { line: 4, .. }));
/// ```
pub fn f64_to_size(value: f64, line: usize) -> EvalResult<usize> {
    f64_to_index(value).ok_or(RuntimeError::InvalidSize { value, line })
}

/// Allocates a list of `length` zeros.
///
/// `requested` is the size as the program wrote it and only appears in the
/// error.
///
/// # Errors
/// Returns [`RuntimeError::InvalidSize`] when the memory cannot be reserved.
///
/// # Example
/// ```
/// use sqbra::util::num::zeroed;
///
/// assert_eq!(zeroed(3, 3.0, 1).unwrap(), [0.0, 0.0, 0.0]);
/// assert!(zeroed(usize::MAX / 4, 1e18, 1).is_err());
/// ```
pub fn zeroed(length: usize, requested: f64, line: usize) -> EvalResult<Vec<f64>> {
    let mut values = Vec::new();
    grow(&mut values, length, requested, line)?;
    Ok(values)
}

/// Resizes `values` to `length`, filling new entries with zeros.
///
/// # Errors
/// Returns [`RuntimeError::InvalidSize`] when the memory cannot be reserved.
/// `values` is left untouched in that case.
pub fn grow(values: &mut Vec<f64>, length: usize, requested: f64, line: usize) -> EvalResult<()> {
    values.try_reserve_exact(length.saturating_sub(values.len()))
          .map_err(|_| RuntimeError::InvalidSize { value: requested,
                                                   line })?;
    values.resize(length, 0.0);
    Ok(())
}

/// Allocates a `rows` by `columns` matrix of zeros.
///
/// The total size is reserved once up front, so an impossible matrix fails
/// before any row is built.
///
/// # Errors
/// Returns [`RuntimeError::InvalidSize`] when the entry count overflows or
/// the memory cannot be reserved.
///
/// # Example
/// ```
/// use sqbra::util::num::zeroed_matrix;
///
/// assert_eq!(zeroed_matrix(2, 1, 2.0, 1).unwrap(), [vec![0.0], vec![0.0]]);
/// assert!(zeroed_matrix(usize::MAX, 2, 1e18, 1).is_err());
/// ```
pub fn zeroed_matrix(rows: usize,
                     columns: usize,
                     requested: f64,
                     line: usize)
                     -> EvalResult<Vec<Vec<f64>>> {
    let too_large = || RuntimeError::InvalidSize { value: requested,
                                                   line };
    let total = rows.checked_mul(columns).ok_or_else(too_large)?;
    Vec::<f64>::new().try_reserve_exact(total).map_err(|_| too_large())?;

    let mut matrix = Vec::new();
    matrix.try_reserve_exact(rows).map_err(|_| too_large())?;
    for _ in 0..rows {
        matrix.push(zeroed(columns, requested, line)?);
    }
    Ok(matrix)
}

/// Converts a length to the language's number type.
///
/// Lengths beyond `2^53` cannot occur in practice, so the conversion is
/// lossless for every list or matrix a program can build.
///
/// # Example
/// ```
/// use sqbra::util::num::usize_to_f64;
///
/// assert_eq!(usize_to_f64(12), 12.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub const fn usize_to_f64(value: usize) -> f64 {
    value as f64
}
