use std::{fmt::Write as _, fs, io, path::Path};

/// Returns the text between the `["` and `"]` delimiters of a string literal.
///
/// # Example
/// ```
/// use sqbra::util::table::extract_string;
///
/// assert_eq!(extract_string("[\"Hello World\"]"), Some("Hello World"));
/// assert_eq!(extract_string("[\"\"]"), Some(""));
/// assert_eq!(extract_string("Hello"), None);
/// ```
#[must_use]
pub fn extract_string(text: &str) -> Option<&str> {
    text.strip_prefix("[\"")?.strip_suffix("\"]")
}

/// Parses a list literal such as `[1, 2.5, -3]`.
///
/// An empty literal `[]` yields an empty list. Returns `None` when the
/// brackets are missing or an entry is not a number.
///
/// # Example
/// ```
/// use sqbra::util::table::parse_numeric_sequence;
///
/// assert_eq!(parse_numeric_sequence("[0.5, 1,-2]"), Some(vec![0.5, 1.0, -2.0]));
/// assert_eq!(parse_numeric_sequence("[]"), Some(vec![]));
/// assert_eq!(parse_numeric_sequence("[1,,2]"), None);
/// ```
#[must_use]
pub fn parse_numeric_sequence(text: &str) -> Option<Vec<f64>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    parse_fields(inner)
}

/// Parses a matrix literal such as `[[1,2],[3,4]]`.
///
/// Rows may differ in length. An empty literal `[]` yields an empty matrix.
///
/// # Example
/// ```
/// use sqbra::util::table::parse_nested_numeric_sequence;
///
/// assert_eq!(parse_nested_numeric_sequence("[[1,2], [3]]"),
///            Some(vec![vec![1.0, 2.0], vec![3.0]]));
/// assert_eq!(parse_nested_numeric_sequence("[1,2]"), None);
/// ```
#[must_use]
pub fn parse_nested_numeric_sequence(text: &str) -> Option<Vec<Vec<f64>>> {
    let mut rest = text.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    let mut rows = Vec::new();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[')?;
        let close = body.find(']')?;
        rows.push(parse_fields(&body[..close])?);
        rest = body[close + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
            if rest.is_empty() {
                return None;
            }
        } else if !rest.is_empty() {
            return None;
        }
    }
    Some(rows)
}

fn parse_fields(inner: &str) -> Option<Vec<f64>> {
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner.split(',').map(|field| field.trim().parse().ok()).collect()
}

/// Reads a comma-separated table file into rows of numbers.
///
/// Blank lines are skipped and a trailing comma at the end of a row is
/// tolerated.
///
/// # Errors
/// Returns the I/O error when the file cannot be read, or an
/// [`io::ErrorKind::InvalidData`] error naming the first malformed line.
pub fn read_table(path: impl AsRef<Path>) -> io::Result<Vec<Vec<f64>>> {
    let contents = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line = line.strip_suffix(',').unwrap_or(line);
        let row = parse_fields(line).ok_or_else(|| {
                                        io::Error::new(io::ErrorKind::InvalidData,
                                                       format!("line {} is not a list of numbers",
                                                               i + 1))
                                    })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Writes rows of numbers as a comma-separated table file.
///
/// Rows are separated by newlines and the final row is followed by a single
/// space and a newline. Numbers use their shortest exact representation, so
/// [`read_table`] gets the same values back.
///
/// # Errors
/// Returns the I/O error when the file cannot be written.
pub fn write_table(path: impl AsRef<Path>, rows: &[Vec<f64>]) -> io::Result<()> {
    let mut contents = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            contents.push('\n');
        }
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                contents.push(',');
            }
            let _ = write!(contents, "{value}");
        }
    }
    contents.push_str(" \n");
    fs::write(path, contents)
}
