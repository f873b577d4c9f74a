//! Parsing of loosely typed arguments at the crate boundary.
//!
//! The typed API cannot receive a two-dimensional series or a non-boolean
//! flag. Text input can, so these parsers apply the same rules before any
//! numeric work: the series must be one-dimensional and numeric, the count
//! must convert to a positive integer and flags must be booleans.

use crate::errors::{SurrogateError, SurrogateResult};

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

/// Parse a one-dimensional series from text.
///
/// Accepts one value per line or a single line of values separated by
/// whitespace, commas or semicolons. Blank lines and lines starting with `#`
/// are skipped. Several lines holding several values each describe a table
/// and are rejected.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::input::parse_series;
///
/// assert_eq!(parse_series("1\n2\n3\n").unwrap(), vec![1.0, 2.0, 3.0]);
/// assert_eq!(parse_series("1, 2, 3").unwrap(), vec![1.0, 2.0, 3.0]);
/// assert!(parse_series("1 2\n3 4\n").is_err());
/// ```
pub fn parse_series(text: &str) -> SurrogateResult<Vec<f64>> {
    let rows: Vec<(usize, Vec<&str>)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            let tokens: Vec<&str> = line.split(is_separator).filter(|t| !t.is_empty()).collect();
            (n, tokens)
        })
        .collect();

    let widest = rows.iter().map(|(_, tokens)| tokens.len()).max().unwrap_or(0);
    if rows.len() > 1 && widest > 1 {
        return Err(SurrogateError::invalid_input(
            "original_data",
            format!(
                "must be a one-dimensional sequence, got {} rows with up to {} columns",
                rows.len(),
                widest
            ),
        ));
    }

    let mut series = Vec::new();
    for (line, tokens) in rows {
        for token in tokens {
            let value: f64 = token.parse().map_err(|_| {
                SurrogateError::invalid_input(
                    "original_data",
                    format!("must be numeric, found '{}' on line {}", token, line),
                )
            })?;
            series.push(value);
        }
    }

    Ok(series)
}

/// Convert `text` to a positive surrogate count.
///
/// Integers are taken as is; finite decimals are truncated toward zero.
/// Anything that does not end up >= 1 is rejected.
pub fn parse_count(text: &str) -> SurrogateResult<usize> {
    let invalid = || {
        SurrogateError::invalid_input(
            "count",
            format!(
                "must be a positive integer or convertible to a positive integer, got '{}'",
                text
            ),
        )
    };

    let text = text.trim();
    let count = match text.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let value: f64 = text.parse().map_err(|_| invalid())?;
            if !value.is_finite() || value.abs() >= i64::MAX as f64 {
                return Err(invalid());
            }
            value.trunc() as i64
        }
    };

    if count < 1 {
        return Err(invalid());
    }
    usize::try_from(count).map_err(|_| invalid())
}

/// Parse a boolean flag named `name`: `true` or `false`, any case.
pub fn parse_flag(name: &str, text: &str) -> SurrogateResult<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SurrogateError::invalid_input(
            name,
            format!("must be a boolean, got '{}'", text),
        )),
    }
}
