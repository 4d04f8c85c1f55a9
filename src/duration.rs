//! Duration strings used throughout object specs.
//!
//! Accepts one or more `<number><unit>` segments, e.g. `"2s"`, `"1m30s"`,
//! `"250ms"`, `"1.5h"`. Supported units: `ns`, `us`, `ms`, `s`, `m`, `h`.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration {0:?}: missing unit")]
    MissingUnit(String),

    #[error("invalid duration {input:?}: unknown unit {unit:?}")]
    UnknownUnit { input: String, unit: String },

    #[error("invalid duration {0:?}")]
    Malformed(String),
}

/// Parse a duration string such as `"10s"` or `"1m30s"`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DurationError::MissingUnit(input.to_string()))?;
        if num_end == 0 {
            return Err(DurationError::Malformed(input.to_string()));
        }
        let value: f64 = rest[..num_end]
            .parse()
            .map_err(|_| DurationError::Malformed(input.to_string()))?;

        let tail = &rest[num_end..];
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let unit = &tail[..unit_end];
        let nanos_per_unit = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => {
                return Err(DurationError::UnknownUnit {
                    input: input.to_string(),
                    unit: unit.to_string(),
                })
            }
        };

        total += value * nanos_per_unit;
        rest = &tail[unit_end..];
    }

    if !total.is_finite() || total > u64::MAX as f64 {
        return Err(DurationError::Malformed(input.to_string()));
    }
    Ok(Duration::from_nanos(total as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert!(matches!(parse_duration("10"), Err(DurationError::MissingUnit(_))));
        assert!(matches!(parse_duration("5d"), Err(DurationError::UnknownUnit { .. })));
        assert!(matches!(parse_duration("s"), Err(DurationError::Malformed(_))));
        assert!(matches!(parse_duration("1..2s"), Err(DurationError::Malformed(_))));
    }
}
