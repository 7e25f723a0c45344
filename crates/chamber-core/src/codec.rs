//! Decoding of colon-delimited clock fields.
//!
//! Both ASCII protocols report time remaining as clock strings, but with
//! different field counts: the TCP controllers send `HH:MM:SS`, the
//! serial-ASCII controllers send `HH:MM`. Each parser is strict about its
//! field count so a protocol mismatch surfaces as a parse error instead of a
//! silently truncated duration.

use chrono::TimeDelta;

use crate::error::{ChamberError, Result};

fn parse_clock_fields(input: &str, expected: usize, shape: &str) -> Result<Vec<i64>> {
    let fields: Vec<&str> = input.trim().split(':').collect();
    if fields.len() != expected {
        return Err(ChamberError::parse(format!(
            "expected {shape} time field, got {input:?}"
        )));
    }
    fields
        .iter()
        .map(|f| {
            f.trim()
                .parse::<i64>()
                .map_err(|_| ChamberError::parse(format!("non-numeric {shape} time field {input:?}")))
        })
        .collect()
}

/// Parses an `HH:MM:SS` field into a duration.
pub fn parse_hms(input: &str) -> Result<TimeDelta> {
    let fields = parse_clock_fields(input, 3, "HH:MM:SS")?;
    Ok(TimeDelta::hours(fields[0])
        + TimeDelta::minutes(fields[1])
        + TimeDelta::seconds(fields[2]))
}

/// Parses an `HH:MM` field into a duration.
pub fn parse_hm(input: &str) -> Result<TimeDelta> {
    let fields = parse_clock_fields(input, 2, "HH:MM")?;
    Ok(TimeDelta::hours(fields[0]) + TimeDelta::minutes(fields[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_decodes_to_duration() {
        let delta = parse_hms("01:02:03").unwrap();
        assert_eq!(delta, TimeDelta::seconds(3723));
    }

    #[test]
    fn hms_tolerates_surrounding_whitespace() {
        let delta = parse_hms(" 10:00:30\r\n").unwrap();
        assert_eq!(delta, TimeDelta::seconds(36030));
    }

    #[test]
    fn hm_decodes_to_duration() {
        let delta = parse_hm("02:30").unwrap();
        assert_eq!(delta, TimeDelta::minutes(150));
    }

    #[test]
    fn field_count_is_strict() {
        assert!(parse_hms("01:02").is_err());
        assert!(parse_hm("01:02:03").is_err());
    }

    #[test]
    fn non_numeric_field_is_a_parse_error() {
        assert!(matches!(
            parse_hms("aa:02:03"),
            Err(ChamberError::Parse(_))
        ));
    }
}
