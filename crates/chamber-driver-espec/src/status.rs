//! Decoded snapshots of the `MON?` and `PRGM MON?` responses.
//!
//! Both snapshots are recomputed on every query and discarded once the
//! caller has extracted what it needs. The field count of the response
//! selects the schema: chambers without a humidity channel send one field
//! less. Decoding is all or nothing - if any field of a response fails to
//! parse, the whole line is discarded and the defaults stand.

use chrono::TimeDelta;

use chamber_core::codec::parse_hm;
use chamber_core::error::{ChamberError, Result};

/// Current chamber conditions from a `MON?` response.
#[derive(Debug, Clone, PartialEq)]
pub struct ChamberConditions {
    /// Measured temperature in Celsius; `NaN` if unparsed.
    pub temp: f64,
    /// Measured humidity in percent; `NaN` if unparsed or the chamber has
    /// no humidity channel.
    pub humidity: f64,
    /// Controller operating mode string; `"UNKNOWN"` if unparsed.
    pub operating_mode: String,
    /// Active alarm count; `-1` if unparsed.
    pub num_alarms: i64,
}

impl Default for ChamberConditions {
    fn default() -> Self {
        Self {
            temp: f64::NAN,
            humidity: f64::NAN,
            operating_mode: "UNKNOWN".to_string(),
            num_alarms: -1,
        }
    }
}

/// Running program status from a `PRGM MON?` response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramStatus {
    /// Step currently executing; `-1` if unparsed.
    pub current_step_num: i64,
    /// Target temperature of the current step; `NaN` if unparsed.
    pub target_temp: f64,
    /// Target humidity of the current step; `NaN` if unparsed or absent.
    pub target_humidity: f64,
    /// Time remaining in the current step; minus one day if unparsed.
    pub time_remaining: TimeDelta,
    /// First repeats-remaining counter reported by the controller.
    pub repeats_remaining_a: i64,
    /// Second repeats-remaining counter reported by the controller.
    pub repeats_remaining_b: i64,
}

impl Default for ProgramStatus {
    fn default() -> Self {
        Self {
            current_step_num: -1,
            target_temp: f64::NAN,
            target_humidity: f64::NAN,
            time_remaining: TimeDelta::days(-1),
            repeats_remaining_a: -1,
            repeats_remaining_b: -1,
        }
    }
}

fn parse_f64(field: &str) -> Result<f64> {
    field
        .parse()
        .map_err(|_| ChamberError::parse(format!("non-numeric field {field:?}")))
}

fn parse_i64(field: &str) -> Result<i64> {
    field
        .parse()
        .map_err(|_| ChamberError::parse(format!("non-numeric field {field:?}")))
}

fn split_fields(line: &str) -> Vec<&str> {
    line.trim().split(',').map(str::trim).collect()
}

/// Decodes a `MON?` response, falling back to defaults if it is corrupt.
pub fn parse_conditions(line: &str) -> ChamberConditions {
    match try_parse_conditions(line) {
        Ok(conditions) => conditions,
        Err(err) => {
            tracing::warn!(line = ?line, error = %err, "discarding unparseable MON? response");
            ChamberConditions::default()
        }
    }
}

fn try_parse_conditions(line: &str) -> Result<ChamberConditions> {
    let fields = split_fields(line);
    match fields.len() {
        // humidity is included
        4 => Ok(ChamberConditions {
            temp: parse_f64(fields[0])?,
            humidity: parse_f64(fields[1])?,
            operating_mode: fields[2].to_string(),
            num_alarms: parse_i64(fields[3])?,
        }),
        // humidity is not included; temp-only chamber
        3 => Ok(ChamberConditions {
            temp: parse_f64(fields[0])?,
            humidity: f64::NAN,
            operating_mode: fields[1].to_string(),
            num_alarms: parse_i64(fields[2])?,
        }),
        n => Err(ChamberError::invalid_response(format!(
            "MON? response with {n} fields"
        ))),
    }
}

/// Decodes a `PRGM MON?` response, falling back to defaults if it is corrupt.
pub fn parse_program_status(line: &str) -> ProgramStatus {
    match try_parse_program_status(line) {
        Ok(status) => status,
        Err(err) => {
            tracing::warn!(line = ?line, error = %err, "discarding unparseable PRGM MON? response");
            ProgramStatus::default()
        }
    }
}

fn try_parse_program_status(line: &str) -> Result<ProgramStatus> {
    let fields = split_fields(line);
    match fields.len() {
        // humidity is included
        6 => Ok(ProgramStatus {
            current_step_num: parse_i64(fields[0])?,
            target_temp: parse_f64(fields[1])?,
            target_humidity: parse_f64(fields[2])?,
            time_remaining: parse_hm(fields[3])?,
            repeats_remaining_a: parse_i64(fields[4])?,
            repeats_remaining_b: parse_i64(fields[5])?,
        }),
        // humidity is not included; temp-only chamber
        5 => Ok(ProgramStatus {
            current_step_num: parse_i64(fields[0])?,
            target_temp: parse_f64(fields[1])?,
            target_humidity: f64::NAN,
            time_remaining: parse_hm(fields[2])?,
            repeats_remaining_a: parse_i64(fields[3])?,
            repeats_remaining_b: parse_i64(fields[4])?,
        }),
        n => Err(ChamberError::invalid_response(format!(
            "PRGM MON? response with {n} fields"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_with_humidity() {
        let conditions = parse_conditions("23.5, 45.0, COOL, 0");
        assert_eq!(conditions.temp, 23.5);
        assert_eq!(conditions.humidity, 45.0);
        assert_eq!(conditions.operating_mode, "COOL");
        assert_eq!(conditions.num_alarms, 0);
    }

    #[test]
    fn conditions_without_humidity() {
        let conditions = parse_conditions("23.5, COOL, 0");
        assert_eq!(conditions.temp, 23.5);
        assert!(conditions.humidity.is_nan());
        assert_eq!(conditions.operating_mode, "COOL");
        assert_eq!(conditions.num_alarms, 0);
    }

    #[test]
    fn malformed_conditions_yield_sentinels_without_raising() {
        let conditions = parse_conditions("garbage, 45.0, COOL, 0");
        assert!(conditions.temp.is_nan());
        assert!(conditions.humidity.is_nan());
        assert_eq!(conditions.operating_mode, "UNKNOWN");
        assert_eq!(conditions.num_alarms, -1);
    }

    #[test]
    fn wrong_field_count_is_discarded() {
        for line in ["23.5, 45.0", ""] {
            let conditions = parse_conditions(line);
            assert!(conditions.temp.is_nan());
            assert!(conditions.humidity.is_nan());
            assert_eq!(conditions.operating_mode, "UNKNOWN");
            assert_eq!(conditions.num_alarms, -1);
        }
    }

    #[test]
    fn decode_is_all_or_nothing() {
        // A bad trailing field throws out the values that did parse.
        let conditions = parse_conditions("23.5, 45.0, COOL, many");
        assert!(conditions.temp.is_nan());
        assert_eq!(conditions.num_alarms, -1);
    }

    #[test]
    fn program_status_with_humidity() {
        let status = parse_program_status("2, 50.0, 85.0, 01:30, 3, 1");
        assert_eq!(status.current_step_num, 2);
        assert_eq!(status.target_temp, 50.0);
        assert_eq!(status.target_humidity, 85.0);
        assert_eq!(status.time_remaining, TimeDelta::minutes(90));
        assert_eq!(status.repeats_remaining_a, 3);
        assert_eq!(status.repeats_remaining_b, 1);
    }

    #[test]
    fn program_status_without_humidity() {
        let status = parse_program_status("2, 50.0, 01:30, 3, 1");
        assert_eq!(status.current_step_num, 2);
        assert_eq!(status.target_temp, 50.0);
        assert!(status.target_humidity.is_nan());
        assert_eq!(status.time_remaining, TimeDelta::minutes(90));
    }

    #[test]
    fn malformed_program_status_yields_sentinels() {
        let status = parse_program_status("2, 50.0, 85.0, soon, 3, 1");
        assert_eq!(status.current_step_num, -1);
        assert!(status.target_temp.is_nan());
        assert!(status.target_humidity.is_nan());
        assert_eq!(status.time_remaining, TimeDelta::days(-1));
        assert_eq!(status.repeats_remaining_a, -1);
        assert_eq!(status.repeats_remaining_b, -1);
    }
}
