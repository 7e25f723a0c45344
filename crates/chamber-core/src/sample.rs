//! The record produced by one polling tick.

use chrono::{DateTime, Local};

/// One reading burst from the chamber.
///
/// Built once per polling tick from four sequential reads and never mutated
/// afterwards. The four reads happen back to back over a single blocking
/// transport, so the fields are not perfectly simultaneous; the skew is
/// bounded by one request/response round trip per field.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock time at the start of the read burst.
    pub timestamp: DateTime<Local>,
    /// Measured temperature in degrees Celsius.
    pub temperature: f64,
    /// Measured relative humidity in percent.
    pub humidity: f64,
    /// Temperature setpoint in degrees Celsius.
    pub temperature_setpoint: f64,
    /// Humidity setpoint in percent.
    pub humidity_setpoint: f64,
}
