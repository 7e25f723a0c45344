//! Sampler configuration with bounded validation.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_INTERVAL_SECS: u64 = 10;
const DEFAULT_RUN_HOURS: f64 = 1.0;

/// Raw sampler settings as they appear in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RawSamplerSettings {
    pub interval_secs: u64,
    pub run_hours: f64,
}

impl Default for RawSamplerSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            run_hours: DEFAULT_RUN_HOURS,
        }
    }
}

/// Validated polling loop configuration.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Pause between samples.
    pub interval: Duration,
    /// Total wall-clock run budget.
    pub run_time: Duration,
}

impl SamplerConfig {
    /// Builds a config from raw inputs, falling back to documented defaults
    /// for out-of-bounds values.
    ///
    /// The interval must be 1-60 seconds (default 10) and the run time
    /// 0.1-24 hours (default 1). Out-of-range inputs are recovered, not
    /// fatal: the operator gets a warning and the run proceeds.
    pub fn new(interval_secs: u64, run_hours: f64) -> Self {
        let interval_secs = if (1..=60).contains(&interval_secs) {
            interval_secs
        } else {
            tracing::warn!(
                interval_secs,
                "invalid sample interval, must be 1-60 seconds; using {DEFAULT_INTERVAL_SECS} s"
            );
            DEFAULT_INTERVAL_SECS
        };

        let run_hours = if (0.1..=24.0).contains(&run_hours) {
            run_hours
        } else {
            tracing::warn!(
                run_hours,
                "invalid run time, must be 0.1-24 hours; using {DEFAULT_RUN_HOURS} h"
            );
            DEFAULT_RUN_HOURS
        };

        Self {
            interval: Duration::from_secs(interval_secs),
            run_time: Duration::from_secs_f64(run_hours * 3600.0),
        }
    }
}

impl From<RawSamplerSettings> for SamplerConfig {
    fn from(raw: RawSamplerSettings) -> Self {
        Self::new(raw.interval_secs, raw.run_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        let config = SamplerConfig::new(5, 0.5);
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.run_time, Duration::from_secs(1800));
    }

    #[test]
    fn out_of_range_interval_falls_back_to_default() {
        let config = SamplerConfig::new(0, 1.0);
        assert_eq!(config.interval, Duration::from_secs(10));
        let config = SamplerConfig::new(61, 1.0);
        assert_eq!(config.interval, Duration::from_secs(10));
    }

    #[test]
    fn out_of_range_run_time_falls_back_to_default() {
        let config = SamplerConfig::new(10, 0.0);
        assert_eq!(config.run_time, Duration::from_secs(3600));
        let config = SamplerConfig::new(10, 25.0);
        assert_eq!(config.run_time, Duration::from_secs(3600));
    }
}
