//! Application configuration file.
//!
//! One TOML file selects the chamber variant and the sampler settings:
//!
//! ```toml
//! output = "big_blue_data.csv"
//!
//! [chamber]
//! type = "watlow_f4"
//! port = "/dev/ttyUSB0"
//!
//! [sampler]
//! interval_secs = 10
//! run_hours = 1.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use chamber_driver_espec::EspecConfig;
use chamber_driver_mock::MockConfig;
use chamber_driver_thermotron::Thermotron8800Config;
use chamber_driver_watlow::WatlowF4Config;
use chamber_sampler::SamplerConfig;

/// Chamber variant selection; exactly one is active per process.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChamberConfig {
    /// Thermotron chamber with a Watlow F4 controller over Modbus serial.
    WatlowF4(WatlowF4Config),
    /// Thermotron chamber with an 8800-series controller over TCP.
    #[serde(rename = "thermotron_8800")]
    Thermotron8800(Thermotron8800Config),
    /// ESPEC chamber over ASCII serial.
    Espec(EspecConfig),
    /// Simulated chamber, no hardware required.
    Mock(MockConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub chamber: ChamberConfig,
    #[serde(default)]
    pub sampler: chamber_sampler::RawSamplerSettings,
    /// Output CSV path (default: chamber_log.csv).
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("chamber_log.csv")
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validated sampler config, applying optional CLI overrides.
    pub fn sampler_config(
        &self,
        interval_secs: Option<u64>,
        run_hours: Option<f64>,
    ) -> SamplerConfig {
        SamplerConfig::new(
            interval_secs.unwrap_or(self.sampler.interval_secs),
            run_hours.unwrap_or(self.sampler.run_hours),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watlow_variant() {
        let config: AppConfig = toml::from_str(
            r#"
            [chamber]
            type = "watlow_f4"
            port = "/dev/ttyUSB0"
            "#,
        )
        .unwrap();
        assert!(matches!(config.chamber, ChamberConfig::WatlowF4(_)));
        assert_eq!(config.output, PathBuf::from("chamber_log.csv"));
    }

    #[test]
    fn parses_thermotron_variant_with_sampler_settings() {
        let config: AppConfig = toml::from_str(
            r#"
            output = "gray.csv"

            [chamber]
            type = "thermotron_8800"
            host = "192.168.1.20"
            port = 8888

            [sampler]
            interval_secs = 5
            run_hours = 0.5
            "#,
        )
        .unwrap();
        assert!(matches!(config.chamber, ChamberConfig::Thermotron8800(_)));
        assert_eq!(config.sampler.interval_secs, 5);
        assert_eq!(config.output, PathBuf::from("gray.csv"));
    }

    #[test]
    fn parses_espec_variant_with_loop_counter() {
        let config: AppConfig = toml::from_str(
            r#"
            [chamber]
            type = "espec"
            port = "/dev/ttyUSB1"
            loop_counter = "repeats_remaining_b"
            "#,
        )
        .unwrap();
        assert!(matches!(config.chamber, ChamberConfig::Espec(_)));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [chamber]
            type = "toaster"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let config: AppConfig = toml::from_str(
            r#"
            [chamber]
            type = "mock"
            "#,
        )
        .unwrap();
        let sampler = config.sampler_config(Some(5), None);
        assert_eq!(sampler.interval, std::time::Duration::from_secs(5));
        assert_eq!(sampler.run_time, std::time::Duration::from_secs(3600));
    }
}
