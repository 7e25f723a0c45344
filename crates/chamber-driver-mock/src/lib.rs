//! Simulated chamber for tests and dry runs.
//!
//! Answers the full capability set from in-memory state so the sampler and
//! the CLI can be exercised with no hardware attached. Readings are fixed
//! values; `stop_profile`/`hold_profile` flip the simulated profile state so
//! command paths are observable from tests.

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::Deserialize;
use tokio::sync::Mutex;

use chamber_core::error::Result;
use chamber_core::Chamber;

/// Configuration for the mock chamber.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub temperature: f64,
    pub humidity: f64,
    pub temperature_setpoint: f64,
    pub humidity_setpoint: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            temperature: 20.1,
            humidity: 30.5,
            temperature_setpoint: 25.0,
            humidity_setpoint: 35.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileState {
    Running,
    Held,
    Stopped,
}

/// In-memory chamber implementation.
pub struct MockChamber {
    config: MockConfig,
    profile: Mutex<ProfileState>,
}

impl MockChamber {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            profile: Mutex::new(ProfileState::Running),
        }
    }

    /// Whether the simulated profile is still running.
    pub async fn profile_running(&self) -> bool {
        *self.profile.lock().await == ProfileState::Running
    }
}

impl Default for MockChamber {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

#[async_trait]
impl Chamber for MockChamber {
    fn driver_name(&self) -> &'static str {
        "mock"
    }

    async fn read_temperature(&self) -> Result<f64> {
        Ok(self.config.temperature)
    }

    async fn read_humidity(&self) -> Result<f64> {
        Ok(self.config.humidity)
    }

    async fn read_temperature_setpoint(&self) -> Result<f64> {
        Ok(self.config.temperature_setpoint)
    }

    async fn read_humidity_setpoint(&self) -> Result<f64> {
        Ok(self.config.humidity_setpoint)
    }

    async fn read_current_step(&self) -> Result<i64> {
        Ok(1)
    }

    async fn read_loop_count(&self) -> Result<i64> {
        Ok(0)
    }

    async fn read_time_remaining(&self) -> Result<TimeDelta> {
        Ok(TimeDelta::minutes(5))
    }

    async fn hold_profile(&self) -> Result<()> {
        *self.profile.lock().await = ProfileState::Held;
        tracing::info!("mock profile held");
        Ok(())
    }

    async fn stop_profile(&self) -> Result<()> {
        *self.profile.lock().await = ProfileState::Stopped;
        tracing::info!("mock profile stopped");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_configured_readings() {
        let chamber = MockChamber::default();
        assert_eq!(chamber.read_temperature().await.unwrap(), 20.1);
        assert_eq!(chamber.read_humidity().await.unwrap(), 30.5);
        assert_eq!(chamber.read_temperature_setpoint().await.unwrap(), 25.0);
        assert_eq!(chamber.read_humidity_setpoint().await.unwrap(), 35.0);
    }

    #[tokio::test]
    async fn stop_profile_is_observable() {
        let chamber = MockChamber::default();
        assert!(chamber.profile_running().await);
        chamber.stop_profile().await.unwrap();
        assert!(!chamber.profile_running().await);
    }
}
