//! Line-oriented ASCII serial driver for ESPEC controllers.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::timeout;

use chamber_core::error::{ChamberError, Result};
use chamber_core::serial::{clear_input_buffer, open_serial, DynSerial};
use chamber_core::Chamber;

use crate::status::{parse_conditions, parse_program_status, ChamberConditions, ProgramStatus};

/// How long to spend discarding stale bytes before each query.
const CLEAR_WINDOW_MS: u64 = 20;

fn default_baud_rate() -> u32 {
    9600
}

fn default_io_timeout_secs() -> u64 {
    3
}

/// Which `PRGM MON?` repeats counter answers `read_loop_count`.
///
/// The controller reports two repeats-remaining fields and the documentation
/// does not say which one tracks jump-loop repetitions, so the choice is
/// configuration rather than a guess baked into the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCounterField {
    #[default]
    RepeatsRemainingA,
    RepeatsRemainingB,
}

/// Configuration for the ESPEC driver.
#[derive(Debug, Clone, Deserialize)]
pub struct EspecConfig {
    /// Serial port path or URL.
    pub port: String,
    /// Baud rate (default: 9600).
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Response timeout in seconds (default: 3).
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    /// Repeats counter reported as the loop count (default: `repeats_remaining_a`).
    #[serde(default)]
    pub loop_counter: LoopCounterField,
}

/// Driver for ESPEC chambers over a (virtual) serial port.
pub struct EspecChamber {
    port: Mutex<Option<BufReader<DynSerial>>>,
    io_timeout: Duration,
    loop_counter: LoopCounterField,
}

impl EspecChamber {
    /// Opens the serial port. No init sequence is required by the protocol.
    pub async fn connect(config: EspecConfig) -> Result<Self> {
        let port = open_serial(&config.port, config.baud_rate, "ESPEC").await?;
        tracing::info!(port = %config.port, "connected to ESPEC chamber");
        Ok(Self::from_port(
            port,
            Duration::from_secs(config.io_timeout_secs),
            config.loop_counter,
        ))
    }

    fn from_port(port: DynSerial, io_timeout: Duration, loop_counter: LoopCounterField) -> Self {
        Self {
            port: Mutex::new(Some(BufReader::new(port))),
            io_timeout,
            loop_counter,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_test_port(port: DynSerial, loop_counter: LoopCounterField) -> Self {
        Self::from_port(port, Duration::from_secs(1), loop_counter)
    }

    /// Sends a command and reads one line of response.
    ///
    /// Stale bytes are discarded first - both those already pulled into the
    /// read buffer and those still sitting in the OS receive queue - so a
    /// late reply to an earlier command cannot masquerade as this one.
    async fn query(&self, command: &str) -> Result<String> {
        let mut guard = self.port.lock().await;
        let reader = guard.as_mut().ok_or(ChamberError::NotConnected)?;

        Self::discard_stale_input(reader).await;

        let line = format!("{command}\n");
        reader.get_mut().write_all(line.as_bytes()).await?;
        reader.get_mut().flush().await?;

        let mut response = String::new();
        let n = timeout(self.io_timeout, reader.read_line(&mut response))
            .await
            .map_err(|_| {
                ChamberError::no_response(format!("timed out waiting for {command} reply"))
            })??;
        if n == 0 {
            return Err(ChamberError::no_response(format!(
                "port closed before {command} reply"
            )));
        }
        tracing::trace!(command, response = %response.trim(), "espec exchange");
        Ok(response)
    }

    /// Sends a command that gets no reply.
    async fn send(&self, command: &str) -> Result<()> {
        let mut guard = self.port.lock().await;
        let reader = guard.as_mut().ok_or(ChamberError::NotConnected)?;

        Self::discard_stale_input(reader).await;

        let line = format!("{command}\n");
        reader.get_mut().write_all(line.as_bytes()).await?;
        reader.get_mut().flush().await?;
        Ok(())
    }

    async fn discard_stale_input(reader: &mut BufReader<DynSerial>) {
        let buffered = reader.buffer().len();
        if buffered > 0 {
            Pin::new(&mut *reader).consume(buffered);
        }
        clear_input_buffer(reader.get_mut(), CLEAR_WINDOW_MS).await;
    }

    /// Queries and decodes the current chamber conditions.
    pub async fn monitor_conditions(&self) -> Result<ChamberConditions> {
        let response = self.query("MON?").await?;
        Ok(parse_conditions(&response))
    }

    /// Queries and decodes the running program status.
    pub async fn monitor_program_status(&self) -> Result<ProgramStatus> {
        let response = self.query("PRGM MON?").await?;
        Ok(parse_program_status(&response))
    }
}

#[async_trait]
impl Chamber for EspecChamber {
    fn driver_name(&self) -> &'static str {
        "espec"
    }

    async fn read_temperature(&self) -> Result<f64> {
        Ok(self.monitor_conditions().await?.temp)
    }

    async fn read_humidity(&self) -> Result<f64> {
        Ok(self.monitor_conditions().await?.humidity)
    }

    async fn read_temperature_setpoint(&self) -> Result<f64> {
        Ok(self.monitor_program_status().await?.target_temp)
    }

    async fn read_humidity_setpoint(&self) -> Result<f64> {
        Ok(self.monitor_program_status().await?.target_humidity)
    }

    async fn read_current_step(&self) -> Result<i64> {
        Ok(self.monitor_program_status().await?.current_step_num)
    }

    async fn read_loop_count(&self) -> Result<i64> {
        let status = self.monitor_program_status().await?;
        Ok(match self.loop_counter {
            LoopCounterField::RepeatsRemainingA => status.repeats_remaining_a,
            LoopCounterField::RepeatsRemainingB => status.repeats_remaining_b,
        })
    }

    async fn read_time_remaining(&self) -> Result<TimeDelta> {
        Ok(self.monitor_program_status().await?.time_remaining)
    }

    /// The ESPEC command set we target has no profile-hold keypress.
    async fn hold_profile(&self) -> Result<()> {
        Err(ChamberError::Unsupported {
            operation: "hold_profile",
            driver: self.driver_name(),
        })
    }

    async fn stop_profile(&self) -> Result<()> {
        self.send("POWER, OFF").await
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.port.lock().await;
        if guard.take().is_some() {
            tracing::info!("closed ESPEC connection");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    /// Fake controller on the host end of a duplex pipe.
    fn spawn_fake_controller(conditions: &'static str, program: &'static str) -> EspecChamber {
        let (host, device) = tokio::io::duplex(256);
        tokio::spawn(async move {
            let mut reader = BufReader::new(host);
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    break;
                }
                let reply = match line.trim() {
                    "MON?" => conditions,
                    "PRGM MON?" => program,
                    _ => continue,
                };
                if reader.get_mut().write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        });
        EspecChamber::with_test_port(Box::new(device), LoopCounterField::default())
    }

    #[tokio::test]
    async fn reads_conditions_with_humidity() {
        let chamber = spawn_fake_controller("23.5, 45.0, COOL, 0\r\n", "2, 50.0, 85.0, 01:30, 3, 1\r\n");
        assert_eq!(chamber.read_temperature().await.unwrap(), 23.5);
        assert_eq!(chamber.read_humidity().await.unwrap(), 45.0);
    }

    #[tokio::test]
    async fn reads_program_status_fields() {
        let chamber = spawn_fake_controller("23.5, 45.0, COOL, 0\r\n", "2, 50.0, 85.0, 01:30, 3, 1\r\n");
        assert_eq!(chamber.read_current_step().await.unwrap(), 2);
        assert_eq!(chamber.read_temperature_setpoint().await.unwrap(), 50.0);
        assert_eq!(chamber.read_humidity_setpoint().await.unwrap(), 85.0);
        assert_eq!(chamber.read_loop_count().await.unwrap(), 3);
        assert_eq!(
            chamber.read_time_remaining().await.unwrap(),
            TimeDelta::minutes(90)
        );
    }

    #[tokio::test]
    async fn loop_counter_field_is_selectable() {
        let (host, device) = tokio::io::duplex(256);
        tokio::spawn(async move {
            let mut reader = BufReader::new(host);
            let mut line = String::new();
            while reader.read_line(&mut line).await.unwrap_or(0) > 0 {
                if line.trim() == "PRGM MON?" {
                    let _ = reader
                        .get_mut()
                        .write_all(b"2, 50.0, 85.0, 01:30, 3, 1\r\n")
                        .await;
                }
                line.clear();
            }
        });
        let chamber =
            EspecChamber::with_test_port(Box::new(device), LoopCounterField::RepeatsRemainingB);
        assert_eq!(chamber.read_loop_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_response_never_raises() {
        let chamber = spawn_fake_controller("###garbled###\r\n", "also garbled\r\n");
        assert!(chamber.read_temperature().await.unwrap().is_nan());
        assert_eq!(chamber.read_current_step().await.unwrap(), -1);
        assert_eq!(
            chamber.read_time_remaining().await.unwrap(),
            TimeDelta::days(-1)
        );
    }

    #[tokio::test]
    async fn hold_profile_is_unsupported() {
        let chamber = spawn_fake_controller("23.5, COOL, 0\r\n", "2, 50.0, 01:30, 3, 1\r\n");
        assert!(matches!(
            chamber.hold_profile().await,
            Err(ChamberError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn stop_profile_sends_power_off() {
        let (mut host, device) = tokio::io::duplex(64);
        let chamber = EspecChamber::with_test_port(Box::new(device), LoopCounterField::default());
        chamber.stop_profile().await.unwrap();

        let mut buf = [0u8; 64];
        let n = host.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"POWER, OFF\n");
    }

    #[tokio::test]
    async fn reads_after_close_fail() {
        let (_host, device) = tokio::io::duplex(64);
        let chamber = EspecChamber::with_test_port(Box::new(device), LoopCounterField::default());
        chamber.close().await.unwrap();
        chamber.close().await.unwrap(); // idempotent
        assert!(matches!(
            chamber.read_temperature().await,
            Err(ChamberError::NotConnected)
        ));
    }
}
