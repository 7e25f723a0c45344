//! Modbus RTU driver for the Watlow F4 controller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;
use tokio_serial::SerialPortBuilderExt;

use chamber_core::error::{ChamberError, Result};
use chamber_core::retry::{retry_transient, RetryPolicy};
use chamber_core::Chamber;

use crate::codec;

/// Watlow F4 holding register map, addresses from the vendor manual.
mod reg {
    /// Current temperature, signed, scaled x10.
    pub const TEMP_VALUE: u16 = 100;
    /// Current relative humidity, unscaled.
    pub const HUMIDITY_VALUE: u16 = 104;
    /// Temperature setpoint, read/write, signed, scaled x10.
    pub const TEMP_SETPOINT: u16 = 300;
    /// Humidity setpoint, read/write, unscaled.
    pub const HUMIDITY_SETPOINT: u16 = 319;
    /// Temperature display units; 1 selects Celsius.
    pub const TEMP_UNITS: u16 = 901;
    /// Writing 1 simulates a "profile hold" keypress.
    pub const HOLD_PROFILE: u16 = 1210;
    /// Writing 1 terminates the running profile.
    pub const STOP_PROFILE: u16 = 1217;
    /// Steps remaining in the profile, excluding jump repetitions.
    pub const STEPS_REMAINING: u16 = 1219;
    /// Temperature channel enable (1 = on, 0 = off).
    pub const TEMP_CHANNEL_ENABLE: u16 = 2000;
    /// Humidity channel enable (1 = on, 0 = off).
    pub const HUMIDITY_CHANNEL_ENABLE: u16 = 2010;
    /// Step number, current profile.
    pub const CURRENT_STEP: u16 = 4101;
    /// Hours/minutes/seconds remaining, three consecutive registers.
    pub const TIME_REMAINING: u16 = 4119;
    /// Jump count, current profile status.
    pub const JUMP_COUNT: u16 = 4126;
}

const CELSIUS: u16 = 1;

fn default_baud_rate() -> u32 {
    9600
}

fn default_slave_address() -> u8 {
    2
}

fn default_max_retries() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    3
}

/// Configuration for the Watlow F4 driver.
#[derive(Debug, Clone, Deserialize)]
pub struct WatlowF4Config {
    /// Serial port path (e.g. "/dev/ttyUSB0", "COM3").
    pub port: String,
    /// Baud rate (default: 9600).
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Modbus subordinate address of the controller (default: 2).
    #[serde(default = "default_slave_address")]
    pub slave_address: u8,
    /// Close the serial port after every register operation instead of
    /// holding it open. Trades per-call latency for a free line between
    /// calls (default: false).
    #[serde(default)]
    pub close_port_after_each_call: bool,
    /// Register operation attempts before a transient error surfaces
    /// (default: 10).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-request response timeout in seconds (default: 3).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WatlowF4Config {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud_rate(),
            slave_address: default_slave_address(),
            close_port_after_each_call: false,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Driver for Thermotron chambers with the Watlow F4 controller.
///
/// Owns the Modbus context exclusively; trait methods take `&self` with the
/// context behind a `tokio::sync::Mutex`. Every register operation runs
/// through the transient-error retry wrapper.
pub struct WatlowF4Chamber {
    config: WatlowF4Config,
    ctx: Mutex<Option<Context>>,
    retry: RetryPolicy,
    io_timeout: Duration,
}

async fn open_context(config: &WatlowF4Config) -> Result<Context> {
    let path = config.port.clone();
    let baud = config.baud_rate;

    // Opening the port is a blocking syscall.
    let port = tokio::task::spawn_blocking(move || {
        tokio_serial::new(&path, baud)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                ChamberError::connect(format!("failed to open Watlow F4 port {path}: {e}"))
            })
    })
    .await
    .map_err(|e| ChamberError::connect(format!("serial open task failed: {e}")))??;

    Ok(rtu::attach_slave(port, Slave(config.slave_address)))
}

impl WatlowF4Chamber {
    /// Opens the serial Modbus interface and forces Celsius reporting.
    ///
    /// A failure here, including a failure of the units write, is a
    /// construction error: the caller gets no half-initialized driver.
    pub async fn connect(config: WatlowF4Config) -> Result<Self> {
        let ctx = open_context(&config).await?;
        tracing::info!(
            port = %config.port,
            slave = config.slave_address,
            "connected to Watlow F4 chamber"
        );

        let chamber = Self {
            retry: RetryPolicy::new(config.max_retries),
            io_timeout: Duration::from_secs(config.timeout_secs),
            ctx: Mutex::new(Some(ctx)),
            config,
        };

        // Scaled reads are meaningless unless the controller reports Celsius.
        chamber
            .write_register(reg::TEMP_UNITS, CELSIUS)
            .await
            .map_err(|e| {
                ChamberError::connect(format!("failed to set Celsius reporting mode: {e}"))
            })?;

        Ok(chamber)
    }

    #[cfg(test)]
    fn with_test_context(config: WatlowF4Config, ctx: Context) -> Self {
        Self {
            retry: RetryPolicy::new(config.max_retries),
            io_timeout: Duration::from_secs(config.timeout_secs),
            ctx: Mutex::new(Some(ctx)),
            config,
        }
    }

    /// Reads one holding register, with retries.
    async fn read_register(&self, addr: u16) -> Result<u16> {
        retry_transient(&self.retry, "read_register", || async move {
            let words = self.registers_once(addr, 1).await?;
            Ok(words[0])
        })
        .await
    }

    /// Reads a block of consecutive holding registers, with retries.
    async fn read_registers(&self, addr: u16, count: u16) -> Result<Vec<u16>> {
        retry_transient(&self.retry, "read_registers", || {
            self.registers_once(addr, count)
        })
        .await
    }

    /// Writes one holding register, with retries.
    ///
    /// In stateless mode the port is released after the transaction whether
    /// it succeeded or not; the failure modes the mode exists for are the
    /// ones that must not leave the line held.
    async fn write_register(&self, addr: u16, value: u16) -> Result<()> {
        retry_transient(&self.retry, "write_register", || async move {
            let mut guard = self.ctx.lock().await;
            let ctx = self.ensure_open(&mut guard).await?;
            let outcome = timeout(self.io_timeout, ctx.write_single_register(addr, value)).await;
            self.release_if_stateless(&mut guard).await;
            outcome
                .map_err(|_| {
                    ChamberError::no_response(format!("timed out writing register {addr}"))
                })?
                .map_err(|e| ChamberError::no_response(format!("register {addr}: {e}")))?
                .map_err(|e| {
                    ChamberError::invalid_response(format!("register {addr}: exception {e}"))
                })?;
            Ok(())
        })
        .await
    }

    async fn registers_once(&self, addr: u16, count: u16) -> Result<Vec<u16>> {
        let mut guard = self.ctx.lock().await;
        let ctx = self.ensure_open(&mut guard).await?;
        let outcome = timeout(self.io_timeout, ctx.read_holding_registers(addr, count)).await;
        self.release_if_stateless(&mut guard).await;
        let words = outcome
            .map_err(|_| ChamberError::no_response(format!("timed out reading register {addr}")))?
            .map_err(|e| ChamberError::no_response(format!("register {addr}: {e}")))?
            .map_err(|e| ChamberError::invalid_response(format!("register {addr}: exception {e}")))?;
        if words.len() != usize::from(count) {
            return Err(ChamberError::invalid_response(format!(
                "register {addr}: expected {count} words, got {}",
                words.len()
            )));
        }
        Ok(words)
    }

    /// Returns the live context, reopening the port first in stateless mode.
    async fn ensure_open<'g>(&self, guard: &'g mut Option<Context>) -> Result<&'g mut Context> {
        if guard.is_none() {
            if !self.config.close_port_after_each_call {
                return Err(ChamberError::NotConnected);
            }
            *guard = Some(open_context(&self.config).await?);
        }
        guard.as_mut().ok_or(ChamberError::NotConnected)
    }

    async fn release_if_stateless(&self, guard: &mut Option<Context>) {
        if self.config.close_port_after_each_call {
            if let Some(mut ctx) = guard.take() {
                let _ = ctx.disconnect().await;
            }
        }
    }

    /// Updates the temperature setpoint in degrees Celsius.
    ///
    /// Negative setpoints go over the wire as the two's complement of the
    /// scaled magnitude; see [`crate::codec`].
    pub async fn set_temperature_setpoint(&self, celsius: f64) -> Result<()> {
        self.write_register(reg::TEMP_SETPOINT, codec::encode_signed_tenths(celsius))
            .await
    }

    /// Updates the humidity setpoint in percent.
    pub async fn set_humidity_setpoint(&self, percent: f64) -> Result<()> {
        self.write_register(reg::HUMIDITY_SETPOINT, percent.round() as u16)
            .await
    }

    /// Turns the temperature channel on or off.
    pub async fn set_temperature_channel(&self, enabled: bool) -> Result<()> {
        self.write_register(reg::TEMP_CHANNEL_ENABLE, u16::from(enabled))
            .await
    }

    /// Turns the humidity channel on or off.
    pub async fn set_humidity_channel(&self, enabled: bool) -> Result<()> {
        self.write_register(reg::HUMIDITY_CHANNEL_ENABLE, u16::from(enabled))
            .await
    }

    /// Number of profile steps remaining, excluding jump repetitions.
    pub async fn read_steps_remaining(&self) -> Result<i64> {
        Ok(i64::from(self.read_register(reg::STEPS_REMAINING).await?))
    }
}

#[async_trait]
impl Chamber for WatlowF4Chamber {
    fn driver_name(&self) -> &'static str {
        "watlow_f4"
    }

    async fn read_temperature(&self) -> Result<f64> {
        let word = self.read_register(reg::TEMP_VALUE).await?;
        Ok(codec::decode_signed_tenths(word))
    }

    async fn read_humidity(&self) -> Result<f64> {
        Ok(f64::from(self.read_register(reg::HUMIDITY_VALUE).await?))
    }

    async fn read_temperature_setpoint(&self) -> Result<f64> {
        let word = self.read_register(reg::TEMP_SETPOINT).await?;
        Ok(codec::decode_signed_tenths(word))
    }

    async fn read_humidity_setpoint(&self) -> Result<f64> {
        Ok(f64::from(self.read_register(reg::HUMIDITY_SETPOINT).await?))
    }

    async fn read_current_step(&self) -> Result<i64> {
        Ok(i64::from(self.read_register(reg::CURRENT_STEP).await?))
    }

    async fn read_loop_count(&self) -> Result<i64> {
        Ok(i64::from(self.read_register(reg::JUMP_COUNT).await?))
    }

    async fn read_time_remaining(&self) -> Result<TimeDelta> {
        let words = self.read_registers(reg::TIME_REMAINING, 3).await?;
        Ok(TimeDelta::hours(i64::from(words[0]))
            + TimeDelta::minutes(i64::from(words[1]))
            + TimeDelta::seconds(i64::from(words[2])))
    }

    async fn hold_profile(&self) -> Result<()> {
        self.write_register(reg::HOLD_PROFILE, 1).await
    }

    async fn stop_profile(&self) -> Result<()> {
        self.write_register(reg::STOP_PROFILE, 1).await
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.ctx.lock().await;
        if let Some(mut ctx) = guard.take() {
            let _ = ctx.disconnect().await;
            tracing::info!(port = %self.config.port, "closed Watlow F4 connection");
        }
        Ok(())
    }
}
