//! Connection-per-call TCP ASCII driver.

use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use chamber_core::codec::parse_hms;
use chamber_core::error::{ChamberError, Result};
use chamber_core::Chamber;

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_io_timeout_secs() -> u64 {
    3
}

/// Configuration for the Thermotron 8800 driver.
#[derive(Debug, Clone, Deserialize)]
pub struct Thermotron8800Config {
    /// Controller hostname or IP address.
    pub host: String,
    /// Controller TCP port.
    pub port: u16,
    /// Per-call connect timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-call response timeout in seconds (default: 3).
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
}

/// Driver for Thermotron chambers with the 8800-series controller.
///
/// Holds no transport handle; each operation gets a [`Connection`] scoped to
/// the call, released on every exit path when the struct drops.
pub struct Thermotron8800Chamber {
    config: Thermotron8800Config,
    connect_timeout: Duration,
    io_timeout: Duration,
}

/// One TCP connection scoped to a single chamber operation.
struct Connection {
    reader: BufReader<TcpStream>,
    io_timeout: Duration,
}

impl Connection {
    /// Sends a newline-terminated command and returns the trimmed reply.
    ///
    /// The reply is read up to its newline, not in one shot, so a response
    /// split across TCP segments cannot come back truncated (a prefix like
    /// `"23"` of `"23.5"` would otherwise parse as a plausible value).
    async fn query(&mut self, command: &str) -> Result<String> {
        let line = format!("{command}\n");
        self.reader.get_mut().write_all(line.as_bytes()).await?;

        let mut reply = String::new();
        let n = timeout(self.io_timeout, self.reader.read_line(&mut reply))
            .await
            .map_err(|_| {
                ChamberError::no_response(format!("timed out waiting for {command} reply"))
            })??;
        if n == 0 {
            return Err(ChamberError::no_response(format!(
                "connection closed before {command} reply"
            )));
        }

        let reply = reply.trim().to_string();
        tracing::trace!(command, reply = %reply, "thermotron exchange");
        Ok(reply)
    }

    /// Sends a command and parses the reply as a float.
    async fn query_f64(&mut self, command: &str) -> Result<f64> {
        let reply = self.query(command).await?;
        reply.parse().map_err(|_| {
            ChamberError::parse(format!("non-numeric {command} reply {reply:?}"))
        })
    }

    /// Sends a command and parses the reply as an integer.
    async fn query_i64(&mut self, command: &str) -> Result<i64> {
        let reply = self.query(command).await?;
        reply.parse().map_err(|_| {
            ChamberError::parse(format!("non-numeric {command} reply {reply:?}"))
        })
    }
}

impl Thermotron8800Chamber {
    /// Creates the driver.
    ///
    /// No socket is opened here; connectivity problems surface on the first
    /// operation, which is also where they would surface mid-run.
    pub fn new(config: Thermotron8800Config) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            io_timeout: Duration::from_secs(config.io_timeout_secs),
            config,
        }
    }

    /// Opens the per-call connection.
    async fn connect(&self) -> Result<Connection> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ChamberError::no_response(format!("connect to {addr} timed out")))??;
        stream.set_nodelay(true)?;
        Ok(Connection {
            reader: BufReader::new(stream),
            io_timeout: self.io_timeout,
        })
    }
}

#[async_trait]
impl Chamber for Thermotron8800Chamber {
    fn driver_name(&self) -> &'static str {
        "thermotron_8800"
    }

    async fn read_temperature(&self) -> Result<f64> {
        self.connect().await?.query_f64("PVAR1?").await
    }

    async fn read_humidity(&self) -> Result<f64> {
        self.connect().await?.query_f64("PVAR2?").await
    }

    async fn read_temperature_setpoint(&self) -> Result<f64> {
        Err(ChamberError::Unsupported {
            operation: "read_temperature_setpoint",
            driver: self.driver_name(),
        })
    }

    async fn read_humidity_setpoint(&self) -> Result<f64> {
        Err(ChamberError::Unsupported {
            operation: "read_humidity_setpoint",
            driver: self.driver_name(),
        })
    }

    async fn read_current_step(&self) -> Result<i64> {
        self.connect().await?.query_i64("INTN?").await
    }

    /// Loops completed so far: the controller only reports the total
    /// programmed loops and the loops left, so the count is their difference.
    async fn read_loop_count(&self) -> Result<i64> {
        let mut conn = self.connect().await?;
        let total = conn.query_i64("NUML?").await?;
        let remaining = conn.query_i64("LLFT?").await?;
        Ok(total - remaining)
    }

    async fn read_time_remaining(&self) -> Result<TimeDelta> {
        let reply = self.connect().await?.query("TLFT?").await?;
        parse_hms(&reply)
    }

    async fn hold_profile(&self) -> Result<()> {
        let ack = self.connect().await?.query("HOLD").await?;
        tracing::debug!(ack = %ack, "hold acknowledged");
        Ok(())
    }

    async fn stop_profile(&self) -> Result<()> {
        let ack = self.connect().await?.query("STOP").await?;
        tracing::debug!(ack = %ack, "stop acknowledged");
        Ok(())
    }

    /// No persistent handle exists, so there is nothing to release.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
