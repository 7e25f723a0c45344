//! Serial port plumbing for the serial-attached drivers.
//!
//! Requires the `serial` feature:
//!
//! ```toml
//! [dependencies]
//! chamber-core = { path = "../chamber-core", features = ["serial"] }
//! ```
//!
//! Drivers hold the port as a [`DynSerial`] so tests can substitute a
//! `tokio::io::DuplexStream` for real hardware.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::error::{ChamberError, Result};

/// Trait alias for async serial port I/O.
///
/// Satisfied by `tokio_serial::SerialStream` on real hardware and by
/// `tokio::io::DuplexStream` in tests.
pub trait SerialPortIO: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> SerialPortIO for T {}

/// Type-erased boxed serial port.
pub type DynSerial = Box<dyn SerialPortIO>;

/// Opens a serial port with 8N1 framing and no flow control.
///
/// Port opening is a blocking syscall, so it runs under `spawn_blocking` to
/// keep the runtime responsive. `device_name` labels the failure message.
pub async fn open_serial(port_path: &str, baud_rate: u32, device_name: &str) -> Result<DynSerial> {
    use tokio_serial::SerialPortBuilderExt;

    let path = port_path.to_string();
    let name = device_name.to_string();

    let port = tokio::task::spawn_blocking(move || {
        tokio_serial::new(&path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| ChamberError::connect(format!("failed to open {name} port {path}: {e}")))
    })
    .await
    .map_err(|e| ChamberError::connect(format!("serial open task failed: {e}")))??;

    Ok(Box::new(port))
}

/// Reads and discards whatever is sitting in the receive buffer.
///
/// Chamber controllers on shared or noisy lines leave stale bytes behind;
/// queries clear them first so a late reply to an earlier command is not
/// mistaken for the current response. Returns the number of bytes discarded.
pub async fn clear_input_buffer<R: AsyncRead + Unpin>(port: &mut R, window_ms: u64) -> usize {
    let mut scratch = [0u8; 256];
    let deadline = tokio::time::Instant::now() + Duration::from_millis(window_ms);
    let mut discarded = 0usize;

    while tokio::time::Instant::now() < deadline {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, port.read(&mut scratch)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => discarded += n,
            // WouldBlock means the buffer is drained; any other I/O error
            // also ends the drain and will resurface on the query itself.
            Ok(Err(_)) => break,
            Err(_) => break,
        }
    }

    if discarded > 0 {
        tracing::debug!(discarded, "cleared stale bytes from serial input buffer");
    }
    discarded
}
