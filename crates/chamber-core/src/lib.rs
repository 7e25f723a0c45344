//! Core traits and types shared by the thermal chamber driver crates.
//!
//! Environmental test chambers from different vendors expose the same logical
//! readings (temperature, humidity, profile position, time remaining) over
//! wildly different wire protocols. This crate defines the [`Chamber`]
//! capability trait that normalizes them, plus the pieces every driver needs:
//!
//! - [`error::ChamberError`] - the shared error taxonomy, including the
//!   transient/fatal split that drives retries
//! - [`retry`] - bounded retry of transient transport failures
//! - [`sample::Sample`] - one timestamped reading burst from the polling loop
//! - [`codec`] - clock-field decoding shared by the ASCII protocols
//! - [`serial`] - serial port plumbing for the serial-attached drivers
//!   (requires the `serial` feature)

pub mod chamber;
pub mod codec;
pub mod error;
pub mod retry;
pub mod sample;

#[cfg(feature = "serial")]
pub mod serial;

pub use chamber::Chamber;
pub use error::{ChamberError, Result};
pub use retry::{retry_transient, RetryPolicy};
pub use sample::Sample;
