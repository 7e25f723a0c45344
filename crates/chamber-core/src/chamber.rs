//! The chamber capability trait.

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::error::Result;

/// Uniform capability interface over a thermal/humidity test chamber.
///
/// Exactly one concrete implementation is active per process, selected at
/// construction time; consumers such as the polling loop depend only on this
/// trait and never learn which transport is behind it. Each implementation
/// owns its transport handle exclusively.
///
/// # Contract
///
/// - All reads issue a fresh query to the device; implementations never serve
///   cached values.
/// - Operations a given controller's wire protocol cannot express fail with
///   [`ChamberError::Unsupported`](crate::ChamberError::Unsupported) rather
///   than silently doing nothing.
/// - `close` is idempotent; reads after `close` fail with
///   [`ChamberError::NotConnected`](crate::ChamberError::NotConnected).
///
/// # Thread Safety
///
/// Methods take `&self`; implementations use interior mutability (a
/// `tokio::sync::Mutex` around the transport handle). There is a single call
/// site per handle, so the lock is uncontended in practice.
#[async_trait]
pub trait Chamber: Send + Sync {
    /// Short driver name for logs and error messages.
    fn driver_name(&self) -> &'static str;

    /// Current measured temperature in degrees Celsius.
    async fn read_temperature(&self) -> Result<f64>;

    /// Current measured relative humidity in percent.
    async fn read_humidity(&self) -> Result<f64>;

    /// Temperature setpoint the controller is driving toward, in Celsius.
    async fn read_temperature_setpoint(&self) -> Result<f64>;

    /// Humidity setpoint the controller is driving toward, in percent.
    async fn read_humidity_setpoint(&self) -> Result<f64>;

    /// Index of the step currently executing within the running profile.
    async fn read_current_step(&self) -> Result<i64>;

    /// Number of loop/jump repetitions relevant to the running profile.
    ///
    /// Vendors disagree on whether this counts completed or remaining
    /// repetitions; see the individual driver docs.
    async fn read_loop_count(&self) -> Result<i64>;

    /// Time remaining in the current profile step.
    ///
    /// Signed so that drivers with a best-effort decode policy can surface
    /// their negative sentinel instead of a fabricated zero.
    async fn read_time_remaining(&self) -> Result<TimeDelta>;

    /// Pause the running profile at its current step.
    async fn hold_profile(&self) -> Result<()>;

    /// Terminate the running profile.
    async fn stop_profile(&self) -> Result<()>;

    /// Release the transport handle. Idempotent.
    async fn close(&self) -> Result<()>;
}
