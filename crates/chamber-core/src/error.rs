//! Error taxonomy for chamber communication.
//!
//! Errors fall into a few categories with distinct handling policies:
//!
//! 1. **Transient transport errors** - [`ChamberError::NoResponse`] and
//!    [`ChamberError::InvalidResponse`]. The device did not answer, or
//!    answered with a frame that does not decode. These are retried up to a
//!    bounded count by [`crate::retry::retry_transient`] before surfacing.
//! 2. **Construction errors** - [`ChamberError::Connect`]. Raised while
//!    opening the transport or running the driver's init sequence. Fatal;
//!    callers are expected to abort before entering the polling loop.
//! 3. **Value errors** - [`ChamberError::Parse`]. The transport delivered a
//!    response but the payload is not the expected number/format. Never
//!    retried; propagates to the caller.
//!
//! Anything not explicitly recovered bubbles up and terminates the run.

use thiserror::Error;

/// Convenience alias for results using the chamber error type.
pub type Result<T> = std::result::Result<T, ChamberError>;

/// Primary error type for chamber drivers and the polling loop.
#[derive(Error, Debug)]
pub enum ChamberError {
    /// Failed to open or initialize the connection to the chamber.
    ///
    /// Surfaced at construction time, before any polling starts.
    #[error("failed to connect to chamber: {0}")]
    Connect(String),

    /// The chamber did not answer within the transport timeout.
    ///
    /// Transient: retried by the retry wrapper.
    #[error("no response from chamber: {0}")]
    NoResponse(String),

    /// The chamber answered with a frame that does not decode.
    ///
    /// Covers Modbus exception responses and short/garbled frames.
    /// Transient: retried by the retry wrapper.
    #[error("invalid response from chamber: {0}")]
    InvalidResponse(String),

    /// A response arrived intact but its payload failed to parse.
    ///
    /// Not retried; a well-formed frame carrying a non-numeric value is a
    /// protocol mismatch, not line noise.
    #[error("could not parse chamber response: {0}")]
    Parse(String),

    /// The active driver's wire protocol has no way to express this
    /// operation.
    ///
    /// Drivers return this instead of silently doing nothing.
    #[error("operation '{operation}' is not supported by the {driver} driver")]
    Unsupported {
        operation: &'static str,
        driver: &'static str,
    },

    /// The connection has already been closed.
    #[error("chamber connection is closed")]
    NotConnected,

    /// Underlying I/O failure on the transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Driver configuration is semantically invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChamberError {
    pub fn connect(msg: impl Into<String>) -> Self {
        Self::Connect(msg.into())
    }

    pub fn no_response(msg: impl Into<String>) -> Self {
        Self::NoResponse(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error class is worth retrying.
    ///
    /// Only the two transport-level classes qualify; everything else either
    /// cannot succeed on a second attempt or must be seen by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoResponse(_) | Self::InvalidResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ChamberError::no_response("timeout").is_transient());
        assert!(ChamberError::invalid_response("bad crc").is_transient());
        assert!(!ChamberError::parse("not a float").is_transient());
        assert!(!ChamberError::connect("port missing").is_transient());
        assert!(!ChamberError::NotConnected.is_transient());
        assert!(!ChamberError::Unsupported {
            operation: "hold_profile",
            driver: "espec"
        }
        .is_transient());
    }
}
