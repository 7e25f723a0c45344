//! Watlow F4 chamber driver for rust chamber logging.
//!
//! Talks Modbus RTU over a serial line to Thermotron chambers fitted with the
//! Watlow F4 controller (the lab's "Big Blue"). All readings live in holding
//! registers; temperatures are signed values scaled by ten, so the raw
//! register word must be reinterpreted as a two's-complement 16-bit integer
//! before dividing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chamber_driver_watlow::{WatlowF4Chamber, WatlowF4Config};
//!
//! let config = WatlowF4Config {
//!     port: "/dev/ttyUSB0".into(),
//!     ..Default::default()
//! };
//! let chamber = WatlowF4Chamber::connect(config).await?;
//! let temp = chamber.read_temperature().await?;
//! ```

pub mod codec;
mod driver;

pub use driver::{WatlowF4Chamber, WatlowF4Config};
