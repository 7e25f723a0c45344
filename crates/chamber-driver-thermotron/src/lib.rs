//! Thermotron 8800 chamber driver.
//!
//! Talks the 8800-series line-oriented ASCII protocol over raw TCP (the
//! lab's "Big Gray"). Every operation opens a fresh connection, sends one
//! newline-terminated command, reads one line of reply, and drops the
//! socket - no connection state survives between calls. That costs a TCP
//! handshake per read but means one flaky reply can never poison the next.

mod driver;

pub use driver::{Thermotron8800Chamber, Thermotron8800Config};
