//! ESPEC chamber driver.
//!
//! Talks the ESPEC controllers' line-oriented ASCII protocol over a (virtual)
//! serial port. Two query commands cover everything: `MON?` returns the
//! current chamber conditions and `PRGM MON?` the running program status,
//! both as comma-separated lines whose field count depends on whether the
//! chamber has a humidity channel.
//!
//! These serial links are noisy, so decoding is best effort: a response that
//! does not parse is logged and thrown out, and the affected fields keep
//! their sentinel defaults (`NaN`, `-1`, `"UNKNOWN"`). Queries never fail
//! because of a malformed response.

mod driver;
mod status;

pub use driver::{EspecChamber, EspecConfig, LoopCounterField};
pub use status::{ChamberConditions, ProgramStatus};
