//! Timed polling loop over the chamber capability interface.
//!
//! Drives periodic reads against whichever [`Chamber`](chamber_core::Chamber)
//! is configured, accumulates one [`Sample`](chamber_core::Sample) per tick,
//! and terminates once the elapsed wall-clock budget runs out. The collected
//! samples are handed back in insertion order for export.

mod config;
mod export;
mod sampler;

pub use config::{RawSamplerSettings, SamplerConfig};
pub use export::{write_csv, write_csv_file};
pub use sampler::run;
