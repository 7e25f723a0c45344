//! CSV export of the accumulated samples.

use std::io::Write;
use std::path::Path;

use anyhow::Context;

use chamber_core::Sample;

const HEADER: [&str; 5] = [
    "Time",
    "Measured Temperature (C)",
    "Measured Humidity (%)",
    "Temperature Setpoint (C)",
    "Humidity Setpoint (%)",
];

/// Writes the samples as CSV, header row first, one row per sample.
pub fn write_csv<W: Write>(samples: &[Sample], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for sample in samples {
        csv_writer.write_record([
            sample.timestamp.format("%H:%M:%S").to_string(),
            sample.temperature.to_string(),
            sample.humidity.to_string(),
            sample.temperature_setpoint.to_string(),
            sample.humidity_setpoint.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the samples to a CSV file at `path`.
pub fn write_csv_file(samples: &[Sample], path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    write_csv(samples, file).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = samples.len(), "wrote sample log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn sample_at(h: u32, m: u32, s: u32) -> Sample {
        Sample {
            timestamp: Local.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap(),
            temperature: -10.5,
            humidity: 45.0,
            temperature_setpoint: -10.0,
            humidity_setpoint: 50.0,
        }
    }

    #[test]
    fn writes_header_and_one_row_per_sample() {
        let samples = vec![sample_at(9, 0, 0), sample_at(9, 0, 10)];
        let mut out = Vec::new();
        write_csv(&samples, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Time,Measured Temperature (C)"));
        assert_eq!(lines[1], "09:00:00,-10.5,45,-10,50");
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chamber.csv");
        write_csv_file(&[sample_at(12, 30, 0)], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
