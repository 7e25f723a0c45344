//! The polling loop itself.

use chrono::Local;
use tokio::time::{sleep, Instant};

use chamber_core::error::Result;
use chamber_core::{Chamber, Sample};

use crate::config::SamplerConfig;

/// Polls the chamber until the run budget is spent.
///
/// Each tick issues four fresh reads back to back - temperature, humidity
/// and both setpoints - builds one [`Sample`], then sleeps for the
/// configured interval. The four reads are strictly sequential; nothing is
/// cached across ticks. Any chamber error ends the run and propagates.
pub async fn run(chamber: &dyn Chamber, config: &SamplerConfig) -> Result<Vec<Sample>> {
    let started = Instant::now();
    let mut samples = Vec::new();

    tracing::info!(
        driver = chamber.driver_name(),
        interval_secs = config.interval.as_secs(),
        run_secs = config.run_time.as_secs(),
        "starting polling loop"
    );

    loop {
        let elapsed = started.elapsed();
        if elapsed >= config.run_time {
            break;
        }

        let percent_complete = elapsed.as_secs_f64() / config.run_time.as_secs_f64() * 100.0;
        tracing::info!(
            sample = samples.len() + 1,
            percent_complete = format!("{percent_complete:.1}"),
            "polling chamber"
        );

        let timestamp = Local::now();
        let temperature = chamber.read_temperature().await?;
        let humidity = chamber.read_humidity().await?;
        let temperature_setpoint = chamber.read_temperature_setpoint().await?;
        let humidity_setpoint = chamber.read_humidity_setpoint().await?;

        samples.push(Sample {
            timestamp,
            temperature,
            humidity,
            temperature_setpoint,
            humidity_setpoint,
        });

        sleep(config.interval).await;
    }

    tracing::info!(samples = samples.len(), "polling loop complete");
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamber_driver_mock::MockChamber;

    // start_paused makes the interval sleeps advance virtual time instantly,
    // so the 0.1 h budget below runs in milliseconds and deterministically.
    #[tokio::test(start_paused = true)]
    async fn sample_count_matches_budget_over_interval() {
        let chamber = MockChamber::default();
        let config = SamplerConfig::new(5, 0.1); // 360 s budget, 5 s ticks
        let samples = run(&chamber, &config).await.unwrap();
        assert_eq!(samples.len(), 72);
    }

    #[tokio::test(start_paused = true)]
    async fn samples_carry_fresh_chamber_readings() {
        let chamber = MockChamber::default();
        let config = SamplerConfig::new(60, 0.1);
        let samples = run(&chamber, &config).await.unwrap();
        assert_eq!(samples.len(), 6);
        for sample in &samples {
            assert_eq!(sample.temperature, 20.1);
            assert_eq!(sample.humidity, 30.5);
            assert_eq!(sample.temperature_setpoint, 25.0);
            assert_eq!(sample.humidity_setpoint, 35.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn samples_are_in_insertion_order() {
        let chamber = MockChamber::default();
        let config = SamplerConfig::new(10, 0.1);
        let samples = run(&chamber, &config).await.unwrap();
        for pair in samples.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }
}
