//! Construction-time selection of the chamber driver.

use anyhow::Context;

use chamber_core::Chamber;
use chamber_driver_espec::EspecChamber;
use chamber_driver_mock::MockChamber;
use chamber_driver_thermotron::Thermotron8800Chamber;
use chamber_driver_watlow::WatlowF4Chamber;

use crate::config::ChamberConfig;

/// Builds the configured chamber driver.
///
/// This is the only place that knows the concrete types; everything
/// downstream sees `dyn Chamber`. Connection failures surface here, before
/// the polling loop starts.
pub async fn connect(config: &ChamberConfig) -> anyhow::Result<Box<dyn Chamber>> {
    let chamber: Box<dyn Chamber> = match config {
        ChamberConfig::WatlowF4(cfg) => Box::new(
            WatlowF4Chamber::connect(cfg.clone())
                .await
                .context("could not connect to the Watlow F4 chamber")?,
        ),
        ChamberConfig::Thermotron8800(cfg) => Box::new(Thermotron8800Chamber::new(cfg.clone())),
        ChamberConfig::Espec(cfg) => Box::new(
            EspecChamber::connect(cfg.clone())
                .await
                .context("could not connect to the ESPEC chamber")?,
        ),
        ChamberConfig::Mock(cfg) => Box::new(MockChamber::new(cfg.clone())),
    };
    tracing::info!(driver = chamber.driver_name(), "chamber driver ready");
    Ok(chamber)
}
