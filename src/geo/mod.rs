//! Daylight gating data: when the sun rises and sets today.
//!
//! ## Module Structure
//!
//! - [`solar`]: the [`SolarModel`] trait with its astronomical and manual
//!   implementations, and the [`SolarComputationError`] taxonomy
//! - [`window`]: [`SolarWindow`], the per-day cache consulted on every light
//!   request
//!
//! Gating mode `off` has no model at all; the scheduler then skips the window
//! and lights every request for its full duration.

pub mod solar;
pub mod window;

use anyhow::{Context, Result};

use crate::config::{Config, GatingMode};

pub use solar::{Astronomical, DayWindow, ManualSchedule, SolarComputationError, SolarModel};
pub use window::{CachedWindow, SolarWindow};

/// Build the solar model selected by `config.gating`.
///
/// Returns `Ok(None)` when gating is off.
pub fn model_from_config(config: &Config) -> Result<Option<Box<dyn SolarModel>>> {
    match config.gating() {
        GatingMode::Geo => {
            let (Some(latitude), Some(longitude)) = (config.latitude, config.longitude) else {
                anyhow::bail!("gating = \"geo\" requires latitude and longitude");
            };
            let model = Astronomical::new(latitude, longitude)
                .context("Failed to set up astronomical gating")?;
            Ok(Some(Box::new(model)))
        }
        GatingMode::Manual => {
            let (sunrise, sunset) = config.manual_times()?;
            Ok(Some(Box::new(ManualSchedule::new(sunrise, sunset))))
        }
        GatingMode::Off => Ok(None),
    }
}

#[cfg(test)]
mod tests;
