//! GPIO hardware: the relay that switches the light and the PIR motion sensor.
//!
//! Two seams keep the scheduling code away from pins:
//!
//! - [`GpioLine`] is a single digital line (sysfs or dry run).
//! - [`Actuator`] is the light itself. [`Relay`] implements it over a line and
//!   is the only place where the configured logic level of "on" is applied.
//!
//! Backends are chosen by [`resolve_backend`]: `auto` picks sysfs when
//! `/sys/class/gpio` is present and falls back to a dry run that only logs.

pub mod dry_run;
pub mod motion;
pub mod relay;
pub mod sysfs;

#[cfg(any(test, feature = "testing-support"))]
pub mod mock;

use anyhow::Result;
use std::path::Path;

use crate::config::{Backend, Config};
use crate::constants::*;

pub use dry_run::DryRunLine;
pub use motion::{EdgeDetector, MotionWatcher};
pub use relay::Relay;
pub use sysfs::{Direction, SysfsGpio};

/// One digital GPIO line.
pub trait GpioLine: Send {
    fn set_level(&mut self, high: bool) -> Result<()>;
    fn level(&mut self) -> Result<bool>;
    fn describe(&self) -> String;
}

/// The switched light.
///
/// `on`/`off`/`toggle` speak in terms of the light, never the logic level.
/// [`Actuator::is_on`] reports the last commanded state.
pub trait Actuator: Send {
    fn on(&mut self) -> Result<()>;
    fn off(&mut self) -> Result<()>;
    fn toggle(&mut self) -> Result<()>;
    fn is_on(&self) -> bool;
}

/// Replace `auto` with the backend that is actually usable here.
pub fn resolve_backend(requested: Backend, gpio_root: &Path) -> Backend {
    match requested {
        Backend::Auto => {
            if gpio_root.join("export").exists() {
                Backend::Sysfs
            } else {
                Backend::DryRun
            }
        }
        explicit => explicit,
    }
}

fn open_line(backend: Backend, pin: u32, direction: Direction) -> Result<Box<dyn GpioLine>> {
    match backend {
        Backend::Sysfs | Backend::Auto => Ok(Box::new(SysfsGpio::open(
            Path::new(SYSFS_GPIO_ROOT),
            pin,
            direction,
        )?)),
        Backend::DryRun => Ok(Box::new(DryRunLine::new(pin))),
    }
}

/// Open the relay described by `config` on the resolved backend.
pub fn open_relay(config: &Config, backend: Backend) -> Result<Relay> {
    let pin = config.relay_pin.unwrap_or(DEFAULT_RELAY_PIN);
    let line = open_line(backend, pin, Direction::Out)?;
    Ok(Relay::new(
        line,
        config.light_on_state.unwrap_or(DEFAULT_LIGHT_ON_STATE),
    ))
}

/// Open the PIR sensor line. Only called when the sensor is enabled.
pub fn open_motion_line(config: &Config, backend: Backend) -> Result<Box<dyn GpioLine>> {
    let pin = config.pir_pin.unwrap_or(DEFAULT_PIR_PIN);
    open_line(backend, pin, Direction::In)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_backend_auto() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_backend(Backend::Auto, dir.path()), Backend::DryRun);

        std::fs::write(dir.path().join("export"), "").unwrap();
        assert_eq!(resolve_backend(Backend::Auto, dir.path()), Backend::Sysfs);
    }

    #[test]
    fn test_resolve_backend_explicit_is_kept() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_backend(Backend::Sysfs, dir.path()), Backend::Sysfs);
        assert_eq!(resolve_backend(Backend::DryRun, dir.path()), Backend::DryRun);
    }

    #[test]
    fn test_open_relay_dry_run() {
        let config = Config::default();
        let mut relay = open_relay(&config, Backend::DryRun).unwrap();
        assert!(!relay.is_on());
        relay.on().unwrap();
        assert!(relay.is_on());
    }
}
