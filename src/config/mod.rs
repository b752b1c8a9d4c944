//! Configuration for the pilight daemon.
//!
//! Settings live in `pilight.toml`, searched in `$XDG_CONFIG_HOME/pilight/`
//! unless a directory was given with `--config`. A commented default file is
//! written on first start.
//!
//! ```toml
//! #[Hardware]
//! backend = "auto"            # "auto", "sysfs" or "dry_run"
//! relay_pin = 2               # GPIO line driving the relay
//! light_on_state = true       # Logic level that switches the light on
//! pir_sensor = true           # Watch the PIR motion sensor
//! pir_pin = 17                # GPIO line of the PIR sensor
//! motion_poll_interval = 10   # PIR sampling period (1-1000)ms
//!
//! #[Light]
//! delay = 60                  # Seconds the light stays on per trigger
//! gating = "geo"              # "geo", "manual" or "off"
//! latitude = 50.0755          # Used by geo gating
//! longitude = 14.4378
//! sunrise = "06:00:00"        # Used by manual gating
//! sunset = "18:00:00"
//!
//! #[Halloween]
//! halloween_divider = 10      # Strobe frequency in Hz
//! halloween_loop = 20         # Number of on/off cycles
//!
//! #[Network]
//! port = 3000                 # Command API port
//! bind_address = "0.0.0.0"
//! remote_host = "10.0.0.12"   # Optional peer that mirrors every trigger
//! remote_port = 3000
//! ```
//!
//! All fields are optional in the file. After [`load_from_path`] returns,
//! validation has run and every field carries a value.

pub mod builder;
pub mod loading;
pub mod validation;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::constants::*;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Which GPIO implementation drives the relay and reads the PIR sensor.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Use sysfs when `/sys/class/gpio` exists, otherwise dry run.
    Auto,
    /// Linux sysfs GPIO interface.
    Sysfs,
    /// Log every pin change without touching hardware.
    DryRun,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Sysfs => "sysfs",
            Backend::DryRun => "dry_run",
        }
    }
}

/// How daylight suppresses light requests.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GatingMode {
    /// Sunrise and sunset computed from latitude/longitude every day.
    Geo,
    /// Fixed sunrise and sunset times from the config file.
    Manual,
    /// Never suppress; every request lights for its full duration.
    Off,
}

impl GatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatingMode::Geo => "geo",
            GatingMode::Manual => "manual",
            GatingMode::Off => "off",
        }
    }
}

/// Daemon settings as read from `pilight.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub backend: Option<Backend>,
    pub relay_pin: Option<u32>,
    /// Logic level of "on". `false` inverts the relay.
    pub light_on_state: Option<bool>,
    pub pir_sensor: Option<bool>,
    pub pir_pin: Option<u32>,
    pub motion_poll_interval: Option<u64>, // milliseconds

    pub delay: Option<u64>, // seconds
    pub gating: Option<GatingMode>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sunrise: Option<String>, // HH:MM:SS, manual gating
    pub sunset: Option<String>,  // HH:MM:SS, manual gating

    pub halloween_divider: Option<u32>,
    pub halloween_loop: Option<u32>,

    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub remote_host: Option<String>,
    pub remote_port: Option<u16>,
}

impl Default for Config {
    /// A fully populated configuration: manual gating at the default times,
    /// dry-run hardware, no peer.
    fn default() -> Self {
        Self {
            backend: Some(Backend::DryRun),
            relay_pin: Some(DEFAULT_RELAY_PIN),
            light_on_state: Some(DEFAULT_LIGHT_ON_STATE),
            pir_sensor: Some(false),
            pir_pin: Some(DEFAULT_PIR_PIN),
            motion_poll_interval: Some(DEFAULT_MOTION_POLL_INTERVAL),
            delay: Some(DEFAULT_DELAY),
            gating: Some(GatingMode::Manual),
            latitude: None,
            longitude: None,
            sunrise: Some(DEFAULT_SUNRISE.to_string()),
            sunset: Some(DEFAULT_SUNSET.to_string()),
            halloween_divider: Some(DEFAULT_HALLOWEEN_DIVIDER),
            halloween_loop: Some(DEFAULT_HALLOWEEN_LOOP),
            port: Some(DEFAULT_PORT),
            bind_address: Some(DEFAULT_BIND_ADDRESS.to_string()),
            remote_host: None,
            remote_port: None,
        }
    }
}

impl Config {
    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or(DEFAULT_BACKEND)
    }

    pub fn gating(&self) -> GatingMode {
        self.gating.unwrap_or(DEFAULT_GATING)
    }

    pub fn delay(&self) -> u64 {
        self.delay.unwrap_or(DEFAULT_DELAY)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    pub fn halloween_divider(&self) -> u32 {
        self.halloween_divider.unwrap_or(DEFAULT_HALLOWEEN_DIVIDER)
    }

    pub fn halloween_loop(&self) -> u32 {
        self.halloween_loop.unwrap_or(DEFAULT_HALLOWEEN_LOOP)
    }

    pub fn pir_enabled(&self) -> bool {
        self.pir_sensor.unwrap_or(DEFAULT_PIR_SENSOR)
    }

    /// Peer to mirror triggers to, if one is configured.
    ///
    /// The peer port defaults to our own port: instances are expected to be
    /// deployed identically.
    pub fn remote_target(&self) -> Option<crate::remote::RemoteTarget> {
        let host = self.remote_host.as_deref()?.trim();
        if host.is_empty() {
            return None;
        }
        Some(crate::remote::RemoteTarget {
            host: host.to_string(),
            port: self.remote_port.unwrap_or(self.port()),
        })
    }

    /// Manual sunrise/sunset, parsed. Only meaningful for manual gating.
    pub fn manual_times(&self) -> anyhow::Result<(NaiveTime, NaiveTime)> {
        let sunrise = self.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE);
        let sunset = self.sunset.as_deref().unwrap_or(DEFAULT_SUNSET);
        Ok((
            NaiveTime::parse_from_str(sunrise, "%H:%M:%S")
                .map_err(|e| anyhow::anyhow!("Invalid sunrise time '{sunrise}': {e}"))?,
            NaiveTime::parse_from_str(sunset, "%H:%M:%S")
                .map_err(|e| anyhow::anyhow!("Invalid sunset time '{sunset}': {e}"))?,
        ))
    }

    pub fn log_config(&self, resolved_backend: Backend) {
        log_block_start!("Loaded configuration");

        let backend = match (self.backend(), resolved_backend) {
            (Backend::Auto, resolved) => format!("Auto ({})", resolved.as_str()),
            (explicit, _) => explicit.as_str().to_string(),
        };
        log_indented!("Backend: {backend}");
        log_indented!(
            "Relay: GPIO {} (on = {})",
            self.relay_pin.unwrap_or(DEFAULT_RELAY_PIN),
            if self.light_on_state.unwrap_or(DEFAULT_LIGHT_ON_STATE) {
                "high"
            } else {
                "low"
            }
        );
        if self.pir_enabled() {
            log_indented!(
                "PIR sensor: GPIO {} every {}ms",
                self.pir_pin.unwrap_or(DEFAULT_PIR_PIN),
                self.motion_poll_interval
                    .unwrap_or(DEFAULT_MOTION_POLL_INTERVAL)
            );
        } else {
            log_indented!("PIR sensor: disabled");
        }
        log_indented!("Light delay: {} seconds", self.delay());

        match self.gating() {
            GatingMode::Geo => {
                if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
                    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
                    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
                    log_indented!(
                        "Gating: geo at {:.3}°{}, {:.3}°{}",
                        lat.abs(),
                        lat_dir,
                        lon.abs(),
                        lon_dir
                    );
                }
            }
            GatingMode::Manual => {
                log_indented!(
                    "Gating: manual, daylight {} - {}",
                    self.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE),
                    self.sunset.as_deref().unwrap_or(DEFAULT_SUNSET)
                );
            }
            GatingMode::Off => log_indented!("Gating: off (light at any hour)"),
        }

        log_indented!(
            "Halloween: {} Hz x {} cycles",
            self.halloween_divider(),
            self.halloween_loop()
        );
        log_indented!("API: {}:{}", self.bind_address(), self.port());
        match self.remote_target() {
            Some(target) => log_indented!("Peer: {}:{}", target.host, target.port),
            None => log_indented!("Peer: none"),
        }
    }
}
