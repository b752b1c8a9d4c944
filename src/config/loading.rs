//! Configuration loading.
//!
//! Locates `pilight.toml`, creates a default one when missing, parses,
//! validates and fills in defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::constants::*;

/// Configuration directory chosen with `--config`, set once at startup.
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// Returns an error if it was already set.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// The directory given with `--config`, if any.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of the configuration file in use.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("pilight").join(CONFIG_FILE_NAME))
}

/// Load the configuration, writing a default file first if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!("Created default configuration");
        log_indented!("{}", config_path.display());
    }

    load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Load configuration from a specific path. Never creates the file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Parse, validate and complete a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).context("Failed to parse TOML")?;

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

/// Fill every unset field with its default.
fn apply_defaults(config: &mut Config) {
    config.backend.get_or_insert(DEFAULT_BACKEND);
    config.relay_pin.get_or_insert(DEFAULT_RELAY_PIN);
    config.light_on_state.get_or_insert(DEFAULT_LIGHT_ON_STATE);
    config.pir_sensor.get_or_insert(DEFAULT_PIR_SENSOR);
    config.pir_pin.get_or_insert(DEFAULT_PIR_PIN);
    config
        .motion_poll_interval
        .get_or_insert(DEFAULT_MOTION_POLL_INTERVAL);
    config.delay.get_or_insert(DEFAULT_DELAY);
    config.gating.get_or_insert(DEFAULT_GATING);
    config.halloween_divider.get_or_insert(DEFAULT_HALLOWEEN_DIVIDER);
    config.halloween_loop.get_or_insert(DEFAULT_HALLOWEEN_LOOP);
    config.port.get_or_insert(DEFAULT_PORT);
    config
        .bind_address
        .get_or_insert_with(|| DEFAULT_BIND_ADDRESS.to_string());

    if config.gating == Some(super::GatingMode::Manual) {
        config
            .sunrise
            .get_or_insert_with(|| DEFAULT_SUNRISE.to_string());
        config
            .sunset
            .get_or_insert_with(|| DEFAULT_SUNSET.to_string());
    }

    // An empty remote_host in the file means "no peer"
    if config
        .remote_host
        .as_deref()
        .is_some_and(|h| h.trim().is_empty())
    {
        config.remote_host = None;
    }
}
