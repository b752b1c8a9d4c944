//! Configuration validation.
//!
//! Rejects settings that would leave the daemon unable to gate, drive the
//! relay or serve commands.

use anyhow::{Context, Result};
use chrono::NaiveTime;

use super::{Config, GatingMode};
use crate::constants::*;

/// Validate a freshly parsed configuration before defaults are applied.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(delay) = config.delay
        && !(MINIMUM_DELAY..=MAXIMUM_DELAY).contains(&delay)
    {
        anyhow::bail!(
            "delay ({} seconds) must be between {} and {} seconds",
            delay,
            MINIMUM_DELAY,
            MAXIMUM_DELAY
        );
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    match config.gating.unwrap_or(DEFAULT_GATING) {
        GatingMode::Geo => {
            if config.latitude.is_none() || config.longitude.is_none() {
                anyhow::bail!(
                    "gating = \"geo\" requires latitude and longitude. \
                    Add both to the configuration or use gating = \"manual\"."
                );
            }
        }
        GatingMode::Manual => validate_manual_times(config)?,
        GatingMode::Off => {}
    }

    if let Some(divider) = config.halloween_divider
        && !(MINIMUM_HALLOWEEN_DIVIDER..=MAXIMUM_HALLOWEEN_DIVIDER).contains(&divider)
    {
        anyhow::bail!(
            "halloween_divider ({}) must be between {} and {}",
            divider,
            MINIMUM_HALLOWEEN_DIVIDER,
            MAXIMUM_HALLOWEEN_DIVIDER
        );
    }

    if let Some(loops) = config.halloween_loop
        && loops > MAXIMUM_HALLOWEEN_LOOP
    {
        anyhow::bail!(
            "halloween_loop ({}) must not exceed {}",
            loops,
            MAXIMUM_HALLOWEEN_LOOP
        );
    }

    if config.port == Some(0) {
        anyhow::bail!("port must be between 1 and 65535");
    }
    if config.remote_port == Some(0) {
        anyhow::bail!("remote_port must be between 1 and 65535");
    }

    if let Some(address) = config.bind_address.as_deref() {
        address
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("bind_address '{address}' is not an IP address"))?;
    }

    for (name, pin) in [("relay_pin", config.relay_pin), ("pir_pin", config.pir_pin)] {
        if let Some(pin) = pin
            && pin > MAXIMUM_GPIO_LINE
        {
            anyhow::bail!("{name} ({pin}) must not exceed {MAXIMUM_GPIO_LINE}");
        }
    }

    if config.pir_sensor.unwrap_or(DEFAULT_PIR_SENSOR)
        && config.relay_pin.unwrap_or(DEFAULT_RELAY_PIN)
            == config.pir_pin.unwrap_or(DEFAULT_PIR_PIN)
    {
        anyhow::bail!("relay_pin and pir_pin cannot use the same GPIO line");
    }

    if let Some(interval) = config.motion_poll_interval
        && !(MINIMUM_MOTION_POLL_INTERVAL..=MAXIMUM_MOTION_POLL_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "motion_poll_interval ({} ms) must be between {} and {} milliseconds",
            interval,
            MINIMUM_MOTION_POLL_INTERVAL,
            MAXIMUM_MOTION_POLL_INTERVAL
        );
    }

    if let Some(host) = config.remote_host.as_deref()
        && host.trim().contains(['/', ' '])
    {
        anyhow::bail!(
            "remote_host '{}' must be a bare host name or IP address",
            host
        );
    }

    Ok(())
}

/// Manual gating needs two distinct, parseable times.
fn validate_manual_times(config: &Config) -> Result<()> {
    let sunrise_str = config.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE);
    let sunset_str = config.sunset.as_deref().unwrap_or(DEFAULT_SUNSET);

    let sunrise = NaiveTime::parse_from_str(sunrise_str, "%H:%M:%S")
        .context("Invalid sunrise time format. Use HH:MM:SS format")?;
    let sunset = NaiveTime::parse_from_str(sunset_str, "%H:%M:%S")
        .context("Invalid sunset time format. Use HH:MM:SS format")?;

    if sunrise == sunset {
        anyhow::bail!(
            "Sunset and sunrise cannot be the same time ({}). \
            There must be a distinction between day and night periods.",
            sunrise_str
        );
    }

    if sunset < sunrise {
        log_warning!(
            "sunset ({sunset_str}) is earlier than sunrise ({sunrise_str}); \
            requests will only ever be gated by the sunrise boundary."
        );
    }

    Ok(())
}
