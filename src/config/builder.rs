//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::*;

/// Write a commented default `pilight.toml` to `path`.
///
/// Gating defaults to `"manual"` in the generated file because coordinates
/// are not known yet; the geo settings are present but commented out.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = default_config_content();
    fs::write(path, content)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;
    Ok(())
}

pub(crate) fn default_config_content() -> String {
    ConfigBuilder::new()
        .add_section("Hardware")
        .add_setting(
            "backend",
            &format!("\"{}\"", DEFAULT_BACKEND.as_str()),
            "GPIO backend: \"auto\", \"sysfs\" or \"dry_run\"",
        )
        .add_setting(
            "relay_pin",
            &DEFAULT_RELAY_PIN.to_string(),
            "GPIO line driving the relay",
        )
        .add_setting(
            "light_on_state",
            &DEFAULT_LIGHT_ON_STATE.to_string(),
            "Logic level that switches the light on",
        )
        .add_setting(
            "pir_sensor",
            &DEFAULT_PIR_SENSOR.to_string(),
            "Watch the PIR motion sensor",
        )
        .add_setting(
            "pir_pin",
            &DEFAULT_PIR_PIN.to_string(),
            "GPIO line of the PIR sensor",
        )
        .add_setting(
            "motion_poll_interval",
            &DEFAULT_MOTION_POLL_INTERVAL.to_string(),
            &format!(
                "PIR sampling period ({MINIMUM_MOTION_POLL_INTERVAL}-{MAXIMUM_MOTION_POLL_INTERVAL})ms"
            ),
        )
        .add_section("Light")
        .add_setting(
            "delay",
            &DEFAULT_DELAY.to_string(),
            &format!("Seconds the light stays on per trigger ({MINIMUM_DELAY}-{MAXIMUM_DELAY})"),
        )
        .add_setting(
            "gating",
            "\"manual\"",
            "Daylight gating: \"geo\", \"manual\" or \"off\"",
        )
        .add_setting(
            "sunrise",
            &format!("\"{DEFAULT_SUNRISE}\""),
            "Manual sunrise (HH:MM:SS)",
        )
        .add_setting(
            "sunset",
            &format!("\"{DEFAULT_SUNSET}\""),
            "Manual sunset (HH:MM:SS)",
        )
        .add_commented_setting("latitude", "50.0755", "Latitude for geo gating (-90 to 90)")
        .add_commented_setting(
            "longitude",
            "14.4378",
            "Longitude for geo gating (-180 to 180)",
        )
        .add_section("Halloween")
        .add_setting(
            "halloween_divider",
            &DEFAULT_HALLOWEEN_DIVIDER.to_string(),
            &format!(
                "Strobe frequency in Hz ({MINIMUM_HALLOWEEN_DIVIDER}-{MAXIMUM_HALLOWEEN_DIVIDER})"
            ),
        )
        .add_setting(
            "halloween_loop",
            &DEFAULT_HALLOWEEN_LOOP.to_string(),
            "Number of strobe on/off cycles",
        )
        .add_section("Network")
        .add_setting(
            "port",
            &DEFAULT_PORT.to_string(),
            "Command API port",
        )
        .add_setting(
            "bind_address",
            &format!("\"{DEFAULT_BIND_ADDRESS}\""),
            "Command API listen address",
        )
        .add_commented_setting(
            "remote_host",
            "\"192.168.1.20\"",
            "Peer pilight that mirrors every trigger",
        )
        .add_commented_setting(
            "remote_port",
            &DEFAULT_PORT.to_string(),
            "Peer API port (defaults to port)",
        )
        .build()
}

/// Builds aligned `key = value  # comment` TOML text.
struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting that is shown but disabled.
    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("#{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for (i, entry) in self.entries.into_iter().enumerate() {
            match entry {
                Entry::Section(title) => {
                    if i > 0 {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    let padding = " ".repeat(width - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
