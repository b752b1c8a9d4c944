//! Application-wide defaults, limits and fixed names.

use crate::config::{Backend, GatingMode};

// # Robot identity and API paths

/// Robot name used in the command API URL.
pub const ROBOT_NAME: &str = "pilight";
pub const COMMAND_LIGHT_ON: &str = "light_on";
pub const COMMAND_HALLOWEEN: &str = "halloween";
pub const COMMANDS: [&str; 2] = [COMMAND_LIGHT_ON, COMMAND_HALLOWEEN];

/// Prefix of every robot command route (`{prefix}/{command}`).
pub const COMMAND_PATH_PREFIX: &str = "/api/robots/pilight/commands";

// # Defaults

pub const DEFAULT_BACKEND: Backend = Backend::Auto;
pub const DEFAULT_GATING: GatingMode = GatingMode::Geo;
pub const DEFAULT_DELAY: u64 = 60; // seconds
pub const DEFAULT_PORT: u16 = 3000; // gobot API default
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PIR_PIN: u32 = 17; // header pin 11
pub const DEFAULT_RELAY_PIN: u32 = 2; // header pin 3
pub const DEFAULT_PIR_SENSOR: bool = true;
pub const DEFAULT_LIGHT_ON_STATE: bool = true;
pub const DEFAULT_HALLOWEEN_DIVIDER: u32 = 10;
pub const DEFAULT_HALLOWEEN_LOOP: u32 = 20;
pub const DEFAULT_MOTION_POLL_INTERVAL: u64 = 10; // milliseconds
pub const DEFAULT_SUNRISE: &str = "06:00:00";
pub const DEFAULT_SUNSET: &str = "18:00:00";

// # Validation limits

pub const MINIMUM_DELAY: u64 = 1;
pub const MAXIMUM_DELAY: u64 = 86_400;
pub const MINIMUM_HALLOWEEN_DIVIDER: u32 = 1;
pub const MAXIMUM_HALLOWEEN_DIVIDER: u32 = 1000;
pub const MAXIMUM_HALLOWEEN_LOOP: u32 = 100_000;
pub const MAXIMUM_GPIO_LINE: u32 = 1023;
pub const MINIMUM_MOTION_POLL_INTERVAL: u64 = 1;
pub const MAXIMUM_MOTION_POLL_INTERVAL: u64 = 1000;

// # Peer forwarding

/// Upper bound on a single forwarded request, including connect.
pub const FORWARD_TIMEOUT_SECS: u64 = 10;

// # Paths

pub const CONFIG_FILE_NAME: &str = "pilight.toml";
pub const LOCK_FILE_NAME: &str = "pilight.lock";
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
