//! # Pilight Library
//!
//! Internal library for the `pilight` binary.
//!
//! This library exists so that integration tests can drive the daemon's
//! internals directly, and to keep CLI dispatch (main.rs) apart from the
//! application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Pilight` builder in `daemon` wires everything together
//! - **Configuration**: `config` module for TOML settings and validation
//! - **Daylight**: `geo` computes and caches each day's sunrise/sunset window
//! - **Light Control**: `light` gates requests against daylight and
//!   reference-counts overlapping holds on the relay
//! - **Hardware**: `hardware` drives GPIO lines through sysfs or a dry run
//! - **Surface**: `api` serves the HTTP command interface, `remote` mirrors
//!   commands to a peer controller
//! - **Infrastructure**: instance lock, signal handling, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod api;
pub mod args;
pub mod config;
pub mod constants;
pub mod daemon;
pub mod geo;
pub mod hardware;
pub mod io;
pub mod light;
pub mod remote;
pub mod time_source;

pub use daemon::Pilight;
