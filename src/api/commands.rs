//! The two named commands and the motion trigger that shares them.
//!
//! Command parameters arrive as a loose JSON map; numbers are floats even when
//! they are logically integers. Each command parses its map into a typed
//! request first. A missing, non-numeric, non-finite or out-of-range value is
//! silently replaced by the configured default, and fractions are truncated.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::constants::*;
use crate::light::{LightPlan, LightScheduler, StrobeEffect};
use crate::remote::{PeerCommand, RemoteForwarder};

pub type Params = Map<String, Value>;

/// Values used when a command omits a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDefaults {
    pub delay: u64,
    pub divider: u32,
    pub cycles: u32,
}

impl Default for CommandDefaults {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            divider: DEFAULT_HALLOWEEN_DIVIDER,
            cycles: DEFAULT_HALLOWEEN_LOOP,
        }
    }
}

/// Non-negative whole number from a JSON number, truncated toward zero.
fn whole_number(params: &Params, key: &str) -> Option<u64> {
    let value = params.get(key)?.as_f64()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // Saturates for values beyond u64::MAX
    Some(value.trunc() as u64)
}

fn fallback<T: std::fmt::Display>(params: &Params, key: &str, default: T) -> T {
    if let Some(raw) = params.get(key) {
        log_debug!("Ignoring {key} = {raw}, using default {default}");
    }
    default
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightOnRequest {
    pub duration: u64,
}

impl LightOnRequest {
    pub fn from_params(params: &Params, defaults: &CommandDefaults) -> Self {
        let duration = whole_number(params, "duration")
            .filter(|d| *d > 0)
            .unwrap_or_else(|| fallback(params, "duration", defaults.delay));
        Self { duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalloweenRequest {
    pub divider: u32,
    pub cycles: u32,
}

impl HalloweenRequest {
    pub fn from_params(params: &Params, defaults: &CommandDefaults) -> Self {
        let divider = whole_number(params, "divider")
            .and_then(|d| u32::try_from(d).ok())
            .filter(|d| (MINIMUM_HALLOWEEN_DIVIDER..=MAXIMUM_HALLOWEEN_DIVIDER).contains(d))
            .unwrap_or_else(|| fallback(params, "divider", defaults.divider));
        let cycles = whole_number(params, "loop")
            .and_then(|c| u32::try_from(c).ok())
            .filter(|c| *c <= MAXIMUM_HALLOWEEN_LOOP)
            .unwrap_or_else(|| fallback(params, "loop", defaults.cycles));
        Self { divider, cycles }
    }
}

/// Entry point shared by the HTTP API and the motion sensor.
pub struct CommandSurface {
    scheduler: LightScheduler,
    strobe: StrobeEffect,
    forwarder: RemoteForwarder,
    defaults: CommandDefaults,
}

impl CommandSurface {
    pub fn new(
        scheduler: LightScheduler,
        forwarder: RemoteForwarder,
        defaults: CommandDefaults,
    ) -> Arc<Self> {
        let strobe = StrobeEffect::new(Arc::clone(scheduler.coordinator()));
        Arc::new(Self {
            scheduler,
            strobe,
            forwarder,
            defaults,
        })
    }

    /// `light_on`: light for `duration` seconds (default: the configured delay).
    ///
    /// Always acknowledges, even when daylight suppressed the light.
    pub fn light_on(&self, params: &Params) -> String {
        let request = LightOnRequest::from_params(params, &self.defaults);
        self.request_light(request.duration);
        format!("Light On - {}", request.duration)
    }

    /// `halloween`: strobe, mirrored on the peer.
    ///
    /// Resolves after the local strobe has finished. The peer request runs in
    /// the background and is not waited for.
    pub async fn halloween(&self, params: &Params) -> String {
        let request = HalloweenRequest::from_params(params, &self.defaults);
        self.forwarder.forward(PeerCommand::Halloween {
            divider: request.divider,
            cycles: request.cycles,
        });
        self.strobe.run(request.divider, request.cycles).await;
        "Halloween".to_string()
    }

    /// The PIR sensor saw movement.
    ///
    /// Same as a `light_on` with the configured delay, and the peer is told
    /// to do the same on its own.
    pub fn motion_detected(&self) {
        log_block_start!("Motion detected");
        self.request_light(self.defaults.delay);
        self.forwarder.forward(PeerCommand::LightOn);
    }

    fn request_light(&self, duration: u64) -> Option<LightPlan> {
        self.scheduler.request_light(duration)
    }

    pub fn scheduler(&self) -> &LightScheduler {
        &self.scheduler
    }

    pub fn forwarder(&self) -> &RemoteForwarder {
        &self.forwarder
    }

    pub fn defaults(&self) -> &CommandDefaults {
        &self.defaults
    }
}
