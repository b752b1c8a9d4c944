//! Recording actuator for tests.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};

use super::Actuator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorEvent {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Default)]
struct Recording {
    on: bool,
    events: Vec<(Instant, ActuatorEvent)>,
}

/// An [`Actuator`] that remembers every command with its tokio timestamp.
///
/// Clones share the same recording, so a test keeps one handle while the
/// coordinator owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<(Instant, ActuatorEvent)> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).events.clone()
    }

    pub fn events(&self) -> Vec<ActuatorEvent> {
        self.history().into_iter().map(|(_, e)| e).collect()
    }

    pub fn count(&self, kind: ActuatorEvent) -> usize {
        self.events().into_iter().filter(|e| *e == kind).count()
    }

    pub fn light_is_on(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).on
    }

    /// Intervals during which the light was on, relative to `origin`.
    ///
    /// A light still on at the end yields an interval ending at `None`.
    pub fn on_intervals(&self, origin: Instant) -> Vec<(Duration, Option<Duration>)> {
        let mut intervals = Vec::new();
        let mut lit_since: Option<Duration> = None;
        for (at, event) in self.history() {
            let offset = at.saturating_duration_since(origin);
            let turns_on = match event {
                ActuatorEvent::On => true,
                ActuatorEvent::Off => false,
                ActuatorEvent::Toggle => lit_since.is_none(),
            };
            match (turns_on, lit_since) {
                (true, None) => lit_since = Some(offset),
                (false, Some(start)) => {
                    intervals.push((start, Some(offset)));
                    lit_since = None;
                }
                _ => {}
            }
        }
        if let Some(start) = lit_since {
            intervals.push((start, None));
        }
        intervals
    }

    fn record(&self, event: ActuatorEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.on = match event {
            ActuatorEvent::On => true,
            ActuatorEvent::Off => false,
            ActuatorEvent::Toggle => !inner.on,
        };
        inner.events.push((Instant::now(), event));
    }
}

impl Actuator for RecordingActuator {
    fn on(&mut self) -> Result<()> {
        self.record(ActuatorEvent::On);
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        self.record(ActuatorEvent::Off);
        Ok(())
    }

    fn toggle(&mut self) -> Result<()> {
        self.record(ActuatorEvent::Toggle);
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.light_is_on()
    }
}
