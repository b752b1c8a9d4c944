//! Reference-counted on/off gate around the light.
//!
//! Every hold switches the light on (if it was off) and schedules its own
//! release. The light goes off only when the last outstanding hold expires,
//! so overlapping requests keep it lit until the latest end time without any
//! end time being stored.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::hardware::Actuator;

struct ActuationState {
    ref_count: usize,
    is_on: bool,
    actuator: Box<dyn Actuator>,
}

/// Point-in-time view of the coordinator, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationSnapshot {
    /// Holds that have not expired yet.
    pub holds: usize,
    /// Whether any hold keeps the light on.
    pub held_on: bool,
    /// What the actuator was last told, strobe included.
    pub light_on: bool,
}

pub struct ActuationCoordinator {
    state: Mutex<ActuationState>,
}

impl ActuationCoordinator {
    pub fn new(actuator: Box<dyn Actuator>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ActuationState {
                ref_count: 0,
                is_on: false,
                actuator,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ActuationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Keep the light on for at least `duration` from now.
    ///
    /// Returns immediately. The release runs as a tokio task, so this must be
    /// called from within a runtime.
    pub fn hold(self: &Arc<Self>, duration: Duration) {
        {
            let mut state = self.lock();
            if !state.is_on {
                switch(&mut state, true);
            }
            state.ref_count += 1;
            log_debug!(
                "Hold for {}s ({} outstanding)",
                duration.as_secs(),
                state.ref_count
            );
        }

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            coordinator.release();
        });
    }

    /// Expire one hold. Turns the light off when none remain.
    fn release(&self) {
        let mut state = self.lock();
        if state.ref_count == 0 {
            log_warning!("Hold released with no holds outstanding; ignoring");
            return;
        }
        state.ref_count -= 1;
        if state.ref_count == 0 {
            switch(&mut state, false);
        } else {
            log_debug!("Hold expired ({} outstanding)", state.ref_count);
        }
    }

    /// Flip the light without touching the hold count. Used by the strobe.
    pub fn toggle(&self) {
        let mut state = self.lock();
        if let Err(e) = state.actuator.toggle() {
            log_error!("Failed to toggle light: {e}");
        }
    }

    /// Put the light back where the holds say it should be.
    ///
    /// Toggling bypasses the hold count, so a hold that started or expired
    /// in between leaves the actuator on the wrong side.
    pub fn settle(&self) {
        let mut state = self.lock();
        if state.actuator.is_on() != state.is_on {
            let on = state.is_on;
            switch(&mut state, on);
        }
    }

    /// Switch the light off regardless of outstanding holds.
    ///
    /// Used at startup and shutdown. Holds still pending will expire normally
    /// and the last one switches off again, which is harmless. A hold taken
    /// in between switches the light back on.
    pub(crate) fn force_off(&self) {
        let mut state = self.lock();
        if let Err(e) = state.actuator.off() {
            log_error!("Failed to switch light off: {e}");
        }
        state.is_on = false;
    }

    pub fn snapshot(&self) -> ActuationSnapshot {
        let state = self.lock();
        ActuationSnapshot {
            holds: state.ref_count,
            held_on: state.is_on,
            light_on: state.actuator.is_on(),
        }
    }
}

fn switch(state: &mut ActuationState, on: bool) {
    let result = if on {
        state.actuator.on()
    } else {
        state.actuator.off()
    };
    match result {
        Ok(()) => log_decorated!("Light {}", if on { "on" } else { "off" }),
        Err(e) => log_error!("Failed to switch light {}: {e}", if on { "on" } else { "off" }),
    }
    // Track the requested state even if the line write failed so that the
    // next transition is attempted again
    state.is_on = on;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{ActuatorEvent, RecordingActuator};
    use tokio::time::{Instant, sleep};

    fn setup() -> (Arc<ActuationCoordinator>, RecordingActuator) {
        crate::logger::Log::set_enabled(false);
        let recorder = RecordingActuator::new();
        (ActuationCoordinator::new(Box::new(recorder.clone())), recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_hold_switches_on_then_off() {
        let (coordinator, recorder) = setup();
        let origin = Instant::now();

        coordinator.hold(Duration::from_secs(10));
        assert!(recorder.light_is_on());
        assert_eq!(coordinator.snapshot().holds, 1);

        sleep(Duration::from_secs(11)).await;
        assert!(!recorder.light_is_on());
        assert_eq!(coordinator.snapshot().holds, 0);
        assert_eq!(
            recorder.on_intervals(origin),
            vec![(Duration::ZERO, Some(Duration::from_secs(10)))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_holds_extend_to_latest_expiry() {
        let (coordinator, recorder) = setup();
        let origin = Instant::now();

        coordinator.hold(Duration::from_secs(10));
        sleep(Duration::from_secs(5)).await;
        coordinator.hold(Duration::from_secs(10));

        // First hold expires at t=10, light must stay on
        sleep(Duration::from_millis(9_999)).await;
        assert!(recorder.light_is_on());
        assert_eq!(coordinator.snapshot().holds, 1);

        sleep(Duration::from_millis(2)).await;
        assert!(!recorder.light_is_on());

        assert_eq!(recorder.count(ActuatorEvent::On), 1);
        assert_eq!(recorder.count(ActuatorEvent::Off), 1);
        assert_eq!(
            recorder.on_intervals(origin),
            vec![(Duration::ZERO, Some(Duration::from_secs(15)))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_hold_inside_long_hold_does_not_switch_off() {
        let (coordinator, recorder) = setup();

        coordinator.hold(Duration::from_secs(60));
        coordinator.hold(Duration::from_secs(5));
        sleep(Duration::from_secs(30)).await;

        assert!(recorder.light_is_on());
        assert_eq!(recorder.events(), vec![ActuatorEvent::On]);
        assert!(coordinator.snapshot().held_on);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_never_goes_negative() {
        let (coordinator, recorder) = setup();

        coordinator.release();
        assert_eq!(coordinator.snapshot().holds, 0);
        assert!(recorder.events().is_empty());

        coordinator.hold(Duration::from_secs(1));
        sleep(Duration::from_secs(2)).await;
        coordinator.release();
        assert_eq!(coordinator.snapshot().holds, 0);
        assert_eq!(recorder.count(ActuatorEvent::Off), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_bypasses_hold_count() {
        let (coordinator, recorder) = setup();

        coordinator.toggle();
        assert!(recorder.light_is_on());
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.holds, 0);
        assert!(!snapshot.held_on);
        assert!(snapshot.light_on);

        coordinator.toggle();
        assert!(!recorder.light_is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_off() {
        let (coordinator, recorder) = setup();
        coordinator.hold(Duration::from_secs(30));
        coordinator.force_off();
        assert!(!recorder.light_is_on());
        assert!(!coordinator.snapshot().held_on);

        sleep(Duration::from_secs(31)).await;
        assert_eq!(coordinator.snapshot().holds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_after_force_off_switches_on_again() {
        let (coordinator, recorder) = setup();
        coordinator.hold(Duration::from_secs(30));
        coordinator.force_off();

        coordinator.hold(Duration::from_secs(60));
        assert!(recorder.light_is_on());
        assert_eq!(coordinator.snapshot().holds, 2);

        // The stale hold expiring first must not switch off
        sleep(Duration::from_secs(31)).await;
        assert!(recorder.light_is_on());

        sleep(Duration::from_secs(30)).await;
        assert!(!recorder.light_is_on());
        assert_eq!(coordinator.snapshot().holds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_matches_actuator_to_holds() {
        let (coordinator, recorder) = setup();

        coordinator.toggle();
        coordinator.settle();
        assert!(!recorder.light_is_on());

        coordinator.hold(Duration::from_secs(10));
        coordinator.toggle();
        coordinator.settle();
        assert!(recorder.light_is_on());

        // Already in line: nothing is sent
        let before = recorder.events().len();
        coordinator.settle();
        assert_eq!(recorder.events().len(), before);
    }
}
