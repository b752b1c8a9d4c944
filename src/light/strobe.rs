//! The halloween strobe.

use std::sync::Arc;
use std::time::Duration;

use super::coordinator::ActuationCoordinator;

/// Fixed-count on/off flashing, independent of holds.
pub struct StrobeEffect {
    coordinator: Arc<ActuationCoordinator>,
}

impl StrobeEffect {
    pub fn new(coordinator: Arc<ActuationCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Flash `cycles` times at `divider` Hz.
    ///
    /// Each cycle is two toggles half a period apart. Afterwards the light
    /// is set to what the outstanding holds ask for, which covers holds that
    /// began or expired mid-strobe. Resolves only when the last toggle's
    /// pause has elapsed. A zero divider is treated as 1 Hz.
    pub async fn run(&self, divider: u32, cycles: u32) {
        let half_period = half_period(divider);
        log_decorated!("Strobe: {cycles} cycles at {divider} Hz");

        for _ in 0..cycles {
            self.coordinator.toggle();
            tokio::time::sleep(half_period).await;
            self.coordinator.toggle();
            tokio::time::sleep(half_period).await;
        }
        self.coordinator.settle();

        log_debug!("Strobe finished");
    }
}

pub fn half_period(divider: u32) -> Duration {
    Duration::from_millis(500) / divider.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{ActuatorEvent, RecordingActuator};
    use tokio::time::Instant;

    #[test]
    fn test_half_period() {
        assert_eq!(half_period(10), Duration::from_millis(50));
        assert_eq!(half_period(1), Duration::from_millis(500));
        assert_eq!(half_period(0), Duration::from_millis(500));
        assert_eq!(half_period(4), Duration::from_millis(125));
    }

    #[tokio::test(start_paused = true)]
    async fn test_strobe_toggle_count_and_spacing() {
        crate::logger::Log::set_enabled(false);
        let recorder = RecordingActuator::new();
        let coordinator = ActuationCoordinator::new(Box::new(recorder.clone()));
        let strobe = StrobeEffect::new(coordinator);

        let origin = Instant::now();
        strobe.run(10, 5).await;
        let elapsed = origin.elapsed();

        let history = recorder.history();
        assert_eq!(history.len(), 10);
        assert!(history.iter().all(|(_, e)| *e == ActuatorEvent::Toggle));
        for pair in history.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            assert!(gap >= Duration::from_millis(50) && gap < Duration::from_millis(52));
        }
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_millis(1020));
        assert!(!recorder.light_is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_cycles_does_nothing() {
        let recorder = RecordingActuator::new();
        let strobe = StrobeEffect::new(ActuationCoordinator::new(Box::new(recorder.clone())));
        strobe.run(10, 0).await;
        assert!(recorder.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_expiring_mid_strobe_leaves_light_off() {
        crate::logger::Log::set_enabled(false);
        let recorder = RecordingActuator::new();
        let coordinator = ActuationCoordinator::new(Box::new(recorder.clone()));
        let strobe = StrobeEffect::new(Arc::clone(&coordinator));

        coordinator.hold(Duration::from_millis(120));
        strobe.run(10, 5).await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.holds, 0);
        assert!(!snapshot.held_on);
        assert!(!recorder.light_is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_starting_mid_strobe_leaves_light_on() {
        crate::logger::Log::set_enabled(false);
        let recorder = RecordingActuator::new();
        let coordinator = ActuationCoordinator::new(Box::new(recorder.clone()));
        let strobe = StrobeEffect::new(Arc::clone(&coordinator));

        let holder = Arc::clone(&coordinator);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            holder.hold(Duration::from_secs(60));
        });
        strobe.run(10, 5).await;

        assert_eq!(coordinator.snapshot().holds, 1);
        assert!(recorder.light_is_on());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(coordinator.snapshot().holds, 0);
        assert!(!recorder.light_is_on());
    }
}
