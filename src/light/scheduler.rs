//! Daylight gating of light requests.
//!
//! All arithmetic is done in whole minutes of the local day, the resolution
//! of the window itself. A request starting at `start` for `d` seconds covers
//! the minutes `start..start + d / 60`; the end is not wrapped past midnight.

use chrono::Timelike;
use std::sync::Arc;
use std::time::Duration;

use super::coordinator::ActuationCoordinator;
use crate::geo::{DayWindow, SolarWindow};
use crate::time_source::TimeSource;

/// What a light request turns into once the daylight window is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPlan {
    /// The whole request lies in daylight; nothing happens.
    Daylight,
    /// Hold the light now for `hold`.
    Immediate { hold: Duration },
    /// Wait for sunset, then hold for the part of the request after it.
    AfterSunset { delay: Duration, hold: Duration },
}

/// Decide how to light a request starting at `start_minute` (minutes since
/// local midnight) that asks for `duration_secs` seconds.
///
/// Daylight is inclusive at both ends. A request crossing sunrise is
/// truncated to end at sunrise; one crossing sunset is deferred to sunset.
/// Sunrise is checked first, so a request can never be both.
pub fn plan_light(start_minute: u32, duration_secs: u64, window: &DayWindow) -> LightPlan {
    let start = i64::from(start_minute);
    let end = start + (duration_secs / 60) as i64;
    let sunrise = i64::from(window.sunrise_minutes());
    let sunset = i64::from(window.sunset_minutes());

    if sunrise <= start && sunset >= end {
        return LightPlan::Daylight;
    }

    if start < sunrise && sunrise < end && start != end {
        return LightPlan::Immediate {
            hold: minutes(sunrise - start),
        };
    }

    if start < sunset && sunset < end && start != end {
        return LightPlan::AfterSunset {
            delay: minutes(sunset - start),
            hold: minutes(end - sunset),
        };
    }

    LightPlan::Immediate {
        hold: Duration::from_secs(duration_secs),
    }
}

fn minutes(m: i64) -> Duration {
    Duration::from_secs(m.max(0) as u64 * 60)
}

/// Applies daylight gating to light requests and feeds the coordinator.
pub struct LightScheduler {
    coordinator: Arc<ActuationCoordinator>,
    /// `None` when gating is off.
    window: Option<Arc<SolarWindow>>,
    clock: Arc<dyn TimeSource>,
}

impl LightScheduler {
    pub fn new(
        coordinator: Arc<ActuationCoordinator>,
        window: Option<Arc<SolarWindow>>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            coordinator,
            window,
            clock,
        }
    }

    /// Light for `duration_secs` seconds from now, subject to daylight.
    ///
    /// Returns the plan that was carried out, or `None` when the daylight
    /// window could not be computed and the request was dropped.
    pub fn request_light(&self, duration_secs: u64) -> Option<LightPlan> {
        let now = self.clock.now();

        let plan = match &self.window {
            None => LightPlan::Immediate {
                hold: Duration::from_secs(duration_secs),
            },
            Some(window) => {
                let day = match window.refresh(now) {
                    Ok(day) => day,
                    Err(e) => {
                        log_warning!("Light request of {duration_secs}s dropped: {e}");
                        return None;
                    }
                };
                let start_minute = now.hour() * 60 + now.minute();
                plan_light(start_minute, duration_secs, &day)
            }
        };

        self.execute(plan);
        Some(plan)
    }

    fn execute(&self, plan: LightPlan) {
        match plan {
            LightPlan::Daylight => {
                log_decorated!("Daylight, light request ignored");
            }
            LightPlan::Immediate { hold } => {
                log_debug!("Lighting for {}s", hold.as_secs());
                self.coordinator.hold(hold);
            }
            LightPlan::AfterSunset { delay, hold } => {
                log_decorated!(
                    "Sunset in {} min, lighting then for {}s",
                    delay.as_secs() / 60,
                    hold.as_secs()
                );
                let coordinator = Arc::clone(&self.coordinator);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    coordinator.hold(hold);
                });
            }
        }
    }

    pub fn coordinator(&self) -> &Arc<ActuationCoordinator> {
        &self.coordinator
    }

    pub fn window(&self) -> Option<&Arc<SolarWindow>> {
        self.window.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> DayWindow {
        DayWindow::from_hm((6, 0), (18, 0)).unwrap()
    }

    fn at(h: u32, m: u32) -> u32 {
        h * 60 + m
    }

    #[test]
    fn test_request_inside_daylight_is_ignored() {
        assert_eq!(plan_light(at(12, 0), 600, &day()), LightPlan::Daylight);
    }

    #[test]
    fn test_request_crossing_sunrise_is_truncated() {
        assert_eq!(
            plan_light(at(5, 30), 3600, &day()),
            LightPlan::Immediate {
                hold: Duration::from_secs(1800)
            }
        );
    }

    #[test]
    fn test_request_crossing_sunset_is_deferred() {
        assert_eq!(
            plan_light(at(17, 30), 3600, &day()),
            LightPlan::AfterSunset {
                delay: Duration::from_secs(1800),
                hold: Duration::from_secs(1800)
            }
        );
    }

    #[test]
    fn test_request_in_darkness_gets_full_duration() {
        assert_eq!(
            plan_light(at(19, 0), 3600, &day()),
            LightPlan::Immediate {
                hold: Duration::from_secs(3600)
            }
        );
        assert_eq!(
            plan_light(at(2, 0), 45, &day()),
            LightPlan::Immediate {
                hold: Duration::from_secs(45)
            }
        );
    }

    #[test]
    fn test_daylight_boundaries_are_inclusive() {
        // Starting on the sunrise minute is daylight
        assert_eq!(plan_light(at(6, 0), 600, &day()), LightPlan::Daylight);
        // Ending on the sunset minute is daylight
        assert_eq!(plan_light(at(17, 50), 600, &day()), LightPlan::Daylight);
        // One minute later it crosses sunset by a minute
        assert_eq!(
            plan_light(at(17, 51), 600, &day()),
            LightPlan::AfterSunset {
                delay: Duration::from_secs(9 * 60),
                hold: Duration::from_secs(60)
            }
        );
        // Ending exactly on the sunrise minute does not cross it
        assert_eq!(
            plan_light(at(5, 50), 600, &day()),
            LightPlan::Immediate {
                hold: Duration::from_secs(600)
            }
        );
    }

    #[test]
    fn test_sub_minute_request_on_sunset_minute() {
        // Shorter than a minute: start == end, still inside the sunset minute
        assert_eq!(plan_light(at(18, 0), 30, &day()), LightPlan::Daylight);
        assert_eq!(
            plan_light(at(18, 1), 30, &day()),
            LightPlan::Immediate {
                hold: Duration::from_secs(30)
            }
        );
    }

    #[test]
    fn test_request_spanning_whole_day_prefers_sunrise() {
        assert_eq!(
            plan_light(at(4, 0), 20 * 3600, &day()),
            LightPlan::Immediate {
                hold: Duration::from_secs(2 * 3600)
            }
        );
    }

    #[test]
    fn test_inverted_manual_window() {
        // Sunset before sunrise: only the sunrise boundary ever gates
        let window = DayWindow::from_hm((20, 0), (4, 0)).unwrap();
        assert_eq!(
            plan_light(at(12, 0), 600, &window),
            LightPlan::Immediate {
                hold: Duration::from_secs(600)
            }
        );
        assert_eq!(
            plan_light(at(19, 30), 3600, &window),
            LightPlan::Immediate {
                hold: Duration::from_secs(1800)
            }
        );
    }
}
