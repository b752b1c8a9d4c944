use chrono::NaiveTime;
use pilight::geo::DayWindow;
use pilight::light::{LightPlan, plan_light};
use proptest::prelude::*;
use std::time::Duration;

/// Start of the request, minutes since midnight
fn minute_strategy() -> impl Strategy<Value = u32> {
    0u32..1440
}

/// Up to a little over two days
fn duration_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![0u64..120, 0u64..200_000]
}

/// Windows with sunrise before noon and sunset after it
fn window_strategy() -> impl Strategy<Value = DayWindow> {
    (0u32..720, 720u32..1440).prop_map(|(rise, set)| {
        DayWindow::new(
            NaiveTime::from_hms_opt(rise / 60, rise % 60, 0).unwrap(),
            NaiveTime::from_hms_opt(set / 60, set % 60, 0).unwrap(),
        )
    })
}

fn in_daylight(start: u32, duration_secs: u64, window: &DayWindow) -> bool {
    let end = u64::from(start) + duration_secs / 60;
    window.sunrise_minutes() <= start && u64::from(window.sunset_minutes()) >= end
}

proptest! {
    /// The light is never held longer than requested
    #[test]
    fn test_lit_time_never_exceeds_request(
        start in minute_strategy(),
        duration in duration_strategy(),
        window in window_strategy(),
    ) {
        let requested = Duration::from_secs(duration);
        match plan_light(start, duration, &window) {
            LightPlan::Daylight => {}
            LightPlan::Immediate { hold } => prop_assert!(hold <= requested),
            LightPlan::AfterSunset { delay, hold } => prop_assert!(delay + hold <= requested),
        }
    }

    /// A request is suppressed exactly when it lies wholly in daylight
    #[test]
    fn test_daylight_only_when_contained(
        start in minute_strategy(),
        duration in duration_strategy(),
        window in window_strategy(),
    ) {
        let plan = plan_light(start, duration, &window);
        prop_assert_eq!(plan == LightPlan::Daylight, in_daylight(start, duration, &window));
    }

    /// A deferred request switches on exactly at sunset
    #[test]
    fn test_deferred_requests_start_at_sunset(
        start in minute_strategy(),
        duration in duration_strategy(),
        window in window_strategy(),
    ) {
        if let LightPlan::AfterSunset { delay, hold } = plan_light(start, duration, &window) {
            prop_assert_eq!(start + (delay.as_secs() / 60) as u32, window.sunset_minutes());
            prop_assert!(delay > Duration::ZERO);
            prop_assert!(hold > Duration::ZERO);
        }
    }

    /// A truncated request switches off exactly at sunrise
    #[test]
    fn test_truncated_requests_end_at_sunrise(
        start in minute_strategy(),
        duration in duration_strategy(),
        window in window_strategy(),
    ) {
        if let LightPlan::Immediate { hold } = plan_light(start, duration, &window) {
            if hold != Duration::from_secs(duration) {
                prop_assert!(start < window.sunrise_minutes());
                prop_assert_eq!(start + (hold.as_secs() / 60) as u32, window.sunrise_minutes());
            }
        }
    }

    /// Requests shorter than a minute are all or nothing
    #[test]
    fn test_sub_minute_requests(
        start in minute_strategy(),
        duration in 0u64..60,
        window in window_strategy(),
    ) {
        let expected = if in_daylight(start, duration, &window) {
            LightPlan::Daylight
        } else {
            LightPlan::Immediate { hold: Duration::from_secs(duration) }
        };
        prop_assert_eq!(plan_light(start, duration, &window), expected);
    }
}
