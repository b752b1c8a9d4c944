use super::*;
use crate::time_source::parse_datetime;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Timelike};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn minutes(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Model that counts computations and can be told to fail.
#[derive(Clone, Default)]
struct CountingModel {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl SolarModel for CountingModel {
    fn compute(
        &self,
        date: NaiveDate,
        _utc_offset: FixedOffset,
    ) -> Result<DayWindow, SolarComputationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SolarComputationError::PolarNight {
                date,
                latitude: 89.0,
            });
        }
        Ok(DayWindow::from_hm((6, 0), (18, 0)).unwrap())
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

#[test]
fn test_astronomical_equator_near_equinox() {
    let model = Astronomical::new(0.0, 0.0).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
    let window = model.compute(date, utc()).unwrap();

    // Roughly 06:05 and 18:10 UTC
    let sunrise = minutes(window.sunrise);
    let sunset = minutes(window.sunset);
    assert!((5 * 60 + 45..=6 * 60 + 20).contains(&sunrise), "sunrise {sunrise}");
    assert!((17 * 60 + 55..=18 * 60 + 25).contains(&sunset), "sunset {sunset}");
}

#[test]
fn test_astronomical_summer_in_prague() {
    let model = Astronomical::new(50.0755, 14.4378).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
    let cest = FixedOffset::east_opt(2 * 3600).unwrap();
    let window = model.compute(date, cest).unwrap();

    // Roughly 04:52 and 21:14 local summer time
    let sunrise = minutes(window.sunrise);
    let sunset = minutes(window.sunset);
    assert!((4 * 60 + 30..=5 * 60 + 15).contains(&sunrise), "sunrise {sunrise}");
    assert!((20 * 60 + 50..=21 * 60 + 40).contains(&sunset), "sunset {sunset}");
    assert_eq!(window.sunrise_minutes(), sunrise);
}

#[test]
fn test_astronomical_polar_cases() {
    let model = Astronomical::new(78.2232, 15.6267).unwrap();

    let winter = NaiveDate::from_ymd_opt(2026, 12, 21).unwrap();
    assert!(matches!(
        model.compute(winter, utc()),
        Err(SolarComputationError::PolarNight { .. })
    ));

    let summer = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
    assert!(matches!(
        model.compute(summer, utc()),
        Err(SolarComputationError::PolarDay { .. })
    ));
}

#[test]
fn test_invalid_coordinates() {
    assert!(matches!(
        Astronomical::new(91.0, 0.0),
        Err(SolarComputationError::InvalidCoordinates { .. })
    ));
    assert!(Astronomical::new(0.0, 181.0).is_err());
}

#[test]
fn test_manual_schedule_ignores_date() {
    let model = ManualSchedule::new(
        NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(19, 45, 0).unwrap(),
    );
    let a = model
        .compute(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), utc())
        .unwrap();
    let b = model
        .compute(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), utc())
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.sunrise_minutes(), 390);
    assert_eq!(a.sunset_minutes(), 1185);
    assert_eq!(model.describe(), "manual 06:30 - 19:45");
}

#[test]
fn test_refresh_computes_once_per_date() {
    let model = CountingModel::default();
    let calls = model.calls.clone();
    let window =
        SolarWindow::new(Box::new(model), parse_datetime("2026-10-15 08:00:00").unwrap()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    for hour in 9..24 {
        let now = parse_datetime(&format!("2026-10-15 {hour:02}:30:00")).unwrap();
        window.refresh(now).unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    window
        .refresh(parse_datetime("2026-10-16 00:01:00").unwrap())
        .unwrap();
    window
        .refresh(parse_datetime("2026-10-16 12:00:00").unwrap())
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        window.cached().unwrap().date,
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    );
}

#[test]
fn test_failed_refresh_is_retried_and_never_stale() {
    let model = CountingModel::default();
    let calls = model.calls.clone();
    let failing = model.failing.clone();
    let window =
        SolarWindow::new(Box::new(model), parse_datetime("2026-10-15 08:00:00").unwrap()).unwrap();

    failing.store(true, Ordering::SeqCst);
    let tomorrow = parse_datetime("2026-10-16 08:00:00").unwrap();
    assert!(window.refresh(tomorrow).is_err());
    assert!(window.refresh(tomorrow).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // The cache still describes yesterday
    assert_eq!(
        window.cached().unwrap().date,
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    );

    failing.store(false, Ordering::SeqCst);
    assert!(window.refresh(tomorrow).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(window.cached().unwrap().date, tomorrow.date_naive());
}

#[test]
fn test_startup_failure_is_an_error() {
    let model = CountingModel::default();
    model.failing.store(true, Ordering::SeqCst);
    let result = SolarWindow::new(Box::new(model), parse_datetime("2026-10-15 08:00:00").unwrap());
    assert!(result.is_err());
}

#[test]
fn test_model_from_config() {
    let mut config = crate::config::Config::default();
    assert_eq!(
        model_from_config(&config).unwrap().unwrap().describe(),
        "manual 06:00 - 18:00"
    );

    config.gating = Some(crate::config::GatingMode::Off);
    assert!(model_from_config(&config).unwrap().is_none());

    config.gating = Some(crate::config::GatingMode::Geo);
    assert!(model_from_config(&config).is_err());
    config.latitude = Some(50.0755);
    config.longitude = Some(14.4378);
    assert!(
        model_from_config(&config)
            .unwrap()
            .unwrap()
            .describe()
            .starts_with("geo 50.0755°N")
    );
}
