//! Sunrise and sunset computation.
//!
//! A [`SolarModel`] turns a calendar date and the local UTC offset into a
//! [`DayWindow`]: the minute of sunrise and the minute of sunset, both in
//! local time. Two models exist: the astronomical one driven by latitude and
//! longitude, and a fixed manual schedule.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};
use thiserror::Error;

/// Why a day's window could not be produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolarComputationError {
    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("the sun does not rise on {date} at latitude {latitude:.2}° (polar night)")]
    PolarNight { date: NaiveDate, latitude: f64 },

    #[error("the sun does not set on {date} at latitude {latitude:.2}° (polar day)")]
    PolarDay { date: NaiveDate, latitude: f64 },

    #[error("solar calculation for {date} produced an event on {event_date}")]
    EventOutOfRange {
        date: NaiveDate,
        event_date: NaiveDate,
    },
}

/// Daylight boundaries of one day, in local time.
///
/// Nothing forces `sunrise <= sunset`; a manual schedule may invert them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

impl DayWindow {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self { sunrise, sunset }
    }

    /// Build from `HH:MM` pairs. Returns `None` for out-of-range values.
    pub fn from_hm(sunrise: (u32, u32), sunset: (u32, u32)) -> Option<Self> {
        Some(Self {
            sunrise: NaiveTime::from_hms_opt(sunrise.0, sunrise.1, 0)?,
            sunset: NaiveTime::from_hms_opt(sunset.0, sunset.1, 0)?,
        })
    }

    /// Minutes since local midnight (0-1439).
    pub fn sunrise_minutes(&self) -> u32 {
        self.sunrise.hour() * 60 + self.sunrise.minute()
    }

    /// Minutes since local midnight (0-1439).
    pub fn sunset_minutes(&self) -> u32 {
        self.sunset.hour() * 60 + self.sunset.minute()
    }
}

/// Produces the daylight window for a given day.
pub trait SolarModel: Send + Sync {
    fn compute(
        &self,
        date: NaiveDate,
        utc_offset: FixedOffset,
    ) -> Result<DayWindow, SolarComputationError>;

    /// One-line human description for logs.
    fn describe(&self) -> String;
}

/// Sunrise/sunset from the observer's position.
#[derive(Debug, Clone, Copy)]
pub struct Astronomical {
    pub latitude: f64,
    pub longitude: f64,
}

impl Astronomical {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SolarComputationError> {
        if sunrise::Coordinates::new(latitude, longitude).is_none() {
            return Err(SolarComputationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl SolarModel for Astronomical {
    fn compute(
        &self,
        date: NaiveDate,
        utc_offset: FixedOffset,
    ) -> Result<DayWindow, SolarComputationError> {
        use sunrise::{Coordinates, SolarDay, SolarEvent};

        let coord = Coordinates::new(self.latitude, self.longitude).ok_or(
            SolarComputationError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            },
        )?;

        if let Some(err) = polar_condition(self.latitude, date) {
            return Err(err);
        }

        let solar_day = SolarDay::new(coord, date);
        let sunrise_utc: DateTime<Utc> = solar_day.event_time(SolarEvent::Sunrise);
        let sunset_utc: DateTime<Utc> = solar_day.event_time(SolarEvent::Sunset);

        let sunrise_local = sunrise_utc.with_timezone(&utc_offset);
        let sunset_local = sunset_utc.with_timezone(&utc_offset);

        // Close to the polar circles the approximation above can miss; the
        // library then yields an event nowhere near the requested day.
        for event in [sunrise_local, sunset_local] {
            let event_date = event.date_naive();
            if (event_date - date).num_days().abs() > 1 {
                return Err(SolarComputationError::EventOutOfRange { date, event_date });
            }
        }

        Ok(DayWindow {
            sunrise: sunrise_local.time(),
            sunset: sunset_local.time(),
        })
    }

    fn describe(&self) -> String {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        format!(
            "geo {:.4}°{}, {:.4}°{}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        )
    }
}

/// Detect days on which the sun never crosses the horizon.
///
/// Uses the standard refraction-corrected altitude of -0.833° and Cooper's
/// approximation of the solar declination.
fn polar_condition(latitude: f64, date: NaiveDate) -> Option<SolarComputationError> {
    let day_of_year = date.ordinal() as f64;
    let declination =
        23.44_f64.to_radians() * ((360.0 / 365.0) * (284.0 + day_of_year)).to_radians().sin();
    let lat = latitude.to_radians();
    let altitude = (-0.833_f64).to_radians();

    let cos_hour_angle =
        (altitude.sin() - lat.sin() * declination.sin()) / (lat.cos() * declination.cos());

    if cos_hour_angle > 1.0 {
        Some(SolarComputationError::PolarNight { date, latitude })
    } else if cos_hour_angle < -1.0 {
        Some(SolarComputationError::PolarDay { date, latitude })
    } else {
        None
    }
}

/// Fixed daylight window, identical every day.
#[derive(Debug, Clone, Copy)]
pub struct ManualSchedule {
    pub window: DayWindow,
}

impl ManualSchedule {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self {
            window: DayWindow::new(sunrise, sunset),
        }
    }
}

impl SolarModel for ManualSchedule {
    fn compute(
        &self,
        _date: NaiveDate,
        _utc_offset: FixedOffset,
    ) -> Result<DayWindow, SolarComputationError> {
        Ok(self.window)
    }

    fn describe(&self) -> String {
        format!(
            "manual {} - {}",
            self.window.sunrise.format("%H:%M"),
            self.window.sunset.format("%H:%M")
        )
    }
}

/// UTC offset in fractional hours, as the window records it.
pub fn offset_hours(offset: FixedOffset) -> f64 {
    offset.local_minus_utc() as f64 / 3600.0
}
