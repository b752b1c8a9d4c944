//! Per-day cache of the daylight window.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset};
use std::sync::Mutex;

use super::solar::{DayWindow, SolarComputationError, SolarModel, offset_hours};

/// Today's window together with the day it is valid for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedWindow {
    pub date: NaiveDate,
    pub utc_offset_hours: f64,
    pub window: DayWindow,
}

/// Lazily recomputed daylight window.
///
/// The window is computed at most once per local calendar date. Refreshes are
/// serialized by an internal lock, so concurrent triggers around midnight
/// compute the new day exactly once.
///
/// A failed computation leaves the cache on the previous date. That stale
/// window is never handed out: [`SolarWindow::refresh`] keeps returning the
/// error and retries on every call until the model succeeds.
pub struct SolarWindow {
    model: Box<dyn SolarModel>,
    cache: Mutex<Option<CachedWindow>>,
}

impl SolarWindow {
    /// Create the window and compute it for `now`.
    ///
    /// Fails if the model cannot produce today's window; the daemon treats
    /// that as fatal.
    pub fn new(
        model: Box<dyn SolarModel>,
        now: DateTime<Local>,
    ) -> Result<Self, SolarComputationError> {
        let window = Self {
            model,
            cache: Mutex::new(None),
        };
        window.refresh(now)?;
        Ok(window)
    }

    /// Return the window for `now`'s date, recomputing it on date change.
    pub fn refresh(&self, now: DateTime<Local>) -> Result<DayWindow, SolarComputationError> {
        let date = now.date_naive();
        let utc_offset: FixedOffset = now.offset().fix();

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(cached) = cache.as_ref()
            && cached.date == date
        {
            return Ok(cached.window);
        }

        match self.model.compute(date, utc_offset) {
            Ok(window) => {
                let previous = cache.replace(CachedWindow {
                    date,
                    utc_offset_hours: offset_hours(utc_offset),
                    window,
                });
                log_solar_refresh(date, &window, previous.is_some());
                Ok(window)
            }
            Err(e) => {
                log_warning!("Could not compute daylight window for {date}: {e}");
                Err(e)
            }
        }
    }

    /// The most recently computed window, if any.
    ///
    /// May belong to an earlier date when today's refresh has failed.
    pub fn cached(&self) -> Option<CachedWindow> {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn describe(&self) -> String {
        self.model.describe()
    }
}

fn log_solar_refresh(date: NaiveDate, window: &DayWindow, rollover: bool) {
    if rollover {
        log_block_start!("New day {date}, daylight window recomputed");
    } else {
        log_block_start!("Daylight window for {date}");
    }
    log_indented!("Sunrise: {}", window.sunrise.format("%H:%M:%S"));
    log_indented!("Sunset:  {}", window.sunset.format("%H:%M:%S"));
}
