//! Wall-clock abstraction for gating decisions.
//!
//! The scheduler only needs to know what time of day it is; delays are driven
//! by the async runtime's own timer. Keeping the wall clock behind a trait lets
//! `--at` rehearse an evening in the middle of the afternoon and lets tests pin
//! the clock to an exact minute.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use std::sync::Mutex;
use std::time::Instant;

/// Source of the current local time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Real clock shifted so that it started at a chosen instant.
///
/// Time flows at normal speed from `start`; used by `--at`.
pub struct OffsetTimeSource {
    start: DateTime<Local>,
    origin: Instant,
}

impl OffsetTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            start,
            origin: Instant::now(),
        }
    }
}

impl TimeSource for OffsetTimeSource {
    fn now(&self) -> DateTime<Local> {
        let elapsed = ChronoDuration::from_std(self.origin.elapsed()).unwrap_or_default();
        self.start + elapsed
    }
}

/// A clock that only moves when told to.
pub struct ManualTimeSource {
    current: Mutex<DateTime<Local>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Convenience constructor from a `YYYY-MM-DD HH:MM:SS` string.
    pub fn at(s: &str) -> Result<Self, String> {
        parse_datetime(s).map(Self::new)
    }

    pub fn set(&self, time: DateTime<Local>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" as local time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;

    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}
