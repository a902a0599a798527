//! FILETIME handling: the raw 64-bit tick count is authoritative on the
//! wire; conversions to unix seconds and [`chrono`] types are views.

use std::fmt;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Seconds between 1601-01-01 and 1970-01-01 as the reference
/// implementation computes them: 369 years of 31 556 926 seconds each.
/// This is an approximation (the exact distance is 11 644 473 600 s), kept
/// verbatim so second-level conversions agree with that implementation.
pub const EPOCH_SHIFT_SECONDS: i64 = (1970 - 1601) * 31_556_926;

const TICKS_PER_SECOND: u64 = 10_000_000;

/// A 64-bit count of 100-nanosecond intervals since 1601-01-01 UTC.
/// Zero means no time is set on the link target.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FileTime(u64);

impl FileTime {
    /// The raw tick count, exactly as stored on disk.
    pub fn ticks(&self) -> u64 {
        self.0
    }

    /// Whether this is the "no time set" marker.
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// Seconds since the unix epoch, using the reference epoch shift.
    pub fn to_unix_seconds(&self) -> i64 {
        ticks_to_utc_seconds(self.0)
    }

    /// Build a `FileTime` from seconds since the unix epoch.
    pub fn from_unix_seconds(seconds: i64) -> Self {
        Self(utc_seconds_to_ticks(seconds))
    }

    /// A calendar view of the timestamp; `None` when unset or out of the
    /// range `chrono` can represent.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        if self.is_unset() {
            return None;
        }
        let subsec_nanos = (self.0 % TICKS_PER_SECOND) as u32 * 100;
        DateTime::from_timestamp(self.to_unix_seconds(), subsec_nanos)
    }
}

impl fmt::Debug for FileTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datetime() {
            Some(datetime) => write!(f, "FileTime({datetime})"),
            None => write!(f, "FileTime({} ticks)", self.0),
        }
    }
}

impl From<u64> for FileTime {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

impl From<FileTime> for u64 {
    fn from(val: FileTime) -> Self {
        val.0
    }
}

/// Whole seconds since the unix epoch for a tick count, shifted by
/// [`EPOCH_SHIFT_SECONDS`]. Sub-second ticks are discarded.
pub fn ticks_to_utc_seconds(ticks: u64) -> i64 {
    (ticks / TICKS_PER_SECOND) as i64 - EPOCH_SHIFT_SECONDS
}

/// Tick count for a unix-epoch second value. Instants before the 1601
/// epoch are clamped to zero ticks.
pub fn utc_seconds_to_ticks(seconds: i64) -> u64 {
    u64::try_from(seconds + EPOCH_SHIFT_SECONDS).unwrap_or(0) * TICKS_PER_SECOND
}
