//! Time source and calendar helpers.
//!
//! # Responsibility
//! - Provide an injectable clock so services stay deterministic under test.
//! - Convert epoch milliseconds to calendar days/months and ISO-8601 text.
//!
//! # Invariants
//! - All stored timestamps are Unix epoch milliseconds.
//! - Calendar cuts use a fixed UTC offset supplied by configuration.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, SecondsFormat, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// One calendar day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current Unix time in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Builds a fixed offset, falling back to UTC for out-of-range values.
pub fn fixed_offset(utc_offset_minutes: i32) -> FixedOffset {
    utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Calendar date of `epoch_ms` in the given offset.
pub fn calendar_day(epoch_ms: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(epoch_ms).map(|utc| utc.with_timezone(&offset).date_naive())
}

/// Formats `epoch_ms` like `Date.prototype.toISOString`: UTC, millis, `Z`.
pub fn to_iso8601(epoch_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|utc| utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Epoch milliseconds of local midnight starting `date`.
pub fn start_of_day_ms(date: NaiveDate, offset: FixedOffset) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|local| local.timestamp_millis())
}

/// First and last millisecond of the given month in `offset`.
pub fn month_bounds_ms(year: i32, month: u32, offset: FixedOffset) -> Option<(i64, i64)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let start = start_of_day_ms(first, offset)?;
    let end = start_of_day_ms(next, offset)? - 1;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-10-16T10:30:00Z
    const OCT_16_MORNING: i64 = 1_792_146_600_000;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn iso_format_matches_js_shape() {
        assert_eq!(
            to_iso8601(OCT_16_MORNING).as_deref(),
            Some("2026-10-16T10:30:00.000Z")
        );
    }

    #[test]
    fn calendar_day_respects_offset() {
        let utc = fixed_offset(0);
        let tokyo = fixed_offset(9 * 60);
        assert_eq!(
            calendar_day(OCT_16_MORNING, utc),
            NaiveDate::from_ymd_opt(2026, 10, 16)
        );
        assert_eq!(
            calendar_day(OCT_16_MORNING, tokyo),
            NaiveDate::from_ymd_opt(2026, 10, 16)
        );
        let west = fixed_offset(-11 * 60);
        assert_eq!(
            calendar_day(OCT_16_MORNING, west),
            NaiveDate::from_ymd_opt(2026, 10, 15)
        );
    }

    #[test]
    fn fixed_offset_falls_back_to_utc_when_out_of_range() {
        assert_eq!(fixed_offset(i32::MAX).local_minus_utc(), 0);
        assert_eq!(fixed_offset(i32::MIN).local_minus_utc(), 0);
        assert_eq!(fixed_offset(40_000_000).local_minus_utc(), 0);
        assert_eq!(fixed_offset(24 * 60).local_minus_utc(), 0);
        assert_eq!(fixed_offset(-90).local_minus_utc(), -90 * 60);
    }

    #[test]
    fn month_bounds_cover_whole_month() {
        let (start, end) = month_bounds_ms(2026, 2, fixed_offset(0)).unwrap();
        assert_eq!(to_iso8601(start).as_deref(), Some("2026-02-01T00:00:00.000Z"));
        assert_eq!(to_iso8601(end).as_deref(), Some("2026-02-28T23:59:59.999Z"));

        let (_, december_end) = month_bounds_ms(2026, 12, fixed_offset(0)).unwrap();
        assert_eq!(
            to_iso8601(december_end).as_deref(),
            Some("2026-12-31T23:59:59.999Z")
        );
        assert!(month_bounds_ms(2026, 13, fixed_offset(0)).is_none());
    }
}
