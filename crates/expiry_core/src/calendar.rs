//! Day-granular date math used by sorting, summaries and reminders.
//!
//! # Responsibility
//! - Collapse timestamps to local midnight before any day arithmetic.
//! - Compute whole remaining days between two dates.
//! - Provide an injectable notion of "today".
//!
//! # Invariants
//! - Remaining-days helpers never panic; arithmetic failures yield `0`.
//! - Partial-day offsets never change a day difference once normalized.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use log::warn;

/// Milliseconds in one calendar day, ignoring DST transitions.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Source of the current local date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Returns `value` with its time-of-day zeroed in the local time zone.
///
/// When local midnight does not exist (DST gap), the earliest valid instant of
/// the same calendar day is returned instead.
pub fn normalize_to_day(value: DateTime<Local>) -> DateTime<Local> {
    start_of_local_day(value.date_naive()).unwrap_or(value)
}

/// Returns the first valid local instant of `date`.
pub fn start_of_local_day(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    if let Some(resolved) = Local.from_local_datetime(&midnight).earliest() {
        return Some(resolved);
    }

    // Gap days: probe forward in one-hour steps until a valid wall time exists.
    (1..=3).find_map(|hour| {
        let probe = date.and_hms_opt(hour, 0, 0)?;
        Local.from_local_datetime(&probe).earliest()
    })
}

/// Whole days between two epoch-millisecond instants, truncated toward zero.
///
/// Negative when `target_ms` lies before `reference_ms`. Returns `0` when the
/// difference overflows or does not fit in `i32`.
pub fn remaining_days_between(target_ms: i64, reference_ms: i64) -> i32 {
    let Some(delta) = target_ms.checked_sub(reference_ms) else {
        warn!("event=remaining_days module=calendar status=error error_code=overflow");
        return 0;
    };

    // Rust integer division already truncates toward zero.
    match i32::try_from(delta / DAY_MILLIS) {
        Ok(days) => days,
        Err(_) => {
            warn!("event=remaining_days module=calendar status=error error_code=out_of_range");
            0
        }
    }
}

/// Whole days from `reference` to `target`; negative when `target` is past.
pub fn remaining_days(target: NaiveDate, reference: NaiveDate) -> i32 {
    i32::try_from(target.signed_duration_since(reference).num_days()).unwrap_or_else(|_| {
        warn!("event=remaining_days module=calendar status=error error_code=out_of_range");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_to_day, remaining_days, remaining_days_between, Clock, FixedClock, DAY_MILLIS,
    };
    use chrono::{Local, NaiveDate, TimeZone, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn normalize_zeroes_time_of_day_and_keeps_date() {
        let value = Local
            .with_ymd_and_hms(2026, 3, 14, 17, 45, 12)
            .earliest()
            .expect("valid local time");
        let normalized = normalize_to_day(value);

        assert_eq!(normalized.date_naive(), date(2026, 3, 14));
        assert_eq!(normalized.minute(), 0);
        assert_eq!(normalized.second(), 0);
        assert_eq!(normalized.nanosecond(), 0);
    }

    #[test]
    fn remaining_days_between_same_instant_is_zero() {
        let now = Local::now().timestamp_millis();
        assert_eq!(remaining_days_between(now, now), 0);
    }

    #[test]
    fn remaining_days_between_counts_whole_days_both_directions() {
        let base = 1_700_000_000_000;
        assert_eq!(remaining_days_between(base + 5 * DAY_MILLIS, base), 5);
        assert_eq!(remaining_days_between(base - 3 * DAY_MILLIS, base), -3);
    }

    #[test]
    fn remaining_days_between_truncates_partial_days_toward_zero() {
        let base = 1_700_000_000_000;
        assert_eq!(remaining_days_between(base + DAY_MILLIS - 1, base), 0);
        assert_eq!(remaining_days_between(base - DAY_MILLIS + 1, base), 0);
        assert_eq!(remaining_days_between(base - DAY_MILLIS - 1, base), -1);
    }

    #[test]
    fn remaining_days_between_falls_back_to_zero_on_overflow() {
        assert_eq!(remaining_days_between(i64::MAX, i64::MIN), 0);
        assert_eq!(remaining_days_between(i64::MAX, 0), 0);
    }

    #[test]
    fn remaining_days_on_dates_matches_offsets() {
        let today = date(2026, 10, 19);
        assert_eq!(remaining_days(today, today), 0);
        assert_eq!(remaining_days(date(2026, 10, 24), today), 5);
        assert_eq!(remaining_days(date(2026, 10, 16), today), -3);
        assert_eq!(remaining_days(date(2026, 11, 2), today), 14);
    }

    #[test]
    fn fixed_clock_returns_pinned_date() {
        let clock = FixedClock(date(2026, 1, 1));
        assert_eq!(clock.today(), date(2026, 1, 1));
        assert_eq!((&clock).today(), date(2026, 1, 1));
    }
}
