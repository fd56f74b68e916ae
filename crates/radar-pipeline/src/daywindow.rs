//! Calendar-day arithmetic for ranking buckets.
//!
//! Ranking days are computed against a configured fixed offset from UTC,
//! never against server-local time, so deployments agree on day boundaries.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// A day-bucketing policy: a fixed offset from UTC, in hours.
#[derive(Debug, Clone, Copy)]
pub struct DayWindow {
    offset_hours: i32,
}

impl DayWindow {
    /// Offsets outside -23..=23 are clamped; config validation rejects them
    /// before they reach this point.
    #[must_use]
    pub fn new(offset_hours: i32) -> Self {
        Self {
            offset_hours: offset_hours.clamp(-23, 23),
        }
    }

    /// The calendar day `now` falls in under this offset.
    #[must_use]
    pub fn day_of(&self, now: DateTime<Utc>) -> NaiveDate {
        (now + Duration::hours(i64::from(self.offset_hours))).date_naive()
    }

    /// Inclusive UTC bounds `[day 00:00:00, day 23:59:59]` of a local day.
    #[must_use]
    pub fn day_range(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let offset = Duration::hours(i64::from(self.offset_hours));
        let start_local = day.and_hms_opt(0, 0, 0).unwrap_or_default();
        let end_local = day.and_hms_opt(23, 59, 59).unwrap_or_default();
        let start = Utc.from_utc_datetime(&start_local) - offset;
        let end = Utc.from_utc_datetime(&end_local) - offset;
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_day_range_spans_the_calendar_day() {
        let window = DayWindow::new(0);
        let (start, end) = window.day_range(date(2026, 8, 29));
        assert_eq!(start.to_rfc3339(), "2026-08-29T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-08-29T23:59:59+00:00");
    }

    #[test]
    fn positive_offset_shifts_bounds_earlier_in_utc() {
        // UTC+8: local midnight is 16:00 UTC of the previous day.
        let window = DayWindow::new(8);
        let (start, end) = window.day_range(date(2026, 8, 29));
        assert_eq!(start.to_rfc3339(), "2026-08-28T16:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-08-29T15:59:59+00:00");
    }

    #[test]
    fn negative_offset_shifts_bounds_later_in_utc() {
        let window = DayWindow::new(-5);
        let (start, _) = window.day_range(date(2026, 8, 29));
        assert_eq!(start.to_rfc3339(), "2026-08-29T05:00:00+00:00");
    }

    #[test]
    fn day_of_respects_offset() {
        // 2026-08-29 20:00 UTC is already the 30th in UTC+8.
        let now = "2026-08-29T20:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(DayWindow::new(0).day_of(now), date(2026, 8, 29));
        assert_eq!(DayWindow::new(8).day_of(now), date(2026, 8, 30));
        assert_eq!(DayWindow::new(-21).day_of(now), date(2026, 8, 28));
    }

    #[test]
    fn out_of_range_offset_is_clamped() {
        let window = DayWindow::new(40);
        let (start, _) = window.day_range(date(2026, 8, 29));
        assert_eq!(start.to_rfc3339(), "2026-08-28T01:00:00+00:00");
    }
}
