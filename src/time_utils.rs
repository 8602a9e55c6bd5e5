// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and calendar arithmetic.

use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an "HH:MM" clock time into minutes since midnight.
///
/// Returns `None` for anything that is not a valid 24-hour clock time.
pub fn parse_clock_time(raw: &str) -> Option<u32> {
    let (hours, minutes) = raw.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Minutes since midnight for a timestamp.
pub fn minutes_of_day(at: DateTime<Utc>) -> u32 {
    at.hour() * 60 + at.minute()
}

/// Whether `current` falls inside a quiet-hours window.
///
/// When `start > end` the window spans midnight, so suppression holds when
/// `current >= start` or `current <= end`. Otherwise suppression holds when
/// `start <= current <= end`. All three values are minutes since midnight.
pub fn in_clock_window(current: u32, start: u32, end: u32) -> bool {
    if start > end {
        current >= start || current <= end
    } else {
        current >= start && current <= end
    }
}

/// Signed ceiling day-distance from `now` to `due`.
///
/// A task due 23 hours from now is 1 day away; a task due exactly 24 hours
/// out is also 1 day away. The ceiling is taken over whole seconds.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_div(due.signed_duration_since(now).num_seconds(), SECONDS_PER_DAY)
}

/// Ceiling day-count by which `due` lies in the past.
///
/// A task due 2 hours ago is overdue by 1 day; 25 hours ago is 2 days.
pub fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_div(now.signed_duration_since(due).num_seconds(), SECONDS_PER_DAY)
}

/// Whether two timestamps fall on the same UTC calendar date.
pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Whether `earlier` falls on the calendar date immediately before `later`.
pub fn is_previous_calendar_day(earlier: DateTime<Utc>, later: DateTime<Utc>) -> bool {
    later
        .date_naive()
        .pred_opt()
        .map(|yesterday| earlier.date_naive() == yesterday)
        .unwrap_or(false)
}

/// Whether two timestamps fall in the same ISO week.
pub fn same_iso_week(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.iso_week() == b.iso_week()
}

/// Whether two timestamps fall in the same calendar month.
pub fn same_calendar_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Ceiling division for a signed numerator and positive denominator.
fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator > 0 {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("valid RFC3339 timestamp")
    }

    #[test]
    fn parse_clock_time_accepts_valid_times() {
        assert_eq!(parse_clock_time("00:00"), Some(0));
        assert_eq!(parse_clock_time("07:30"), Some(450));
        assert_eq!(parse_clock_time("23:59"), Some(1439));
    }

    #[test]
    fn parse_clock_time_rejects_invalid_times() {
        assert_eq!(parse_clock_time("24:00"), None);
        assert_eq!(parse_clock_time("12:60"), None);
        assert_eq!(parse_clock_time("9:00"), None);
        assert_eq!(parse_clock_time("nope"), None);
        assert_eq!(parse_clock_time(""), None);
    }

    #[test]
    fn clock_window_spanning_midnight() {
        let start = parse_clock_time("22:00").unwrap();
        let end = parse_clock_time("07:00").unwrap();

        assert!(in_clock_window(parse_clock_time("23:30").unwrap(), start, end));
        assert!(in_clock_window(parse_clock_time("02:00").unwrap(), start, end));
        assert!(!in_clock_window(parse_clock_time("12:00").unwrap(), start, end));
    }

    #[test]
    fn clock_window_same_day() {
        let start = parse_clock_time("09:00").unwrap();
        let end = parse_clock_time("17:00").unwrap();

        assert!(in_clock_window(parse_clock_time("09:00").unwrap(), start, end));
        assert!(in_clock_window(parse_clock_time("12:00").unwrap(), start, end));
        assert!(in_clock_window(parse_clock_time("17:00").unwrap(), start, end));
        assert!(!in_clock_window(parse_clock_time("08:59").unwrap(), start, end));
        assert!(!in_clock_window(parse_clock_time("17:01").unwrap(), start, end));
    }

    #[test]
    fn days_until_rounds_up() {
        let now = at("2026-08-25T12:00:00Z");

        // 23 hours out rounds up to a full day.
        assert_eq!(days_until(now + Duration::hours(23), now), 1);
        // Exactly one day stays one day.
        assert_eq!(days_until(now + Duration::hours(24), now), 1);
        // A minute past one day becomes two.
        assert_eq!(
            days_until(now + Duration::hours(24) + Duration::minutes(1), now),
            2
        );
        // Due right now is zero.
        assert_eq!(days_until(now, now), 0);
    }

    #[test]
    fn days_overdue_rounds_up() {
        let now = at("2026-08-25T12:00:00Z");

        // The ceiling boundary: 2 hours late is already "1 day overdue".
        assert_eq!(days_overdue(now - Duration::hours(2), now), 1);
        assert_eq!(days_overdue(now - Duration::hours(24), now), 1);
        assert_eq!(days_overdue(now - Duration::hours(25), now), 2);
    }

    #[test]
    fn calendar_day_helpers() {
        let morning = at("2026-08-25T01:00:00Z");
        let evening = at("2026-08-25T23:30:00Z");
        let next_day = at("2026-08-26T00:30:00Z");

        assert!(same_calendar_day(morning, evening));
        assert!(!same_calendar_day(evening, next_day));
        assert!(is_previous_calendar_day(evening, next_day));
        assert!(!is_previous_calendar_day(morning, evening));
    }

    #[test]
    fn week_and_month_windows() {
        // 2026-08-24 is a Monday; the ISO week runs through Sunday 2026-08-30.
        let monday = at("2026-08-24T10:00:00Z");
        let sunday = at("2026-08-30T10:00:00Z");
        let next_monday = at("2026-08-31T10:00:00Z");

        assert!(same_iso_week(monday, sunday));
        assert!(!same_iso_week(sunday, next_monday));
        assert!(same_calendar_month(monday, next_monday));
        assert!(!same_calendar_month(monday, at("2026-09-01T00:00:00Z")));
    }
}
