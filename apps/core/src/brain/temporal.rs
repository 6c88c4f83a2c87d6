//! Temporal expression parsing.
//!
//! Resolves relative dates, clock times, durations and daily-hour budgets
//! from natural language. All functions are pure; "today" is always passed
//! in so results are reproducible.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static IN_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin\s+(\d+)\s+days?\b").expect("Invalid regex: in-days"));

static IN_WEEKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin\s+(\d+)\s+weeks?\b").expect("Invalid regex: in-weeks"));

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("Invalid regex: weekday names")
});

// Clock times: "at 3", "at 3:30pm", "15:00", "7pm". An explicit marker
// ("at", a colon, or am/pm) is required so bare numbers in phrases like
// "in 3 days" are not mistaken for times.
static AT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bat\s+(\d{1,2})(?::(\d{2}))?\s*([ap]\.?m\.?)?\b")
        .expect("Invalid regex: at-time")
});

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("Invalid regex: clock-time"));

static MERIDIEM_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*([ap]\.?m\.?)\b").expect("Invalid regex: meridiem-time")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+(\d+)\s*(hours?|hrs?|minutes?|mins?)\b")
        .expect("Invalid regex: duration")
});

static DAILY_HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*hours?\s*(?:per\s+day|daily|each\s+day|a\s+day)\b")
        .expect("Invalid regex: daily-hours")
});

/// Resolves the date a text refers to, defaulting to `today`.
pub fn resolve_date(text: &str, today: NaiveDate) -> NaiveDate {
    let lower = text.to_lowercase();

    if lower.contains("today") {
        return today;
    }
    if lower.contains("tomorrow") {
        return today + Duration::days(1);
    }
    if lower.contains("next week") {
        return today + Duration::days(7);
    }
    if let Some(caps) = IN_DAYS.captures(&lower) {
        if let Ok(days) = caps[1].parse::<i64>() {
            return today + Duration::days(days);
        }
    }
    if let Some(caps) = WEEKDAY.captures(&lower) {
        return next_weekday(today, &caps[1]);
    }

    today
}

/// Extracts a study deadline, if the text mentions one.
///
/// "exam"/"test" without an explicit date default to one week out.
pub fn parse_deadline(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.to_lowercase();

    if lower.contains("next week") {
        return Some(today + Duration::days(7));
    }
    if lower.contains("two weeks") {
        return Some(today + Duration::days(14));
    }
    if let Some(caps) = IN_DAYS.captures(&lower) {
        if let Ok(days) = caps[1].parse::<i64>() {
            return Some(today + Duration::days(days));
        }
    }
    if let Some(caps) = IN_WEEKS.captures(&lower) {
        if let Ok(weeks) = caps[1].parse::<i64>() {
            return Some(today + Duration::weeks(weeks));
        }
    }
    if lower.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }
    if let Some(caps) = WEEKDAY.captures(&lower) {
        return Some(next_weekday(today, &caps[1]));
    }
    if lower.contains("exam") || lower.contains("test") {
        return Some(today + Duration::days(7));
    }

    None
}

/// Extracts a clock time from the text, if present.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    if let Some(caps) = AT_TIME.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let meridiem = caps.get(3).map(|m| m.as_str().to_lowercase());
        return build_time(hour, minute, meridiem.as_deref());
    }
    if let Some(caps) = MERIDIEM_TIME.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let meridiem = caps[2].to_lowercase();
        return build_time(hour, 0, Some(&meridiem));
    }
    if let Some(caps) = CLOCK_TIME.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return build_time(hour, minute, None);
    }

    None
}

/// Extracts an event duration in minutes ("for 2 hours", "for 45 minutes").
pub fn parse_duration_minutes(text: &str) -> Option<i64> {
    let caps = DURATION.captures(text)?;
    let amount: i64 = caps[1].parse().ok()?;
    let unit = caps[2].to_lowercase();

    if unit.starts_with("hour") || unit.starts_with("hr") {
        Some(amount * 60)
    } else {
        Some(amount)
    }
}

/// Extracts a daily study-hour budget ("3 hours per day").
pub fn parse_daily_hours(text: &str) -> Option<f64> {
    let caps = DAILY_HOURS.captures(text)?;
    caps[1].parse::<f64>().ok()
}

fn build_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem {
        Some(m) if m.starts_with('p') && hour != 12 => hour + 12,
        Some(m) if m.starts_with('a') && hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Returns the next occurrence of the named weekday, at least one day out.
fn next_weekday(today: NaiveDate, name: &str) -> NaiveDate {
    let weekdays = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];
    let target = weekdays
        .iter()
        .position(|d| d.eq_ignore_ascii_case(name))
        .unwrap_or(0) as i64;
    let current = today.weekday().num_days_from_monday() as i64;
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7; // next occurrence, never today
    }
    today + Duration::days(ahead)
}
