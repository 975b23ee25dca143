//! Human-friendly due dates resolved to TickTick timestamps.
//!
//! TickTick expects due dates as UTC instants rendered with a literal `+0000`
//! suffix (e.g. `2025-01-15T14:59:59.000+0000`). Every relative or calendar
//! form resolves to 23:59:59.000 local time on the target day.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::{Error, Result};

/// Calendar date format accepted on the command line
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for timestamps sent to TickTick. `+0000` is a literal suffix.
pub const TICKTICK_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f+0000";

/// Format in which TickTick returns timestamps (numeric offset without colon)
const TICKTICK_RESPONSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Upper bound on how far past a skipped local time we search for the next one
const MAX_GAP_MINUTES: u32 = 48 * 60;

/// Resolve a date expression relative to the current local time.
///
/// See [`resolve_date_at`] for the accepted forms.
pub fn resolve_date(expr: &str) -> Result<String> {
    resolve_date_at(expr, &Local::now())
}

/// Resolve a date expression relative to `now`.
///
/// Accepted forms, in precedence order:
/// * `today` / `tomorrow` (any case)
/// * `+Nd` with `N` a non-negative decimal integer
/// * `YYYY-MM-DD`
/// * an RFC 3339 timestamp, returned unchanged
///
/// # Arguments
/// * `expr` - The user-supplied expression
/// * `now` - Reference instant; its time zone defines "local" end-of-day
///
/// # Returns
/// * `Result<String>` - Timestamp in [`TICKTICK_TIMESTAMP_FORMAT`], or `InvalidDate`
pub fn resolve_date_at<Tz: TimeZone>(expr: &str, now: &DateTime<Tz>) -> Result<String> {
    let invalid = || Error::InvalidDate(expr.to_string());
    let tz = now.timezone();
    let today = now.date_naive();

    match expr.to_ascii_lowercase().as_str() {
        "today" => return end_of_day(&tz, today).ok_or_else(invalid),
        "tomorrow" => {
            return today
                .checked_add_days(Days::new(1))
                .and_then(|day| end_of_day(&tz, day))
                .ok_or_else(invalid);
        }
        _ => {}
    }

    if let Some(days) = expr.strip_prefix('+').and_then(|rest| rest.strip_suffix('d')) {
        if days.is_empty() || !days.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let days: u64 = days.parse().map_err(|_| invalid())?;
        return today
            .checked_add_days(Days::new(days))
            .and_then(|day| end_of_day(&tz, day))
            .ok_or_else(invalid);
    }

    if let Some(day) = parse_calendar_date(expr) {
        return end_of_day(&tz, day).ok_or_else(invalid);
    }

    if is_strict_rfc3339(expr) {
        return Ok(expr.to_string());
    }

    Err(invalid())
}

/// Render 23:59:59.000 on `day` in `tz` as a TickTick timestamp.
///
/// When that wall-clock time falls in a gap (a DST jump or a zone shift), the
/// first local time after the gap is used instead.
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<String> {
    let local = day.and_hms_milli_opt(23, 59, 59, 0)?;
    let instant = match tz.from_local_datetime(&local).earliest() {
        Some(instant) => instant,
        None => first_after_gap(tz, local)?,
    };
    Some(instant.with_timezone(&Utc).format(TICKTICK_TIMESTAMP_FORMAT).to_string())
}

/// Walk forward minute by minute from a skipped local time to the first one
/// that exists in `tz`.
fn first_after_gap<Tz: TimeZone>(tz: &Tz, skipped: NaiveDateTime) -> Option<DateTime<Tz>> {
    let mut probe = skipped.with_second(0)?.with_nanosecond(0)?;
    for _ in 0..MAX_GAP_MINUTES {
        probe = probe.checked_add_signed(Duration::minutes(1))?;
        if let Some(instant) = tz.from_local_datetime(&probe).earliest() {
            return Some(instant);
        }
    }
    None
}

/// RFC 3339 as Go's `time.RFC3339` layout reads it: upper-case `T` and `Z`,
/// no space separator, no leap second.
fn is_strict_rfc3339(s: &str) -> bool {
    if s.as_bytes().get(10) != Some(&b'T') || s.contains(['t', 'z']) {
        return false;
    }
    DateTime::parse_from_rfc3339(s).is_ok_and(|dt| dt.nanosecond() < 1_000_000_000)
}

/// Strict `YYYY-MM-DD`: four-digit year, two-digit month and day.
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Local calendar day of a timestamp returned by TickTick, for display.
///
/// Falls back to the first ten characters when the value cannot be parsed.
pub fn display_day(timestamp: &str) -> String {
    let parsed = DateTime::parse_from_str(timestamp, TICKTICK_RESPONSE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(timestamp));

    match parsed {
        Ok(dt) => format_ymd(dt.with_timezone(&Local).date_naive()),
        Err(_) => timestamp.get(..10).unwrap_or(timestamp).to_string(),
    }
}
