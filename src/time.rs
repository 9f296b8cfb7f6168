//! Conversion of board-local wall-clock fragments into UTC instants.
//!
//! Boards report a journey date as `YYYYMMDD` and departure times as
//! `HHMMSS` in the transit region's local time. Anything that does not fit
//! those shapes becomes `None` rather than an error.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone the board's wall-clock values are expressed in.
pub const REGION_TZ: Tz = chrono_tz::Europe::Berlin;

const TIME_LEN: usize = 6;

/// Parses a board journey date (`YYYYMMDD`).
pub fn parse_journey_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
}

/// Parses an `HHMMSS` time of day.
///
/// Fields are read the way `strptime("%H%M%S")` reads them: each field
/// takes two digits when they are in range, otherwise one, and the first
/// combination that fits all three fields must use the whole string. So
/// `13000` is 13:00:00 and `93000` is 09:30:00. Values longer than six
/// characters, non-digits and out-of-range fields (hour 24 and up
/// included) yield `None`.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    if raw.is_empty() || raw.len() > TIME_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = raw.as_bytes();
    let (h, m, s) = split_fields(digits)?;
    if h + m + s != digits.len() {
        return None;
    }

    let value = |from: usize, width: usize| raw[from..from + width].parse::<u32>().ok();
    NaiveTime::from_hms_opt(value(0, h)?, value(h, m)?, value(h + m, s)?)
}

/// Widths of the first hour/minute/second split that matches at all.
fn split_fields(digits: &[u8]) -> Option<(usize, usize, usize)> {
    for h in field_widths(digits, 23) {
        let rest = &digits[h..];
        for m in field_widths(rest, 59) {
            if let Some(s) = field_widths(&rest[m..], 61).next() {
                return Some((h, m, s));
            }
        }
    }
    None
}

/// Candidate widths of a numeric field at the start of `digits`, two-digit
/// reading first when it does not exceed `max`.
fn field_widths(digits: &[u8], max: u32) -> impl Iterator<Item = usize> {
    let two = digits.len() >= 2
        && u32::from(digits[0] - b'0') * 10 + u32::from(digits[1] - b'0') <= max;
    [two.then_some(2), (!digits.is_empty()).then_some(1)]
        .into_iter()
        .flatten()
}

/// Combines `date` and a raw board time into an absolute UTC instant.
pub fn normalize(date: NaiveDate, raw: Option<&str>, tz: Tz) -> Option<DateTime<Utc>> {
    let time = parse_time_of_day(raw?)?;
    localize(date.and_time(time), tz)
}

/// Resolves a local wall-clock value in `tz` to UTC.
///
/// Ambiguous values (autumn fall-back) resolve to standard time. Values
/// inside the spring-forward gap keep the offset in force before the gap.
fn localize(local: chrono::NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, standard) => Some(standard.with_timezone(&Utc)),
        LocalResult::None => {
            let before_gap = tz
                .offset_from_local_datetime(&(local - Duration::hours(1)))
                .earliest()?;
            let offset = Duration::seconds(before_gap.fix().local_minus_utc() as i64);
            Some(Utc.from_utc_datetime(&(local - offset)))
        }
    }
}
