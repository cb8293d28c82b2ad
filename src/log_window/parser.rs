use std::sync::LazyLock;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

/// Every log timestamp is read in this zone; the bracketed offset in the
/// line itself is matched but ignored.
pub const LOG_TIME_ZONE: Tz = chrono_tz::Europe::Moscow;

/// Month abbreviations in calendar order, matched case-sensitively.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `ip - [DD/Mon/YYYY:HH:MM:SS +ZZZZ] "request" status latency ...`
///
/// One or two tokens may sit between the address and the bracket so the
/// combined format (`ip - user [...]`) matches too. Anything after the
/// latency field is ignored.
static ACCESS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[0-9.]+\s(?:\S+\s){1,2}\[",
        r"(?P<day>\d{2})/(?P<month>[a-zA-Z]+)/(?P<year>\d{4})",
        r":(?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})",
        r"\s[-+0-9]+\]\s",
        r#"(?P<request>".*?")\s"#,
        r"(?P<status>\d+)\s",
        r"(?P<latency>[0-9.]+)",
    ))
    .expect("access line pattern compiles")
});

/// One access-log line reduced to what the percentile pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub timestamp: DateTime<Tz>,
    /// Request processing time in seconds.
    pub latency: f64,
}

/// Parses one line, or returns `None` when it does not look like an
/// access record. Never fails loudly: foreign lines are routine.
pub fn parse_line(line: &str) -> Option<ParsedRecord> {
    let caps = ACCESS_LINE.captures(line)?;

    let month = month_number(&caps["month"])?;
    let year: i32 = caps["year"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps["second"].parse().ok()?;

    let timestamp = log_timestamp(year, month, day, hour, minute, second)?;

    // The pattern admits things like "1.2.3"; those count as zero.
    let latency = caps["latency"].parse().unwrap_or(0.0);

    Some(ParsedRecord { timestamp, latency })
}

/// Resolves the wall-clock fields in `LOG_TIME_ZONE` the lenient way:
/// out-of-range days and clock fields carry into the next unit
/// (`31/Feb` is early March, hour `25` is the next day), an ambiguous
/// local time takes the earlier instant, and a time inside a DST gap is
/// read with the offset in force before the jump.
fn log_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<DateTime<Tz>> {
    let local = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN)
        + Duration::days(i64::from(day) - 1)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
        + Duration::seconds(i64::from(second));

    match LOG_TIME_ZONE.from_local_datetime(&local) {
        LocalResult::Single(timestamp) => Some(timestamp),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = LOG_TIME_ZONE
                .offset_from_local_datetime(&(local - Duration::days(1)))
                .earliest()?;
            let utc = local - Duration::seconds(i64::from(before.fix().local_minus_utc()));
            Some(LOG_TIME_ZONE.from_utc_datetime(&utc))
        }
    }
}

/// 1-based month number for a three-letter English abbreviation.
fn month_number(abbrev: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == abbrev)
        .map(|idx| idx as u32 + 1)
}
