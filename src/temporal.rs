use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(\d{4})(?:-(\d{2})(?:-(\d{2})",
        r"(?:T(\d{2})(?::(\d{2})(?::(\d{2})(?:\.(\d+))?)?)?)?)?)?",
        r"(Z|[+-]\d{2}:?\d{2})?$",
    ))
    .expect("valid ISO-8601 pattern")
});

static GMT_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:GMT|UTC)\s*([+-]\d{4})").expect("valid offset pattern"));

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parses partial-precision ISO-8601: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`,
/// `YYYY-MM-DDTHH[:MM[:SS[.fff]]]` with an optional `Z` or `±HH:MM` zone.
///
/// Missing components default to their minimum; no zone means UTC.
pub(crate) fn parse_iso_date(input: &str) -> Option<DateTime<Utc>> {
    let caps = ISO_DATE.captures(input)?;
    let number = |index: usize, default: u32| -> Option<u32> {
        match caps.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = caps[1].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2, 1)?, number(3, 1)?)?;

    let millis = match caps.get(7) {
        Some(fraction) => {
            let digits: String = fraction.as_str().chars().chain("00".chars()).take(3).collect();
            digits.parse().ok()?
        }
        None => 0,
    };
    let naive = date.and_hms_milli_opt(number(4, 0)?, number(5, 0)?, number(6, 0)?, millis)?;

    match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => Some(Utc.from_utc_datetime(&naive)),
        Some(zone) => {
            let offset = parse_offset(zone)?;
            let local = offset.from_local_datetime(&naive).single()?;
            Some(local.with_timezone(&Utc))
        }
    }
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Best-effort free-form date parsing.
///
/// Tries ISO-8601, RFC 3339, RFC 2822 (also with `GMT+hhmm` zones) and a set
/// of common human formats such as `Dec 25, 1995` or `2012-12-18 02:50`.
/// Strings without a zone are read as UTC.
pub(crate) fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Some(date) = parse_iso_date(input) {
        return Some(date);
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Utc));
    }

    let rfc2822 = GMT_OFFSET.replace(input, "$1");
    if let Ok(date) = DateTime::parse_from_rfc2822(&rfc2822) {
        return Some(date.with_timezone(&Utc));
    }

    let human = input.replace(',', " ");
    let human = human.split_whitespace().collect::<Vec<_>>().join(" ");

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&human, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(&human, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}
