//! `logTime` CHOICE and its ordering rules.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Exactly one of the three logTime alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTime {
    /// Seconds since the Unix epoch.
    UnixTime(i64),
    /// UTCTime string as encoded, e.g. `240115103000Z`.
    UtcTime(String),
    /// GeneralizedTime string as encoded, e.g. `20240115103000Z`.
    GeneralizedTime(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogTimeError {
    #[error("unix time {0} is out of range")]
    OutOfRange(i64),

    #[error("cannot parse {variant} value '{value}'")]
    Unparseable {
        variant: &'static str,
        value: String,
    },
}

impl LogTime {
    /// Name of the populated alternative as used in the record format.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            LogTime::UnixTime(_) => "unixTime",
            LogTime::UtcTime(_) => "utcTime",
            LogTime::GeneralizedTime(_) => "generalizedTime",
        }
    }

    /// Interpret the value as an instant.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, LogTimeError> {
        match self {
            LogTime::UnixTime(secs) => {
                DateTime::from_timestamp(*secs, 0).ok_or(LogTimeError::OutOfRange(*secs))
            }
            LogTime::UtcTime(s) => parse_utc_time(s).ok_or_else(|| self.unparseable(s)),
            LogTime::GeneralizedTime(s) => {
                parse_generalized_time(s).ok_or_else(|| self.unparseable(s))
            }
        }
    }

    fn unparseable(&self, value: &str) -> LogTimeError {
        LogTimeError::Unparseable {
            variant: self.variant_name(),
            value: value.to_string(),
        }
    }

    /// Order two log times.
    ///
    /// Unix times compare numerically. Strings of the same alternative that are
    /// byte-identical are equal without parsing; everything else is compared
    /// as instants.
    pub fn compare(&self, other: &LogTime) -> Result<Ordering, LogTimeError> {
        match (self, other) {
            (LogTime::UnixTime(a), LogTime::UnixTime(b)) => Ok(a.cmp(b)),
            (LogTime::UtcTime(a), LogTime::UtcTime(b))
            | (LogTime::GeneralizedTime(a), LogTime::GeneralizedTime(b))
                if a == b =>
            {
                Ok(Ordering::Equal)
            }
            _ => Ok(self.to_datetime()?.cmp(&other.to_datetime()?)),
        }
    }
}

impl fmt::Display for LogTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTime::UnixTime(secs) => write!(f, "{secs}"),
            LogTime::UtcTime(s) | LogTime::GeneralizedTime(s) => write!(f, "{s}"),
        }
    }
}

/// UTCTime: `YYMMDDhhmm[ss](Z|+hhmm|-hhmm)`; years 50-99 map to 19xx.
fn parse_utc_time(s: &str) -> Option<DateTime<Utc>> {
    let yy = s.get(0..2)?;
    if !yy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let century = if yy >= "50" { "19" } else { "20" };
    let (body, _) = split_zone(s)?;
    // UTCTime has neither fractions nor an hour-only form
    if body.contains(['.', ',']) || (body.len() != 10 && body.len() != 12) {
        return None;
    }
    parse_generalized_time(&format!("{century}{s}"))
}

/// GeneralizedTime: `YYYYMMDDhh[mm[ss[.fff]]]` with optional `Z` or offset.
/// Local times without a zone are read as UTC.
fn parse_generalized_time(s: &str) -> Option<DateTime<Utc>> {
    let (body, offset_secs) = split_zone(s)?;
    let (main, fraction) = match body.find(['.', ',']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    if !main.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = match main.len() {
        10 => format!("{main}0000"),
        12 => format!("{main}00"),
        14 => main.to_string(),
        _ => return None,
    };
    let mut naive = NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").ok()?;

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits: String = fraction.chars().chain("000000000".chars()).take(9).collect();
        let nanos: i64 = digits.parse().ok()?;
        naive = naive.checked_add_signed(Duration::nanoseconds(nanos))?;
    }

    let utc = naive.checked_sub_signed(Duration::seconds(offset_secs))?;
    Some(Utc.from_utc_datetime(&utc))
}

/// Split a trailing zone designator; returns the body and the offset in seconds.
fn split_zone(s: &str) -> Option<(&str, i64)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Some((body, 0));
    }
    let len = s.len();
    if len > 5 {
        let sign = match s.as_bytes()[len - 5] {
            b'+' => Some(1),
            b'-' => Some(-1),
            _ => None,
        };
        if let Some(sign) = sign {
            let zone = s.get(len - 4..)?;
            if !zone.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let hours: i64 = zone[..2].parse().ok()?;
            let minutes: i64 = zone[2..].parse().ok()?;
            if hours > 23 || minutes > 59 {
                return None;
            }
            return Some((&s[..len - 5], sign * (hours * 3600 + minutes * 60)));
        }
    }
    Some((s, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> i64 {
        DateTime::parse_from_rfc3339(s).unwrap().timestamp()
    }

    #[test]
    fn utc_time_century_window() {
        let t = LogTime::UtcTime("240115103000Z".into()).to_datetime().unwrap();
        assert_eq!(t.timestamp(), ts("2024-01-15T10:30:00Z"));

        let t = LogTime::UtcTime("991231235959Z".into()).to_datetime().unwrap();
        assert_eq!(t.timestamp(), ts("1999-12-31T23:59:59Z"));
    }

    #[test]
    fn utc_time_without_seconds_and_with_offset() {
        let t = LogTime::UtcTime("2401151030+0100".into()).to_datetime().unwrap();
        assert_eq!(t.timestamp(), ts("2024-01-15T09:30:00Z"));
    }

    #[test]
    fn utc_time_rejects_fraction() {
        for value in ["9912311230.5Z", "240115103000.25Z", "2401151030,5+0100"] {
            assert!(
                LogTime::UtcTime(value.into()).to_datetime().is_err(),
                "{value} accepted"
            );
        }
    }

    #[test]
    fn generalized_time_with_fraction() {
        let t = LogTime::GeneralizedTime("20240115103000.25Z".into())
            .to_datetime()
            .unwrap();
        assert_eq!(t.timestamp(), ts("2024-01-15T10:30:00Z"));
        assert_eq!(t.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn rejects_garbage() {
        let err = LogTime::GeneralizedTime("yesterday".into())
            .to_datetime()
            .unwrap_err();
        assert_eq!(
            err,
            LogTimeError::Unparseable {
                variant: "generalizedTime",
                value: "yesterday".into()
            }
        );
        assert!(LogTime::UtcTime("24011510Z".into()).to_datetime().is_err());
        assert!(LogTime::GeneralizedTime("20241315103000Z".into())
            .to_datetime()
            .is_err());
    }

    #[test]
    fn compare_across_variants() {
        let unix = LogTime::UnixTime(ts("2024-01-15T10:30:00Z"));
        let utc = LogTime::UtcTime("240115103001Z".into());
        let generalized = LogTime::GeneralizedTime("20240115102959Z".into());

        assert_eq!(unix.compare(&utc).unwrap(), Ordering::Less);
        assert_eq!(unix.compare(&generalized).unwrap(), Ordering::Greater);
        assert_eq!(utc.compare(&utc.clone()).unwrap(), Ordering::Equal);
    }

    #[test]
    fn identical_strings_compare_equal_without_parsing() {
        let odd = LogTime::GeneralizedTime("not-a-time".into());
        assert_eq!(odd.compare(&odd.clone()).unwrap(), Ordering::Equal);
    }
}
