//! Ledger timestamp parsing.
//!
//! Results files come from several harness versions, so update times show
//! up as RFC 3339 strings, Go `time.Time` strings, naive date-times or raw
//! epoch nanoseconds.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

use super::types::RelTime;

/// Match: "2019-05-01 10:00:00.123456789 -0600 MDT m=+0.012345"
static GO_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)?) ([+-]\d{4})(?: [A-Za-z0-9+-]+)?(?: m=[+-]\d+(?:\.\d+)?)?$",
    )
    .expect("Invalid go time regex")
});

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a timestamp string into an absolute UTC time
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(caps) = GO_TIME.captures(s) {
        let stamp = format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str());
        return DateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S%.f %z")
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a JSON timestamp value: strings as above, numbers as epoch nanoseconds
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let nanos = match n.as_i64() {
                Some(i) => i,
                None => n.as_f64()? as i64,
            };
            Some(Utc.timestamp_nanos(nanos))
        }
        _ => None,
    }
}

/// Seconds between `t0` and `t`
pub fn seconds_since(t0: DateTime<Utc>, t: DateTime<Utc>) -> RelTime {
    let delta = t - t0;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let t = parse_timestamp("2019-05-01T10:00:00.5Z").unwrap();
        let t0 = parse_timestamp("2019-05-01T10:00:00Z").unwrap();
        assert!((seconds_since(t0, t) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_go_time_string() {
        let go = parse_timestamp("2019-05-01 10:00:01.25 -0600 MDT m=+0.012345").unwrap();
        let utc = parse_timestamp("2019-05-01T16:00:01.25Z").unwrap();
        assert_eq!(go, utc);

        let no_monotonic = parse_timestamp("2019-05-01 10:00:01 +0000 UTC").unwrap();
        assert_eq!(no_monotonic, parse_timestamp("2019-05-01T10:00:01Z").unwrap());
    }

    #[test]
    fn test_parse_naive() {
        let a = parse_timestamp("2019-05-01 10:00:00").unwrap();
        let b = parse_timestamp("2019-05-01T10:00:02.5").unwrap();
        assert!((seconds_since(a, b) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_epoch_nanos() {
        let t = parse_timestamp_value(&Value::from(1_500_000_000i64)).unwrap();
        let t0 = parse_timestamp_value(&Value::from(0)).unwrap();
        assert!((seconds_since(t0, t) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp_value(&Value::Bool(true)).is_none());
    }
}
