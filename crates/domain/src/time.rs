//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// UTC timestamp used for `createdAt`, `startedAt`, `finishedAt`, etc.
pub type Timestamp = DateTime<Utc>;

/// Naive layouts produced by `<input type="datetime-local">`.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse a client-supplied date-time.
///
/// Accepts RFC 3339 (`2030-01-01T10:00:00Z`, any offset) and the naive
/// `YYYY-MM-DDTHH:MM[:SS]` layout, which is taken as UTC.
#[must_use]
pub fn parse_client_timestamp(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.to_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_parse_rfc3339_with_offset_as_utc() {
        let ts = parse_client_timestamp("2030-01-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn should_parse_datetime_local_layout_without_seconds() {
        let ts = parse_client_timestamp("2030-01-01T10:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 1, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn should_parse_datetime_local_layout_with_seconds() {
        let ts = parse_client_timestamp("2030-01-01T10:30:15").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 1, 1, 10, 30, 15).unwrap());
    }

    #[test]
    fn should_return_none_for_garbage() {
        assert!(parse_client_timestamp("next tuesday").is_none());
        assert!(parse_client_timestamp("").is_none());
    }
}
