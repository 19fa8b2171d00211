use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse the ISO-8601 forms the backend sends: a plain date, a local
/// date-time, or an RFC 3339 timestamp. Offsets are dropped; the portal only
/// needs the calendar position for ordering and display.
pub fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_date() {
        let dt = parse_iso("2024-03-01").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn parses_timestamps() {
        assert!(parse_iso("2024-03-01T10:15:00").is_some());
        assert!(parse_iso("2024-03-01T10:15:00.123").is_some());
        assert!(parse_iso("2024-03-01T10:15:00Z").is_some());
        assert!(parse_iso("2024-03-01T10:15:00+01:00").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_iso("").is_none());
        assert!(parse_iso("yesterday").is_none());
        assert!(parse_iso("2024-13-40").is_none());
    }
}
