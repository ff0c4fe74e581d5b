//! Serde helpers for Jira timestamp fields.
//!
//! Jira renders timestamps as `2024-05-03T09:15:00.000+0000`, with
//! millisecond precision and a colon-less UTC offset that the stock
//! RFC 3339 deserializer rejects. Both shapes are accepted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Deserialize an optional Jira timestamp; unparsable values become `None`.
pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_jira_offset_without_colon() {
        let dt = parse("2024-05-03T09:15:00.000+0000").unwrap();
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn test_parse_rfc3339() {
        assert!(parse("2024-05-03T09:15:00Z").is_some());
        assert!(parse("2024-05-03T09:15:00+02:00").is_some());
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse("yesterday").is_none());
    }
}
