//! Serde helpers storing [`SystemTime`] values as RFC 3339 strings, the format
//! shared by the remote relations and the local fallback documents.

use std::time::SystemTime;

use serde::{Deserialize, Deserializer, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Format a timestamp as RFC 3339 (UTC).
pub fn format(value: SystemTime) -> Result<String, time::error::Format> {
    OffsetDateTime::from(value).format(&Rfc3339)
}

/// Parse an RFC 3339 timestamp, accepting any offset.
pub fn parse(value: &str) -> Result<SystemTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339).map(SystemTime::from)
}

/// Serde `serialize_with` hook.
pub fn serialize<S>(value: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = format(*value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// Serde `deserialize_with` hook.
pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn parses_postgres_style_offsets() {
        let parsed = parse("2024-03-01T12:00:00.5+02:00").unwrap();
        let expected = UNIX_EPOCH + Duration::from_millis(1_709_287_200_500);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn formats_in_utc() {
        let value = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(format(value).unwrap(), "1970-01-02T00:00:00Z");
    }

    #[test]
    fn rejects_free_form_dates() {
        assert!(parse("yesterday").is_err());
        assert!(parse("2024-03-01").is_err());
    }
}
