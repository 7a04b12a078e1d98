//! Timestamps are written as epoch milliseconds. Records written by other
//! clients may carry an RFC 3339 string instead, so both are accepted on read.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serializer, de};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(f64),
    Text(String),
}

pub fn serialize<S>(value: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(time) => serializer.serialize_i64(to_millis(*time)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => Ok(None),
        // Out-of-range numbers are treated like a missing value.
        Some(RawTimestamp::Millis(millis)) => Ok(from_millis(millis)),
        Some(RawTimestamp::Text(text)) => OffsetDateTime::parse(&text, &Rfc3339)
            .map(|parsed| Some(SystemTime::from(parsed)))
            .map_err(de::Error::custom),
    }
}

fn to_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as i64,
        Err(before) => -(before.duration().as_millis() as i64),
    }
}

/// Epoch milliseconds as a `SystemTime`, or `None` when `time` cannot represent the instant.
fn from_millis(millis: f64) -> Option<SystemTime> {
    if !millis.is_finite() {
        return None;
    }
    let nanos = (millis.trunc() as i128)
        .checked_mul(1_000_000)?
        .checked_add((millis.fract() * 1_000_000.0) as i128)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .map(SystemTime::from)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn millis_inside_range_convert_exactly() {
        assert_eq!(
            from_millis(1_700_000_000_000.0),
            Some(UNIX_EPOCH + Duration::from_millis(1_700_000_000_000))
        );
        assert_eq!(
            from_millis(-1_000.0),
            Some(UNIX_EPOCH - Duration::from_secs(1))
        );
    }

    #[test]
    fn millis_outside_range_are_dropped() {
        assert_eq!(from_millis(1.0e15), None);
        assert_eq!(from_millis(-1.0e15), None);
        assert_eq!(from_millis(f64::MAX), None);
    }
}
