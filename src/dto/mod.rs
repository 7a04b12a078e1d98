use std::time::{SystemTime, UNIX_EPOCH};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Game requests and the public game projection.
pub mod game;
/// Health payload.
pub mod health;
/// Catalog listing filters.
pub mod query;
pub mod validation;

/// RFC 3339 rendering that never panics on instants `time` cannot represent.
fn format_system_time(time: SystemTime) -> String {
    let nanos = match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i128::try_from(elapsed.as_nanos()).ok(),
        Err(before) => i128::try_from(before.duration().as_nanos())
            .ok()
            .map(|nanos| -nanos),
    };

    nanos
        .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(nanos).ok())
        .and_then(|datetime| datetime.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn formats_representable_instants() {
        assert_eq!(format_system_time(UNIX_EPOCH), "1970-01-01T00:00:00Z");
        assert_eq!(
            format_system_time(UNIX_EPOCH + Duration::from_millis(1_700_000_000_000)),
            "2023-11-14T22:13:20Z"
        );
    }

    #[test]
    fn far_future_instant_does_not_panic() {
        let far = UNIX_EPOCH + Duration::from_secs(1_000_000_000_000);
        assert_eq!(format_system_time(far), "invalid-timestamp");
    }
}
