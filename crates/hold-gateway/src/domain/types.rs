//! Response payload written once a held request is released.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of every released response: `{"timestamp":"2025-12-15T12:34:56Z"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampBody {
    /// RFC 3339 UTC timestamp, seconds precision
    pub timestamp: String,
}

impl TimestampBody {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            timestamp: time.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Serialize as a newline-terminated JSON line
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let time = Utc.with_ymd_and_hms(2025, 12, 15, 12, 34, 56).unwrap();
        let body = TimestampBody::at(time);
        assert_eq!(body.timestamp, "2025-12-15T12:34:56Z");
    }

    #[test]
    fn test_wire_bytes() {
        let time = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let bytes = TimestampBody::at(time).to_bytes().unwrap();
        assert_eq!(&bytes[..], b"{\"timestamp\":\"2025-01-02T03:04:05Z\"}\n");
    }

    #[test]
    fn test_sub_second_precision_dropped() {
        let time = Utc
            .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(987))
            .unwrap();
        let body = TimestampBody::at(time);
        assert_eq!(body.timestamp, "2025-06-01T00:00:00Z");
        assert!(DateTime::parse_from_rfc3339(&body.timestamp).is_ok());
    }
}
