//! Marketplace event structure and boundary validation.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Epoch values at or above this are interpreted as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// One marketplace activity entry, validated at the boundary.
///
/// The upstream endpoint returns loosely-shaped JSON; only the timestamp is
/// interpreted here. The rest of the payload is carried through untouched for
/// the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    /// When the event was created upstream
    pub created_at: DateTime<Utc>,

    /// The raw event payload as returned by the endpoint
    pub payload: Value,
}

impl MarketEvent {
    /// Validate a raw batch entry into an event.
    ///
    /// `timestamp_field` names the payload field holding the creation time.
    /// Accepted formats: RFC 3339 strings, naive `YYYY-MM-DDTHH:MM:SS[.fff]`
    /// strings (read as UTC), and numeric epoch seconds or milliseconds.
    pub fn from_raw(raw: &Value, timestamp_field: &str) -> Result<Self> {
        let ts = raw
            .get(timestamp_field)
            .ok_or_else(|| AppError::malformed_event(format!("missing '{timestamp_field}'")))?;

        let created_at = parse_timestamp(ts)
            .ok_or_else(|| AppError::malformed_event(format!("unparseable timestamp {ts}")))?;

        Ok(Self {
            created_at,
            payload: raw.clone(),
        })
    }

    /// Event time as epoch milliseconds, for watermark comparison.
    pub fn timestamp_ms(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            let epoch = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            let millis = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
                epoch
            } else {
                epoch.checked_mul(1000)?
            };
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Some endpoints omit the timezone suffix; read those as UTC.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
