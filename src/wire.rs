use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::engine::EngineError;
use crate::limits::{MAX_DURATION_MIN, MIN_DURATION_MIN};
use crate::model::Min;

// ── Boundary encoding ────────────────────────────────────────────
//
// The HTTP layer owns routing and serialization; this module owns the data
// contract it encodes: date/time parsing, duration bounds, and the response
// envelope shape.

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| EngineError::validation(field, format!("expected YYYY-MM-DD, got {s:?}")))
}

/// Parse a `HH:MM` or `HH:MM:SS` time-of-day. Seconds are accepted on the
/// wire but floored away by the minute-granularity engine.
pub fn parse_time(field: &'static str, s: &str) -> Result<NaiveTime, EngineError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| EngineError::validation(field, format!("expected HH:MM[:SS], got {s:?}")))
}

/// Validate a wire duration against the protocol bounds.
pub fn parse_duration(field: &'static str, minutes: i64) -> Result<Min, EngineError> {
    if minutes < i64::from(MIN_DURATION_MIN) || minutes > i64::from(MAX_DURATION_MIN) {
        return Err(EngineError::validation(
            field,
            format!("must be between {MIN_DURATION_MIN} and {MAX_DURATION_MIN} minutes"),
        ));
    }
    Ok(minutes as Min)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// JSON response envelope: `{success, data, message, errors}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: Vec::new(),
        }
    }

    pub fn error(err: &EngineError) -> Self {
        let errors = match err {
            EngineError::Validation { field, message } => vec![FieldError {
                field: (*field).to_string(),
                message: message.clone(),
            }],
            _ => Vec::new(),
        };
        Self {
            success: false,
            data: None,
            message: Some(err.to_string()),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_roundtrip() {
        let d = parse_date("date", "2026-03-02").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn bad_date_is_field_error() {
        let err = parse_date("date", "03/02/2026").unwrap_err();
        assert!(matches!(err, EngineError::Validation { field: "date", .. }));
    }

    #[test]
    fn impossible_date_rejected() {
        assert!(parse_date("date", "2026-02-30").is_err());
    }

    #[test]
    fn time_with_and_without_seconds() {
        assert_eq!(
            parse_time("startTime", "09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("startTime", "09:30:45").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 45).unwrap()
        );
        assert!(parse_time("startTime", "25:00").is_err());
    }

    #[test]
    fn duration_bounds_inclusive() {
        assert_eq!(parse_duration("duration", 15).unwrap(), 15);
        assert_eq!(parse_duration("duration", 480).unwrap(), 480);
        assert!(parse_duration("duration", 14).is_err());
        assert!(parse_duration("duration", 481).is_err());
        assert!(parse_duration("duration", -60).is_err());
    }

    #[test]
    fn envelope_shapes() {
        let ok = ApiResponse::ok(vec!["09:00"]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0], "09:00");
        assert!(json.get("errors").is_none());

        let err = EngineError::validation("duration", "out of range");
        let body = ApiResponse::<()>::error(&err);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["field"], "duration");
    }
}
