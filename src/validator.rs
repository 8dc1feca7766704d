//! Record validation
//!
//! `validate` is the sole entry point: JSON-decode one message body, check
//! every field against the log-message schema's bounds, and normalize
//! `level` to lowercase before the enum check. Deterministic and pure — no
//! side effects, no I/O.

use crate::level::Level;
use crate::record::LogRecord;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

const MAX_PROJECT_LEN: usize = 100;
const MAX_MODULE_LEN: usize = 100;
const MAX_FUNCTION_LEN: usize = 100;
const MAX_MESSAGE_LEN: usize = 1000;
const MAX_CODE: i64 = 999_999;
const MIN_CODE: i64 = 0;

/// Reason a record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    MalformedJson,
    MissingField,
    BadType,
    OutOfRange,
    BadEnum,
}

#[derive(Debug, Clone)]
pub struct Invalid {
    pub reason: InvalidReason,
    pub detail: String,
}

impl Invalid {
    fn new(reason: InvalidReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Wire shape of an incoming record. `deny_unknown_fields` rejects any
/// top-level key outside the schema. Every field is `Option<Value>` so a
/// missing key (or an explicit `null`) deserializes to `None` instead of
/// failing the whole struct — that's what lets us tell "missing field" apart
/// from "malformed json" or a wrong-typed value.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogRecord {
    project: Option<serde_json::Value>,
    timestamp: Option<serde_json::Value>,
    level: Option<serde_json::Value>,
    module: Option<serde_json::Value>,
    function: Option<serde_json::Value>,
    message: Option<serde_json::Value>,
    code: Option<serde_json::Value>,
}

fn required(value: Option<serde_json::Value>, field: &'static str) -> Result<serde_json::Value, Invalid> {
    value.ok_or_else(|| Invalid::new(InvalidReason::MissingField, field))
}

fn required_string(value: &serde_json::Value, max_len: usize) -> Result<String, InvalidReason> {
    let s = value.as_str().ok_or(InvalidReason::BadType)?;
    if s.chars().count() > max_len {
        return Err(InvalidReason::OutOfRange);
    }
    Ok(s.to_string())
}

static PROJECT_PATTERN: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^[\w\s\-]+$").unwrap());

/// Parses and validates one message body against the log-message schema.
pub fn validate(raw_json_bytes: &[u8]) -> Result<LogRecord, Invalid> {
    let raw: RawLogRecord = serde_json::from_slice(raw_json_bytes)
        .map_err(|e| Invalid::new(InvalidReason::MalformedJson, e.to_string()))?;

    let project_value = required(raw.project, "project")?;
    let project =
        required_string(&project_value, MAX_PROJECT_LEN).map_err(|r| Invalid::new(r, "project"))?;
    if !PROJECT_PATTERN.is_match(&project) {
        return Err(Invalid::new(InvalidReason::OutOfRange, "project"));
    }

    let timestamp_value = required(raw.timestamp, "timestamp")?;
    let timestamp_str = timestamp_value
        .as_str()
        .ok_or_else(|| Invalid::new(InvalidReason::BadType, "timestamp"))?;
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(timestamp_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Invalid::new(InvalidReason::BadType, format!("timestamp: {e}")))?;

    let level_value = required(raw.level, "level")?;
    let level_str = level_value
        .as_str()
        .ok_or_else(|| Invalid::new(InvalidReason::BadType, "level"))?
        .to_lowercase();
    let level = Level::from_str(&level_str)
        .map_err(|_| Invalid::new(InvalidReason::BadEnum, "level"))?;

    let module_value = required(raw.module, "module")?;
    let module =
        required_string(&module_value, MAX_MODULE_LEN).map_err(|r| Invalid::new(r, "module"))?;
    let function_value = required(raw.function, "function")?;
    let function = required_string(&function_value, MAX_FUNCTION_LEN)
        .map_err(|r| Invalid::new(r, "function"))?;
    let message_value = required(raw.message, "message")?;
    let message = required_string(&message_value, MAX_MESSAGE_LEN)
        .map_err(|r| Invalid::new(r, "message"))?;

    let code_value = required(raw.code, "code")?;
    let code = code_value
        .as_i64()
        .ok_or_else(|| Invalid::new(InvalidReason::BadType, "code"))?;
    if !(MIN_CODE..=MAX_CODE).contains(&code) {
        return Err(Invalid::new(InvalidReason::OutOfRange, "code"));
    }

    Ok(LogRecord {
        project,
        timestamp,
        level,
        module,
        function,
        message,
        code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "project": "home_logger",
            "timestamp": "2023-10-15T12:34:56Z",
            "level": "info",
            "module": "auth",
            "function": "login",
            "message": "User logged in successfully.",
            "code": 123
        })
    }

    #[test]
    fn accepts_a_well_formed_record() {
        let bytes = serde_json::to_vec(&sample()).unwrap();
        let record = validate(&bytes).unwrap();
        assert_eq!(record.project, "home_logger");
        assert_eq!(record.code, 123);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = validate(b"not json").unwrap_err();
        assert_eq!(err.reason, InvalidReason::MalformedJson);
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let mut v = sample();
        v.as_object_mut()
            .unwrap()
            .insert("extra".to_string(), serde_json::json!("nope"));
        let bytes = serde_json::to_vec(&v).unwrap();
        assert!(validate(&bytes).is_err());
    }

    #[test]
    fn normalizes_level_case_before_enum_check() {
        let mut v = sample();
        v["level"] = serde_json::json!("INFO");
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(validate(&bytes).unwrap().level, Level::Info);
    }

    #[test]
    fn rejects_bad_enum_level() {
        let mut v = sample();
        v["level"] = serde_json::json!("critical");
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(validate(&bytes).unwrap_err().reason, InvalidReason::BadEnum);
    }

    #[test]
    fn code_boundary_zero_and_max_are_accepted() {
        for code in [0, 999_999] {
            let mut v = sample();
            v["code"] = serde_json::json!(code);
            let bytes = serde_json::to_vec(&v).unwrap();
            assert!(validate(&bytes).is_ok());
        }
    }

    #[test]
    fn code_above_max_is_out_of_range() {
        let mut v = sample();
        v["code"] = serde_json::json!(10_000_000);
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(
            validate(&bytes).unwrap_err().reason,
            InvalidReason::OutOfRange
        );
    }

    #[test]
    fn negative_code_is_out_of_range() {
        let mut v = sample();
        v["code"] = serde_json::json!(-1);
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(
            validate(&bytes).unwrap_err().reason,
            InvalidReason::OutOfRange
        );
    }

    #[test]
    fn project_name_with_whitespace_is_accepted() {
        let mut v = sample();
        v["project"] = serde_json::json!("home logger two");
        let bytes = serde_json::to_vec(&v).unwrap();
        assert!(validate(&bytes).is_ok());
    }

    #[test]
    fn unicode_message_round_trips() {
        let mut v = sample();
        v["message"] = serde_json::json!("\u{5bc6}\u{7801}\u{9519}\u{8bef} caf\u{e9}");
        let bytes = serde_json::to_vec(&v).unwrap();
        let record = validate(&bytes).unwrap();
        assert!(record.message.contains('\u{e9}'));
    }

    #[test]
    fn message_over_length_bound_is_out_of_range() {
        let mut v = sample();
        v["message"] = serde_json::json!("x".repeat(1001));
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(
            validate(&bytes).unwrap_err().reason,
            InvalidReason::OutOfRange
        );
    }

    #[test]
    fn missing_field_is_reported_as_missing_field() {
        let mut v = sample();
        v.as_object_mut().unwrap().remove("code");
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(
            validate(&bytes).unwrap_err().reason,
            InvalidReason::MissingField
        );
    }

    #[test]
    fn null_field_is_reported_as_missing_field() {
        let mut v = sample();
        v["message"] = serde_json::Value::Null;
        let bytes = serde_json::to_vec(&v).unwrap();
        assert_eq!(
            validate(&bytes).unwrap_err().reason,
            InvalidReason::MissingField
        );
    }
}
