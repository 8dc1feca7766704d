//! The wire log record
//!
//! Defines [`LogRecord`], the entity carried end to end from the broker to
//! every sink. It is only ever constructed by [`crate::validator::validate`]
//! — this module performs no validation itself.

use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One validated log entry, schema per the log-message wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub project: String,
    /// Canonicalized to UTC by the validator regardless of the wire offset.
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub module: String,
    pub function: String,
    pub message: String,
    pub code: i64,
}

impl LogRecord {
    /// Resolves a named format placeholder to its rendered text, or `None`
    /// if `name` isn't one of the record's fields — formatters pass unknown
    /// placeholders through literally rather than treating this as an error.
    pub fn placeholder_value(&self, name: &str) -> Option<String> {
        match name {
            "project" => Some(self.project.clone()),
            "timestamp" => Some(self.timestamp.to_rfc3339()),
            "level" => Some(self.level.as_str().to_string()),
            "module" => Some(self.module.clone()),
            "function" => Some(self.function.clone()),
            "message" => Some(self.message.clone()),
            "code" => Some(self.code.to_string()),
            _ => None,
        }
    }
}
