//! Log levels
//!
//! Defines the seven wire-level severities from the log-message schema.
//! `unknown` is both a valid wire value and the fallback used for console
//! style lookup when a configured level has no style entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
    Fatal,
    Debug,
    Alert,
    Unknown,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Debug => "debug",
            Level::Alert => "alert",
            Level::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = ();

    /// Case-insensitive; the validator normalizes to lowercase before this
    /// is ever reached, but parsing standalone still lowercases defensively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "debug" => Ok(Level::Debug),
            "alert" => Ok(Level::Alert),
            "unknown" => Ok(Level::Unknown),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::Warning);
    }

    #[test]
    fn rejects_names_outside_the_schema() {
        assert!("critical".parse::<Level>().is_err());
    }

    #[test]
    fn display_round_trips_through_as_str() {
        for level in [
            Level::Info,
            Level::Warning,
            Level::Error,
            Level::Fatal,
            Level::Debug,
            Level::Alert,
            Level::Unknown,
        ] {
            assert_eq!(level.to_string(), level.as_str());
        }
    }
}
