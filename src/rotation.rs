//! Rotation trigger evaluation
//!
//! A pure predicate over one project's current file state and the
//! configured [`RotationConfig`] trigger. Mirrors the four trigger checks
//! the original file sink ran on every write: `daily` fires once per day at
//! a fixed wall-clock minute, `time` fires once a file has been open longer
//! than a duration, `lines` and `size` fire on count thresholds.

use crate::config::{RotationConfig, RotationTrigger};
use chrono::{DateTime, Datelike, Utc};

/// The mutable bookkeeping the file sink tracks per active file.
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    pub date_start: DateTime<Utc>,
    pub count_lines: u64,
    pub current_size: u64,
}

impl RotationState {
    /// `initial_size` should be the real on-disk size right after the file's
    /// header is written, so the size trigger accounts for it from the start.
    pub fn fresh(opened_at: DateTime<Utc>, initial_size: u64) -> Self {
        Self {
            date_start: opened_at,
            count_lines: 0,
            current_size: initial_size,
        }
    }
}

/// Evaluates whether `state` should trigger a rotation under `config`, as of
/// `now`. Only the trigger named by `config.trigger` is evaluated — unlike
/// the legacy size/time/both-only policy, these triggers are mutually
/// exclusive per configuration, not combined.
pub fn should_rotate(config: &RotationConfig, state: &RotationState, now: DateTime<Utc>) -> bool {
    match config.trigger {
        RotationTrigger::Daily => {
            let target = now.format("%H:%M").to_string();
            target == config.daily && state.date_start.num_days_from_ce() != now.num_days_from_ce()
        }
        RotationTrigger::Time => {
            let elapsed = (now - state.date_start).num_seconds();
            elapsed >= config.time as i64
        }
        RotationTrigger::Lines => state.count_lines >= config.lines,
        RotationTrigger::Size => state.current_size >= config.size,
    }
}
