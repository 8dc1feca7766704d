//! Error types and result handling
//!
//! Defines the error taxonomy from the error-handling design: record-scope
//! errors never leave the sink that raised them, lifecycle errors surface to
//! the supervisor, which decides whether to retry or exit. Uses thiserror
//! for ergonomic error handling.

use thiserror::Error;

/// Result type alias using [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;

/// Reason a record failed validation. Never surfaces as a side-effecting
/// error — only as a drop reason to log.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed json")]
    MalformedJson,
    #[error("missing field")]
    MissingField,
    #[error("bad type")]
    BadType,
    #[error("out of range")]
    OutOfRange,
    #[error("bad enum")]
    BadEnum,
}

/// Per-sink failure. Isolated: one sink's error never blocks the others.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("console sink: {0}")]
    Console(String),
    #[error("database sink: {0}")]
    Database(String),
    #[error("file sink io error: {0}")]
    File(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(String),
}

/// Consumer lifecycle failed to start.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("failed to connect to broker: {0}")]
    Connection(String),
    #[error("failed to declare queues: {0}")]
    QueueDeclare(String),
    #[error("failed to build sinks: {0}")]
    SinkInit(String),
}

/// Consumer lifecycle failed to stop cleanly. Logged, never raised further.
#[derive(Error, Debug)]
pub enum StopError {
    #[error("teardown error: {0}")]
    Teardown(String),
}

/// Transient broker/database failure; drives reconnect/retry.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("broker connection lost: {0}")]
    Broker(String),
    #[error("database connection lost: {0}")]
    Database(String),
}

/// An incoming config document failed validation; current config is retained.
#[derive(Error, Debug)]
pub enum ConfigUpdateError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error type unifying the taxonomy above.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Start(#[from] StartError),
    #[error(transparent)]
    Stop(#[from] StopError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    ConfigUpdate(#[from] ConfigUpdateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
