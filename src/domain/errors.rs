//! Domain errors for the interview navigator.

use thiserror::Error;

use super::models::coverage::Dimension;

/// Errors raised at the domain seams (storage, serialization, snapshots).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Fatal configuration errors. The engine refuses to start on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid threshold {name}: {value}. Must be within its range")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Invalid session_turn_cap: {0}. Must be at least 1")]
    InvalidTurnCap(u32),

    #[error("Invalid weight for {dimension:?}: {value}. Must be finite and non-negative")]
    InvalidWeight { dimension: Dimension, value: f64 },

    #[error("Dimension weights sum to zero")]
    ZeroWeights,

    #[error("Invalid breadth_goal_tiebreak [{0}]. Must list each EXPLORE_* goal once")]
    InvalidTiebreak(String),

    #[error("Invalid temporal_tolerance_years: {0}. Cannot be negative")]
    InvalidTolerance(i32),

    #[error("Invalid smoothing_half_life_turns: {0}. Must be positive")]
    InvalidHalfLife(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Decision table incomplete: {0}")]
    IncompleteTable(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
