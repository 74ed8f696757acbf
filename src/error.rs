//! Error types for the onboarding service.
//!
//! Field validation failures are not errors here: they are carried as
//! [`Violation`](crate::onboarding::schema::Violation) values inside the
//! controller's error map. These types cover the service around it.

use uuid::Uuid;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from handing the finished onboarding record to the backend.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Submission is only possible from the processing step (currently {step})")]
    WrongStep { step: String },

    #[error("Backend rejected submission with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found")]
    NotFound { id: Uuid },

    #[error("Invalid session id: {0}")]
    InvalidId(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
