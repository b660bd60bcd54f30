use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::diagnosis_types::FailureKind;

/// Rejections raised while staging an image.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntakeError {
    #[error("not an image: declared media type is {media_type:?}")]
    NotAnImage { media_type: String },

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

impl IntakeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IntakeError::NotAnImage { .. } => FailureKind::NotAnImage,
            IntakeError::Unreadable { .. } => FailureKind::UnreadableImage,
        }
    }
}

/// Failures of one remote classification call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("could not reach the classification service: {0}")]
    Connection(String),

    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Protocol(String),

    #[error("invalid response from server: {0}")]
    MalformedResponse(String),
}

impl PredictionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PredictionError::Connection(_) => FailureKind::ConnectionError,
            PredictionError::Server { .. } => FailureKind::ServerError,
            PredictionError::Protocol(_) => FailureKind::ProtocolError,
            PredictionError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// Persisted store failures. Always recovered by the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Boundary error handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct AppError {
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError {
            message: format!("Database error: {}", err),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError {
            message: format!("Invalid configuration: {}", err),
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError {
            message: err.to_string(),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError { message: msg }
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError {
            message: msg.to_string(),
        }
    }
}
