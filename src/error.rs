// src/error.rs

//! Error type shared by the library and the CLI.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Everything that can stop a finder operation.
#[derive(Error, Debug)]
pub enum AppError {
    /// Reading or writing a stored document
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure talking to openBD or the social endpoint
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A stored document or response body is not the JSON we expect
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or unusable setup (config file, credentials)
    #[error("setup error: {0}")]
    Config(String),

    /// A config value outside its allowed range
    #[error("invalid setting: {0}")]
    Validation(String),

    /// Coverage or detail source answered with a failure status
    #[error("openBD {context} failed: {message}")]
    Upstream { context: String, message: String },

    /// Social endpoint rejected a post
    #[error("post rejected with status {status}: {message}")]
    Social { status: u16, message: String },

    /// A single bibliographic record could not be decoded
    #[error("record {isbn} could not be decoded: {message}")]
    Record { isbn: String, message: String },
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Failure from the bibliographic source. `context` names the endpoint.
    pub fn upstream(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Upstream {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn social(status: u16, message: impl fmt::Display) -> Self {
        Self::Social {
            status,
            message: message.to_string(),
        }
    }

    pub fn record(isbn: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Record {
            isbn: isbn.into(),
            message: message.to_string(),
        }
    }
}
