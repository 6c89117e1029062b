use std::fmt;

use thiserror::Error;

/// Error categories surfaced to the user. Only the category is shown; the
/// underlying transport detail goes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyTitle,
    LoadFailed,
    AddFailed,
    UpdateFailed,
    DeleteFailed,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::EmptyTitle => "Title should not be empty",
            ErrorKind::LoadFailed => "Unable to load todos",
            ErrorKind::AddFailed => "Unable to add a todo",
            ErrorKind::UpdateFailed => "Unable to update a todo",
            ErrorKind::DeleteFailed => "Unable to delete a todo",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        TransportError::Status {
            endpoint: endpoint.into(),
            status,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            TransportError::Network { endpoint, .. }
            | TransportError::Status { endpoint, .. }
            | TransportError::Decode { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no user id configured: pass --user-id, set TODOS_USER_ID, or add \"userId\" to {config_file}")]
    MissingUserId { config_file: String },
    #[error("invalid user id '{0}': expected a positive integer")]
    InvalidUserId(String),
    #[error("invalid API URL '{0}': expected an http(s) URL")]
    InvalidApiUrl(String),
    #[error("failed to read config file {path}: {message}")]
    File { path: String, message: String },
}
