//! Error types for keyhold.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Key submission errors ===
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Unverified identity: {0}")]
    UnverifiedIdentity(String),

    #[error("Key ID already in use: {0}")]
    KeyIdConflict(String),

    // === Lookup / permission errors ===
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedKey(_) => "MALFORMED_KEY",
            Self::UnverifiedIdentity(_) => "UNVERIFIED_IDENTITY",
            Self::KeyIdConflict(_) => "KEY_ID_CONFLICT",
            Self::KeyNotFound(_) => "KEY_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether the caller caused this error.
    ///
    /// Client errors are final: retrying the same request gives the same
    /// answer.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedKey(_)
                | Self::UnverifiedIdentity(_)
                | Self::KeyIdConflict(_)
                | Self::KeyNotFound(_)
                | Self::NotFound(_)
                | Self::AccessDenied(_)
        )
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

// === From implementations ===

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
