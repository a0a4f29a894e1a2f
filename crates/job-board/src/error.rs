use crate::config::ConfigError;
use crate::session::SessionStoreError;
use crate::telemetry::TelemetryError;
use crate::unlock::{BackendError, UnlockError};
use std::fmt;

/// Top-level error for the server and command line entry points.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Session(SessionStoreError),
    Backend(BackendError),
    Unlock(UnlockError),
    NotSignedIn,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::Backend(err) => write!(f, "backend error: {}", err),
            AppError::Unlock(err) => write!(f, "unlock failed: {}", err),
            AppError::NotSignedIn => write!(f, "not signed in; run `login` first"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Backend(err) => Some(err),
            AppError::Unlock(err) => Some(err),
            AppError::NotSignedIn => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SessionStoreError> for AppError {
    fn from(value: SessionStoreError) -> Self {
        Self::Session(value)
    }
}

impl From<BackendError> for AppError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<UnlockError> for AppError {
    fn from(value: UnlockError) -> Self {
        Self::Unlock(value)
    }
}
