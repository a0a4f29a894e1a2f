use std::fmt;

use tracing::warn;

use super::backend::BackendError;
use crate::access::LOGIN_PATH;

pub const INSUFFICIENT_CREDITS_MESSAGE: &str =
    "Insufficient credits. Please contact admin to add more credits.";
pub const UNAVAILABLE_MESSAGE: &str =
    "This feature is temporarily unavailable. Please try again later.";
pub const UNAUTHORIZED_MESSAGE: &str = "You do not have permission to perform this action.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Backend messages at least this long are replaced by [`GENERIC_MESSAGE`].
const MAX_PASSTHROUGH_LEN: usize = 100;

/// Failure of an unlock step, classified for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockFailure {
    InsufficientCredits { balance: u64, cost: u64 },
    Unavailable { operation: String },
    Unauthorized { login_path: &'static str },
    Network(String),
    Rejected(String),
}

impl UnlockFailure {
    pub fn user_message(&self) -> String {
        match self {
            UnlockFailure::InsufficientCredits { .. } => INSUFFICIENT_CREDITS_MESSAGE.to_string(),
            UnlockFailure::Unavailable { .. } => UNAVAILABLE_MESSAGE.to_string(),
            UnlockFailure::Unauthorized { .. } => UNAUTHORIZED_MESSAGE.to_string(),
            UnlockFailure::Network(_) => NETWORK_MESSAGE.to_string(),
            UnlockFailure::Rejected(message) => {
                let trimmed = message.trim();
                if trimmed.is_empty() || trimmed.chars().count() >= MAX_PASSTHROUGH_LEN {
                    GENERIC_MESSAGE.to_string()
                } else {
                    trimmed.to_string()
                }
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UnlockFailure::Network(_) | UnlockFailure::Unavailable { .. }
        )
    }

    /// Where the caller should be sent, if anywhere.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            UnlockFailure::Unauthorized { login_path } => Some(login_path),
            _ => None,
        }
    }
}

impl From<BackendError> for UnlockFailure {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InsufficientCredits { balance, cost } => {
                UnlockFailure::InsufficientCredits { balance, cost }
            }
            BackendError::Unsupported { operation } => {
                warn!(%operation, "backend operation unavailable");
                UnlockFailure::Unavailable { operation }
            }
            BackendError::Unauthorized(_) => UnlockFailure::Unauthorized {
                login_path: LOGIN_PATH,
            },
            BackendError::Network(detail) => UnlockFailure::Network(detail),
            BackendError::NotFound(message) | BackendError::Rejected(message) => {
                UnlockFailure::Rejected(message)
            }
        }
    }
}

impl fmt::Display for UnlockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for UnlockFailure {}
