/// Error enumeration for storage failures shared by every store trait.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub(crate) fn poisoned(store: &str) -> Self {
        Self::Unavailable(format!("{store} lock poisoned"))
    }
}
