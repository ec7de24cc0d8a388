use thiserror::Error;

/// Failures of the persistence layer behind reference lists and reputation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read list: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "with-serde")]
    #[error("invalid reputation snapshot: {source}")]
    Snapshot {
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    #[cfg(feature = "with-serde")]
    pub(crate) fn snapshot(source: serde_json::Error) -> Self {
        Self::Snapshot { source }
    }
}
