use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error(transparent)]
    Store(#[from] StoreError),
}
