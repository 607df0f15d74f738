use crate::cache::error::StoreError;
use crate::clients::error::ClientError;
use thiserror::Error;

/// Failure of a home timeline operation, surfaced to the request layer as is.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("timeline store failure: {0}")]
    Store(#[from] StoreError),
    #[error("collaborator failure: {0}")]
    Collaborator(#[from] ClientError),
}
