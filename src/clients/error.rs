use thiserror::Error;

/// Failure of a call to a collaborator service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{service} unreachable: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} answered {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} failed: {message}")]
    Service {
        service: &'static str,
        message: String,
    },
}
