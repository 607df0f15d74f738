use thiserror::Error;

/// Failure talking to a cache node.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache node {endpoint} unreachable: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("cache node {endpoint} answered {status}")]
    Status { endpoint: String, status: u16 },
    #[error("protocol error from {endpoint}: {message}")]
    Protocol { endpoint: String, message: String },
}

impl StoreError {
    pub fn protocol(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}
