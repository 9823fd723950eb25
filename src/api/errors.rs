//! Store API error types

use thiserror::Error;

/// The single failure outcome of any API call.
///
/// Screens only care that a call failed; the cause is kept for the log.
#[derive(Error, Debug)]
#[error("request to {endpoint} failed: {cause}")]
pub struct FetchError {
    pub endpoint: String,
    #[source]
    pub cause: FetchCause,
}

#[derive(Error, Debug)]
pub enum FetchCause {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("could not read request payload: {0}")]
    Payload(#[from] std::io::Error),
}

impl FetchError {
    pub fn new(endpoint: impl Into<String>, cause: impl Into<FetchCause>) -> Self {
        Self {
            endpoint: endpoint.into(),
            cause: cause.into(),
        }
    }

    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::new(endpoint, FetchCause::Status(status))
    }
}
