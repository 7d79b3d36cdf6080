//! Gateway failure classification

use thiserror::Error;

/// The two ways a gateway call can fail.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request completed but the gateway refused it or answered
    /// with something we cannot use.
    #[error("{0}")]
    Business(String),
}

/// Coarse kind, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Business,
}

impl GatewayError {
    pub fn business(msg: impl Into<String>) -> Self {
        GatewayError::Business(msg.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Network(_) => FailureKind::Network,
            GatewayError::Business(_) => FailureKind::Business,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Network(e)
    }
}
