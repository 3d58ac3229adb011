use crate::query::Endpoint;
use thiserror::Error;

/// Fallback shown when a non-2xx body carries no `detail` or `error` message.
pub const GENERIC_HTTP_MESSAGE: &str = "Request failed";

/// Missing or malformed user input detected before a request is built.
///
/// Display strings are user-facing banner texts.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Error)]
pub enum ValidationError {
    #[error("Please select an item to compare")]
    MissingComparisonItem,

    #[error("Please select an item")]
    MissingVegetable,

    #[error("Please select a city")]
    MissingCity,

    #[error("Please enter a valid price")]
    InvalidPrice,
}

/// All failures generated by the [`DataGateway`](crate::gateway::DataGateway).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum GatewayError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: Endpoint, message: String },

    #[error("invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl GatewayError {
    /// Construct a [`GatewayError::Network`] from any displayable transport error.
    pub fn network(error: impl std::fmt::Display) -> Self {
        Self::Network {
            message: error.to_string(),
        }
    }

    /// Construct a [`GatewayError::Decode`] for the provided [`Endpoint`].
    pub fn decode(endpoint: Endpoint, error: impl std::fmt::Display) -> Self {
        Self::Decode {
            endpoint,
            message: error.to_string(),
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best-effort user facing message, without the error kind prefix.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Network { message }
            | GatewayError::Http { message, .. }
            | GatewayError::Decode { message, .. }
            | GatewayError::InvalidUrl { message, .. } => message,
        }
    }
}
