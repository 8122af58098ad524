use reqwest::StatusCode;
use thiserror::Error;

/// Classified failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("location not found")]
    NotFound,

    #[error("invalid API key")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("server responded with status {0}")]
    ServerError(u16),

    /// DNS, connect, TLS, timeout or body read failure. The detail is for logs.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// A 2xx response whose body could not be turned into domain values.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => FetchError::NotFound,
            StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
            other => FetchError::ServerError(other.as_u16()),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            FetchError::NotFound => "Location not found".to_string(),
            FetchError::Unauthorized => "Invalid API key".to_string(),
            FetchError::RateLimited => "Request limit exceeded".to_string(),
            FetchError::ServerError(code) => format!("Server error: {code}"),
            FetchError::NetworkUnavailable(_) => {
                "Network error: check your internet connection".to_string()
            }
            FetchError::InvalidResponse(_) => {
                "Received an unreadable response from the weather service".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    // The request URL carries the API key, so it never reaches the message.
    fn from(err: reqwest::Error) -> Self {
        FetchError::NetworkUnavailable(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::InvalidResponse(err.to_string())
    }
}
