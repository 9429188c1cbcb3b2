use std::time::Duration;

/// Errors that can occur while talking to the catalog.
///
/// Not-found is deliberately absent: lookups report it as `Ok(None)` or an
/// empty result.
#[derive(Debug, thiserror::Error)]
pub enum ScryfallError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by Scryfall API")]
    RateLimit,

    #[error("Scryfall API error {status} ({code}): {details}")]
    Api {
        status: u16,
        code: String,
        details: String,
    },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScryfallError {
    /// True for conditions a caller may reasonably retry later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimit | Self::Timeout(_) => true,
            Self::ServerError { status, .. } => *status >= 500,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Json(_) | Self::Config(_) => false,
        }
    }
}
