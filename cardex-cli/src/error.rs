use thiserror::Error;

use cardex_cache::CacheError;
use cardex_db::SchemaError;
use cardex_import::{PreviewError, ResolveError};
use cardex_scryfall::ScryfallError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database could not be opened
    #[error("Database error: {0}")]
    Database(#[from] SchemaError),

    /// Card cache failure
    #[error("{0}")]
    Cache(#[from] CacheError),

    /// Catalog request failed outright
    #[error("Catalog error: {0}")]
    Catalog(#[from] ScryfallError),

    /// Deck import or resolution failed
    #[error("{0}")]
    Import(#[from] PreviewError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Output serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        Self::Import(PreviewError::Resolve(e))
    }
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
