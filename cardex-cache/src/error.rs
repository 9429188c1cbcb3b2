use cardex_db::OperationError;
use cardex_scryfall::ScryfallError;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Card store error: {0}")]
    Store(#[from] OperationError),

    #[error("Card store lock poisoned")]
    StorePoisoned,

    #[error("Catalog unavailable: {0}")]
    Upstream(#[from] ScryfallError),
}

/// Failures writing to object storage. Image caching treats these as a
/// reason to fall back to the upstream URL.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),
}
