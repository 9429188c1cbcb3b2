//! Client for the Scryfall card catalog.
//!
//! All catalog requests pass through one shared [`RateLimiter`] so the process
//! never exceeds one request per [`MIN_REQUEST_INTERVAL`]. Batch lookups are
//! chunked to the collection endpoint's limit. Nothing here caches; see
//! `cardex-cache` for that.

pub mod client;
pub mod error;
pub mod rate_limit;
pub mod source;
pub mod types;

pub use client::{ClientOptions, MAX_COLLECTION_BATCH, MIN_REQUEST_INTERVAL, ScryfallClient};
pub use error::ScryfallError;
pub use rate_limit::RateLimiter;
pub use source::{CatalogSource, CollectionResult};
pub use types::{ApiErrorObject, ScryfallCard, ScryfallCardFace, SearchPage};
