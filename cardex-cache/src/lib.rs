//! Read-through cache for card records and card images.
//!
//! [`CardCache`] keeps catalog records in SQLite and refreshes them from a
//! [`CatalogSource`](cardex_scryfall::CatalogSource) once they go stale.
//! [`ImageCache`] mirrors card images into an [`ObjectStore`] and remembers
//! the resulting URLs on the card record.

pub mod card_cache;
pub mod error;
pub mod image_cache;
pub mod object_store;
pub mod progress;
pub mod record;

pub use card_cache::{CacheOptions, CardCache, Lookup, LookupState, RefreshSummary};
pub use error::{CacheError, StorageError};
pub use image_cache::{
    BatchCacheSummary, IMAGE_CONCURRENCY, IMAGE_FETCH_TIMEOUT, ImageCache, ImageOutcome,
    object_key,
};
pub use object_store::{LocalObjectStore, ObjectStore};
pub use progress::{BatchProgress, SilentProgress};
pub use record::{build_record, face_aliases, is_commander_eligible};
