//! SQLite persistence layer for cached card records.
//!
//! Provides schema creation, upserts, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, set_cached_image_url, upsert_card, upsert_card_aliases,
};
pub use queries::{
    CacheStats, cache_stats, find_card_by_name, get_card, get_cards, search_card_names,
    stale_card_ids,
};
pub use schema::{SchemaError, open_database, open_memory};
