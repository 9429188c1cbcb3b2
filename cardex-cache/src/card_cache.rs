//! Read-through card record cache.
//!
//! A record younger than the staleness window is served from SQLite without
//! touching the catalog. Older records are refreshed on read; when the refresh
//! fails the stale copy is served instead, so a catalog outage only turns
//! into an error for cards that were never cached.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use cardex_catalog::{CardFace, CardRecord, DEFAULT_STALE_AFTER_DAYS, ImageSize};
use cardex_db::{CacheStats, OperationError};
use cardex_scryfall::{CatalogSource, ScryfallCard};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use crate::error::CacheError;
use crate::record::{build_record, face_aliases};

#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Records older than this are refreshed on read.
    pub stale_after: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            stale_after: Duration::days(DEFAULT_STALE_AFTER_DAYS),
        }
    }
}

/// How a single-card lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    /// Fresh local record, no upstream call.
    FreshHit,
    /// Local record was stale (or a refresh was forced) and the catalog
    /// returned a replacement.
    StaleHitRefreshOk,
    /// Local record was stale, the refresh failed, and the stale copy was served.
    StaleHitRefreshFailed,
    /// Nothing local; the catalog returned the card.
    MissFetchOk,
    /// Nothing local and the catalog does not know the card.
    MissFetchFailed,
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub state: LookupState,
    pub record: Option<CardRecord>,
}

/// Outcome of a maintenance refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub requested: usize,
    pub refreshed: usize,
}

pub struct CardCache<S> {
    source: Arc<S>,
    db: Mutex<Connection>,
    options: CacheOptions,
}

impl<S: CatalogSource> CardCache<S> {
    pub fn new(source: Arc<S>, conn: Connection, options: CacheOptions) -> Self {
        Self {
            source,
            db: Mutex::new(conn),
            options,
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Fetch a card by id, refreshing it from the catalog when stale or when
    /// `force_refresh` is set.
    pub async fn get_card(
        &self,
        id: &str,
        force_refresh: bool,
    ) -> Result<Option<CardRecord>, CacheError> {
        Ok(self.lookup(id, force_refresh).await?.record)
    }

    /// Like [`get_card`](Self::get_card), also reporting how the lookup was
    /// satisfied.
    pub async fn lookup(&self, id: &str, force_refresh: bool) -> Result<Lookup, CacheError> {
        let cached = self.with_conn(|conn| cardex_db::get_card(conn, id))?;

        if !force_refresh && cached.as_ref().is_some_and(|r| !self.is_stale(r)) {
            log::debug!("Cache hit for {id}");
            return Ok(Lookup {
                state: LookupState::FreshHit,
                record: cached,
            });
        }

        let fetched = self.source.get_card(id).await;
        match (fetched, cached) {
            (Ok(Some(card)), cached) => {
                let record = self.store(&card)?;
                let state = if cached.is_some() {
                    LookupState::StaleHitRefreshOk
                } else {
                    LookupState::MissFetchOk
                };
                Ok(Lookup {
                    state,
                    record: Some(record),
                })
            }
            (Ok(None), Some(stale)) => {
                log::warn!("Catalog no longer returns {id}; serving cached record");
                Ok(Lookup {
                    state: LookupState::StaleHitRefreshFailed,
                    record: Some(stale),
                })
            }
            (Err(e), Some(stale)) => {
                log::warn!("Refresh of {id} failed ({e}); serving stale record");
                Ok(Lookup {
                    state: LookupState::StaleHitRefreshFailed,
                    record: Some(stale),
                })
            }
            (Ok(None), None) => Ok(Lookup {
                state: LookupState::MissFetchFailed,
                record: None,
            }),
            (Err(e), None) => Err(e.into()),
        }
    }

    /// Fetch a card by name. A fresh local record with that exact name
    /// (ignoring case) wins; otherwise the catalog is asked.
    pub async fn get_card_by_name(
        &self,
        name: &str,
        fuzzy: bool,
    ) -> Result<Option<CardRecord>, CacheError> {
        let cached = self.with_conn(|conn| cardex_db::find_card_by_name(conn, name))?;
        if cached.as_ref().is_some_and(|r| !self.is_stale(r)) {
            return Ok(cached);
        }

        match self.source.get_card_by_name(name, fuzzy).await {
            Ok(Some(card)) => Ok(Some(self.store(&card)?)),
            Ok(None) => Ok(cached),
            Err(e) if cached.is_some() => {
                log::warn!("Name lookup for '{name}' failed ({e}); serving stale record");
                Ok(cached)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch many cards by id with a single upstream batch for whatever is
    /// stale or missing. Ids that are neither cached nor known upstream are
    /// dropped; the result order is unspecified.
    ///
    /// If the catalog is unreachable, stale copies are served only when every
    /// requested id has one. Otherwise the upstream error is returned.
    pub async fn get_cards_by_ids(&self, ids: &[String]) -> Result<Vec<CardRecord>, CacheError> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let cached = self.with_conn(|conn| cardex_db::get_cards(conn, &ids))?;
        let mut fresh = Vec::new();
        let mut stale: HashMap<String, CardRecord> = HashMap::new();
        for record in cached {
            if self.is_stale(&record) {
                stale.insert(record.id.clone(), record);
            } else {
                fresh.push(record);
            }
        }

        let known: HashSet<&str> = fresh
            .iter()
            .map(|r| r.id.as_str())
            .chain(stale.keys().map(String::as_str))
            .collect();
        let uncached: Vec<String> = ids
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect();
        let mut to_fetch: Vec<String> = stale.keys().cloned().collect();
        to_fetch.extend(uncached.iter().cloned());

        if to_fetch.is_empty() {
            return Ok(fresh);
        }

        log::debug!(
            "{} cached, fetching {} ({} stale)",
            fresh.len(),
            to_fetch.len(),
            stale.len()
        );

        match self.source.get_cards_by_ids(&to_fetch).await {
            Ok(cards) => {
                let stored = self.store_many(&cards)?;
                for record in &stored {
                    stale.remove(&record.id);
                }
                if !stale.is_empty() {
                    log::warn!(
                        "{} stale records not returned by the catalog; serving cached copies",
                        stale.len()
                    );
                }
                fresh.extend(stored);
                fresh.extend(stale.into_values());
                Ok(fresh)
            }
            // An id with no local copy cannot be told apart from one the
            // catalog does not know, so the failure must surface.
            Err(e) if !uncached.is_empty() => Err(e.into()),
            Err(e) => {
                log::warn!("Batch refresh failed ({e}); serving {} stale records", stale.len());
                fresh.extend(stale.into_values());
                Ok(fresh)
            }
        }
    }

    /// Re-fetch a card from the catalog regardless of freshness. Unlike
    /// [`get_card`](Self::get_card), failures are not masked.
    pub async fn refresh_card(&self, id: &str) -> Result<Option<CardRecord>, CacheError> {
        match self.source.get_card(id).await? {
            Some(card) => Ok(Some(self.store(&card)?)),
            None => Ok(None),
        }
    }

    /// Persist cards fetched elsewhere, returning the stored records.
    pub fn record_fetched(&self, cards: &[ScryfallCard]) -> Result<Vec<CardRecord>, CacheError> {
        self.store_many(cards)
    }

    /// Remember the object-storage URL for one image of a card.
    pub fn set_cached_image(
        &self,
        id: &str,
        size: ImageSize,
        face: CardFace,
        url: &str,
    ) -> Result<(), CacheError> {
        self.with_conn(|conn| cardex_db::set_cached_image_url(conn, id, size, face, url))
    }

    /// The stored record for `id`, without consulting the catalog.
    pub fn cached_record(&self, id: &str) -> Result<Option<CardRecord>, CacheError> {
        self.with_conn(|conn| cardex_db::get_card(conn, id))
    }

    /// Cached names starting with `prefix`, without consulting the catalog.
    pub fn cached_names(&self, prefix: &str, limit: usize) -> Result<Vec<String>, CacheError> {
        self.with_conn(|conn| cardex_db::search_card_names(conn, prefix, limit))
    }

    /// Refresh up to `limit` of the oldest stale records in one batch.
    pub async fn refresh_stale(&self, limit: usize) -> Result<RefreshSummary, CacheError> {
        let cutoff = self.stale_cutoff(Utc::now());
        let ids = self.with_conn(|conn| cardex_db::stale_card_ids(conn, cutoff, limit))?;
        if ids.is_empty() {
            return Ok(RefreshSummary::default());
        }

        let cards = self.source.get_cards_by_ids(&ids).await?;
        let stored = self.store_many(&cards)?;
        log::info!("Refreshed {} of {} stale records", stored.len(), ids.len());
        Ok(RefreshSummary {
            requested: ids.len(),
            refreshed: stored.len(),
        })
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let cutoff = self.stale_cutoff(Utc::now());
        self.with_conn(|conn| cardex_db::cache_stats(conn, cutoff))
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn is_stale(&self, record: &CardRecord) -> bool {
        record.is_stale_at(Utc::now(), self.options.stale_after)
    }

    fn stale_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.options.stale_after
    }

    fn store(&self, card: &ScryfallCard) -> Result<CardRecord, CacheError> {
        let mut stored = self.store_many(std::slice::from_ref(card))?;
        stored.pop().ok_or_else(|| {
            CacheError::Store(OperationError::NotFound {
                entity_type: "card".to_string(),
                id: card.id.clone(),
            })
        })
    }

    /// Upsert cards and read them back, so the returned records carry any
    /// image URLs the store already had.
    fn store_many(&self, cards: &[ScryfallCard]) -> Result<Vec<CardRecord>, CacheError> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let mut stored = Vec::with_capacity(cards.len());
            for card in cards {
                cardex_db::upsert_card(conn, &build_record(card, now))?;
                cardex_db::upsert_card_aliases(conn, &card.id, &face_aliases(card))?;
                if let Some(record) = cardex_db::get_card(conn, &card.id)? {
                    stored.push(record);
                }
            }
            Ok(stored)
        })
    }

    /// Run `f` with the connection locked. The guard never outlives the
    /// closure, so it is never held across an await point.
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, OperationError>,
    ) -> Result<T, CacheError> {
        let conn = self.db.lock().map_err(|_| CacheError::StorePoisoned)?;
        Ok(f(&conn)?)
    }
}
