//! Match deck entries to catalog records.
//!
//! All names are looked up in one batched catalog call, however many entries
//! share them. Entries imported from a deck host already carry a catalog id
//! and are served from the card cache first. Names the catalog does not know
//! get a few autocomplete suggestions, within fixed bounds.

use std::collections::{HashMap, HashSet};

use cardex_cache::{CacheError, CardCache, face_aliases};
use cardex_catalog::{CardRecord, CardResolution, ParsedCardEntry, ResolutionError};
use cardex_scryfall::CatalogSource;
use serde::Serialize;
use tokio::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Card cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Bounds on suggestion lookups for unresolved names.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Unique unresolved names that get suggestions at all.
    pub max_suggestion_lookups: usize,
    /// Suggestions kept per name.
    pub suggestions_per_name: usize,
    /// Pause between consecutive suggestion lookups.
    pub suggestion_delay: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_suggestion_lookups: 5,
            suggestions_per_name: 3,
            suggestion_delay: Duration::from_millis(50),
        }
    }
}

/// Per-entry results in input order, plus the commander's.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub cards: Vec<CardResolution>,
    pub commander: Option<CardResolution>,
    pub resolved_count: usize,
    pub unresolved_count: usize,
}

/// Resolve `entries` (and `commander`) against the catalog.
///
/// Lookup failures are reported per entry, not as an error: a failed batch
/// marks every name-resolved entry `Unavailable`. Only store failures are
/// returned as `Err`.
pub async fn resolve_entries<S: CatalogSource>(
    cache: &CardCache<S>,
    entries: &[ParsedCardEntry],
    commander: Option<&ParsedCardEntry>,
    options: &ResolveOptions,
) -> Result<ResolutionReport, ResolveError> {
    let all: Vec<&ParsedCardEntry> = entries.iter().chain(commander).collect();

    // ── Entries with a catalog id: cache first ──────────────────────────
    let by_id = resolve_by_id(cache, &all).await?;

    // ── Everything else: one batched name lookup ───────────────────────
    let mut seen = HashSet::new();
    let names: Vec<String> = all
        .iter()
        .filter(|e| !has_id_match(e, &by_id))
        .filter(|e| seen.insert(e.name.to_lowercase()))
        .map(|e| e.name.clone())
        .collect();

    let mut by_name: HashMap<String, CardRecord> = HashMap::new();
    let mut batch_failure: Option<String> = None;
    if !names.is_empty() {
        log::debug!("Resolving {} unique names", names.len());
        match cache.source().get_cards_by_names(&names).await {
            Ok(collection) => {
                let stored: HashMap<String, CardRecord> = cache
                    .record_fetched(&collection.cards)?
                    .into_iter()
                    .map(|r| (r.id.clone(), r))
                    .collect();
                for card in &collection.cards {
                    let Some(record) = stored.get(&card.id) else {
                        continue;
                    };
                    for key in std::iter::once(card.name.clone()).chain(face_aliases(card)) {
                        by_name
                            .entry(key.to_lowercase())
                            .or_insert_with(|| record.clone());
                    }
                }
            }
            Err(e) => {
                log::warn!("Batch name lookup failed: {e}");
                batch_failure = Some(e.to_string());
            }
        }
    }

    let resolve_one = |entry: &ParsedCardEntry| -> CardResolution {
        if let Some(record) = entry.catalog_id.as_ref().and_then(|id| by_id.get(id)) {
            return CardResolution::resolved(entry, record.clone());
        }
        if let Some(reason) = &batch_failure {
            return CardResolution::unresolved(entry, ResolutionError::Unavailable(reason.clone()));
        }
        match by_name.get(&entry.name.to_lowercase()) {
            Some(record) => CardResolution::resolved(entry, record.clone()),
            None => CardResolution::unresolved(entry, ResolutionError::NotFound),
        }
    };

    let mut cards: Vec<CardResolution> = entries.iter().map(resolve_one).collect();
    let mut commander = commander.map(resolve_one);

    // ── Suggestions for names the catalog does not know ─────────────────
    if batch_failure.is_none() {
        let suggestions = suggest(cache, &cards, commander.as_ref(), options).await;
        for resolution in cards.iter_mut().chain(commander.iter_mut()) {
            if let Some(found) = suggestions.get(&resolution.name.to_lowercase()) {
                if !resolution.resolved {
                    resolution.suggestions = found.clone();
                }
            }
        }
    }

    let resolved_count = cards.iter().filter(|c| c.resolved).count();
    let unresolved_count = cards.len() - resolved_count;
    log::info!("Resolved {resolved_count} of {} entries", cards.len());

    Ok(ResolutionReport {
        cards,
        commander,
        resolved_count,
        unresolved_count,
    })
}

async fn resolve_by_id<S: CatalogSource>(
    cache: &CardCache<S>,
    entries: &[&ParsedCardEntry],
) -> Result<HashMap<String, CardRecord>, ResolveError> {
    let mut seen = HashSet::new();
    let ids: Vec<String> = entries
        .iter()
        .filter_map(|e| e.catalog_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    match cache.get_cards_by_ids(&ids).await {
        Ok(records) => Ok(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
        Err(CacheError::Upstream(e)) => {
            log::warn!("Id lookup failed ({e}); using stored records and names");
            let mut stored = HashMap::new();
            for id in &ids {
                if let Some(record) = cache.cached_record(id)? {
                    stored.insert(record.id.clone(), record);
                }
            }
            Ok(stored)
        }
        Err(e) => Err(e.into()),
    }
}

fn has_id_match(entry: &ParsedCardEntry, by_id: &HashMap<String, CardRecord>) -> bool {
    entry
        .catalog_id
        .as_ref()
        .is_some_and(|id| by_id.contains_key(id))
}

/// Autocomplete suggestions keyed by lowercased name, for at most
/// `max_suggestion_lookups` unique not-found names in input order.
async fn suggest<S: CatalogSource>(
    cache: &CardCache<S>,
    cards: &[CardResolution],
    commander: Option<&CardResolution>,
    options: &ResolveOptions,
) -> HashMap<String, Vec<String>> {
    let mut seen = HashSet::new();
    let wanted: Vec<&str> = cards
        .iter()
        .chain(commander)
        .filter(|c| c.error == Some(ResolutionError::NotFound))
        .filter(|c| seen.insert(c.name.to_lowercase()))
        .map(|c| c.name.as_str())
        .take(options.max_suggestion_lookups)
        .collect();

    let mut suggestions = HashMap::new();
    for (i, name) in wanted.into_iter().enumerate() {
        if i > 0 && !options.suggestion_delay.is_zero() {
            tokio::time::sleep(options.suggestion_delay).await;
        }
        match cache.source().autocomplete(name).await {
            Ok(mut found) => {
                found.truncate(options.suggestions_per_name);
                suggestions.insert(name.to_lowercase(), found);
            }
            Err(e) => log::debug!("No suggestions for '{name}': {e}"),
        }
    }
    suggestions
}
