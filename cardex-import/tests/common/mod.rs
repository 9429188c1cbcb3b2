#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cardex_cache::{CacheOptions, CardCache};
use cardex_scryfall::{CatalogSource, CollectionResult, ScryfallCard, ScryfallError};

/// In-memory catalog that records every call made against it.
#[derive(Default)]
pub struct FakeSource {
    cards: Mutex<Vec<ScryfallCard>>,
    completions: Mutex<HashMap<String, Vec<String>>>,
    offline: AtomicBool,
    pub by_ids_calls: AtomicUsize,
    pub by_names_calls: AtomicUsize,
    pub names_requested: Mutex<Vec<Vec<String>>>,
    pub autocomplete_queries: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_cards(cards: Vec<ScryfallCard>) -> Self {
        let source = Self::default();
        *source.cards.lock().unwrap() = cards;
        source
    }

    pub fn complete(&self, query: &str, results: &[&str]) {
        self.completions.lock().unwrap().insert(
            query.to_lowercase(),
            results.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), ScryfallError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ScryfallError::RateLimit);
        }
        Ok(())
    }

    fn find(&self, pred: impl Fn(&ScryfallCard) -> bool) -> Option<ScryfallCard> {
        self.cards.lock().unwrap().iter().find(|c| pred(c)).cloned()
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn get_card(&self, id: &str) -> Result<Option<ScryfallCard>, ScryfallError> {
        self.check_online()?;
        Ok(self.find(|c| c.id == id))
    }

    async fn get_card_by_name(
        &self,
        name: &str,
        _fuzzy: bool,
    ) -> Result<Option<ScryfallCard>, ScryfallError> {
        self.check_online()?;
        Ok(self.find(|c| c.matches_name(name)))
    }

    async fn get_cards_by_ids(&self, ids: &[String]) -> Result<Vec<ScryfallCard>, ScryfallError> {
        self.by_ids_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(ids.iter().filter_map(|id| self.find(|c| &c.id == id)).collect())
    }

    async fn get_cards_by_names(
        &self,
        names: &[String],
    ) -> Result<CollectionResult, ScryfallError> {
        self.by_names_calls.fetch_add(1, Ordering::SeqCst);
        self.names_requested.lock().unwrap().push(names.to_vec());
        self.check_online()?;
        let mut result = CollectionResult::default();
        for name in names {
            match self.find(|c| c.matches_name(name)) {
                Some(card) => result.cards.push(card),
                None => result.not_found.push(name.clone()),
            }
        }
        Ok(result)
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ScryfallError> {
        self.autocomplete_queries
            .lock()
            .unwrap()
            .push(query.to_string());
        self.check_online()?;
        Ok(self
            .completions
            .lock()
            .unwrap()
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn download_image(&self, _url: &str, timeout: Duration) -> Result<Vec<u8>, ScryfallError> {
        Err(ScryfallError::Timeout(timeout))
    }
}

pub fn card(id: &str, name: &str, type_line: &str) -> ScryfallCard {
    ScryfallCard {
        id: id.to_string(),
        name: name.to_string(),
        layout: "normal".to_string(),
        type_line: Some(type_line.to_string()),
        legalities: [("commander".to_string(), "legal".to_string())]
            .into_iter()
            .collect(),
        ..ScryfallCard::default()
    }
}

pub fn catalog() -> Vec<ScryfallCard> {
    vec![
        card("sol", "Sol Ring", "Artifact"),
        card("kenrith", "Kenrith, the Returned King", "Legendary Creature — Human Noble"),
        card("forest", "Forest", "Basic Land — Forest"),
        card("signet", "Arcane Signet", "Artifact"),
        card("fire-ice", "Fire // Ice", "Instant // Instant"),
    ]
}

pub fn new_cache(source: Arc<FakeSource>) -> CardCache<FakeSource> {
    CardCache::new(source, cardex_db::open_memory().unwrap(), CacheOptions::default())
}
