#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cardex_cache::{CacheOptions, CardCache, build_record};
use cardex_catalog::ImageUris;
use cardex_scryfall::{CatalogSource, CollectionResult, ScryfallCard, ScryfallCardFace, ScryfallError};
use chrono::Utc;

/// In-memory catalog that counts every call made against it.
#[derive(Default)]
pub struct FakeSource {
    cards: Mutex<HashMap<String, ScryfallCard>>,
    images: Mutex<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
    pub get_card_calls: AtomicUsize,
    pub by_name_calls: AtomicUsize,
    pub by_ids_calls: AtomicUsize,
    pub by_names_calls: AtomicUsize,
    pub autocomplete_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_cards(cards: Vec<ScryfallCard>) -> Self {
        let source = Self::default();
        for card in cards {
            source.add_card(card);
        }
        source
    }

    pub fn add_card(&self, card: ScryfallCard) {
        self.cards.lock().unwrap().insert(card.id.clone(), card);
    }

    pub fn remove_card(&self, id: &str) {
        self.cards.lock().unwrap().remove(id);
    }

    pub fn add_image(&self, url: &str, bytes: &[u8]) {
        self.images
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn total_calls(&self) -> usize {
        [
            &self.get_card_calls,
            &self.by_name_calls,
            &self.by_ids_calls,
            &self.by_names_calls,
            &self.autocomplete_calls,
            &self.download_calls,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    fn check_online(&self) -> Result<(), ScryfallError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ScryfallError::ServerError {
                status: 503,
                message: "offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn get_card(&self, id: &str) -> Result<Option<ScryfallCard>, ScryfallError> {
        self.get_card_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.cards.lock().unwrap().get(id).cloned())
    }

    async fn get_card_by_name(
        &self,
        name: &str,
        _fuzzy: bool,
    ) -> Result<Option<ScryfallCard>, ScryfallError> {
        self.by_name_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self
            .cards
            .lock()
            .unwrap()
            .values()
            .find(|c| c.matches_name(name))
            .cloned())
    }

    async fn get_cards_by_ids(&self, ids: &[String]) -> Result<Vec<ScryfallCard>, ScryfallError> {
        self.by_ids_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let cards = self.cards.lock().unwrap();
        Ok(ids.iter().filter_map(|id| cards.get(id).cloned()).collect())
    }

    async fn get_cards_by_names(
        &self,
        names: &[String],
    ) -> Result<CollectionResult, ScryfallError> {
        self.by_names_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let cards = self.cards.lock().unwrap();
        let mut result = CollectionResult::default();
        for name in names {
            match cards.values().find(|c| c.matches_name(name)) {
                Some(card) => result.cards.push(card.clone()),
                None => result.not_found.push(name.clone()),
            }
        }
        Ok(result)
    }

    async fn autocomplete(&self, _query: &str) -> Result<Vec<String>, ScryfallError> {
        self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(Vec::new())
    }

    async fn download_image(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, ScryfallError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.images
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(ScryfallError::Timeout(timeout))
    }
}

pub fn image_url(id: &str, face: &str) -> String {
    format!("https://img.test/{face}/{id}.jpg")
}

fn uris(url: String) -> ImageUris {
    ImageUris {
        small: Some(url.replace(".jpg", "-small.jpg")),
        normal: Some(url.clone()),
        large: Some(url.replace(".jpg", "-large.jpg")),
        ..ImageUris::default()
    }
}

/// A single-faced card with images.
pub fn card(id: &str, name: &str) -> ScryfallCard {
    ScryfallCard {
        id: id.to_string(),
        oracle_id: Some(format!("oracle-{id}")),
        name: name.to_string(),
        layout: "normal".to_string(),
        type_line: Some("Artifact".to_string()),
        mana_cost: Some("{1}".to_string()),
        cmc: 1.0,
        colors: Some(vec![]),
        set: "cmm".to_string(),
        set_name: "Commander Masters".to_string(),
        collector_number: "1".to_string(),
        rarity: "uncommon".to_string(),
        legalities: [("commander".to_string(), "legal".to_string())]
            .into_iter()
            .collect(),
        image_uris: Some(uris(image_url(id, "front"))),
        ..ScryfallCard::default()
    }
}

/// A transform card with distinct front and back images.
pub fn double_faced(id: &str, front: &str, back: &str) -> ScryfallCard {
    ScryfallCard {
        id: id.to_string(),
        name: format!("{front} // {back}"),
        layout: "transform".to_string(),
        cmc: 1.0,
        card_faces: vec![
            ScryfallCardFace {
                name: front.to_string(),
                type_line: Some("Creature — Human Wizard".to_string()),
                image_uris: Some(uris(image_url(id, "front"))),
                ..ScryfallCardFace::default()
            },
            ScryfallCardFace {
                name: back.to_string(),
                type_line: Some("Creature — Human Insect".to_string()),
                image_uris: Some(uris(image_url(id, "back"))),
                ..ScryfallCardFace::default()
            },
        ],
        ..ScryfallCard::default()
    }
}

pub fn new_cache(source: Arc<FakeSource>) -> CardCache<FakeSource> {
    let conn = cardex_db::open_memory().unwrap();
    CardCache::new(source, conn, CacheOptions::default())
}

/// A cache whose store already holds `stale` cards cached 31 days ago.
pub fn cache_with_stale(source: Arc<FakeSource>, stale: &[ScryfallCard]) -> CardCache<FakeSource> {
    let conn = cardex_db::open_memory().unwrap();
    let old = Utc::now() - chrono::Duration::days(31);
    for card in stale {
        cardex_db::upsert_card(&conn, &build_record(card, old)).unwrap();
    }
    CardCache::new(source, conn, CacheOptions::default())
}
