//! Card image mirroring.
//!
//! Images are downloaded from the catalog's image host once per card, size,
//! and face, uploaded to an [`ObjectStore`], and the resulting URL is stored
//! on the card record. Every failure along the way degrades to the upstream
//! URL; callers always get something displayable when the catalog has an
//! image at all.

use std::sync::Arc;
use std::time::Duration;

use cardex_catalog::{CardFace, CardRecord, ImageSize};
use cardex_scryfall::CatalogSource;
use futures::StreamExt;
use futures::stream;

use crate::card_cache::CardCache;
use crate::error::CacheError;
use crate::object_store::ObjectStore;
use crate::progress::BatchProgress;

/// Timeout for a single image download.
pub const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Cards processed concurrently during batch caching.
pub const IMAGE_CONCURRENCY: usize = 3;

/// Object key for a card image.
pub fn object_key(card_id: &str, size: ImageSize, face: CardFace) -> String {
    let prefix = match face {
        CardFace::Front => "cards",
        CardFace::Back => "cards-back",
    };
    format!("{prefix}/{size}/{card_id}.jpg")
}

/// What happened to one requested image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Freshly mirrored to object storage.
    Uploaded(String),
    /// A mirrored URL was already on the record.
    AlreadyCached(String),
    /// Storage is unconfigured or mirroring failed; this is the upstream URL.
    Fallback(String),
    /// No record, or the record has no image for this size and face.
    Missing,
}

impl ImageOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Uploaded(url) | Self::AlreadyCached(url) | Self::Fallback(url) => Some(url),
            Self::Missing => None,
        }
    }

    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Uploaded(url) | Self::AlreadyCached(url) | Self::Fallback(url) => Some(url),
            Self::Missing => None,
        }
    }
}

/// Per-image tallies for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCacheSummary {
    pub uploaded: usize,
    pub already_cached: usize,
    pub fallback: usize,
    pub missing: usize,
}

impl BatchCacheSummary {
    fn record(&mut self, outcome: &ImageOutcome) {
        match outcome {
            ImageOutcome::Uploaded(_) => self.uploaded += 1,
            ImageOutcome::AlreadyCached(_) => self.already_cached += 1,
            ImageOutcome::Fallback(_) => self.fallback += 1,
            ImageOutcome::Missing => self.missing += 1,
        }
    }
}

pub struct ImageCache<S> {
    cards: Arc<CardCache<S>>,
    store: Option<Arc<dyn ObjectStore>>,
    fetch_timeout: Duration,
    concurrency: usize,
}

impl<S: CatalogSource> ImageCache<S> {
    /// `store` of `None` means object storage is not configured; image URLs
    /// then always point at the catalog's image host.
    pub fn new(cards: Arc<CardCache<S>>, store: Option<Arc<dyn ObjectStore>>) -> Self {
        Self {
            cards,
            store,
            fetch_timeout: IMAGE_FETCH_TIMEOUT,
            concurrency: IMAGE_CONCURRENCY,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn is_storage_configured(&self) -> bool {
        self.store.is_some()
    }

    /// URL for a card image, mirroring it to object storage on first use.
    pub async fn get_card_image_url(
        &self,
        id: &str,
        size: ImageSize,
        face: CardFace,
    ) -> Result<Option<String>, CacheError> {
        Ok(self.cache_image(id, size, face).await?.into_url())
    }

    /// Like [`get_card_image_url`](Self::get_card_image_url), reporting what
    /// happened.
    pub async fn cache_image(
        &self,
        id: &str,
        size: ImageSize,
        face: CardFace,
    ) -> Result<ImageOutcome, CacheError> {
        match self.cards.get_card(id, false).await? {
            Some(record) => Ok(self.cache_for_record(&record, size, face).await),
            None => Ok(ImageOutcome::Missing),
        }
    }

    /// URL for a card image from the store alone: the mirrored URL if one
    /// exists, else the upstream URL on the stored record. Never fetches.
    pub fn get_card_image_url_fast(
        &self,
        id: &str,
        size: ImageSize,
        face: CardFace,
    ) -> Result<Option<String>, CacheError> {
        let Some(record) = self.cards.cached_record(id)? else {
            return Ok(None);
        };
        Ok(record
            .cached_image_url(size, face)
            .or_else(|| record.upstream_image_url(size, face))
            .map(str::to_string))
    }

    /// Mirror the front image of every card in `ids`.
    pub async fn batch_cache_images(
        &self,
        ids: &[String],
        size: ImageSize,
        progress: &dyn BatchProgress,
    ) -> BatchCacheSummary {
        self.run_batch(ids, size, false, progress).await
    }

    /// Mirror front images, plus back images for double-faced cards.
    pub async fn batch_cache_images_with_back_faces(
        &self,
        ids: &[String],
        size: ImageSize,
        progress: &dyn BatchProgress,
    ) -> BatchCacheSummary {
        self.run_batch(ids, size, true, progress).await
    }

    // ── Internals ──────────────────────────────────────────────────────────

    async fn run_batch(
        &self,
        ids: &[String],
        size: ImageSize,
        back_faces: bool,
        progress: &dyn BatchProgress,
    ) -> BatchCacheSummary {
        let total = ids.len();
        let mut summary = BatchCacheSummary::default();
        let mut completed = 0;

        let mut results = stream::iter(ids)
            .map(|id| async move { (id, self.cache_card_faces(id, size, back_faces).await) })
            .buffer_unordered(self.concurrency);

        while let Some((id, outcomes)) = results.next().await {
            for outcome in &outcomes {
                summary.record(outcome);
            }
            completed += 1;
            progress.on_item(completed, total, id);
        }

        progress.on_complete(&summary);
        summary
    }

    async fn cache_card_faces(
        &self,
        id: &str,
        size: ImageSize,
        back_faces: bool,
    ) -> Vec<ImageOutcome> {
        let record = match self.cards.get_card(id, false).await {
            Ok(Some(record)) => record,
            Ok(None) => return vec![ImageOutcome::Missing],
            Err(e) => {
                log::warn!("Could not load card {id}: {e}");
                return vec![ImageOutcome::Missing];
            }
        };

        let mut outcomes = vec![self.cache_for_record(&record, size, CardFace::Front).await];
        if back_faces && record.has_back_face {
            outcomes.push(self.cache_for_record(&record, size, CardFace::Back).await);
        }
        outcomes
    }

    async fn cache_for_record(
        &self,
        record: &CardRecord,
        size: ImageSize,
        face: CardFace,
    ) -> ImageOutcome {
        if let Some(url) = record.cached_image_url(size, face) {
            return ImageOutcome::AlreadyCached(url.to_string());
        }
        let Some(upstream) = record.upstream_image_url(size, face) else {
            return ImageOutcome::Missing;
        };
        let Some(store) = &self.store else {
            return ImageOutcome::Fallback(upstream.to_string());
        };

        let bytes = match self
            .cards
            .source()
            .download_image(upstream, self.fetch_timeout)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Image download failed for {} ({face} {size}): {e}", record.id);
                return ImageOutcome::Fallback(upstream.to_string());
            }
        };

        let key = object_key(&record.id, size, face);
        let url = match store.put(&key, bytes, "image/jpeg").await {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Image upload failed for {key}: {e}");
                return ImageOutcome::Fallback(upstream.to_string());
            }
        };

        if let Err(e) = self.cards.set_cached_image(&record.id, size, face, &url) {
            log::warn!("Uploaded {key} but could not record its URL: {e}");
        }
        log::debug!("Mirrored {key}");
        ImageOutcome::Uploaded(url)
    }
}
