//! Batch progress reporting.

use crate::image_cache::BatchCacheSummary;

/// Receives progress updates from batch image caching.
pub trait BatchProgress: Send + Sync {
    /// Called once per card after all of its images were handled, whatever
    /// the outcome.
    fn on_item(&self, completed: usize, total: usize, card_id: &str);

    /// Called when the batch is complete.
    fn on_complete(&self, summary: &BatchCacheSummary);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn on_item(&self, _completed: usize, _total: usize, _card_id: &str) {}
    fn on_complete(&self, _summary: &BatchCacheSummary) {}
}
