//! Progress bar for batch image caching.

use cardex_cache::{BatchCacheSummary, BatchProgress};
use indicatif::{ProgressBar, ProgressStyle};

pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub(crate) fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total as u64)
        };
        bar.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("static pattern")
                .tick_chars("/-\\|")
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }
}

impl BatchProgress for BarProgress {
    fn on_item(&self, completed: usize, _total: usize, card_id: &str) {
        self.bar.set_position(completed as u64);
        self.bar.set_message(card_id.to_string());
    }

    fn on_complete(&self, _summary: &BatchCacheSummary) {
        self.bar.finish_and_clear();
    }
}
