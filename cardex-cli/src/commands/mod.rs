pub(crate) mod card;
pub(crate) mod config;
pub(crate) mod image;
pub(crate) mod import;
pub(crate) mod maintenance;
pub(crate) mod parse;

use std::sync::Arc;

use cardex_cache::{CardCache, ImageCache};
use cardex_catalog::{CardRecord, CardResolution};
use cardex_scryfall::ScryfallClient;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::time::Duration;

use crate::CliError;
use crate::settings::Settings;

/// Everything a networked command needs, built from settings.
pub(crate) struct AppContext {
    pub settings: Settings,
    pub cache: Arc<CardCache<ScryfallClient>>,
}

impl AppContext {
    pub(crate) fn open(settings: Settings) -> Result<Self, CliError> {
        let client = ScryfallClient::new(settings.client_options())?;
        let conn = cardex_db::open_database(&settings.database_path)?;
        log::debug!("Using card database {}", settings.database_path.display());
        let cache = CardCache::new(Arc::new(client), conn, settings.cache_options());
        Ok(Self {
            settings,
            cache: Arc::new(cache),
        })
    }

    pub(crate) fn image_cache(&self) -> ImageCache<ScryfallClient> {
        ImageCache::new(self.cache.clone(), self.settings.object_store())
            .with_fetch_timeout(Duration::from_secs(self.settings.images.fetch_timeout_secs))
            .with_concurrency(self.settings.images.concurrency)
    }
}

/// One-line summary of a card record.
pub(crate) fn print_card_line(record: &CardRecord) {
    log::info!(
        "  {} {} {}",
        record.name.if_supports_color(Stdout, |t| t.bold()),
        record.mana_cost.as_deref().unwrap_or(""),
        format!("[{} #{}]", record.set_code.to_uppercase(), record.collector_number)
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
}

/// Full card details.
pub(crate) fn print_card(record: &CardRecord) {
    print_card_line(record);
    log::info!("  {}", record.type_line.if_supports_color(Stdout, |t| t.cyan()));
    if let Some(text) = &record.oracle_text {
        for line in text.lines() {
            log::info!("    {}", line);
        }
    }
    log::info!(
        "  Id: {}  Rarity: {}  Mana value: {}",
        record.id,
        record.rarity,
        record.mana_value
    );
    if let Some(usd) = &record.prices.usd {
        log::info!("  Price: ${}", usd);
    }
    if record.commander_eligible {
        log::info!(
            "  {}",
            "Can be your commander".if_supports_color(Stdout, |t| t.green())
        );
    }
    if record.has_back_face {
        log::info!(
            "  {}",
            "Double-faced".if_supports_color(Stdout, |t| t.dimmed())
        );
    }
    log::info!(
        "  Cached: {}",
        record.cached_at.format("%Y-%m-%d %H:%M UTC")
    );
}

/// One resolution line with a status glyph.
pub(crate) fn print_resolution(resolution: &CardResolution) {
    if resolution.resolved {
        log::info!(
            "  {} {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            resolution.quantity,
            resolution.name,
        );
        return;
    }

    let reason = resolution
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_default();
    log::info!(
        "  {} {} {} {}",
        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
        resolution.quantity,
        resolution.name,
        format!("({})", reason).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if !resolution.suggestions.is_empty() {
        log::info!(
            "      Did you mean: {}",
            resolution
                .suggestions
                .join(", ")
                .if_supports_color(Stdout, |t| t.yellow())
        );
    }
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max).collect()
    }
}
