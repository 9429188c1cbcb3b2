use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::Settings;

use super::AppContext;

/// Refresh up to `limit` of the oldest stale records.
pub(crate) async fn run_refresh_stale(settings: Settings, limit: usize) -> Result<(), CliError> {
    let ctx = AppContext::open(settings)?;
    let summary = ctx.cache.refresh_stale(limit).await?;

    if summary.requested == 0 {
        log::info!(
            "{}",
            "No stale records.".if_supports_color(Stdout, |t| t.dimmed())
        );
        return Ok(());
    }
    log::info!(
        "{} Refreshed {} of {} stale records",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.refreshed,
        summary.requested,
    );
    if summary.refreshed < summary.requested {
        log::warn!(
            "{} records were not returned by the catalog",
            summary.requested - summary.refreshed
        );
    }
    Ok(())
}

/// Show card cache statistics. Never touches the network.
pub(crate) fn run_stats(settings: &Settings) -> Result<(), CliError> {
    let db_path = &settings.database_path;
    if !db_path.exists() {
        log::warn!("No card database found at {}", db_path.display());
        log::info!("Run 'cardex card <id>' or 'cardex import <deck>' to create one.");
        return Ok(());
    }

    let conn = cardex_db::open_database(db_path)?;
    let cutoff = Utc::now() - settings.cache_options().stale_after;
    let stats = cardex_db::cache_stats(&conn, cutoff)
        .map_err(|e| CliError::Cache(e.into()))?;

    log::info!(
        "{}",
        "Card Cache Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Cards:             {:>8}", stats.cards);
    log::info!(
        "  Stale:             {:>8} (older than {} days)",
        stats.stale,
        settings.stale_after_days
    );
    log::info!("  Double-faced:      {:>8}", stats.double_faced);
    log::info!("  Mirrored images:   {:>8}", stats.with_cached_images);
    log::info!("  Commanders:        {:>8}", stats.commander_eligible);
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        log::info!("  Oldest:            {}", oldest.format("%Y-%m-%d"));
        log::info!("  Newest:            {}", newest.format("%Y-%m-%d"));
    }
    Ok(())
}
