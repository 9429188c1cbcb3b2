use cardex_cache::LookupState;
use cardex_scryfall::ScryfallCard;
use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::Settings;

use super::{AppContext, print_card, truncate_str};

fn describe_state(state: LookupState) -> &'static str {
    match state {
        LookupState::FreshHit => "from cache",
        LookupState::StaleHitRefreshOk => "refreshed from catalog",
        LookupState::StaleHitRefreshFailed => "stale copy, catalog unavailable",
        LookupState::MissFetchOk => "fetched from catalog",
        LookupState::MissFetchFailed => "not found",
    }
}

/// Show a card by catalog id.
pub(crate) async fn run_card(
    settings: Settings,
    id: String,
    refresh: bool,
    printings: bool,
) -> Result<(), CliError> {
    let ctx = AppContext::open(settings)?;
    let lookup = ctx.cache.lookup(&id, refresh).await?;

    match &lookup.record {
        Some(record) => {
            print_card(record);
            log::info!(
                "  {}",
                format!("({})", describe_state(lookup.state))
                    .if_supports_color(Stdout, |t| t.dimmed())
            );
            if lookup.state == LookupState::StaleHitRefreshFailed {
                let age = Utc::now() - record.cached_at;
                log::warn!("Record is {} days old", age.num_days());
            }
        }
        None => log::warn!("No card with id {}", id),
    }

    let oracle_id = lookup
        .record
        .as_ref()
        .and_then(|r| r.oracle_id.as_deref())
        .filter(|_| printings);
    if let Some(oracle_id) = oracle_id {
        let cards = ctx.cache.source().get_card_printings(oracle_id).await?;
        crate::log_blank();
        log::info!(
            "{} ({})",
            "Printings".if_supports_color(Stdout, |t| t.bold()),
            cards.len()
        );
        for card in &cards {
            log::info!(
                "  {:<6} #{:<6} {}",
                card.set.to_uppercase(),
                card.collector_number,
                card.set_name.if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }
    Ok(())
}

/// Look up a card by name, exact or fuzzy.
pub(crate) async fn run_named(settings: Settings, name: String, fuzzy: bool) -> Result<(), CliError> {
    let ctx = AppContext::open(settings)?;
    match ctx.cache.get_card_by_name(&name, fuzzy).await? {
        Some(record) => print_card(&record),
        None => {
            log::warn!("No card named '{}'", name);
            let suggestions = ctx.cache.source().autocomplete(&name).await?;
            if !suggestions.is_empty() {
                log::info!(
                    "  Did you mean: {}",
                    suggestions
                        .iter()
                        .take(5)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                        .if_supports_color(Stdout, |t| t.yellow())
                );
            }
        }
    }
    Ok(())
}

/// Search the catalog, or cached names when `cached` is set.
pub(crate) async fn run_search(
    settings: Settings,
    query: String,
    page: u32,
    cached: bool,
) -> Result<(), CliError> {
    let ctx = AppContext::open(settings)?;

    if cached {
        let names = ctx.cache.cached_names(&query, 50)?;
        if names.is_empty() {
            log::info!(
                "{}",
                "No cached cards match.".if_supports_color(Stdout, |t| t.dimmed())
            );
        }
        for name in names {
            log::info!("  {}", name);
        }
        return Ok(());
    }

    let results = ctx.cache.source().search_cards(&query, page).await?;
    if results.cards.is_empty() {
        log::info!(
            "{}",
            "No cards match.".if_supports_color(Stdout, |t| t.dimmed())
        );
        return Ok(());
    }

    // Search results are complete card objects.
    ctx.cache.record_fetched(&results.cards)?;

    log::info!(
        "{} {} cards (page {})",
        "Found".if_supports_color(Stdout, |t| t.bold()),
        results.total_cards,
        page.max(1),
    );
    for card in &results.cards {
        print_search_row(card);
    }
    if results.has_more {
        log::info!(
            "{}",
            format!("More results: --page {}", page.max(1) + 1)
                .if_supports_color(Stdout, |t| t.dimmed())
        );
    }
    Ok(())
}

fn print_search_row(card: &ScryfallCard) {
    log::info!(
        "  {:<40} {:<12} {}",
        truncate_str(&card.name, 40),
        card.set.to_uppercase(),
        truncate_str(&card.full_type_line(), 40).if_supports_color(Stdout, |t| t.dimmed()),
    );
}
