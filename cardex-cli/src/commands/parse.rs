use std::io::Read;
use std::path::{Path, PathBuf};

use cardex_catalog::{
    DeckCategory, ParsedDeckList, generate_deck_list_text, parse_deck_list, unique_card_names,
    validate_commander_deck,
};
use cardex_import::preview_parsed;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::Settings;

use super::{AppContext, print_resolution};

/// Read deck-list text from a file, or stdin for "-".
pub(crate) fn read_deck_text(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a deck list offline and report entries, errors, and warnings.
pub(crate) fn run_parse(path: &Path, json: bool) -> Result<(), CliError> {
    let parsed = parse_deck_list(&read_deck_text(path)?);
    let warnings = validate_commander_deck(&parsed);

    if json {
        let out = serde_json::json!({
            "deck": parsed,
            "unique_names": unique_card_names(&parsed),
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_parsed_summary(&parsed);
    crate::log_blank();
    log::info!("{}", "Normalized list:".if_supports_color(Stdout, |t| t.bold()));
    for line in generate_deck_list_text(&parsed.entries, parsed.commander.as_ref()).lines() {
        log::info!("  {}", line);
    }
    print_warnings(&warnings);
    Ok(())
}

/// Parse a deck list and resolve it against the catalog.
pub(crate) async fn run_parse_resolved(
    settings: Settings,
    path: PathBuf,
    json: bool,
) -> Result<(), CliError> {
    let parsed = parse_deck_list(&read_deck_text(&path)?);
    let ctx = AppContext::open(settings)?;
    let options = ctx.settings.resolve_options();
    let preview = preview_parsed(&ctx.cache, &parsed, &options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    print_parsed_summary(&parsed);
    crate::log_blank();
    if let Some(commander) = &preview.commander {
        log::info!("{}", "Commander:".if_supports_color(Stdout, |t| t.bold()));
        print_resolution(commander);
    }
    log::info!("{}", "Cards:".if_supports_color(Stdout, |t| t.bold()));
    for card in &preview.cards {
        print_resolution(card);
    }
    crate::log_blank();
    log::info!(
        "Resolved {} of {} entries",
        preview.resolved_count,
        preview.cards.len()
    );
    print_warnings(&preview.warnings);
    Ok(())
}

fn print_parsed_summary(parsed: &ParsedDeckList) {
    let count = |category: DeckCategory| -> u32 {
        parsed
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.quantity)
            .sum()
    };

    log::info!(
        "{} {} cards in {} entries",
        "Parsed".if_supports_color(Stdout, |t| t.bold()),
        parsed.total_cards(),
        parsed.entries.len(),
    );
    match &parsed.commander {
        Some(commander) => log::info!(
            "  Commander:   {}",
            commander.name.if_supports_color(Stdout, |t| t.cyan())
        ),
        None => log::info!(
            "  Commander:   {}",
            "none".if_supports_color(Stdout, |t| t.dimmed())
        ),
    }
    log::info!("  Main:        {:>4}", count(DeckCategory::Main));
    log::info!("  Sideboard:   {:>4}", count(DeckCategory::Sideboard));
    log::info!("  Considering: {:>4}", count(DeckCategory::Considering));

    if !parsed.errors.is_empty() {
        crate::log_blank();
        for error in &parsed.errors {
            log::warn!("line {}: {} ({})", error.line, error.message, error.content);
        }
    }
}

pub(crate) fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    crate::log_blank();
    for warning in warnings {
        log::warn!("{}", warning);
    }
}
