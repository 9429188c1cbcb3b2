use cardex_import::{MoxfieldClient, preview_deck_import};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::Settings;

use super::parse::print_warnings;
use super::{AppContext, print_resolution};

/// Fetch a Moxfield deck and show how it resolves against the catalog.
pub(crate) async fn run_import(settings: Settings, deck: String, json: bool) -> Result<(), CliError> {
    let moxfield = MoxfieldClient::new(settings.moxfield.base_url.as_str(), &settings.user_agent)
        .map_err(cardex_import::PreviewError::from)?;
    let ctx = AppContext::open(settings)?;
    let options = ctx.settings.resolve_options();

    let imported = preview_deck_import(&moxfield, &ctx.cache, &deck, &options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&imported)?);
        return Ok(());
    }

    let preview = &imported.preview;
    log::info!(
        "{} {}",
        imported.deck_name.if_supports_color(Stdout, |t| t.bold()),
        imported
            .author_username
            .as_deref()
            .map(|a| format!("by {}", a))
            .unwrap_or_default()
            .if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("  {}", imported.source.if_supports_color(Stdout, |t| t.cyan()));
    crate::log_blank();

    match &preview.commander {
        Some(commander) => {
            log::info!("{}", "Commander:".if_supports_color(Stdout, |t| t.bold()));
            print_resolution(commander);
        }
        None => log::info!(
            "{}",
            "No commander".if_supports_color(Stdout, |t| t.dimmed())
        ),
    }
    log::info!("{}", "Cards:".if_supports_color(Stdout, |t| t.bold()));
    for card in &preview.cards {
        print_resolution(card);
    }

    crate::log_blank();
    log::info!(
        "{} cards, {} resolved, {} unresolved",
        preview.total_cards,
        preview.resolved_count,
        preview.unresolved_count,
    );
    print_warnings(&preview.warnings);
    Ok(())
}
