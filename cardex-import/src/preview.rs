//! Import previews: what a deck would look like once saved.

use cardex_cache::CardCache;
use cardex_catalog::{
    CardResolution, ParseError, ParsedDeckList, parse_deck_list, validate_commander_deck,
};
use cardex_scryfall::CatalogSource;
use serde::Serialize;

use crate::moxfield::{DeckImportError, MoxfieldClient};
use crate::resolve::{ResolveError, ResolveOptions, resolve_entries};

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Import(#[from] DeckImportError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    pub commander: Option<CardResolution>,
    pub cards: Vec<CardResolution>,
    pub total_cards: u32,
    pub resolved_count: usize,
    pub unresolved_count: usize,
    pub warnings: Vec<String>,
    pub parse_errors: Vec<ParseError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckImportPreview {
    pub preview: ImportPreview,
    pub author_username: Option<String>,
    pub deck_name: String,
    /// Public URL of the imported deck.
    pub source: String,
}

/// Parse pasted deck-list text and resolve it.
pub async fn preview_text<S: CatalogSource>(
    cache: &CardCache<S>,
    text: &str,
    options: &ResolveOptions,
) -> Result<ImportPreview, ResolveError> {
    let parsed = parse_deck_list(text);
    preview_parsed(cache, &parsed, options).await
}

/// Resolve an already-parsed deck list.
pub async fn preview_parsed<S: CatalogSource>(
    cache: &CardCache<S>,
    parsed: &ParsedDeckList,
    options: &ResolveOptions,
) -> Result<ImportPreview, ResolveError> {
    let warnings = validate_commander_deck(parsed);
    let report =
        resolve_entries(cache, &parsed.entries, parsed.commander.as_ref(), options).await?;

    Ok(ImportPreview {
        commander: report.commander,
        cards: report.cards,
        total_cards: parsed.total_cards(),
        resolved_count: report.resolved_count,
        unresolved_count: report.unresolved_count,
        warnings,
        parse_errors: parsed.errors.clone(),
    })
}

/// Fetch a deck from Moxfield and resolve it.
pub async fn preview_deck_import<S: CatalogSource>(
    moxfield: &MoxfieldClient,
    cache: &CardCache<S>,
    id_or_url: &str,
    options: &ResolveOptions,
) -> Result<DeckImportPreview, PreviewError> {
    let deck = moxfield.fetch_deck(id_or_url).await?;
    let preview = preview_parsed(cache, &deck.to_parsed(), options).await?;
    Ok(DeckImportPreview {
        preview,
        source: deck.public_url(),
        author_username: deck.author_username,
        deck_name: deck.name,
    })
}
