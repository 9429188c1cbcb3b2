//! Write operations for cached card records.

use cardex_catalog::types::*;
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

// ── Card Operations ─────────────────────────────────────────────────────────

/// Insert or update a card record.
///
/// On conflict every catalog-sourced column and `cached_at` are replaced.
/// Cached image URLs are written only for new rows; an existing row keeps
/// whatever object-storage URLs it already had.
pub fn upsert_card(conn: &Connection, card: &CardRecord) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO cards (id, oracle_id, name, layout, type_line, mana_cost, mana_value,
                            colors, color_identity, oracle_text, set_code, set_name,
                            collector_number, rarity, prices, legalities, has_back_face,
                            image_uris, back_image_uris,
                            cached_image_small, cached_image_normal, cached_image_large,
                            cached_back_image_small, cached_back_image_normal, cached_back_image_large,
                            commander_eligible, cached_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)
         ON CONFLICT(id) DO UPDATE SET
             oracle_id = excluded.oracle_id,
             name = excluded.name,
             layout = excluded.layout,
             type_line = excluded.type_line,
             mana_cost = excluded.mana_cost,
             mana_value = excluded.mana_value,
             colors = excluded.colors,
             color_identity = excluded.color_identity,
             oracle_text = excluded.oracle_text,
             set_code = excluded.set_code,
             set_name = excluded.set_name,
             collector_number = excluded.collector_number,
             rarity = excluded.rarity,
             prices = excluded.prices,
             legalities = excluded.legalities,
             has_back_face = excluded.has_back_face,
             image_uris = excluded.image_uris,
             back_image_uris = excluded.back_image_uris,
             commander_eligible = excluded.commander_eligible,
             cached_at = excluded.cached_at",
        params![
            card.id,
            card.oracle_id,
            card.name,
            card.layout,
            card.type_line,
            card.mana_cost,
            card.mana_value,
            serde_json::to_string(&card.colors)?,
            serde_json::to_string(&card.color_identity)?,
            card.oracle_text,
            card.set_code,
            card.set_name,
            card.collector_number,
            card.rarity,
            serde_json::to_string(&card.prices)?,
            serde_json::to_string(&card.legalities)?,
            card.has_back_face,
            optional_json(card.image_uris.as_ref())?,
            optional_json(card.back_image_uris.as_ref())?,
            card.cached_images.small,
            card.cached_images.normal,
            card.cached_images.large,
            card.cached_back_images.small,
            card.cached_back_images.normal,
            card.cached_back_images.large,
            card.commander_eligible,
            card.cached_at,
        ],
    )?;
    Ok(())
}

/// Replace the alternate names a card can be found under.
pub fn upsert_card_aliases(
    conn: &Connection,
    card_id: &str,
    aliases: &[String],
) -> Result<(), OperationError> {
    conn.execute(
        "DELETE FROM card_aliases WHERE card_id = ?1",
        params![card_id],
    )?;
    for alias in aliases {
        conn.execute(
            "INSERT OR IGNORE INTO card_aliases (card_id, alias) VALUES (?1, ?2)",
            params![card_id, alias],
        )?;
    }
    Ok(())
}

/// Record the object-storage URL for one size and face of a card.
pub fn set_cached_image_url(
    conn: &Connection,
    card_id: &str,
    size: ImageSize,
    face: CardFace,
    url: &str,
) -> Result<(), OperationError> {
    let column = cached_image_column(size, face);
    let updated = conn.execute(
        &format!("UPDATE cards SET {column} = ?1 WHERE id = ?2"),
        params![url, card_id],
    )?;
    if updated == 0 {
        return Err(OperationError::NotFound {
            entity_type: "card".to_string(),
            id: card_id.to_string(),
        });
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn cached_image_column(size: ImageSize, face: CardFace) -> &'static str {
    match (face, size) {
        (CardFace::Front, ImageSize::Small) => "cached_image_small",
        (CardFace::Front, ImageSize::Normal) => "cached_image_normal",
        (CardFace::Front, ImageSize::Large) => "cached_image_large",
        (CardFace::Back, ImageSize::Small) => "cached_back_image_small",
        (CardFace::Back, ImageSize::Normal) => "cached_back_image_normal",
        (CardFace::Back, ImageSize::Large) => "cached_back_image_large",
    }
}

fn optional_json<T: serde::Serialize>(value: Option<&T>) -> Result<Option<String>, OperationError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(Into::into)
}
