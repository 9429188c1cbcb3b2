//! Read queries for the card cache.

use cardex_catalog::types::*;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use serde::de::DeserializeOwned;

use crate::operations::OperationError;

const CARD_COLUMNS: &str = "id, oracle_id, name, layout, type_line, mana_cost, mana_value,
    colors, color_identity, oracle_text, set_code, set_name, collector_number, rarity,
    prices, legalities, has_back_face, image_uris, back_image_uris,
    cached_image_small, cached_image_normal, cached_image_large,
    cached_back_image_small, cached_back_image_normal, cached_back_image_large,
    commander_eligible, cached_at";

// ── Card Lookups ────────────────────────────────────────────────────────────

/// Fetch one card by catalog id.
pub fn get_card(conn: &Connection, id: &str) -> Result<Option<CardRecord>, OperationError> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"))?;
    let result = stmt.query_row(params![id], row_to_card);
    match result {
        Ok(card) => Ok(Some(card)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch every cached card among `ids`, in the order requested. Ids with no
/// row are skipped.
pub fn get_cards(conn: &Connection, ids: &[String]) -> Result<Vec<CardRecord>, OperationError> {
    let mut cards = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(card) = get_card(conn, id)? {
            cards.push(card);
        }
    }
    Ok(cards)
}

/// Find a card by name (case-insensitive), also matching face names of
/// multi-faced cards. When several printings share a name, the most
/// recently cached one wins.
pub fn find_card_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<CardRecord>, OperationError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {CARD_COLUMNS} FROM cards
         WHERE name = ?1 COLLATE NOCASE
            OR id IN (SELECT card_id FROM card_aliases WHERE alias = ?1 COLLATE NOCASE)
         ORDER BY (name = ?1 COLLATE NOCASE) DESC, cached_at DESC
         LIMIT 1"
    ))?;
    let result = stmt.query_row(params![name], row_to_card);
    match result {
        Ok(card) => Ok(Some(card)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Cached card names starting with `prefix`, alphabetically.
pub fn search_card_names(
    conn: &Connection,
    prefix: &str,
    limit: usize,
) -> Result<Vec<String>, OperationError> {
    let pattern = format!("{}%", escape_like(prefix));
    let mut stmt = conn.prepare(
        "SELECT DISTINCT name FROM cards
         WHERE name LIKE ?1 ESCAPE '\\'
         ORDER BY name COLLATE NOCASE LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![pattern, limit as i64], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Ids of cards cached before `cutoff`, oldest first.
pub fn stale_card_ids(
    conn: &Connection,
    cutoff: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<String>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM cards WHERE cached_at < ?1 ORDER BY cached_at ASC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![cutoff, limit as i64], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Summary statistics for the card cache. `stale_cutoff` marks the
/// freshness boundary: rows cached before it count as stale.
pub fn cache_stats(
    conn: &Connection,
    stale_cutoff: DateTime<Utc>,
) -> Result<CacheStats, OperationError> {
    let cards: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0))?;
    let stale: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cards WHERE cached_at < ?1",
        params![stale_cutoff],
        |r| r.get(0),
    )?;
    let double_faced: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cards WHERE has_back_face = 1",
        [],
        |r| r.get(0),
    )?;
    let with_cached_images: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cards
         WHERE cached_image_small IS NOT NULL
            OR cached_image_normal IS NOT NULL
            OR cached_image_large IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let commander_eligible: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cards WHERE commander_eligible = 1",
        [],
        |r| r.get(0),
    )?;
    let (oldest, newest): (Option<DateTime<Utc>>, Option<DateTime<Utc>>) = conn.query_row(
        "SELECT MIN(cached_at), MAX(cached_at) FROM cards",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;

    Ok(CacheStats {
        cards,
        stale,
        double_faced,
        with_cached_images,
        commander_eligible,
        oldest,
        newest,
    })
}

/// Summary statistics for the card cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub cards: i64,
    pub stale: i64,
    pub double_faced: i64,
    pub with_cached_images: i64,
    pub commander_eligible: i64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

fn row_to_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<CardRecord> {
    Ok(CardRecord {
        id: row.get(0)?,
        oracle_id: row.get(1)?,
        name: row.get(2)?,
        layout: row.get(3)?,
        type_line: row.get(4)?,
        mana_cost: row.get(5)?,
        mana_value: row.get(6)?,
        colors: json_column(row, 7)?,
        color_identity: json_column(row, 8)?,
        oracle_text: row.get(9)?,
        set_code: row.get(10)?,
        set_name: row.get(11)?,
        collector_number: row.get(12)?,
        rarity: row.get(13)?,
        prices: json_column(row, 14)?,
        legalities: json_column(row, 15)?,
        has_back_face: row.get(16)?,
        image_uris: optional_json_column(row, 17)?,
        back_image_uris: optional_json_column(row, 18)?,
        cached_images: CachedImageUrls {
            small: row.get(19)?,
            normal: row.get(20)?,
            large: row.get(21)?,
        },
        cached_back_images: CachedImageUrls {
            small: row.get(22)?,
            normal: row.get(23)?,
            large: row.get(24)?,
        },
        commander_eligible: row.get(25)?,
        cached_at: row.get(26)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_json_column<T: DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        serde_json::from_str(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
