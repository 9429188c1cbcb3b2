//! Deck import from Moxfield.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use cardex_catalog::{DeckCategory, ParsedCardEntry, ParsedDeckList};
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::Duration;

pub const DEFAULT_MOXFIELD_URL: &str = "https://api2.moxfield.com/v3";

static DECK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.)?moxfield\.com/decks/([A-Za-z0-9_-]+)(?:[/?#].*)?$")
        .expect("static pattern")
});
static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{8,}$").expect("static pattern"));

/// Boards that become deck entries, in output order.
const BOARDS: &[(&str, DeckCategory)] = &[
    ("commanders", DeckCategory::Commander),
    ("mainboard", DeckCategory::Main),
    ("sideboard", DeckCategory::Sideboard),
    ("companions", DeckCategory::Sideboard),
    ("maybeboard", DeckCategory::Considering),
];

#[derive(Debug, thiserror::Error)]
pub enum DeckImportError {
    #[error("Not a Moxfield deck URL or id: {0}")]
    InvalidUrl(String),
    #[error("Deck not found: {0}")]
    DeckNotFound(String),
    #[error("Deck is private: {0}")]
    PrivateDeck(String),
    #[error("Rate limited by Moxfield; try again shortly")]
    RateLimited,
    #[error("Moxfield API error: {0}")]
    ApiError(String),
}

/// A deck fetched from the host, normalized into parser entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDeck {
    pub deck_id: String,
    pub name: String,
    pub author_username: Option<String>,
    pub public_id: Option<String>,
    pub entries: Vec<ParsedCardEntry>,
    /// The first listed commander. Partners stay in `entries`.
    pub commander: Option<ParsedCardEntry>,
}

impl ImportedDeck {
    pub fn to_parsed(&self) -> ParsedDeckList {
        ParsedDeckList {
            entries: self.entries.clone(),
            commander: self.commander.clone(),
            errors: Vec::new(),
        }
    }

    pub fn public_url(&self) -> String {
        let id = self.public_id.as_deref().unwrap_or(&self.deck_id);
        format!("https://moxfield.com/decks/{id}")
    }
}

/// Pull a deck id out of a Moxfield URL, or accept a bare id.
pub fn extract_deck_id(input: &str) -> Option<String> {
    let input = input.trim();
    if let Some(caps) = DECK_URL.captures(input) {
        return Some(caps[1].to_string());
    }
    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }
    None
}

pub struct MoxfieldClient {
    http: reqwest::Client,
    base_url: String,
}

impl MoxfieldClient {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self, DeckImportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .map_err(|e| DeckImportError::ApiError(e.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a deck by URL or id.
    pub async fn fetch_deck(&self, id_or_url: &str) -> Result<ImportedDeck, DeckImportError> {
        let deck_id = extract_deck_id(id_or_url)
            .ok_or_else(|| DeckImportError::InvalidUrl(id_or_url.trim().to_string()))?;

        log::debug!("Fetching Moxfield deck {deck_id}");
        let resp = self
            .http
            .get(format!("{}/decks/all/{}", self.base_url, deck_id))
            .send()
            .await
            .map_err(|e| DeckImportError::ApiError(e.to_string()))?;

        if let Some(err) = status_error(resp.status(), &deck_id) {
            return Err(err);
        }

        let text = resp
            .text()
            .await
            .map_err(|e| DeckImportError::ApiError(e.to_string()))?;
        let deck = decode_deck(&text)?;

        let imported = normalize_deck(&deck_id, deck);
        log::info!(
            "Imported '{}' ({} entries) from Moxfield",
            imported.name,
            imported.entries.len()
        );
        Ok(imported)
    }
}

/// Map a non-success response status to the matching import error.
fn status_error(status: StatusCode, deck_id: &str) -> Option<DeckImportError> {
    match status {
        StatusCode::NOT_FOUND => Some(DeckImportError::DeckNotFound(deck_id.to_string())),
        StatusCode::FORBIDDEN => Some(DeckImportError::PrivateDeck(deck_id.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Some(DeckImportError::RateLimited),
        s if !s.is_success() => Some(DeckImportError::ApiError(format!("HTTP {s}"))),
        _ => None,
    }
}

fn decode_deck(body: &str) -> Result<MoxfieldDeck, DeckImportError> {
    serde_json::from_str(body)
        .map_err(|e| DeckImportError::ApiError(format!("Failed to parse deck: {e}")))
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoxfieldDeck {
    #[serde(default)]
    name: String,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    created_by_user: Option<MoxfieldUser>,
    #[serde(default)]
    boards: BTreeMap<String, MoxfieldBoard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoxfieldUser {
    user_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MoxfieldBoard {
    #[serde(default)]
    cards: BTreeMap<String, MoxfieldBoardCard>,
}

#[derive(Debug, Deserialize)]
struct MoxfieldBoardCard {
    quantity: u32,
    card: MoxfieldCard,
}

#[derive(Debug, Deserialize)]
struct MoxfieldCard {
    name: String,
    #[serde(default)]
    scryfall_id: Option<String>,
}

/// Flatten the host's boards into entries. Within a board, entries are
/// ordered by name.
pub(crate) fn normalize_deck(deck_id: &str, deck: MoxfieldDeck) -> ImportedDeck {
    let mut entries = Vec::new();
    for (board_name, category) in BOARDS {
        let Some(board) = deck.boards.get(*board_name) else {
            continue;
        };
        let mut cards: Vec<&MoxfieldBoardCard> =
            board.cards.values().filter(|c| c.quantity > 0).collect();
        cards.sort_by(|a, b| a.card.name.cmp(&b.card.name));
        for board_card in cards {
            let mut entry =
                ParsedCardEntry::new(board_card.card.name.clone(), board_card.quantity, *category);
            if let Some(id) = &board_card.card.scryfall_id {
                entry = entry.with_catalog_id(id.clone());
            }
            entries.push(entry);
        }
    }

    let commander = entries
        .iter()
        .find(|e| e.category == DeckCategory::Commander)
        .cloned();

    ImportedDeck {
        deck_id: deck_id.to_string(),
        name: deck.name,
        author_username: deck.created_by_user.map(|u| u.user_name),
        public_id: deck.public_id,
        entries,
        commander,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_urls() {
        for input in [
            "https://www.moxfield.com/decks/AbC123xyz_-9",
            "https://moxfield.com/decks/AbC123xyz_-9",
            "moxfield.com/decks/AbC123xyz_-9/",
            "https://www.moxfield.com/decks/AbC123xyz_-9?tab=stats",
            "https://www.moxfield.com/decks/AbC123xyz_-9#primer",
            "  https://www.moxfield.com/decks/AbC123xyz_-9/history  ",
        ] {
            assert_eq!(extract_deck_id(input).as_deref(), Some("AbC123xyz_-9"), "{input}");
        }
    }

    #[test]
    fn test_extract_bare_id() {
        assert_eq!(extract_deck_id("AbCdEfGh").as_deref(), Some("AbCdEfGh"));
        assert!(extract_deck_id("short").is_none());
        assert!(extract_deck_id("has spaces in it").is_none());
        assert!(extract_deck_id("https://archidekt.com/decks/12345678").is_none());
        assert!(extract_deck_id("").is_none());
    }

    #[test]
    fn test_normalize_boards() {
        let body = r#"{
            "name": "Kenrith Politics",
            "publicId": "pub123",
            "createdByUser": {"userName": "spellslinger"},
            "boards": {
                "commanders": {"count": 2, "cards": {
                    "k1": {"quantity": 1, "card": {"name": "Tymna the Weaver", "scryfall_id": "tymna-id"}},
                    "k2": {"quantity": 1, "card": {"name": "Thrasios, Triton Hero", "scryfall_id": "thras-id"}}
                }},
                "mainboard": {"count": 11, "cards": {
                    "m1": {"quantity": 1, "card": {"name": "Sol Ring", "scryfall_id": "sol-id"}},
                    "m2": {"quantity": 10, "card": {"name": "Forest"}}
                }},
                "sideboard": {"count": 0, "cards": {}},
                "maybeboard": {"count": 1, "cards": {
                    "x1": {"quantity": 1, "card": {"name": "Cyclonic Rift", "scryfall_id": "rift-id"}}
                }},
                "tokens": {"count": 1, "cards": {
                    "t1": {"quantity": 1, "card": {"name": "Treasure"}}
                }}
            }
        }"#;
        let deck: MoxfieldDeck = serde_json::from_str(body).unwrap();
        let imported = normalize_deck("abc12345", deck);

        assert_eq!(imported.name, "Kenrith Politics");
        assert_eq!(imported.author_username.as_deref(), Some("spellslinger"));
        assert_eq!(imported.public_url(), "https://moxfield.com/decks/pub123");

        let names: Vec<_> = imported.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Thrasios, Triton Hero",
                "Tymna the Weaver",
                "Forest",
                "Sol Ring",
                "Cyclonic Rift"
            ]
        );
        let commander = imported.commander.as_ref().unwrap();
        assert_eq!(commander.name, "Thrasios, Triton Hero");
        assert_eq!(commander.catalog_id.as_deref(), Some("thras-id"));
        assert_eq!(imported.entries[1].category, DeckCategory::Commander);
        assert_eq!(imported.entries[2].catalog_id, None);
        assert_eq!(imported.entries[4].category, DeckCategory::Considering);
        assert_eq!(imported.to_parsed().total_cards(), 14);
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::OK, "abc12345").is_none());
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "abc12345"),
            Some(DeckImportError::DeckNotFound(id)) if id == "abc12345"
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "abc12345"),
            Some(DeckImportError::PrivateDeck(id)) if id == "abc12345"
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "abc12345"),
            Some(DeckImportError::RateLimited)
        ));
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::UNAUTHORIZED,
        ] {
            assert!(matches!(
                status_error(status, "abc12345"),
                Some(DeckImportError::ApiError(msg)) if msg.contains(status.as_str())
            ));
        }
    }

    #[test]
    fn test_malformed_body_is_api_error() {
        let err = decode_deck("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, DeckImportError::ApiError(msg) if msg.starts_with("Failed to parse deck")));

        let deck = decode_deck(r#"{"name": "Empty"}"#).unwrap();
        assert_eq!(normalize_deck("abc12345", deck).entries.len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        // Nothing listens on port 9; an attempted request would be ApiError.
        let client = MoxfieldClient::new("http://127.0.0.1:9", "cardex-test").unwrap();
        let err = client.fetch_deck("not a deck").await.unwrap_err();
        assert!(matches!(err, DeckImportError::InvalidUrl(_)));
    }
}
