//! Data model types for deck lists and the card record cache.
//!
//! Deck-side types ([`ParsedCardEntry`], [`ParseError`], [`ParsedDeckList`])
//! come out of the text parser or a deck-host import. Catalog-side types
//! ([`CardRecord`] and its image bundles) are what the record cache persists.
//! [`CardResolution`] joins the two.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Records older than this many days are considered stale.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 30;

// ── Deck Entries ────────────────────────────────────────────────────────────

/// Which part of a deck an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeckCategory {
    #[default]
    Main,
    Commander,
    Sideboard,
    Considering,
}

impl DeckCategory {
    /// Order in which categories are written out by the deck-list generator.
    pub const EXPORT_ORDER: [DeckCategory; 4] = [
        DeckCategory::Commander,
        DeckCategory::Main,
        DeckCategory::Sideboard,
        DeckCategory::Considering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Commander => "commander",
            Self::Sideboard => "sideboard",
            Self::Considering => "considering",
        }
    }

    /// Section header text understood by the parser.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Main => "Deck",
            Self::Commander => "Commander",
            Self::Sideboard => "Sideboard",
            Self::Considering => "Considering",
        }
    }
}

impl fmt::Display for DeckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One card line of a deck list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCardEntry {
    pub name: String,
    /// Always within `1..=99`.
    pub quantity: u32,
    pub category: DeckCategory,
    /// Catalog id supplied by a deck-host import; text parsing never sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
}

impl ParsedCardEntry {
    pub fn new(name: impl Into<String>, quantity: u32, category: DeckCategory) -> Self {
        Self {
            name: name.into(),
            quantity,
            category,
            catalog_id: None,
        }
    }

    pub fn with_catalog_id(mut self, id: impl Into<String>) -> Self {
        self.catalog_id = Some(id.into());
        self
    }
}

/// A rejected deck-list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Output of the deck-list parser. Partial success is the normal case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDeckList {
    pub entries: Vec<ParsedCardEntry>,
    pub commander: Option<ParsedCardEntry>,
    pub errors: Vec<ParseError>,
}

impl ParsedDeckList {
    /// Sum of quantities across every entry.
    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }
}

// ── Card Images ─────────────────────────────────────────────────────────────

/// Image sizes mirrored into object storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    Small,
    Normal,
    Large,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Small, ImageSize::Normal, ImageSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Normal => "normal",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "normal" => Ok(Self::Normal),
            "large" => Ok(Self::Large),
            other => Err(format!("unknown image size '{other}' (expected small, normal, large)")),
        }
    }
}

/// Which printed face of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFace {
    #[default]
    Front,
    Back,
}

impl CardFace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for CardFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image URI bundle as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUris {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub art_crop: Option<String>,
    #[serde(default)]
    pub border_crop: Option<String>,
}

impl ImageUris {
    pub fn get(&self, size: ImageSize) -> Option<&str> {
        match size {
            ImageSize::Small => self.small.as_deref(),
            ImageSize::Normal => self.normal.as_deref(),
            ImageSize::Large => self.large.as_deref(),
        }
    }
}

/// Object-storage URLs for one face, populated lazily per size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedImageUrls {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
}

impl CachedImageUrls {
    pub fn get(&self, size: ImageSize) -> Option<&str> {
        match size {
            ImageSize::Small => self.small.as_deref(),
            ImageSize::Normal => self.normal.as_deref(),
            ImageSize::Large => self.large.as_deref(),
        }
    }

    pub fn set(&mut self, size: ImageSize, url: impl Into<String>) {
        let slot = match size {
            ImageSize::Small => &mut self.small,
            ImageSize::Normal => &mut self.normal,
            ImageSize::Large => &mut self.large,
        };
        *slot = Some(url.into());
    }

    pub fn is_empty(&self) -> bool {
        self.small.is_none() && self.normal.is_none() && self.large.is_none()
    }
}

// ── Card Record ─────────────────────────────────────────────────────────────

/// Market prices as strings, exactly as the catalog reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPrices {
    #[serde(default)]
    pub usd: Option<String>,
    #[serde(default)]
    pub usd_foil: Option<String>,
    #[serde(default)]
    pub eur: Option<String>,
    #[serde(default)]
    pub tix: Option<String>,
}

/// Cached canonical metadata for one catalog card, keyed by catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub oracle_id: Option<String>,
    pub name: String,
    pub layout: String,
    pub type_line: String,
    pub mana_cost: Option<String>,
    pub mana_value: f64,
    pub colors: Vec<String>,
    pub color_identity: Vec<String>,
    pub oracle_text: Option<String>,
    pub set_code: String,
    pub set_name: String,
    pub collector_number: String,
    pub rarity: String,
    pub prices: CardPrices,
    /// Format name → legality ("legal", "not_legal", "banned", "restricted").
    pub legalities: BTreeMap<String, String>,
    pub has_back_face: bool,
    pub image_uris: Option<ImageUris>,
    pub back_image_uris: Option<ImageUris>,
    pub cached_images: CachedImageUrls,
    pub cached_back_images: CachedImageUrls,
    pub commander_eligible: bool,
    pub cached_at: DateTime<Utc>,
}

impl CardRecord {
    /// Catalog image bundle for a face. The back face only exists on
    /// records flagged as double-faced.
    pub fn image_uris_for(&self, face: CardFace) -> Option<&ImageUris> {
        match face {
            CardFace::Front => self.image_uris.as_ref(),
            CardFace::Back if self.has_back_face => self.back_image_uris.as_ref(),
            CardFace::Back => None,
        }
    }

    /// Upstream image URL for a size and face, if the catalog provided one.
    pub fn upstream_image_url(&self, size: ImageSize, face: CardFace) -> Option<&str> {
        self.image_uris_for(face).and_then(|uris| uris.get(size))
    }

    /// Object-storage URL previously persisted for a size and face.
    pub fn cached_image_url(&self, size: ImageSize, face: CardFace) -> Option<&str> {
        match face {
            CardFace::Front => self.cached_images.get(size),
            CardFace::Back => self.cached_back_images.get(size),
        }
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        is_stale(self.cached_at, now, stale_after)
    }
}

/// A record is stale once strictly more than `stale_after` has elapsed.
pub fn is_stale(cached_at: DateTime<Utc>, now: DateTime<Utc>, stale_after: Duration) -> bool {
    now - cached_at > stale_after
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Why an entry could not be matched to a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ResolutionError {
    /// The catalog has no card by this name.
    #[error("Card not found")]
    NotFound,
    /// The catalog could not be reached; retrying later may succeed.
    #[error("Card lookup unavailable: {0}")]
    Unavailable(String),
}

/// The resolved-or-not result for one deck entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardResolution {
    /// Canonical catalog name when resolved, otherwise the name as typed.
    pub name: String,
    pub quantity: u32,
    pub category: DeckCategory,
    pub resolved: bool,
    pub catalog_id: Option<String>,
    pub catalog_record: Option<CardRecord>,
    pub error: Option<ResolutionError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl CardResolution {
    pub fn resolved(entry: &ParsedCardEntry, record: CardRecord) -> Self {
        Self {
            name: record.name.clone(),
            quantity: entry.quantity,
            category: entry.category,
            resolved: true,
            catalog_id: Some(record.id.clone()),
            catalog_record: Some(record),
            error: None,
            suggestions: Vec::new(),
        }
    }

    pub fn unresolved(entry: &ParsedCardEntry, error: ResolutionError) -> Self {
        Self {
            name: entry.name.clone(),
            quantity: entry.quantity,
            category: entry.category,
            resolved: false,
            catalog_id: None,
            catalog_record: None,
            error: Some(error),
            suggestions: Vec::new(),
        }
    }
}
