//! Parser for plain and annotated deck-list text.
//!
//! Deck lists come in a handful of loosely related shapes:
//! ```text
//! Commander:
//! 1 Kenrith, the Returned King
//!
//! // Creatures (2)
//! 1 Llanowar Elves (M19) 314
//! Birds of Paradise x2
//! SB: 2 Pyroblast
//! ```
//!
//! Parsing is line-oriented. Deck-group headers switch the current category,
//! card-type headers and comments are consumed, and every other non-blank line
//! must be a card line. Lines that cannot be accepted become [`ParseError`]s;
//! they never abort the parse.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{DeckCategory, ParseError, ParsedCardEntry, ParsedDeckList};

/// Lines longer than this (in characters) are rejected before any pattern runs.
pub const MAX_LINE_LENGTH: usize = 200;

/// Largest quantity accepted on a single line.
pub const MAX_QUANTITY: u32 = 99;

static GROUP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?://\s*)?(commanders?|sideboard|considering|maybeboard|maybe|main\s*deck|mainboard|deck)(?:\s*\(\d+\))?\s*:?$",
    )
    .expect("static pattern")
});

static TYPE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?://\s*)?(creatures?|lands?|instants?|sorcery|sorceries|artifacts?|enchantments?|planeswalkers?|battles?|kindred|tribal|spells?|other)(?:\s*\(\d+\))?\s*:?$",
    )
    .expect("static pattern")
});

/// `1 Llanowar Elves (M19) 314`, optionally followed by a foil marker.
static ANNOTATED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)x?\s+(.+?)\s+\(([A-Za-z0-9]{2,6})\)\s+([A-Za-z0-9\-★]+)(?:\s+\*[A-Za-z]\*)?$")
        .expect("static pattern")
});

/// `3 Name`, `3x Name`, `Name x3`, `Name 3x`, or a bare `Name`.
static GENERAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(\d+)\s*x?\s+)?(.+?)(?:\s+x\s*(\d+)|\s+(\d+)\s*x)?$")
        .expect("static pattern")
});

static SIDEBOARD_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SB:\s*").expect("static pattern"));

static TRAILING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\*[A-Za-z]\*$").expect("static pattern"));

static TRAILING_SET_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\([A-Za-z0-9]{2,6}\)(?:\s+[A-Za-z0-9\-★]+)?$").expect("static pattern")
});

static TRAILING_COLLECTOR_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d+[a-z]?$").expect("static pattern"));

/// Parse deck-list text into entries, the designated commander, and line errors.
///
/// # Examples
///
/// ```
/// use cardex_catalog::{DeckCategory, parse_deck_list};
///
/// let parsed = parse_deck_list("Commander:\n1 Kenrith, the Returned King\n\nDeck:\n1 Sol Ring");
/// assert_eq!(parsed.entries.len(), 2);
/// assert_eq!(parsed.entries[1].category, DeckCategory::Main);
/// assert_eq!(parsed.commander.unwrap().name, "Kenrith, the Returned King");
/// ```
pub fn parse_deck_list(text: &str) -> ParsedDeckList {
    let mut result = ParsedDeckList::default();
    let mut category = DeckCategory::Main;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;

        // Length check first: the pattern match below must never see an
        // unbounded line. The byte check bounds the character count.
        if raw.len() > MAX_LINE_LENGTH * 4 || raw.chars().count() > MAX_LINE_LENGTH {
            result.errors.push(ParseError {
                line: line_number,
                content: truncate_for_display(raw),
                message: format!("Line exceeds maximum length of {MAX_LINE_LENGTH} characters"),
            });
            continue;
        }

        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = GROUP_HEADER.captures(line) {
            category = group_category(&caps[1]);
            continue;
        }
        if TYPE_HEADER.is_match(line) {
            continue;
        }
        if line.starts_with("//") || line.starts_with('#') {
            continue;
        }

        let (line_category, card_text) = match SIDEBOARD_PREFIX.find(line) {
            Some(m) => (DeckCategory::Sideboard, &line[m.end()..]),
            None => (category, line),
        };

        match parse_card_line(card_text) {
            Ok((name, quantity)) => {
                let entry = ParsedCardEntry::new(name, quantity, line_category);
                if line_category == DeckCategory::Commander {
                    result.commander = Some(entry.clone());
                }
                result.entries.push(entry);
            }
            Err(message) => result.errors.push(ParseError {
                line: line_number,
                content: line.to_string(),
                message,
            }),
        }
    }

    result
}

/// Strip set codes, collector numbers, and foil markers from a card name and
/// collapse internal whitespace.
pub fn normalize_card_name(name: &str) -> String {
    let mut name = name.trim();
    name = strip_match(&TRAILING_MARKER, name);
    name = strip_match(&TRAILING_SET_CODE, name);
    name = strip_match(&TRAILING_COLLECTOR_NUMBER, name);
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Internal parsing ────────────────────────────────────────────────────────

fn group_category(header: &str) -> DeckCategory {
    let lower = header.to_ascii_lowercase();
    match lower.as_str() {
        "commander" | "commanders" => DeckCategory::Commander,
        "sideboard" => DeckCategory::Sideboard,
        "considering" | "maybeboard" | "maybe" => DeckCategory::Considering,
        _ => DeckCategory::Main,
    }
}

/// Returns `(normalized name, quantity)` or a human-readable rejection reason.
fn parse_card_line(line: &str) -> Result<(String, u32), String> {
    let (raw_quantity, raw_name) = if let Some(caps) = ANNOTATED_LINE.captures(line) {
        (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps[2].to_string(),
        )
    } else if let Some(caps) = GENERAL_LINE.captures(line) {
        let quantity = caps
            .get(1)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().to_string());
        (quantity, caps[2].to_string())
    } else {
        return Err("Could not parse card line".to_string());
    };

    let quantity = match raw_quantity {
        Some(q) => parse_quantity(&q)?,
        None => 1,
    };

    let name = normalize_card_name(&raw_name);
    if name.chars().count() < 2 {
        return Err(format!("Card name '{name}' is too short"));
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Card name '{name}' cannot be only a number"));
    }

    Ok((name, quantity))
}

fn parse_quantity(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(q) if (1..=MAX_QUANTITY).contains(&q) => Ok(q),
        _ => Err(format!(
            "Invalid quantity {raw} (must be between 1 and {MAX_QUANTITY})"
        )),
    }
}

fn strip_match<'a>(pattern: &Regex, s: &'a str) -> &'a str {
    match pattern.find(s) {
        Some(m) => s[..m.start()].trim_end(),
        None => s,
    }
}

fn truncate_for_display(raw: &str) -> String {
    let end = raw
        .char_indices()
        .nth(MAX_LINE_LENGTH)
        .map_or(raw.len(), |(i, _)| i);
    format!("{}...", &raw[..end])
}

#[cfg(test)]
#[path = "tests/deck_parser_tests.rs"]
mod tests;
