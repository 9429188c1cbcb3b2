//! Helpers over parsed deck lists: name extraction for batch resolution,
//! Commander-format sanity warnings, and text generation for export.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::types::{DeckCategory, ParsedCardEntry, ParsedDeckList};

/// The six basic land names, exempt from the singleton rule.
pub const BASIC_LANDS: &[&str] = &["Plains", "Island", "Swamp", "Mountain", "Forest", "Wastes"];

/// Non-commander cards allowed in a Commander deck.
const COMMANDER_DECK_SIZE: u32 = 99;

pub fn is_basic_land(name: &str) -> bool {
    BASIC_LANDS.iter().any(|b| b.eq_ignore_ascii_case(name.trim()))
}

/// Deduplicated card names (entries then commander), compared
/// case-insensitively. The first spelling seen is kept.
pub fn unique_card_names(deck: &ParsedDeckList) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for entry in deck.entries.iter().chain(deck.commander.iter()) {
        if seen.insert(entry.name.to_lowercase()) {
            names.push(entry.name.clone());
        }
    }
    names
}

/// Human-readable warnings for a Commander deck. These never block an import.
pub fn validate_commander_deck(deck: &ParsedDeckList) -> Vec<String> {
    let mut warnings = Vec::new();

    if deck.commander.is_none() {
        warnings.push("No commander specified".to_string());
    }

    let main_count: u32 = deck
        .entries
        .iter()
        .filter(|e| e.category == DeckCategory::Main)
        .map(|e| e.quantity)
        .sum();
    if main_count > COMMANDER_DECK_SIZE {
        warnings.push(format!(
            "Deck has {main_count} cards besides the commander (maximum is {COMMANDER_DECK_SIZE})"
        ));
    }

    // Copies are counted across lines, so "1 Sol Ring" twice is a duplicate too.
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (String, u32)> = HashMap::new();
    for entry in deck
        .entries
        .iter()
        .filter(|e| matches!(e.category, DeckCategory::Main | DeckCategory::Commander))
    {
        let key = entry.name.to_lowercase();
        let slot = totals.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (entry.name.clone(), 0)
        });
        slot.1 += entry.quantity;
    }

    for key in &order {
        let (name, total) = &totals[key];
        if *total > 1 && !is_basic_land(name) {
            warnings.push(format!(
                "{name} appears {total} times (singleton format allows 1 copy)"
            ));
        }
    }

    warnings
}

/// Render entries back into deck-list text, grouped by category.
///
/// Each section starts with a header the parser recognizes, e.g.
/// `Deck (98):`, followed by `"{quantity} {name}"` lines. The commander is
/// written under `Commander` unless it is already among the entries.
pub fn generate_deck_list_text(
    entries: &[ParsedCardEntry],
    commander: Option<&ParsedCardEntry>,
) -> String {
    let mut sections = Vec::new();

    for category in DeckCategory::EXPORT_ORDER {
        let mut lines: Vec<(u32, &str)> = Vec::new();

        if category == DeckCategory::Commander {
            if let Some(cmd) = commander {
                let listed = entries.iter().any(|e| {
                    e.category == DeckCategory::Commander && e.name.eq_ignore_ascii_case(&cmd.name)
                });
                if !listed {
                    lines.push((cmd.quantity, cmd.name.as_str()));
                }
            }
        }

        lines.extend(
            entries
                .iter()
                .filter(|e| e.category == category)
                .map(|e| (e.quantity, e.name.as_str())),
        );

        if lines.is_empty() {
            continue;
        }

        let count: u32 = lines.iter().map(|(q, _)| q).sum();
        let mut section = format!("{} ({}):", category.header(), count);
        for (quantity, name) in lines {
            section.push('\n');
            section.push_str(&format!("{quantity} {name}"));
        }
        sections.push(section);
    }

    sections.join("\n\n")
}
