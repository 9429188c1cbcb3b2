//! Deck-list data model, deck-list text parsing, and card record types.
//!
//! This crate defines the shapes shared by the rest of the pipeline without
//! any network or database dependencies. `cardex-db` persists [`CardRecord`]s,
//! `cardex-scryfall` produces the upstream card objects they are built from,
//! and `cardex-import` turns [`ParsedDeckList`]s into resolved previews.

pub mod deck_list;
pub mod deck_parser;
pub mod types;

pub use deck_list::{
    BASIC_LANDS, generate_deck_list_text, is_basic_land, unique_card_names,
    validate_commander_deck,
};
pub use deck_parser::{MAX_LINE_LENGTH, MAX_QUANTITY, normalize_card_name, parse_deck_list};
pub use types::*;
