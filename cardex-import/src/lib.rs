//! Turn deck lists into resolved card lists.
//!
//! Deck lists arrive either as pasted text (parsed by `cardex-catalog`) or
//! as a deck-host URL ([`moxfield`]). Either way the entries are matched to
//! catalog records by [`resolve`], and [`preview`] packages the result with
//! validation warnings for display before anything is saved.

pub mod moxfield;
pub mod preview;
pub mod resolve;

pub use moxfield::{
    DEFAULT_MOXFIELD_URL, DeckImportError, ImportedDeck, MoxfieldClient, extract_deck_id,
};
pub use preview::{
    DeckImportPreview, ImportPreview, PreviewError, preview_deck_import, preview_parsed,
    preview_text,
};
pub use resolve::{ResolutionReport, ResolveError, ResolveOptions, resolve_entries};
