//! Mapping from catalog card objects to cached records.

use std::collections::BTreeMap;

use cardex_catalog::{CachedImageUrls, CardRecord};
use cardex_scryfall::ScryfallCard;
use chrono::{DateTime, Utc};

/// Build a cache record from a catalog card, stamped with `now`.
///
/// Cached image URLs start empty; the store keeps existing ones on upsert.
pub fn build_record(card: &ScryfallCard, now: DateTime<Utc>) -> CardRecord {
    let type_line = card.full_type_line();
    let oracle_text = card.full_oracle_text();
    let commander_eligible =
        is_commander_eligible(&type_line, oracle_text.as_deref(), &card.legalities);

    CardRecord {
        id: card.id.clone(),
        oracle_id: card.oracle_id.clone(),
        name: card.name.clone(),
        layout: card.layout.clone(),
        type_line,
        mana_cost: card.full_mana_cost(),
        mana_value: card.cmc,
        colors: card.all_colors(),
        color_identity: card.color_identity.clone(),
        oracle_text,
        set_code: card.set.clone(),
        set_name: card.set_name.clone(),
        collector_number: card.collector_number.clone(),
        rarity: card.rarity.clone(),
        prices: card.prices.clone(),
        legalities: card.legalities.clone(),
        has_back_face: card.has_back_face(),
        image_uris: card.front_image_uris().cloned(),
        back_image_uris: card.back_image_uris().cloned(),
        cached_images: CachedImageUrls::default(),
        cached_back_images: CachedImageUrls::default(),
        commander_eligible,
        cached_at: now,
    }
}

/// A card can lead a Commander deck when it is legal in the format, is
/// legendary, and is either a creature or a planeswalker whose text says it
/// can be your commander.
pub fn is_commander_eligible(
    type_line: &str,
    oracle_text: Option<&str>,
    legalities: &BTreeMap<String, String>,
) -> bool {
    if legalities.get("commander").map(String::as_str) != Some("legal") {
        return false;
    }
    if !type_line.contains("Legendary") {
        return false;
    }
    if type_line.contains("Creature") {
        return true;
    }
    type_line.contains("Planeswalker")
        && oracle_text.is_some_and(|text| text.contains("can be your commander"))
}

/// Face names a card should also be found under, excluding its full name.
pub fn face_aliases(card: &ScryfallCard) -> Vec<String> {
    card.card_faces
        .iter()
        .map(|face| face.name.clone())
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case(&card.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use cardex_scryfall::ScryfallCardFace;

    use super::*;

    fn legal() -> BTreeMap<String, String> {
        [("commander".to_string(), "legal".to_string())].into_iter().collect()
    }

    #[test]
    fn test_legendary_creature_is_eligible() {
        assert!(is_commander_eligible(
            "Legendary Creature — Human Noble",
            None,
            &legal()
        ));
    }

    #[test]
    fn test_banned_or_missing_legality_is_not_eligible() {
        let banned = [("commander".to_string(), "banned".to_string())]
            .into_iter()
            .collect();
        assert!(!is_commander_eligible("Legendary Creature — Elder Dragon", None, &banned));
        assert!(!is_commander_eligible(
            "Legendary Creature — Elder Dragon",
            None,
            &BTreeMap::new()
        ));
    }

    #[test]
    fn test_nonlegendary_creature_is_not_eligible() {
        assert!(!is_commander_eligible("Creature — Elf Druid", None, &legal()));
    }

    #[test]
    fn test_planeswalker_needs_commander_text() {
        assert!(!is_commander_eligible(
            "Legendary Planeswalker — Jace",
            Some("+1: Draw a card."),
            &legal()
        ));
        assert!(is_commander_eligible(
            "Legendary Planeswalker — Teferi",
            Some("Teferi, Temporal Archmage can be your commander."),
            &legal()
        ));
    }

    #[test]
    fn test_build_record_from_double_faced_card() {
        let card = ScryfallCard {
            id: "c1".into(),
            name: "Delver of Secrets // Insectile Aberration".into(),
            layout: "transform".into(),
            cmc: 1.0,
            set: "isd".into(),
            card_faces: vec![
                ScryfallCardFace {
                    name: "Delver of Secrets".into(),
                    type_line: Some("Creature — Human Wizard".into()),
                    mana_cost: Some("{U}".into()),
                    image_uris: Some(cardex_catalog::ImageUris {
                        normal: Some("https://img/front.jpg".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ScryfallCardFace {
                    name: "Insectile Aberration".into(),
                    type_line: Some("Creature — Human Insect".into()),
                    mana_cost: Some(String::new()),
                    image_uris: Some(cardex_catalog::ImageUris {
                        normal: Some("https://img/back.jpg".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let now = Utc::now();
        let record = build_record(&card, now);
        assert!(record.has_back_face);
        assert_eq!(record.set_code, "isd");
        assert_eq!(record.mana_cost.as_deref(), Some("{U}"));
        assert_eq!(
            record.back_image_uris.unwrap().normal.as_deref(),
            Some("https://img/back.jpg")
        );
        assert!(!record.commander_eligible);
        assert_eq!(record.cached_at, now);
        assert_eq!(
            face_aliases(&card),
            vec!["Delver of Secrets", "Insectile Aberration"]
        );
    }
}
