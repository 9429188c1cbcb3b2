use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cardex_catalog::{CardPrices, ImageUris};

// ── Card objects ────────────────────────────────────────────────────────────

/// A card object as returned by the catalog. Only the fields this crate
/// consumes are modelled; everything else is ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScryfallCard {
    pub id: String,
    #[serde(default)]
    pub oracle_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: f64,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub prices: CardPrices,
    #[serde(default)]
    pub legalities: BTreeMap<String, String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Vec<ScryfallCardFace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScryfallCardFace {
    pub name: String,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

impl ScryfallCard {
    /// A card has a back face when its second face carries its own images
    /// (transform and modal double-faced cards). Split and adventure cards
    /// have two faces but share one image.
    pub fn has_back_face(&self) -> bool {
        self.card_faces
            .get(1)
            .is_some_and(|face| face.image_uris.is_some())
    }

    pub fn front_image_uris(&self) -> Option<&ImageUris> {
        self.image_uris
            .as_ref()
            .or_else(|| self.card_faces.first()?.image_uris.as_ref())
    }

    pub fn back_image_uris(&self) -> Option<&ImageUris> {
        if !self.has_back_face() {
            return None;
        }
        self.card_faces.get(1)?.image_uris.as_ref()
    }

    /// Top-level type line, or the faces' type lines joined.
    pub fn full_type_line(&self) -> String {
        if let Some(line) = &self.type_line {
            return line.clone();
        }
        self.card_faces
            .iter()
            .filter_map(|f| f.type_line.as_deref())
            .collect::<Vec<_>>()
            .join(" // ")
    }

    pub fn full_oracle_text(&self) -> Option<String> {
        if self.oracle_text.is_some() {
            return self.oracle_text.clone();
        }
        let texts: Vec<&str> = self
            .card_faces
            .iter()
            .filter_map(|f| f.oracle_text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n//\n"))
        }
    }

    pub fn full_mana_cost(&self) -> Option<String> {
        if let Some(cost) = self.mana_cost.as_ref().filter(|c| !c.is_empty()) {
            return Some(cost.clone());
        }
        let costs: Vec<&str> = self
            .card_faces
            .iter()
            .filter_map(|f| f.mana_cost.as_deref())
            .filter(|c| !c.is_empty())
            .collect();
        if costs.is_empty() {
            None
        } else {
            Some(costs.join(" // "))
        }
    }

    /// Card colors, falling back to the union of face colors.
    pub fn all_colors(&self) -> Vec<String> {
        if let Some(colors) = &self.colors {
            return colors.clone();
        }
        let mut colors: Vec<String> = Vec::new();
        for color in self.card_faces.iter().filter_map(|f| f.colors.as_ref()).flatten() {
            if !colors.contains(color) {
                colors.push(color.clone());
            }
        }
        colors
    }

    /// Whether `name` matches the card or one of its faces, ignoring case.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.card_faces.iter().any(|f| f.name.eq_ignore_ascii_case(name))
    }
}

// ── List objects ────────────────────────────────────────────────────────────

/// Generic list envelope used by search and collection responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total_cards: Option<u32>,
    #[serde(default)]
    pub not_found: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub data: Vec<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPage {
    pub cards: Vec<ScryfallCard>,
    pub has_more: bool,
    pub total_cards: u32,
}

/// Identifier entry in a collection request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CollectionIdentifier {
    Id { id: String },
    Name { name: String },
}

// ── Errors ──────────────────────────────────────────────────────────────────

/// The catalog's error object (`"object": "error"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorObject {
    pub status: u16,
    pub code: String,
    #[serde(default)]
    pub details: String,
}

impl ApiErrorObject {
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code == "not_found"
    }
}

/// Recognize an error object by its shape rather than by HTTP status.
pub fn error_object(value: &serde_json::Value) -> Option<ApiErrorObject> {
    if value.get("object").and_then(serde_json::Value::as_str) != Some("error") {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_object_is_detected_by_shape() {
        let body = json!({
            "object": "error",
            "code": "not_found",
            "status": 404,
            "details": "No card found with the given ID or set code and collector number."
        });
        let err = error_object(&body).unwrap();
        assert!(err.is_not_found());

        let card = json!({"object": "card", "id": "abc", "name": "Sol Ring"});
        assert!(error_object(&card).is_none());
    }

    #[test]
    fn test_double_faced_card_has_back_face() {
        let body = json!({
            "id": "dfc",
            "name": "Delver of Secrets // Insectile Aberration",
            "layout": "transform",
            "cmc": 1.0,
            "card_faces": [
                {"name": "Delver of Secrets", "type_line": "Creature — Human Wizard",
                 "colors": ["U"], "image_uris": {"normal": "https://img/front.jpg"}},
                {"name": "Insectile Aberration", "type_line": "Creature — Human Insect",
                 "colors": ["U"], "image_uris": {"normal": "https://img/back.jpg"}}
            ]
        });
        let card: ScryfallCard = serde_json::from_value(body).unwrap();
        assert!(card.has_back_face());
        assert_eq!(
            card.front_image_uris().unwrap().normal.as_deref(),
            Some("https://img/front.jpg")
        );
        assert_eq!(
            card.back_image_uris().unwrap().normal.as_deref(),
            Some("https://img/back.jpg")
        );
        assert_eq!(
            card.full_type_line(),
            "Creature — Human Wizard // Creature — Human Insect"
        );
        assert_eq!(card.all_colors(), vec!["U"]);
        assert!(card.matches_name("insectile aberration"));
    }

    #[test]
    fn test_split_card_has_no_back_face() {
        let body = json!({
            "id": "split",
            "name": "Fire // Ice",
            "layout": "split",
            "type_line": "Instant // Instant",
            "image_uris": {"normal": "https://img/fire-ice.jpg"},
            "card_faces": [
                {"name": "Fire", "mana_cost": "{1}{R}", "oracle_text": "Fire deals 2 damage divided as you choose among one or two targets."},
                {"name": "Ice", "mana_cost": "{1}{U}", "oracle_text": "Tap target permanent.\nDraw a card."}
            ]
        });
        let card: ScryfallCard = serde_json::from_value(body).unwrap();
        assert!(!card.has_back_face());
        assert!(card.back_image_uris().is_none());
        assert_eq!(card.full_mana_cost().as_deref(), Some("{1}{R} // {1}{U}"));
        assert!(card.full_oracle_text().unwrap().contains("\n//\n"));
    }

    #[test]
    fn test_collection_identifiers_serialize_untagged() {
        let ids = vec![
            CollectionIdentifier::Id { id: "abc".into() },
            CollectionIdentifier::Name { name: "Sol Ring".into() },
        ];
        assert_eq!(
            serde_json::to_value(&ids).unwrap(),
            json!([{"id": "abc"}, {"name": "Sol Ring"}])
        );
    }
}
