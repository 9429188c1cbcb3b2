use std::time::Instant;

use cardex_catalog::{DeckCategory, MAX_LINE_LENGTH, normalize_card_name, parse_deck_list};

#[test]
fn quantity_prefixed_lines_default_to_main() {
    let p = parse_deck_list("1 Sol Ring\n4 Lightning Bolt\n12 Forest");
    assert!(p.errors.is_empty());
    assert_eq!(p.entries.len(), 3);
    assert_eq!(p.entries[1].name, "Lightning Bolt");
    assert_eq!(p.entries[1].quantity, 4);
    assert!(p.entries.iter().all(|e| e.category == DeckCategory::Main));
    assert!(p.commander.is_none());
}

#[test]
fn every_valid_quantity_is_accepted() {
    for q in 1..=99 {
        let p = parse_deck_list(&format!("{q} Llanowar Elves"));
        assert!(p.errors.is_empty(), "quantity {q} rejected");
        assert_eq!(p.entries.len(), 1);
        assert_eq!(p.entries[0].quantity, q);
        assert_eq!(p.entries[0].name, "Llanowar Elves");
    }
}

#[test]
fn category_follows_most_recent_group_header() {
    let text = "\
Commander:
1 Kenrith, the Returned King

Deck:
1 Sol Ring
Sideboard
2 Pyroblast
// Maybeboard
1 Cyclonic Rift
Main Deck:
1 Arcane Signet";
    let p = parse_deck_list(text);
    assert!(p.errors.is_empty(), "{:?}", p.errors);
    let cats: Vec<_> = p.entries.iter().map(|e| e.category).collect();
    assert_eq!(
        cats,
        vec![
            DeckCategory::Commander,
            DeckCategory::Main,
            DeckCategory::Sideboard,
            DeckCategory::Considering,
            DeckCategory::Main,
        ]
    );
    assert_eq!(p.commander.unwrap().name, "Kenrith, the Returned King");
}

#[test]
fn headers_are_case_insensitive() {
    let p = parse_deck_list("SIDEBOARD:\n1 Duress\nconsidering\n1 Negate");
    assert_eq!(p.entries[0].category, DeckCategory::Sideboard);
    assert_eq!(p.entries[1].category, DeckCategory::Considering);
}

#[test]
fn type_headers_do_not_change_category() {
    let p = parse_deck_list("Sideboard:\nCreatures:\n1 Grizzly Bears\n// Lands (2)\n2 Forest");
    assert!(p.errors.is_empty());
    assert_eq!(p.entries.len(), 2);
    assert!(p.entries.iter().all(|e| e.category == DeckCategory::Sideboard));
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let p = parse_deck_list("# my deck\n\n// built for fun\n   \n1 Sol Ring");
    assert!(p.errors.is_empty());
    assert_eq!(p.entries.len(), 1);
}

#[test]
fn trailing_quantity_forms() {
    let p = parse_deck_list("Birds of Paradise x2\nCounterspell 3x");
    assert_eq!(p.entries[0].quantity, 2);
    assert_eq!(p.entries[0].name, "Birds of Paradise");
    assert_eq!(p.entries[1].quantity, 3);
    assert_eq!(p.entries[1].name, "Counterspell");
}

#[test]
fn annotated_export_lines() {
    let p = parse_deck_list("1 Llanowar Elves (M19) 314\n2 Sol Ring (CMM) 400 *F*");
    assert!(p.errors.is_empty());
    assert_eq!(p.entries[0].name, "Llanowar Elves");
    assert_eq!(p.entries[1].name, "Sol Ring");
    assert_eq!(p.entries[1].quantity, 2);
}

#[test]
fn sideboard_prefix_applies_to_single_line() {
    let p = parse_deck_list("SB: 2 Pyroblast\n1 Sol Ring");
    assert_eq!(p.entries[0].category, DeckCategory::Sideboard);
    assert_eq!(p.entries[0].quantity, 2);
    assert_eq!(p.entries[1].category, DeckCategory::Main);
}

#[test]
fn split_card_names_are_not_comments() {
    let p = parse_deck_list("1 Fire // Ice");
    assert_eq!(p.entries.len(), 1);
    assert_eq!(p.entries[0].name, "Fire // Ice");
}

#[test]
fn out_of_range_quantities_are_errors() {
    let p = parse_deck_list("0 Sol Ring\n100 Forest\n1 Arcane Signet");
    assert_eq!(p.entries.len(), 1);
    assert_eq!(p.errors.len(), 2);
    assert_eq!(p.errors[0].line, 1);
    assert_eq!(p.errors[1].line, 2);
    assert!(p.errors[1].message.contains("quantity"));
}

#[test]
fn short_and_numeric_names_are_errors() {
    let p = parse_deck_list("1 X\n3 42");
    assert!(p.entries.is_empty());
    assert_eq!(p.errors.len(), 2);
    assert!(p.errors[0].message.contains("too short"));
    assert!(p.errors[1].message.contains("number"));
}

#[test]
fn overlong_line_is_a_single_error() {
    let long = format!("1 {}", "A".repeat(MAX_LINE_LENGTH));
    let p = parse_deck_list(&long);
    assert!(p.entries.is_empty());
    assert_eq!(p.errors.len(), 1);
    assert!(p.errors[0].message.contains("maximum length"));
}

#[test]
fn length_limit_counts_characters_not_bytes() {
    // 150 characters, 298 bytes.
    let name = format!("Ætherling {}", "é".repeat(138));
    let line = format!("1 {}", name);
    assert!(line.len() > MAX_LINE_LENGTH);
    let p = parse_deck_list(&line);
    assert!(p.errors.is_empty(), "{:?}", p.errors);
    assert_eq!(p.entries.len(), 1);
    assert_eq!(p.entries[0].name, name);

    let too_long = format!("1 {}", "é".repeat(MAX_LINE_LENGTH));
    let p = parse_deck_list(&too_long);
    assert!(p.entries.is_empty());
    assert!(p.errors[0].message.contains("maximum length"));
}

#[test]
fn overlong_adversarial_line_is_rejected_quickly() {
    let nasty = format!("1 {}x", " x".repeat(200_000));
    let start = Instant::now();
    let p = parse_deck_list(&nasty);
    assert_eq!(p.errors.len(), 1);
    assert!(p.entries.is_empty());
    assert!(start.elapsed().as_millis() < 500);
}

#[test]
fn bad_lines_do_not_abort_the_parse() {
    let mut text = String::new();
    for i in 0..500 {
        if i % 200 == 7 {
            text.push_str("0 Broken Line\n");
        } else {
            text.push_str("1 Island\n");
        }
    }
    let p = parse_deck_list(&text);
    assert_eq!(p.errors.len(), 3);
    assert_eq!(p.entries.len(), 497);
}

#[test]
fn last_commander_wins() {
    let p = parse_deck_list("Commander:\n1 Tymna the Weaver\n1 Thrasios, Triton Hero");
    assert_eq!(p.commander.unwrap().name, "Thrasios, Triton Hero");
    assert_eq!(p.entries.len(), 2);
}

#[test]
fn normalize_strips_set_codes_and_numbers() {
    assert_eq!(normalize_card_name("Sol Ring (CMM) 400"), "Sol Ring");
    assert_eq!(normalize_card_name("Sol Ring (CMM)"), "Sol Ring");
    assert_eq!(normalize_card_name("Sol   Ring  123"), "Sol Ring");
    assert_eq!(normalize_card_name("Sol Ring *F*"), "Sol Ring");
    assert_eq!(normalize_card_name("  Kenrith,  the Returned King "), "Kenrith, the Returned King");
}
