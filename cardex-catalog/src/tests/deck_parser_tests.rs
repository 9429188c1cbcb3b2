use super::*;

#[test]
fn test_parse_card_line_leading_quantity() {
    assert_eq!(parse_card_line("4 Lightning Bolt"), Ok(("Lightning Bolt".to_string(), 4)));
    assert_eq!(parse_card_line("4x Lightning Bolt"), Ok(("Lightning Bolt".to_string(), 4)));
}

#[test]
fn test_parse_card_line_trailing_quantity() {
    assert_eq!(parse_card_line("Lightning Bolt x3"), Ok(("Lightning Bolt".to_string(), 3)));
    assert_eq!(parse_card_line("Lightning Bolt 3x"), Ok(("Lightning Bolt".to_string(), 3)));
}

#[test]
fn test_parse_card_line_no_quantity_defaults_to_one() {
    assert_eq!(parse_card_line("Sol Ring"), Ok(("Sol Ring".to_string(), 1)));
}

#[test]
fn test_parse_card_line_annotated_export() {
    assert_eq!(
        parse_card_line("1 Llanowar Elves (M19) 314"),
        Ok(("Llanowar Elves".to_string(), 1))
    );
    assert_eq!(
        parse_card_line("1 Sol Ring (CMM) 400 *F*"),
        Ok(("Sol Ring".to_string(), 1))
    );
}

#[test]
fn test_parse_quantity_overflow_is_rejected() {
    assert!(parse_quantity("99999999999999999999").is_err());
    assert!(parse_quantity("0").is_err());
    assert!(parse_quantity("100").is_err());
    assert_eq!(parse_quantity("99"), Ok(99));
}

#[test]
fn test_group_category_mapping() {
    assert_eq!(group_category("Maybeboard"), DeckCategory::Considering);
    assert_eq!(group_category("COMMANDER"), DeckCategory::Commander);
    assert_eq!(group_category("main deck"), DeckCategory::Main);
    assert_eq!(group_category("Sideboard"), DeckCategory::Sideboard);
}

#[test]
fn test_truncate_for_display_respects_char_boundaries() {
    let line = "é".repeat(250);
    let shown = truncate_for_display(&line);
    assert!(shown.ends_with("..."));
    assert_eq!(shown.chars().count(), MAX_LINE_LENGTH + 3);
}
