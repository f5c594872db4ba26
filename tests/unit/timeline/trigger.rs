use super::*;

#[test]
fn parses_keywords_and_percentages() {
    assert_eq!("top 85%".parse::<TriggerSpec>().unwrap(), ITEM_ENTRY);
    assert_eq!("center 40%".parse::<TriggerSpec>().unwrap(), ITEM_EXIT);
    assert_eq!(
        "bottom top".parse::<TriggerSpec>().unwrap(),
        TriggerSpec::new(1.0, 0.0)
    );
    assert_eq!(
        "center".parse::<TriggerSpec>().unwrap(),
        TriggerSpec::new(0.5, 0.5)
    );
}

#[test]
fn rejects_malformed_triggers() {
    for bad in ["", "top 85", "middle 10%", "top 10% extra", "top NaN%"] {
        assert!(bad.parse::<TriggerSpec>().is_err(), "{bad:?} should fail");
    }
}

#[test]
fn resolves_against_layout() {
    let vp = Viewport::new(1280.0, 1000.0).unwrap();
    let item = Rect::new(0.0, 3_000.0, 800.0, 3_400.0);
    assert!((ITEM_ENTRY.resolve(item, vp) - 2_150.0).abs() < 1e-9);
    assert!((ITEM_EXIT.resolve(item, vp) - 2_800.0).abs() < 1e-9);
}

#[test]
fn serde_uses_the_string_form() {
    let json = serde_json::to_string(&ITEM_EXIT).unwrap();
    assert_eq!(json, "\"center 40%\"");
    let back: TriggerSpec = serde_json::from_str("\"top 80%\"").unwrap();
    assert_eq!(back, CARD_START);
    assert!(serde_json::from_str::<TriggerSpec>("\"sideways\"").is_err());
}
