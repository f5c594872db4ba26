use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = EngineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.lazy_options().unwrap(), ObserveOptions::default());
    assert_eq!(cfg.counter_options().unwrap().threshold, 0.5);
}

#[test]
fn partial_json_fills_in_defaults() {
    let cfg = EngineConfig::from_json_str(r#"{ "overlay_min_dwell_ms": 300 }"#).unwrap();
    assert_eq!(cfg.overlay_min_dwell_ms, 300);
    assert_eq!(cfg.frame_interval_ms, 16);
    assert_eq!(cfg.contact_endpoint, "/api/contact");
}

#[test]
fn invalid_values_are_rejected() {
    for bad in [
        r#"{ "counter_threshold": 1.5 }"#,
        r#"{ "lazy_margin_px": -1 }"#,
        r#"{ "frame_interval_ms": 0 }"#,
        r#"{ "contact_endpoint": " " }"#,
        r#"{ "unknown_knob": 1 }"#,
        "not json",
    ] {
        let err = EngineConfig::from_json_str(bad).unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)), "{bad}: {err}");
    }
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = EngineConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open engine config"));
}
