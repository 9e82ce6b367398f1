use reel_core::{ConfigError, SlotConfig};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("reel-core-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_load_config_from_file() {
    let path = temp_path("config");
    let json = serde_json::json!({
        "reel_count": 4,
        "visible_rows": 4,
        "slots_per_reel": 7,
        "symbol_pitch": 96.0,
        "timing": { "normal_speed": 1500.0, "quick_stop_time": 0.25 },
        "anticipation": { "extra_symbols": 5 }
    });
    std::fs::write(&path, json.to_string()).unwrap();

    let config = SlotConfig::from_path(&path);
    std::fs::remove_file(&path).ok();
    let config = config.unwrap();

    assert_eq!(config.reel_count, 4);
    assert_eq!(config.timing.normal_speed, 1500.0);
    assert_eq!(config.timing.deceleration_time, 1.2, "unset fields keep their defaults");
    assert_eq!(config.anticipation.extra_symbols, 5);
    assert_eq!(config.anticipation.time_compression, 1.2);

    let layout = config.layout().unwrap();
    assert_eq!(layout.last_page_distance(), 96.0 * 5.0);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SlotConfig::from_path(temp_path("missing")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_invalid_file_is_rejected() {
    let path = temp_path("invalid");
    std::fs::write(&path, r#"{ "visible_rows": 6, "slots_per_reel": 6 }"#).unwrap();
    let err = SlotConfig::from_path(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ConfigError::TooFewSlots { slots: 6, visible: 6 }));
    assert!(err.to_string().contains("must exceed"));
}
