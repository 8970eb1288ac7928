/*!
 * App configuration tests
 */

use pdflingo::app_config::Config;

use crate::common::create_temp_dir;

#[test]
fn test_default_config_has_sane_values() {
    let config = Config::default();
    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "es");
    assert_eq!(config.translation.worker_count, 8);
    assert_eq!(config.translation.retry_count, 3);
    assert_eq!(config.chunking.word_budget, 5000);
    assert!((config.extraction.corruption_threshold - 0.2).abs() < f32::EPSILON);
    assert!(config.pricing.contains_key(&config.translation.model));
}

#[test]
fn test_config_round_trips_through_file() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.translation.api_key = "test-key".to_string();
    config.target_language = "ja".to_string();
    config.chunking.word_budget = 2500;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.target_language, "ja");
    assert_eq!(loaded.chunking.word_budget, 2500);
    assert_eq!(loaded.translation.api_key, "test-key");
}

#[test]
fn test_minimal_config_file_fills_defaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "source_language": "fr",
            "target_language": "de",
            "translation": { "api_key": "k" }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.source_language, "fr");
    assert_eq!(config.translation.worker_count, 8);
    assert_eq!(config.translation.model, "claude-sonnet-4-5-20250929");
    assert_eq!(config.extraction.min_image_dimension, 50);
    assert!(config.extraction.extract_images);
}

#[test]
fn test_validate_for_translation_rejects_missing_api_key() {
    let config = Config::default();
    assert!(config.validate_for_translation().is_err());
}

#[test]
fn test_validate_allows_missing_api_key_for_offline_commands() {
    // inspect and estimate never call the service, so a keyless config
    // must still load and validate
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_keyless_config_file_loads_for_offline_commands() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "source_language": "en",
            "target_language": "es",
            "translation": {}
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.translation.api_key.is_empty());
    assert!(config.validate_for_translation().is_err());
}

#[test]
fn test_validate_rejects_zero_workers() {
    let mut config = Config::default();
    config.translation.api_key = "k".to_string();
    config.translation.worker_count = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_out_of_range_corruption_threshold() {
    let mut config = Config::default();
    config.translation.api_key = "k".to_string();
    config.extraction.corruption_threshold = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_malformed_endpoint() {
    let mut config = Config::default();
    config.translation.api_key = "k".to_string();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_accepts_empty_endpoint() {
    let mut config = Config::default();
    config.translation.api_key = "k".to_string();
    config.translation.endpoint = String::new();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_unknown_language() {
    let mut config = Config::default();
    config.translation.api_key = "k".to_string();
    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_accepts_complete_config() {
    let mut config = Config::default();
    config.translation.api_key = "k".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_model_pricing_lookup() {
    let mut config = Config::default();
    assert!(config.model_pricing().is_some());

    config.translation.model = "unknown-model".to_string();
    assert!(config.model_pricing().is_none());
}
