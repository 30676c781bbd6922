// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use depth_recorder::{CompressionMode, Config, RecorderError};

#[test]
fn test_config_default() {
    // Test that default config can be created and is usable
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.compression, CompressionMode::Lossless);
    assert_eq!(
        config.max_save_attempts, None,
        "Failed writes should be retried until they succeed by default"
    );
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        file_prefix: "kinect".to_string(),
        frame_width: 320,
        frame_height: 240,
        compression: CompressionMode::Quantized { drop_bits: 3 },
        max_save_attempts: Some(10),
        ..Config::default()
    };
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("missing.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Config::load(&path), Err(RecorderError::Config(_))));

    // Parses, but fails validation
    std::fs::write(&path, r#"{ "file_prefix": "" }"#).unwrap();
    assert!(matches!(Config::load(&path), Err(RecorderError::Config(_))));
}

#[test]
fn test_compression_mode_json_shape() {
    let json = serde_json::to_string(&CompressionMode::Quantized { drop_bits: 2 }).unwrap();
    assert_eq!(json, r#"{"mode":"quantized","drop_bits":2}"#);

    let mode: CompressionMode = serde_json::from_str(r#"{"mode":"lossless"}"#).unwrap();
    assert_eq!(mode, CompressionMode::Lossless);
}
