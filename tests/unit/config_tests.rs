// Configuration module unit tests
// Loading presets and batch thresholds from YAML and JSON files

use std::io::Write;

use markscale::config::*;
use markscale::watermark::{BaseOn, ScaleMode, WatermarkKind, WatermarkPosition};
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(yaml.as_bytes())
        .expect("Failed to write to temp file");
    temp_file.flush().expect("Failed to flush temp file");
    temp_file
}

#[test]
fn test_can_load_config_from_yaml_file_path() {
    let yaml = r##"
batch:
  proportional_area_ratio: 4
  adaptive_area_ratio: 16
presets:
  - id: corner
    name: Corner copyright
    category: text
    watermark:
      type: text
      content: "© 2024"
      color: "#FF0000"
      scale_mode: adaptive
      position:
        position: top-left
        offset_x: 1.5
      adaptive:
        scale_ratio: 0.04
        base_on: shorter-edge
"##;
    let temp_file = write_config(yaml);

    let config = Config::from_file(temp_file.path()).expect("Failed to load config from file");

    assert_eq!(config.batch.proportional_area_ratio, 4.0);
    assert_eq!(config.batch.adaptive_area_ratio, 16.0);
    assert!(config.batch.parallel);

    let preset = config.preset("corner").expect("preset should exist");
    let watermark = &preset.watermark;
    assert_eq!(watermark.scale_mode, ScaleMode::Adaptive);
    assert_eq!(watermark.position.position, WatermarkPosition::TopLeft);
    assert_eq!(watermark.position.offset_x, 1.5);
    assert_eq!(watermark.adaptive.scale_ratio, 0.04);
    assert_eq!(watermark.adaptive.base_on, Some(BaseOn::ShorterEdge));

    match &watermark.kind {
        WatermarkKind::Text(style) => {
            assert_eq!(style.content, "© 2024");
            assert_eq!(style.color, "#FF0000");
            // untouched fields come from the defaults table
            assert_eq!(style.font_size, defaults::FONT_SIZE);
            assert_eq!(style.opacity, defaults::OPACITY);
        }
        other => panic!("Expected text watermark, got {:?}", other),
    }
}

#[test]
fn test_json_file_is_loaded_by_extension() {
    let json = r#"{
        "batch": { "adaptive_area_ratio": 20, "parallel": false },
        "presets": [
            {
                "id": "stamp",
                "name": "Stamp",
                "is_default": true,
                "watermark": { "type": "text", "content": "PAID", "scale_mode": "fixed" }
            }
        ]
    }"#;
    let mut temp_file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    temp_file
        .write_all(json.as_bytes())
        .expect("Failed to write to temp file");
    temp_file.flush().expect("Failed to flush temp file");

    let config = Config::from_file(temp_file.path()).expect("Failed to load JSON config");
    assert_eq!(config.batch.adaptive_area_ratio, 20.0);
    assert!(!config.batch.parallel);

    let preset = config.default_preset().expect("preset should exist");
    assert_eq!(preset.id, "stamp");
    assert_eq!(preset.watermark.scale_mode, ScaleMode::Fixed);
}

#[test]
fn test_invalid_json_file_reports_json_error() {
    let mut temp_file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    // Valid YAML, but not JSON
    temp_file
        .write_all(b"batch:\n  parallel: false\n")
        .expect("Failed to write to temp file");
    temp_file.flush().expect("Failed to flush temp file");

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_returns_error_for_non_existent_file() {
    let non_existent_path = "/tmp/markscale_config_that_does_not_exist_12345.yaml";
    let err = Config::from_file(non_existent_path).unwrap_err();

    assert!(matches!(err, ConfigError::Io(_)));
    assert!(
        err.to_string().contains("Failed to read config file"),
        "Error message should mention failed to read config file, got: {}",
        err
    );
}

#[test]
fn test_from_file_rejects_invalid_config() {
    let yaml = r#"
batch:
  proportional_area_ratio: 20
  adaptive_area_ratio: 10
"#;
    let temp_file = write_config(yaml);

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_from_file_rejects_two_default_presets() {
    let yaml = r#"
presets:
  - id: a
    name: A
    is_default: true
    watermark: { type: text, content: a }
  - id: b
    name: B
    is_default: true
    watermark: { type: text, content: b }
"#;
    let temp_file = write_config(yaml);

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("Only one preset may be the default"));
}

#[test]
fn test_env_var_substitution_in_config_file() {
    std::env::set_var("MARKSCALE_TEST_PRESET_TEXT", "Confidential");

    let yaml = r#"
presets:
  - id: env
    name: From environment
    watermark:
      type: text
      content: "${MARKSCALE_TEST_PRESET_TEXT}"
"#;
    let temp_file = write_config(yaml);

    let config = Config::from_file(temp_file.path()).expect("Failed to load config from file");
    match &config.presets[0].watermark.kind {
        WatermarkKind::Text(style) => assert_eq!(style.content, "Confidential"),
        other => panic!("Expected text watermark, got {:?}", other),
    }
}

#[test]
fn test_missing_env_var_is_reported_by_name() {
    let yaml = "presets:\n  - id: x\n    name: ${MARKSCALE_TEST_NEVER_SET}\n    watermark: { type: text }\n";
    let temp_file = write_config(yaml);

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("MARKSCALE_TEST_NEVER_SET"));
}

#[test]
fn test_fullscreen_preset_with_tiling_options() {
    let yaml = r#"
presets:
  - id: draft
    name: Draft overlay
    category: fullscreen
    watermark:
      type: fullscreen
      mode: text
      content: DRAFT
      rotation: -30
      tile_spacing: 150
      diagonal_mode: true
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    config.validate().unwrap();

    let preset = config.default_preset().unwrap();
    assert_eq!(preset.category, PresetCategory::Fullscreen);
    match &preset.watermark.kind {
        WatermarkKind::Fullscreen(style) => {
            assert_eq!(style.content, "DRAFT");
            assert_eq!(style.rotation, -30.0);
            assert_eq!(style.tile_spacing, 150.0);
            assert!(style.diagonal_mode);
            assert_eq!(style.tile_density, defaults::TILE_DENSITY);
        }
        other => panic!("Expected fullscreen watermark, got {:?}", other),
    }
}

#[test]
fn test_config_round_trips_through_yaml() {
    let config = Config::from_yaml_with_env(
        r#"
logging:
  level: "markscale=debug"
presets:
  - id: logo
    name: Logo
    watermark: { type: image, image_url: logo.png, width: 120, height: 40 }
"#,
    )
    .unwrap();

    let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");
    let reparsed = Config::from_yaml_with_env(&yaml).unwrap();

    assert_eq!(reparsed.logging, config.logging);
    assert_eq!(reparsed.presets, config.presets);
}
