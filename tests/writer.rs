// Rendering and persistence of full generated documents

use cape_defaults::board::FixedRevisions;
use cape_defaults::config::{OutputFormat, Settings};
use cape_defaults::{generate_default_config, writer, GeneratorError};
use tempfile::tempdir;

#[test]
fn test_generate_default_config_writes_cfg() {
    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.path = dir.path().join("default.cfg");

    let generated =
        generate_default_config(&FixedRevisions::new(Some("0B3A"), None), &settings).unwrap();
    let text = std::fs::read_to_string(&settings.output.path).unwrap();

    assert_eq!(text, writer::render_cfg(&generated.document));
    assert!(text.starts_with("[System]\nloglevel = 20\n"));
    assert!(text.contains("replicape_revision = 0B3A\n"));
    assert!(text.contains("[Temperature Control]\n    [[M106/M107]]\n    type = gcode\n"));
    assert!(text.contains("    [[Heater-bed]]\n    mosfet = 4\n    prefix = B\n"));
    assert!(text.contains("G29 = '''\nM561"));
    assert!(text.contains("bed_compensation_matrix = [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]\n"));
    assert!(text.trim_end().ends_with("extruder_1_angle = 5"));
}

#[test]
fn test_unknown_revision_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.path = dir.path().join("default.cfg");

    let err = generate_default_config(&FixedRevisions::new(Some("00A3"), None), &settings)
        .unwrap_err();
    assert!(matches!(err, GeneratorError::UnknownRevision { .. }));
    assert!(!settings.output.path.exists());
}

#[test]
fn test_json_output() {
    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.path = dir.path().join("default.json");
    settings.output.format = OutputFormat::Json;

    generate_default_config(&FixedRevisions::new(Some("00B2"), Some("00B0")), &settings).unwrap();
    let text = std::fs::read_to_string(&settings.output.path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["System"]["num_axes"], 7);
    assert_eq!(value["Heaters"]["Heater-b"]["prefix"], "T3");
}

#[test]
fn test_toml_output_parses() {
    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.path = dir.path().join("default.toml");
    settings.output.format = OutputFormat::Toml;

    generate_default_config(&FixedRevisions::new(Some("0B3A"), Some("00A0")), &settings).unwrap();
    let text = std::fs::read_to_string(&settings.output.path).unwrap();
    let value: toml::Table = toml::from_str(&text).unwrap();
    assert_eq!(value["Fans"]["Fan-0"]["channel"].as_integer(), Some(14));
    assert_eq!(value["System"]["pwm_freq"].as_integer(), Some(1000));
}

#[test]
fn test_unwritable_path_is_write_failure() {
    let dir = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.path = dir.path().join("no-such-dir").join("default.cfg");

    let err = generate_default_config(&FixedRevisions::new(Some("0B3A"), None), &settings)
        .unwrap_err();
    assert!(matches!(err, GeneratorError::Write { .. }));
}
