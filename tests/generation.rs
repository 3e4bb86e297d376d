// Integration tests for full generation runs across board revisions

use cape_defaults::board::tables::{PWM_FREQUENCY_TABLE, AXIS_COUNT_TABLE};
use cape_defaults::board::{Board, FixedRevisions};
use cape_defaults::config::RevisionSettings;
use cape_defaults::document::ConfigValue;
use cape_defaults::sections;
use cape_defaults::{generate, GeneratedConfig, GeneratorError};

fn run(main: Option<&str>, reach: Option<&str>) -> Result<GeneratedConfig, GeneratorError> {
    generate(&FixedRevisions::new(main, reach), &RevisionSettings::default())
}

/// Every (main, expansion) pair the tables fully cover.
fn recognized_pairs() -> Vec<(&'static str, Option<&'static str>)> {
    let expansions = std::iter::once(None).chain(AXIS_COUNT_TABLE.iter().map(|(r, _)| Some(*r)));
    let mut pairs = Vec::new();
    for reach in expansions {
        for (main, _) in PWM_FREQUENCY_TABLE {
            if run(Some(*main), reach).is_ok() {
                pairs.push((*main, reach));
            }
        }
    }
    pairs
}

#[test]
fn test_recognized_pairs_cover_tables() {
    let pairs = recognized_pairs();
    // 00A4 has no fan table of its own and only works with a Reach 00A0.
    assert!(pairs.contains(&("00A4", Some("00A0"))));
    assert!(!pairs.contains(&("00A4", None)));
    assert_eq!(pairs.len(), 5 + 5 + 6);
}

#[test]
fn test_axis_and_heater_counts_for_all_pairs() {
    for (main, reach) in recognized_pairs() {
        let generated = run(Some(main), reach).unwrap();
        let axes = generated.axes.len();
        assert!([5, 7, 8].contains(&axes), "{main}/{reach:?}");
        assert_eq!(generated.heaters.len(), axes - 2, "{main}/{reach:?}");
        assert_eq!(generated.heaters.as_slice()[0], "bed");
    }
}

#[test]
fn test_main_0b3a_without_reach() {
    let generated = run(Some("0B3A"), None).unwrap();
    assert_eq!(generated.parameters.pwm_frequency, 1000);
    assert_eq!(generated.parameters.axis_count, 5);
    assert_eq!(generated.heaters.as_slice(), ["bed", "e", "h"]);
    assert_eq!(generated.parameters.fan_channels, vec![7, 8, 9, 10]);

    let fans = generated.document.section(sections::FANS).unwrap();
    assert_eq!(fans.keys().collect::<Vec<_>>(), ["Fan-0", "Fan-1", "Fan-2", "Fan-3"]);
    let fan_3 = fans.get("Fan-3").and_then(ConfigValue::as_section).unwrap();
    assert_eq!(fan_3.get("channel").and_then(ConfigValue::as_int), Some(10));
    assert_eq!(fan_3.get("input").and_then(ConfigValue::as_int), Some(0));
}

#[test]
fn test_reach_absent_defaults_to_five_axes() {
    let generated = run(Some("00B1"), None).unwrap();
    assert_eq!(generated.parameters.axis_count, 5);
    let system = generated.document.section(sections::SYSTEM).unwrap();
    assert_eq!(system.get("num_axes").and_then(ConfigValue::as_int), Some(5));
}

#[test]
fn test_main_00a3_is_unknown_for_pwm() {
    let err = run(Some("00A3"), None).unwrap_err();
    match err {
        GeneratorError::UnknownRevision { board, revision, table } => {
            assert_eq!(board, Board::Main);
            assert_eq!(revision, "00A3");
            assert_eq!(table, "PWM frequency");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_reach_00a0_overrides_fans() {
    for main in ["0A4A", "00B3", "0B3A"] {
        let generated = run(Some(main), Some("00A0")).unwrap();
        assert_eq!(generated.parameters.axis_count, 8);
        assert_eq!(generated.parameters.fan_channels, vec![14, 15, 7]);
        assert_eq!(generated.heaters.len(), 6);
        assert_eq!(generated.document.section(sections::FANS).unwrap().len(), 3);
    }
}

#[test]
fn test_reach_00b0_gives_seven_axes() {
    let generated = run(Some("0B3A"), Some("00B0")).unwrap();
    assert_eq!(generated.axes.iter().collect::<Vec<_>>(), ["x", "y", "z", "e", "h", "a", "b"]);
    assert_eq!(generated.heaters.as_slice(), ["bed", "e", "h", "a", "b"]);
}

#[test]
fn test_unknown_reach_is_rejected() {
    let err = run(Some("0B3A"), Some("00C1")).unwrap_err();
    assert!(matches!(err, GeneratorError::UnknownRevision { board: Board::Expansion, .. }));
}

#[test]
fn test_malformed_revision_is_rejected() {
    let err = run(Some("B3"), None).unwrap_err();
    assert!(matches!(err, GeneratorError::InvalidRevision { board: Board::Main, .. }));
}

#[test]
fn test_missing_main_uses_fallback() {
    let generated = run(None, None).unwrap();
    let system = generated.document.section(sections::SYSTEM).unwrap();
    assert_eq!(system.get("replicape_revision").and_then(ConfigValue::as_str), Some("0B3A"));
    assert_eq!(system.get("pwm_freq").and_then(ConfigValue::as_int), Some(1000));
}

#[test]
fn test_generation_is_idempotent() {
    let a = run(Some("0A4A"), Some("00B0")).unwrap();
    let b = run(Some("0A4A"), Some("00B0")).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        cape_defaults::writer::render_cfg(&a.document),
        cape_defaults::writer::render_cfg(&b.document)
    );
}

#[test]
fn test_per_axis_keys_follow_axis_set() {
    let generated = run(Some("0B3A"), Some("00A0")).unwrap();
    let planner = generated.document.section(sections::PLANNER).unwrap();
    let homing = generated.document.section(sections::HOMING).unwrap();
    for axis in generated.axes.iter() {
        assert!(planner.contains_key(&sections::axis_key("max_speed", axis)));
        assert!(homing.contains_key(&sections::axis_key("home_speed", axis)));
    }
    assert_eq!(planner.keys().filter(|k| k.starts_with("max_speed_")).count(), 8);
}

#[test]
fn test_y2_pin_follows_main_revision() {
    let a4a = run(Some("0A4A"), None).unwrap();
    let b3a = run(Some("0B3A"), None).unwrap();
    let pin = |g: &GeneratedConfig| {
        g.document
            .section(sections::ENDSTOPS)
            .and_then(|s| s.get("pin_Y2"))
            .and_then(ConfigValue::as_str)
            .map(str::to_string)
    };
    assert_eq!(pin(&a4a).as_deref(), Some("GPIO1_19"));
    assert_eq!(pin(&b3a).as_deref(), Some("GPIO3_17"));
}
