// src/board/tables.rs - Revision-keyed parameter tables
//
// Every lookup here is an explicit table. A revision missing from a table it
// is required for is an `UnknownRevision` error, never a carried-over value.

use crate::board::{Board, BoardRevisions, Revision};
use crate::error::{GeneratorError, Result};

/// Axis count with no expansion board installed.
pub const BASE_AXIS_COUNT: usize = 5;

/// Expansion revision -> axis count.
pub const AXIS_COUNT_TABLE: &[(&str, usize)] = &[("00A0", 8), ("00B0", 7)];

/// Main revision -> PWM frequency in Hz.
pub const PWM_FREQUENCY_TABLE: &[(&str, u32)] = &[
    ("00A4", 100),
    ("0A4A", 100),
    ("00B1", 1000),
    ("00B2", 1000),
    ("00B3", 1000),
    ("0B3A", 1000),
];

/// Main revision -> fan PWM channels.
pub const FAN_CHANNEL_TABLE: &[(&str, &[u32])] = &[
    ("00A3", &[0, 1, 2]),
    ("0A4A", &[8, 9, 10]),
    ("00B1", &[7, 8, 9, 10]),
    ("00B2", &[7, 8, 9, 10]),
    ("00B3", &[7, 8, 9, 10]),
    ("0B3A", &[7, 8, 9, 10]),
];

/// Expansion revision -> fan PWM channels, taking precedence over the main board.
pub const EXPANSION_FAN_CHANNEL_TABLE: &[(&str, &[u32])] = &[("00A0", &[14, 15, 7])];

/// ADC input for each heater position.
pub const ADC_CHANNELS: [u32; 6] = [6, 4, 5, 0, 3, 2];

/// Heater mosfet for each heater position.
pub const HEATER_MOSFETS: [u32; 6] = [4, 5, 3, 11, 12, 13];

/// Number of heaters the positional tables can address.
pub const HEATER_CAPACITY: usize = ADC_CHANNELS.len();

pub const ADC_PATH_TEMPLATE: &str = "/sys/bus/iio/devices/iio:device0/in_voltage{}_raw";

/// Main revision -> `pin_Y2`, for the one endstop pin that moved between revisions.
pub const Y2_PIN_TABLE: &[(&str, &str)] = &[("0A4A", "GPIO1_19")];
pub const Y2_PIN_DEFAULT: &str = "GPIO3_17";

fn lookup<T: Copy>(table: &[(&str, T)], revision: &Revision) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| *key == revision.as_str())
        .map(|(_, value)| *value)
}

/// Axis count for an optional expansion board.
pub fn axis_count(expansion: Option<&Revision>) -> Result<usize> {
    match expansion {
        None => Ok(BASE_AXIS_COUNT),
        Some(rev) => lookup(AXIS_COUNT_TABLE, rev).ok_or_else(|| GeneratorError::UnknownRevision {
            board: Board::Expansion,
            revision: rev.to_string(),
            table: "axis count",
        }),
    }
}

/// PWM frequency for a main board revision.
pub fn pwm_frequency(main: &Revision) -> Result<u32> {
    lookup(PWM_FREQUENCY_TABLE, main).ok_or_else(|| GeneratorError::UnknownRevision {
        board: Board::Main,
        revision: main.to_string(),
        table: "PWM frequency",
    })
}

/// Fan channels; an expansion board entry overrides the main board table.
pub fn fan_channels(main: &Revision, expansion: Option<&Revision>) -> Result<Vec<u32>> {
    if let Some(channels) = expansion.and_then(|rev| lookup(EXPANSION_FAN_CHANNEL_TABLE, rev)) {
        return Ok(channels.to_vec());
    }
    lookup(FAN_CHANNEL_TABLE, main)
        .map(<[u32]>::to_vec)
        .ok_or_else(|| GeneratorError::UnknownRevision {
            board: Board::Main,
            revision: main.to_string(),
            table: "fan channel",
        })
}

/// Sysfs path of the ADC input sampled for heater position `index`.
pub fn thermistor_path(index: usize) -> Option<String> {
    ADC_CHANNELS
        .get(index)
        .map(|channel| ADC_PATH_TEMPLATE.replace("{}", &channel.to_string()))
}

pub fn heater_mosfet(index: usize) -> Option<u32> {
    HEATER_MOSFETS.get(index).copied()
}

/// Label prefix for heater position `index`: `B` for the bed, then `T0`, `T1`, ...
pub fn heater_prefix(index: usize) -> Option<String> {
    match index {
        i if i >= HEATER_CAPACITY => None,
        0 => Some("B".to_string()),
        i => Some(format!("T{}", i - 1)),
    }
}

/// Endstop input pins, in document order.
pub fn endstop_pins(main: &Revision) -> Vec<(&'static str, &'static str)> {
    let y2 = lookup(Y2_PIN_TABLE, main).unwrap_or(Y2_PIN_DEFAULT);
    vec![
        ("X1", "GPIO3_21"),
        ("X2", "GPIO0_30"),
        ("Y1", "GPIO1_17"),
        ("Y2", y2),
        ("Z1", "GPIO0_31"),
        ("Z2", "GPIO0_4"),
    ]
}

/// Input-event keycodes of the six endstops.
pub const ENDSTOP_KEYCODES: [(&str, u32); 6] = [
    ("X1", 112),
    ("X2", 113),
    ("Y1", 114),
    ("Y2", 115),
    ("Z1", 116),
    ("Z2", 117),
];

/// Every revision-derived scalar, resolved once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardParameters {
    pub revisions: BoardRevisions,
    pub axis_count: usize,
    pub pwm_frequency: u32,
    pub fan_channels: Vec<u32>,
    pub endstop_pins: Vec<(&'static str, &'static str)>,
}

impl BoardParameters {
    pub fn resolve(revisions: BoardRevisions) -> Result<Self> {
        let axis_count = axis_count(revisions.expansion.as_ref())?;
        let pwm_frequency = pwm_frequency(&revisions.main)?;
        let fan_channels = fan_channels(&revisions.main, revisions.expansion.as_ref())?;
        let endstop_pins = endstop_pins(&revisions.main);
        tracing::debug!(
            axis_count,
            pwm_frequency,
            ?fan_channels,
            "Resolved board parameters for Replicape rev. {}",
            revisions.main
        );
        Ok(Self {
            revisions,
            axis_count,
            pwm_frequency,
            fan_channels,
            endstop_pins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(s: &str) -> Revision {
        Revision::parse(Board::Main, s).unwrap().unwrap()
    }

    #[test]
    fn test_axis_count() {
        assert_eq!(axis_count(None).unwrap(), 5);
        assert_eq!(axis_count(Some(&rev("00A0"))).unwrap(), 8);
        assert_eq!(axis_count(Some(&rev("00B0"))).unwrap(), 7);
        let err = axis_count(Some(&rev("00C0"))).unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownRevision { board: Board::Expansion, .. }));
    }

    #[test]
    fn test_pwm_frequency() {
        assert_eq!(pwm_frequency(&rev("00A4")).unwrap(), 100);
        assert_eq!(pwm_frequency(&rev("0A4A")).unwrap(), 100);
        for r in ["00B1", "00B2", "00B3", "0B3A"] {
            assert_eq!(pwm_frequency(&rev(r)).unwrap(), 1000);
        }
        let err = pwm_frequency(&rev("00A3")).unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownRevision { table: "PWM frequency", .. }));
    }

    #[test]
    fn test_pwm_sets_are_disjoint() {
        for (i, (a, _)) in PWM_FREQUENCY_TABLE.iter().enumerate() {
            for (b, _) in &PWM_FREQUENCY_TABLE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_fan_channels() {
        assert_eq!(fan_channels(&rev("00A3"), None).unwrap(), vec![0, 1, 2]);
        assert_eq!(fan_channels(&rev("0A4A"), None).unwrap(), vec![8, 9, 10]);
        assert_eq!(fan_channels(&rev("0B3A"), None).unwrap(), vec![7, 8, 9, 10]);
        assert_eq!(fan_channels(&rev("0B3A"), Some(&rev("00B0"))).unwrap(), vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_expansion_overrides_fan_channels() {
        assert_eq!(fan_channels(&rev("0A4A"), Some(&rev("00A0"))).unwrap(), vec![14, 15, 7]);
        // Override applies even where the main board has no fan entry.
        assert_eq!(fan_channels(&rev("00A4"), Some(&rev("00A0"))).unwrap(), vec![14, 15, 7]);
    }

    #[test]
    fn test_fan_channels_unknown_main() {
        let err = fan_channels(&rev("00A4"), None).unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownRevision { table: "fan channel", .. }));
    }

    #[test]
    fn test_positional_tables() {
        assert_eq!(
            thermistor_path(0).unwrap(),
            "/sys/bus/iio/devices/iio:device0/in_voltage6_raw"
        );
        assert_eq!(thermistor_path(HEATER_CAPACITY), None);
        assert_eq!(heater_mosfet(3), Some(11));
        assert_eq!(heater_prefix(0).as_deref(), Some("B"));
        assert_eq!(heater_prefix(1).as_deref(), Some("T0"));
        assert_eq!(heater_prefix(5).as_deref(), Some("T4"));
        assert_eq!(heater_prefix(6), None);
    }

    #[test]
    fn test_y2_pin_depends_on_main_revision() {
        let pins = endstop_pins(&rev("0A4A"));
        assert!(pins.contains(&("Y2", "GPIO1_19")));
        let pins = endstop_pins(&rev("00B3"));
        assert!(pins.contains(&("Y2", "GPIO3_17")));
    }
}
