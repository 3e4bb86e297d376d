// src/sections.rs - Section builders and document assembly
//
// Each builder is a pure function returning one section. `assemble` folds
// them into the document in the order the runtime's reference file uses.

use crate::axes::{AxisSet, SPATIAL_AXES};
use crate::board::tables::{BoardParameters, ENDSTOP_KEYCODES};
use crate::document::{ConfigDocument, ConfigSection};
use crate::thermal::ThermalNetwork;

pub const SYSTEM: &str = "System";
pub const GEOMETRY: &str = "Geometry";
pub const DELTA: &str = "Delta";
pub const STEPPERS: &str = "Steppers";
pub const PLANNER: &str = "Planner";
pub const TEMPERATURE_CONTROL: &str = "Temperature Control";
pub const THERMISTORS: &str = "Thermistors";
pub const FANS: &str = "Fans";
pub const HEATERS: &str = "Heaters";
pub const ENDSTOPS: &str = "Endstops";
pub const HOMING: &str = "Homing";
pub const SERVOS: &str = "Servos";
pub const PROBE: &str = "Probe";
pub const ROTARY_ENCODERS: &str = "Rotary-encoders";
pub const FILAMENT_SENSORS: &str = "Filament-sensors";
pub const WATCHDOG: &str = "Watchdog";
pub const ALARMS: &str = "Alarms";
pub const MACROS: &str = "Macros";
pub const HPX2MAX_PLUGIN: &str = "HPX2MaxPlugin";
pub const DUAL_SERVO_PLUGIN: &str = "DualServoPlugin";

/// Document section order.
pub const SECTION_ORDER: [&str; 20] = [
    SYSTEM,
    GEOMETRY,
    DELTA,
    STEPPERS,
    PLANNER,
    TEMPERATURE_CONTROL,
    THERMISTORS,
    FANS,
    HEATERS,
    ENDSTOPS,
    HOMING,
    SERVOS,
    PROBE,
    ROTARY_ENCODERS,
    FILAMENT_SENSORS,
    WATCHDOG,
    ALARMS,
    MACROS,
    HPX2MAX_PLUGIN,
    DUAL_SERVO_PLUGIN,
];

pub const G28_DEFAULT_AXES: &str = "X,Y,Z,E,H,A,B,C";

pub const G29_MACRO: &str = "
M561                ; Reset the bed level matrix
M558 P0             ; Set probe type to Servo with switch
M557 P0 X10 Y20     ; Set probe point 0
M557 P1 X10 Y180    ; Set probe point 1
M557 P2 X180 Y100   ; Set probe point 2
G28 X0 Y0           ; Home X Y

G28 Z0              ; Home Z
G0 Z12              ; Move Z up to allow space for probe
G32                 ; Undock probe
G92 Z0              ; Reset Z height to 0
G30 P0 S            ; Probe point 0
G0 Z0               ; Move the Z up
G31                 ; Dock probe

G28 Z0              ; Home Z
G0 Z12              ; Move Z up to allow space for probe
G32                 ; Undock probe
G92 Z0              ; Reset Z height to 0
G30 P1 S            ; Probe point 1
G0 Z0               ; Move the Z up
G31                 ; Dock probe

G28 Z0              ; Home Z
G0 Z12              ; Move Z up to allow space for probe
G32                 ; Undock probe
G92 Z0              ; Reset Z height to 0
G30 P2 S            ; Probe point 2
G0 Z0               ; Move the Z up
G31                 ; Dock probe

G28 X0 Y0           ; Home X Y";

pub const G31_MACRO: &str = "M280 P0 S320 F3000  ; Probe up (Dock sled)";
pub const G32_MACRO: &str = "M280 P0 S-60 F3000  ; Probe down (Undock sled)";

/// `{attribute}_{axis}` key for per-axis scalars.
pub fn axis_key(attribute: &str, axis: &str) -> String {
    format!("{attribute}_{axis}")
}

fn per_axis<'a, V>(
    axes: &'a AxisSet,
    attribute: &'static str,
    value: V,
) -> impl Iterator<Item = (String, V)> + 'a
where
    V: Clone + 'a,
{
    axes.iter().map(move |a| (axis_key(attribute, a), value.clone()))
}

pub fn system(params: &BoardParameters) -> ConfigSection {
    ConfigSection::new()
        // CRITICAL=50 ERROR=40 WARNING=30 INFO=20 DEBUG=10
        .with("loglevel", 20)
        .with("log_to_file", true)
        .with("logfile", "/home/octo/.octoprint/logs/plugin_redeem.log")
        .with("data_path", "/etc/redeem")
        .with("plugins", "")
        .with("machine_type", "Unknown")
        .with("replicape_revision", params.revisions.main.as_str())
        .with("pwm_freq", params.pwm_frequency)
        .with("num_axes", params.axis_count)
}

pub fn geometry(axes: &AxisSet) -> ConfigSection {
    let mut c = ConfigSection::new().with("axis_config", 0);
    c.extend(per_axis(axes, "travel", 0.2));
    c.extend(per_axis(axes, "offset", 0.2));
    c.with(
        "bed_compensation_matrix",
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ],
    )
}

pub fn delta() -> ConfigSection {
    let mut c = ConfigSection::new().with("L", 0.322).with("r", 0.175);
    for tower in ["A", "B", "C"] {
        c.insert(format!("{tower}_radial"), 0.0);
        c.insert(format!("{tower}_angular"), 0.0);
    }
    c
}

pub fn steppers(axes: &AxisSet) -> ConfigSection {
    let mut c = ConfigSection::new().with("number_of_extruders", 2);
    for a in axes.iter() {
        c.insert(axis_key("microstepping", a), 3);
        c.insert(axis_key("current", a), 0.5);
        c.insert(axis_key("steps_pr_mm", a), 50.0);
        c.insert(axis_key("backlash", a), 0.0);
        c.insert(axis_key("in_use", a), true);
        c.insert(axis_key("direction", a), 1);
        c.insert(axis_key("slow_decay", a), 0);
        c.insert(axis_key("slave", a), "");
    }
    c.with("use_timeout", true).with("timeout_seconds", 500)
}

pub fn planner(axes: &AxisSet) -> ConfigSection {
    let mut c = ConfigSection::new()
        .with("move_cache_size", 1024)
        .with("print_move_buffer_wait", 250)
        .with("max_buffered_move_time", 1000);
    for a in axes.iter() {
        c.insert(axis_key("acceleration", a), 0.5);
        c.insert(axis_key("max_jerk", a), 0.01);
        c.insert(axis_key("max_speed", a), 0.03);
    }
    c.with("arc_segment_length", 0.001).with("e_axis_active", true)
}

/// Control units, gcode unit first, then pid/safety pairs per heater.
pub fn temperature_control(network: &ThermalNetwork) -> ConfigSection {
    network
        .units()
        .map(|(name, unit)| (name, unit.to_section()))
        .collect()
}

pub fn thermistors(network: &ThermalNetwork) -> ConfigSection {
    network
        .thermistors()
        .iter()
        .map(|t| (t.name.as_str(), t.to_section()))
        .collect()
}

pub fn fans(network: &ThermalNetwork) -> ConfigSection {
    network
        .fans()
        .iter()
        .map(|f| (f.name.as_str(), f.to_section()))
        .collect()
}

pub fn heaters(network: &ThermalNetwork) -> ConfigSection {
    network
        .heaters()
        .iter()
        .map(|h| (h.name.as_str(), h.to_section()))
        .collect()
}

pub fn endstops(params: &BoardParameters, axes: &AxisSet) -> ConfigSection {
    let mut c: ConfigSection = axes
        .iter()
        .enumerate()
        .map(|(i, a)| (axis_key("has", a), i < SPATIAL_AXES))
        .collect();
    c.insert("inputdev", "/dev/input/by-path/platform-ocp:gpio_keys-event");
    // CPU runs at 200 MHz
    c.insert("end_stop_delay_cycles", 1000);
    for axis in ["X", "Y", "Z"] {
        for n in [1, 2] {
            c.insert(format!("invert_{axis}{n}"), false);
            c.insert(format!("end_stop_{axis}{n}_stops"), "");
        }
    }
    for (endstop, pin) in &params.endstop_pins {
        c.insert(format!("pin_{endstop}"), *pin);
    }
    for (endstop, keycode) in ENDSTOP_KEYCODES {
        c.insert(format!("keycode_{endstop}"), keycode);
    }
    c.insert("homing_only_endstops", "");
    c.extend(per_axis(axes, "soft_end_stop_min", -1000.0));
    c.extend(per_axis(axes, "soft_end_stop_max", 1000.0));
    c
}

pub fn homing(axes: &AxisSet) -> ConfigSection {
    let mut c = ConfigSection::new().with("G28_default_axes", G28_DEFAULT_AXES);
    for a in axes.iter() {
        c.insert(axis_key("home_speed", a), 0.1);
        c.insert(axis_key("home_backoff_speed", a), 0.01);
        c.insert(axis_key("home_backoff_offset", a), 0.01);
        c.insert(axis_key("home", a), 0.0);
    }
    c
}

/// Reference servo entry, disabled.
pub fn servos() -> ConfigSection {
    ConfigSection::new()
        .with("servo_0_enable", false)
        .with("servo_0_channel", "P9_14")
        .with("servo_0_angle_init", 90)
        .with("servo_0_angle_min", -90)
        .with("servo_0_angle_max", 90)
        .with("servo_0_pulse_min", 0.001)
        .with("servo_0_pulse_max", 0.002)
}

pub fn probe() -> ConfigSection {
    ConfigSection::new()
        .with("length", 0.01)
        .with("speed", 0.05)
        .with("accel", 0.1)
        .with("offset_x", 0.0)
        .with("offset_y", 0.0)
        .with("offset_z", 0.0)
}

pub fn rotary_encoders() -> ConfigSection {
    ConfigSection::new()
        .with("enable-e", false)
        .with("event-e", "/dev/input/event1")
        .with("cpr-e", -360)
        .with("diameter-e", 0.003)
}

pub fn filament_sensors() -> ConfigSection {
    ConfigSection::new().with("alarm-level-e", 0.01)
}

pub fn watchdog() -> ConfigSection {
    ConfigSection::new().with("enable_watchdog", true)
}

pub fn alarms() -> ConfigSection {
    ConfigSection::new()
}

pub fn macros() -> ConfigSection {
    ConfigSection::new()
        .with("G29", G29_MACRO)
        .with("G31", G31_MACRO)
        .with("G32", G32_MACRO)
}

pub fn hpx2max_plugin() -> ConfigSection {
    ConfigSection::new()
        .with("servo_channel", 1)
        .with("extruder_0_angle", 20)
        .with("extruder_1_angle", 175)
}

pub fn dual_servo_plugin() -> ConfigSection {
    ConfigSection::new()
        .with("servo_channel", "P9_14")
        .with("pulse_min", 0.001)
        .with("pulse_max", 0.002)
        .with("angle_min", -90)
        .with("angle_max", 90)
        .with("extruder_0_angle", -5)
        .with("extruder_1_angle", 5)
}

/// Fold every section into one document in [`SECTION_ORDER`].
pub fn assemble(params: &BoardParameters, axes: &AxisSet, network: &ThermalNetwork) -> ConfigDocument {
    [
        (SYSTEM, system(params)),
        (GEOMETRY, geometry(axes)),
        (DELTA, delta()),
        (STEPPERS, steppers(axes)),
        (PLANNER, planner(axes)),
        (TEMPERATURE_CONTROL, temperature_control(network)),
        (THERMISTORS, thermistors(network)),
        (FANS, fans(network)),
        (HEATERS, heaters(network)),
        (ENDSTOPS, endstops(params, axes)),
        (HOMING, homing(axes)),
        (SERVOS, servos()),
        (PROBE, probe()),
        (ROTARY_ENCODERS, rotary_encoders()),
        (FILAMENT_SENSORS, filament_sensors()),
        (WATCHDOG, watchdog()),
        (ALARMS, alarms()),
        (MACROS, macros()),
        (HPX2MAX_PLUGIN, hpx2max_plugin()),
        (DUAL_SERVO_PLUGIN, dual_servo_plugin()),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigValue;

    #[test]
    fn test_per_axis_keys() {
        let axes = AxisSet::new(5).unwrap();
        let c = steppers(&axes);
        for a in ["x", "y", "z", "e", "h"] {
            assert!(c.contains_key(&format!("steps_pr_mm_{a}")), "{a}");
        }
        assert!(!c.contains_key("steps_pr_mm_a"));
        assert_eq!(c.keys().filter(|k| *k == "use_timeout").count(), 1);
    }

    #[test]
    fn test_geometry_offsets_every_axis() {
        let axes = AxisSet::new(7).unwrap();
        let c = geometry(&axes);
        for a in axes.iter() {
            assert!(c.contains_key(&axis_key("offset", a)));
            assert!(c.contains_key(&axis_key("travel", a)));
        }
        assert!(matches!(c.get("bed_compensation_matrix"), Some(ConfigValue::List(rows)) if rows.len() == 3));
    }

    #[test]
    fn test_endstop_homing_flags() {
        let axes = AxisSet::new(5).unwrap();
        let params_axes = endstops_fixture();
        let c = endstops(&params_axes, &axes);
        assert_eq!(c.get("has_x").and_then(ConfigValue::as_bool), Some(true));
        assert_eq!(c.get("has_z").and_then(ConfigValue::as_bool), Some(true));
        assert_eq!(c.get("has_e").and_then(ConfigValue::as_bool), Some(false));
        assert_eq!(c.get("keycode_Z2").and_then(ConfigValue::as_int), Some(117));
        assert_eq!(c.get("pin_Y2").and_then(ConfigValue::as_str), Some("GPIO3_17"));
        assert_eq!(c.get("soft_end_stop_min_h").and_then(ConfigValue::as_float), Some(-1000.0));
    }

    fn endstops_fixture() -> BoardParameters {
        use crate::board::{Board, BoardRevisions, Revision};
        let main = Revision::parse(Board::Main, "00B3").unwrap().unwrap();
        BoardParameters::resolve(BoardRevisions {
            main,
            expansion: None,
            main_is_fallback: false,
        })
        .unwrap()
    }

    #[test]
    fn test_section_order() {
        let params = endstops_fixture();
        let axes = AxisSet::new(params.axis_count).unwrap();
        let network = ThermalNetwork::build_default(&axes.heaters(), &params.fan_channels).unwrap();
        let doc = assemble(&params, &axes, &network);
        assert_eq!(doc.section_names().collect::<Vec<_>>(), SECTION_ORDER);
        assert!(doc.section(ALARMS).unwrap().is_empty());
    }
}
