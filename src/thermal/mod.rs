//! Thermal management network.
//!
//! The network is a set of uniquely named nodes (thermistors, heaters, fans
//! and control units) wired together by name. Nodes can be added in any
//! order; [`ThermalNetwork::validate`] checks every reference once the
//! network is complete, and [`ThermalNetwork::build_default`] refuses to
//! return a network that fails it.

pub mod units;

use std::collections::HashMap;

use crate::axes::HeaterSet;
use crate::board::tables;
use crate::error::{GeneratorError, Result};
use units::{
    ControlUnit, Fan, FanInput, GcodeCommand, Heater, NodeKind, PidControl, Safety, Thermistor,
};

pub const THERMISTOR_SENSOR: &str = "B57560G104F";
pub const FAN_COMMAND_UNIT: &str = "M106/M107";
pub const FAN_COMMANDS: &str = "M106, M107";
pub const HEATER_STABLE_TIME: u32 = 5;

pub fn thermistor_name(heater: &str) -> String { format!("Thermistor-{heater}") }
pub fn control_name(heater: &str) -> String { format!("Control-{heater}") }
pub fn safety_name(heater: &str) -> String { format!("Safety-{heater}") }
pub fn heater_name(heater: &str) -> String { format!("Heater-{heater}") }
pub fn fan_name(index: usize) -> String { format!("Fan-{index}") }

/// Idle PID loop reading the heater's own thermistor.
pub fn default_pid(heater: &str) -> PidControl {
    PidControl {
        input: thermistor_name(heater),
        target_value: 0.0,
        kp: 0.1,
        ti: 100.0,
        td: 0.3,
        ok_range: 4.0,
        on_off_range: None,
        max_value: 255,
        sleep: 0.25,
        output: None,
    }
}

pub fn default_safety(heater: &str) -> Safety {
    Safety {
        max_rise_rate: 10.0,
        max_fall_rate: 10.0,
        min_temp: 20.0,
        max_temp: 250.0,
        min_rise_rate: 0.1,
        min_rise_offset: 20.0,
        min_rise_delay: 1.0,
        input: thermistor_name(heater),
        heater: heater_name(heater),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThermalNetwork {
    units: Vec<(String, ControlUnit)>,
    thermistors: Vec<Thermistor>,
    heaters: Vec<Heater>,
    fans: Vec<Fan>,
}

impl ThermalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default network: one thermistor, pid loop, safety unit and heater per
    /// heater name, a shared fan command unit, and one idle fan per channel.
    pub fn build_default(heaters: &HeaterSet, fan_channels: &[u32]) -> Result<Self> {
        if heaters.len() > tables::HEATER_CAPACITY {
            return Err(GeneratorError::HeaterTableExhausted {
                heaters: heaters.len(),
                capacity: tables::HEATER_CAPACITY,
            });
        }

        let mut network = ThermalNetwork::new();
        network.add_unit(
            FAN_COMMAND_UNIT,
            ControlUnit::Gcode(GcodeCommand {
                command: FAN_COMMANDS.to_string(),
                outputs: Vec::new(),
            }),
        );

        for (index, h) in heaters.iter().enumerate() {
            network.add_unit(control_name(h), ControlUnit::PidControl(default_pid(h)));
            network.add_unit(safety_name(h), ControlUnit::Safety(default_safety(h)));
            network.add_thermistor(Thermistor {
                name: thermistor_name(h),
                sensor: THERMISTOR_SENSOR.to_string(),
                path_adc: positional(tables::thermistor_path(index), heaters.len())?,
            });
            network.add_heater(Heater {
                name: heater_name(h),
                mosfet: positional(tables::heater_mosfet(index), heaters.len())?,
                prefix: positional(tables::heater_prefix(index), heaters.len())?,
                input: Some(control_name(h)),
                safety: vec![safety_name(h)],
                stable_time: HEATER_STABLE_TIME,
            });
        }

        for (index, channel) in fan_channels.iter().enumerate() {
            network.add_fan(Fan {
                name: fan_name(index),
                channel: *channel,
                input: FanInput::Constant(0),
            });
        }

        network.validate()?;
        tracing::debug!(
            units = network.units.len(),
            heaters = network.heaters.len(),
            fans = network.fans.len(),
            "Built thermal network"
        );
        Ok(network)
    }

    pub fn add_unit(&mut self, name: impl Into<String>, unit: ControlUnit) {
        self.units.push((name.into(), unit));
    }

    pub fn add_thermistor(&mut self, thermistor: Thermistor) {
        self.thermistors.push(thermistor);
    }

    pub fn add_heater(&mut self, heater: Heater) {
        self.heaters.push(heater);
    }

    pub fn add_fan(&mut self, fan: Fan) {
        self.fans.push(fan);
    }

    pub fn units(&self) -> impl Iterator<Item = (&str, &ControlUnit)> {
        self.units.iter().map(|(n, u)| (n.as_str(), u))
    }

    pub fn unit(&self, name: &str) -> Option<&ControlUnit> {
        self.units.iter().find(|(n, _)| n == name).map(|(_, u)| u)
    }

    pub fn thermistors(&self) -> &[Thermistor] {
        &self.thermistors
    }

    pub fn heaters(&self) -> &[Heater] {
        &self.heaters
    }

    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }

    /// Map of every node name to its kind, rejecting duplicates.
    fn index(&self) -> Result<HashMap<&str, NodeKind>> {
        let nodes = self
            .units
            .iter()
            .map(|(n, u)| (n.as_str(), NodeKind::Unit(u.kind())))
            .chain(self.thermistors.iter().map(|t| (t.name.as_str(), NodeKind::Thermistor)))
            .chain(self.heaters.iter().map(|h| (h.name.as_str(), NodeKind::Heater)))
            .chain(self.fans.iter().map(|f| (f.name.as_str(), NodeKind::Fan)));

        let mut index = HashMap::new();
        for (name, kind) in nodes {
            if index.insert(name, kind).is_some() {
                return Err(GeneratorError::DuplicateName(name.to_string()));
            }
        }
        Ok(index)
    }

    /// Check names are unique, every reference resolves to a node of the
    /// expected role, and no heater has more than one primary controller.
    pub fn validate(&self) -> Result<()> {
        let index = self.index()?;

        let unit_refs = self.units.iter().map(|(n, u)| (n.as_str(), u.references()));
        let heater_refs = self.heaters.iter().map(|h| (h.name.as_str(), h.references()));
        let fan_refs = self.fans.iter().map(|f| (f.name.as_str(), f.references()));

        for (node, refs) in unit_refs.chain(heater_refs).chain(fan_refs) {
            for r in refs {
                let kind = index.get(r.target).copied().ok_or_else(|| {
                    GeneratorError::DanglingReference {
                        node: node.to_string(),
                        field: r.field,
                        target: r.target.to_string(),
                    }
                })?;
                if !r.role.accepts(kind) {
                    return Err(GeneratorError::WrongRole {
                        node: node.to_string(),
                        field: r.field,
                        target: r.target.to_string(),
                        expected: r.role.describe(),
                    });
                }
            }
        }

        for heater in &self.heaters {
            let mut controllers: Vec<String> = heater.input.iter().cloned().collect();
            for (name, unit) in &self.units {
                if unit.output() == Some(heater.name.as_str()) && !controllers.contains(name) {
                    controllers.push(name.clone());
                }
            }
            if controllers.len() > 1 {
                return Err(GeneratorError::HeaterConflict {
                    heater: heater.name.clone(),
                    controllers,
                });
            }
        }
        Ok(())
    }

    /// Names of every safety unit guarding `heater`.
    pub fn safeties_for(&self, heater: &str) -> Vec<&str> {
        self.units
            .iter()
            .filter_map(|(n, u)| match u {
                ControlUnit::Safety(s) if s.heater == heater => Some(n.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of references checked by [`validate`](Self::validate).
    pub fn reference_count(&self) -> usize {
        self.units.iter().map(|(_, u)| u.references().len()).sum::<usize>()
            + self.heaters.iter().map(|h| h.references().len()).sum::<usize>()
            + self.fans.iter().map(|f| f.references().len()).sum::<usize>()
    }
}

fn positional<T>(value: Option<T>, heaters: usize) -> Result<T> {
    value.ok_or(GeneratorError::HeaterTableExhausted {
        heaters,
        capacity: tables::HEATER_CAPACITY,
    })
}
