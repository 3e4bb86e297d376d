// src/thermal/units.rs - Thermal network node types
use crate::document::ConfigSection;

/// What a referenced node must be for a reference to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Anything producing a temperature: a thermistor or an alias/comparison unit
    TemperatureSource,
    /// A thermistor or an alias of one
    Sensor,
    Heater,
    /// A heater or a fan
    Output,
    Fan,
    /// A unit producing a power value (constant, on-off, pid, proportional)
    Controller,
    Safety,
}

impl Role {
    pub fn accepts(self, kind: NodeKind) -> bool {
        match self {
            Role::TemperatureSource => matches!(
                kind,
                NodeKind::Thermistor
                    | NodeKind::Unit(
                        UnitKind::Alias | UnitKind::Difference | UnitKind::Maximum | UnitKind::Minimum
                    )
            ),
            Role::Sensor => matches!(kind, NodeKind::Thermistor | NodeKind::Unit(UnitKind::Alias)),
            Role::Heater => kind == NodeKind::Heater,
            Role::Output => matches!(kind, NodeKind::Heater | NodeKind::Fan),
            Role::Fan => kind == NodeKind::Fan,
            Role::Controller => matches!(
                kind,
                NodeKind::Unit(
                    UnitKind::ConstantControl
                        | UnitKind::OnOffControl
                        | UnitKind::PidControl
                        | UnitKind::ProportionalControl
                )
            ),
            Role::Safety => kind == NodeKind::Unit(UnitKind::Safety),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Role::TemperatureSource => "a thermistor, alias or comparison unit",
            Role::Sensor => "a thermistor or alias",
            Role::Heater => "a heater",
            Role::Output => "a heater or fan",
            Role::Fan => "a fan",
            Role::Controller => "a control unit",
            Role::Safety => "a safety unit",
        }
    }
}

/// Discriminant of a control unit, as written in its `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Alias,
    Difference,
    Maximum,
    Minimum,
    ConstantControl,
    OnOffControl,
    PidControl,
    ProportionalControl,
    Safety,
    Gcode,
}

impl UnitKind {
    pub fn type_name(self) -> &'static str {
        match self {
            UnitKind::Alias => "alias",
            UnitKind::Difference => "difference",
            UnitKind::Maximum => "maximum",
            UnitKind::Minimum => "minimum",
            UnitKind::ConstantControl => "constant-control",
            UnitKind::OnOffControl => "on-off-control",
            UnitKind::PidControl => "pid-control",
            UnitKind::ProportionalControl => "proportional-control",
            UnitKind::Safety => "safety",
            UnitKind::Gcode => "gcode",
        }
    }
}

/// Any named node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Thermistor,
    Heater,
    Fan,
    Unit(UnitKind),
}

/// A name reference held by a node field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub field: &'static str,
    pub target: &'a str,
    pub role: Role,
}

impl<'a> Reference<'a> {
    fn new(field: &'static str, target: &'a str, role: Role) -> Self {
        Self { field, target, role }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub input_0: String,
    pub input_1: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnOffControl {
    pub input: String,
    pub target_value: f64,
    pub on_offset: f64,
    pub off_offset: f64,
    pub on_value: u8,
    pub off_value: u8,
    pub sleep: f64,
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PidControl {
    pub input: String,
    pub target_value: f64,
    pub kp: f64,
    pub ti: f64,
    pub td: f64,
    pub ok_range: f64,
    pub on_off_range: Option<f64>,
    pub max_value: u8,
    pub sleep: f64,
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProportionalControl {
    pub input: String,
    pub target_value: f64,
    pub kp: f64,
    pub max_value: u8,
    pub min_value: u8,
    pub ok_range: f64,
    pub sleep: f64,
    pub output: Option<String>,
}

/// Runaway and disconnection limits for one heater/sensor pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Safety {
    pub max_rise_rate: f64,
    pub max_fall_rate: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Expected rise (deg/s) while powered and below target - offset, after the delay
    pub min_rise_rate: f64,
    pub min_rise_offset: f64,
    pub min_rise_delay: f64,
    pub input: String,
    pub heater: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GcodeCommand {
    /// Comma separated G/M codes, e.g. `M106, M107`
    pub command: String,
    /// Target fans; empty means every fan.
    pub outputs: Vec<String>,
}

/// Closed set of control unit types.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlUnit {
    Alias { input: String },
    Difference(Comparison),
    Maximum(Comparison),
    Minimum(Comparison),
    ConstantControl { value: u8, output: Option<String> },
    OnOffControl(OnOffControl),
    PidControl(PidControl),
    ProportionalControl(ProportionalControl),
    Safety(Safety),
    Gcode(GcodeCommand),
}

impl ControlUnit {
    pub fn kind(&self) -> UnitKind {
        match self {
            ControlUnit::Alias { .. } => UnitKind::Alias,
            ControlUnit::Difference(_) => UnitKind::Difference,
            ControlUnit::Maximum(_) => UnitKind::Maximum,
            ControlUnit::Minimum(_) => UnitKind::Minimum,
            ControlUnit::ConstantControl { .. } => UnitKind::ConstantControl,
            ControlUnit::OnOffControl(_) => UnitKind::OnOffControl,
            ControlUnit::PidControl(_) => UnitKind::PidControl,
            ControlUnit::ProportionalControl(_) => UnitKind::ProportionalControl,
            ControlUnit::Safety(_) => UnitKind::Safety,
            ControlUnit::Gcode(_) => UnitKind::Gcode,
        }
    }

    /// Every name reference held by this unit.
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut refs = Vec::new();
        match self {
            ControlUnit::Alias { input } => {
                refs.push(Reference::new("input", input, Role::TemperatureSource));
            }
            ControlUnit::Difference(c) | ControlUnit::Maximum(c) | ControlUnit::Minimum(c) => {
                refs.push(Reference::new("input_0", &c.input_0, Role::TemperatureSource));
                refs.push(Reference::new("input_1", &c.input_1, Role::TemperatureSource));
            }
            ControlUnit::ConstantControl { output, .. } => push_output(&mut refs, output),
            ControlUnit::OnOffControl(c) => {
                refs.push(Reference::new("input", &c.input, Role::TemperatureSource));
                push_output(&mut refs, &c.output);
            }
            ControlUnit::PidControl(c) => {
                refs.push(Reference::new("input", &c.input, Role::TemperatureSource));
                push_output(&mut refs, &c.output);
            }
            ControlUnit::ProportionalControl(c) => {
                refs.push(Reference::new("input", &c.input, Role::TemperatureSource));
                push_output(&mut refs, &c.output);
            }
            ControlUnit::Safety(s) => {
                refs.push(Reference::new("input", &s.input, Role::Sensor));
                refs.push(Reference::new("heater", &s.heater, Role::Heater));
            }
            ControlUnit::Gcode(g) => {
                for o in &g.outputs {
                    refs.push(Reference::new("output", o, Role::Fan));
                }
            }
        }
        refs
    }

    /// Heater or fan this unit drives through its own `output` field.
    pub fn output(&self) -> Option<&str> {
        match self {
            ControlUnit::ConstantControl { output, .. } => output.as_deref(),
            ControlUnit::OnOffControl(c) => c.output.as_deref(),
            ControlUnit::PidControl(c) => c.output.as_deref(),
            ControlUnit::ProportionalControl(c) => c.output.as_deref(),
            _ => None,
        }
    }

    pub fn to_section(&self) -> ConfigSection {
        let section = ConfigSection::new().with("type", self.kind().type_name());
        match self {
            ControlUnit::Alias { input } => section.with("input", input.as_str()),
            ControlUnit::Difference(c) | ControlUnit::Maximum(c) | ControlUnit::Minimum(c) => section
                .with("input_0", c.input_0.as_str())
                .with("input_1", c.input_1.as_str()),
            ControlUnit::ConstantControl { value, output } => {
                with_output(section.with("value", *value), output)
            }
            ControlUnit::OnOffControl(c) => with_output(
                section
                    .with("input", c.input.as_str())
                    .with("target_value", c.target_value)
                    .with("on_offset", c.on_offset)
                    .with("off_offset", c.off_offset)
                    .with("on_value", c.on_value)
                    .with("off_value", c.off_value)
                    .with("sleep", c.sleep),
                &c.output,
            ),
            ControlUnit::PidControl(c) => {
                let mut s = section
                    .with("input", c.input.as_str())
                    .with("target_value", c.target_value)
                    .with("Kp", c.kp)
                    .with("Ti", c.ti)
                    .with("Td", c.td)
                    .with("ok_range", c.ok_range);
                if let Some(range) = c.on_off_range {
                    s.insert("on_off_range", range);
                }
                with_output(
                    s.with("max_value", c.max_value).with("sleep", c.sleep),
                    &c.output,
                )
            }
            ControlUnit::ProportionalControl(c) => with_output(
                section
                    .with("input", c.input.as_str())
                    .with("target_value", c.target_value)
                    .with("Kp", c.kp)
                    .with("max_value", c.max_value)
                    .with("min_value", c.min_value)
                    .with("ok_range", c.ok_range)
                    .with("sleep", c.sleep),
                &c.output,
            ),
            ControlUnit::Safety(s) => section
                .with("max_rise_rate", s.max_rise_rate)
                .with("max_fall_rate", s.max_fall_rate)
                .with("min_temp", s.min_temp)
                .with("max_temp", s.max_temp)
                .with("min_rise_rate", s.min_rise_rate)
                .with("min_rise_offset", s.min_rise_offset)
                .with("min_rise_delay", s.min_rise_delay)
                .with("input", s.input.as_str())
                .with("heater", s.heater.as_str()),
            ControlUnit::Gcode(g) => section
                .with("command", g.command.as_str())
                .with("output", g.outputs.join(", ")),
        }
    }
}

fn push_output<'a>(refs: &mut Vec<Reference<'a>>, output: &'a Option<String>) {
    if let Some(o) = output {
        refs.push(Reference::new("output", o, Role::Output));
    }
}

fn with_output(section: ConfigSection, output: &Option<String>) -> ConfigSection {
    match output {
        Some(o) => section.with("output", o.as_str()),
        None => section,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thermistor {
    pub name: String,
    pub sensor: String,
    pub path_adc: String,
}

impl Thermistor {
    pub fn to_section(&self) -> ConfigSection {
        ConfigSection::new()
            .with("sensor", self.sensor.as_str())
            .with("path_adc", self.path_adc.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heater {
    pub name: String,
    pub mosfet: u32,
    pub prefix: String,
    /// Control unit driving this heater
    pub input: Option<String>,
    pub safety: Vec<String>,
    pub stable_time: u32,
}

impl Heater {
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut refs = Vec::new();
        if let Some(input) = &self.input {
            refs.push(Reference::new("input", input, Role::Controller));
        }
        for s in &self.safety {
            refs.push(Reference::new("safety", s, Role::Safety));
        }
        refs
    }

    pub fn to_section(&self) -> ConfigSection {
        let section = ConfigSection::new()
            .with("mosfet", self.mosfet)
            .with("prefix", self.prefix.as_str());
        let section = match &self.input {
            Some(input) => section.with("input", input.as_str()),
            None => section,
        };
        section
            .with("safety", self.safety.join(", "))
            .with("stable_time", self.stable_time)
    }
}

/// Fan input: a fixed PWM value or a control unit.
#[derive(Debug, Clone, PartialEq)]
pub enum FanInput {
    Constant(u8),
    Unit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fan {
    pub name: String,
    pub channel: u32,
    pub input: FanInput,
}

impl Fan {
    pub fn references(&self) -> Vec<Reference<'_>> {
        match &self.input {
            FanInput::Unit(unit) => vec![Reference::new("input", unit, Role::Controller)],
            FanInput::Constant(_) => Vec::new(),
        }
    }

    pub fn to_section(&self) -> ConfigSection {
        let section = ConfigSection::new().with("channel", self.channel);
        match &self.input {
            FanInput::Constant(v) => section.with("input", *v),
            FanInput::Unit(u) => section.with("input", u.as_str()),
        }
    }
}
