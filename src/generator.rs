// src/generator.rs - One generation run, from detected boards to document
use std::fmt;

use crate::axes::{AxisSet, HeaterSet};
use crate::board::tables::BoardParameters;
use crate::board::{BoardRevisions, RevisionResolver};
use crate::config::{RevisionSettings, Settings};
use crate::document::ConfigDocument;
use crate::error::Result;
use crate::sections;
use crate::thermal::ThermalNetwork;
use crate::writer;

/// Everything derived during a run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConfig {
    pub parameters: BoardParameters,
    pub axes: AxisSet,
    pub heaters: HeaterSet,
    pub network: ThermalNetwork,
    pub document: ConfigDocument,
}

/// Derive the full default configuration for already-resolved revisions.
///
/// Fails before producing any document if a revision is missing from a
/// required table or the thermal network does not validate.
pub fn generate_for(revisions: BoardRevisions) -> Result<GeneratedConfig> {
    let parameters = BoardParameters::resolve(revisions)?;
    let axes = AxisSet::new(parameters.axis_count)?;
    let heaters = axes.heaters();
    let network = ThermalNetwork::build_default(&heaters, &parameters.fan_channels)?;
    let document = sections::assemble(&parameters, &axes, &network);
    Ok(GeneratedConfig {
        parameters,
        axes,
        heaters,
        network,
        document,
    })
}

/// Resolve the installed boards, apply the main-board fallback and generate.
pub fn generate<R>(resolver: &R, revisions: &RevisionSettings) -> Result<GeneratedConfig>
where
    R: RevisionResolver + ?Sized,
{
    let detected = resolver.resolve()?;
    let resolved = detected.with_fallback(&revisions.fallback_main)?;
    generate_for(resolved)
}

/// Generate and write the document where `settings` says.
pub fn generate_default_config<R>(resolver: &R, settings: &Settings) -> Result<GeneratedConfig>
where
    R: RevisionResolver + ?Sized,
{
    let generated = generate(resolver, &settings.revisions)?;
    writer::write_document(&generated.document, &settings.output.path, settings.output.format)?;
    Ok(generated)
}

impl fmt::Display for GeneratedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.parameters;
        write!(f, "Replicape rev. {}", p.revisions.main)?;
        if p.revisions.main_is_fallback {
            write!(f, " (assumed)")?;
        }
        writeln!(f)?;
        match &p.revisions.expansion {
            Some(rev) => writeln!(f, "Reach rev. {rev}")?,
            None => writeln!(f, "Reach: not present")?,
        }
        writeln!(f, "PWM frequency: {} Hz", p.pwm_frequency)?;
        writeln!(f, "Axes ({}): {}", self.axes.len(), self.axes.iter().collect::<Vec<_>>().join(", "))?;
        writeln!(f, "Heaters ({}): {}", self.heaters.len(), self.heaters.as_slice().join(", "))?;
        let channels: Vec<String> = p.fan_channels.iter().map(u32::to_string).collect();
        write!(f, "Fan channels ({}): {}", channels.len(), channels.join(", "))
    }
}
