// src/axes.rs - Axis set and derived heater set
use crate::error::{GeneratorError, Result};

/// Canonical axis ordering: three linear axes, two extruders, three Reach extruders.
pub const CANONICAL_AXES: [&str; 8] = ["X", "Y", "Z", "E", "H", "A", "B", "C"];

/// Number of leading spatial axes that carry no heater.
pub const SPATIAL_AXES: usize = 3;

/// Axis counts a recognized board combination can produce.
pub const SUPPORTED_AXIS_COUNTS: [usize; 3] = [5, 7, 8];

/// Name of the heater that always leads the heater set.
pub const BED_HEATER: &str = "bed";

/// Active axes, lower-cased for use in configuration keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSet(Vec<String>);

impl AxisSet {
    /// The first `count` canonical axes.
    pub fn new(count: usize) -> Result<Self> {
        if !SUPPORTED_AXIS_COUNTS.contains(&count) {
            return Err(GeneratorError::UnsupportedAxisCount(count));
        }
        Ok(AxisSet(
            CANONICAL_AXES[..count]
                .iter()
                .map(|a| a.to_ascii_lowercase())
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Axes beyond the spatial three, i.e. the extruders.
    pub fn extruders(&self) -> impl Iterator<Item = &str> {
        self.iter().skip(SPATIAL_AXES)
    }

    /// The bed heater followed by one heater per extruder axis.
    pub fn heaters(&self) -> HeaterSet {
        let names = std::iter::once(BED_HEATER.to_string())
            .chain(self.extruders().map(str::to_string))
            .collect();
        HeaterSet(names)
    }
}

/// Heater names in positional-table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaterSet(Vec<String>);

impl HeaterSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
