// src/error.rs - Error taxonomy for default-configuration generation
use std::path::PathBuf;
use thiserror::Error;

use crate::board::Board;
use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{board} revision '{value}' is not a valid revision identifier")]
    InvalidRevision { board: Board, value: String },

    #[error("{board} revision '{revision}' has no entry in the {table} table")]
    UnknownRevision {
        board: Board,
        revision: String,
        table: &'static str,
    },

    #[error("axis count {0} is not supported")]
    UnsupportedAxisCount(usize),

    #[error("duplicate node name '{0}' in thermal network")]
    DuplicateName(String),

    #[error("node '{node}' field '{field}' references missing node '{target}'")]
    DanglingReference {
        node: String,
        field: &'static str,
        target: String,
    },

    #[error("node '{node}' field '{field}' references '{target}', expected {expected}")]
    WrongRole {
        node: String,
        field: &'static str,
        target: String,
        expected: &'static str,
    },

    #[error("heater '{heater}' is driven by more than one control unit: {controllers:?}")]
    HeaterConflict {
        heater: String,
        controllers: Vec<String>,
    },

    #[error("{heaters} heaters requested but positional tables only hold {capacity}")]
    HeaterTableExhausted { heaters: usize, capacity: usize },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("settings error: {0}")]
    Settings(#[from] ConfigError),
}

impl GeneratorError {
    /// True for errors raised by the thermal-network validation pass.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            GeneratorError::DuplicateName(_)
                | GeneratorError::DanglingReference { .. }
                | GeneratorError::WrongRole { .. }
                | GeneratorError::HeaterConflict { .. }
        )
    }
}
