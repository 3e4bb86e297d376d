// cape-defaults: default configuration generator for Replicape/Reach boards

pub mod axes;
pub mod board;
pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod sections;
pub mod thermal;
pub mod writer;

pub use error::{GeneratorError, Result};
pub use generator::{generate, generate_default_config, generate_for, GeneratedConfig};
