//! Board revisions and the resolver seam.
//!
//! Detection of the installed boards happens elsewhere (EEPROM parsing on the
//! target); this module only defines what a detected revision looks like and
//! the trait a detector implements.

pub mod tables;

use std::fmt;

use crate::error::{GeneratorError, Result};

/// Main board revision assumed when detection finds no main board.
pub const FALLBACK_MAIN_REVISION: &str = "0B3A";

/// Which board a revision belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    /// Replicape main control board
    Main,
    /// Reach expansion board
    Expansion,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Board::Main => write!(f, "Replicape"),
            Board::Expansion => write!(f, "Reach"),
        }
    }
}

/// A well-formed board revision identifier, e.g. `0B3A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(String);

impl Revision {
    pub const LEN: usize = 4;

    /// Parse a raw revision string.
    ///
    /// Returns `Ok(None)` for an absent (empty or blank) revision and an
    /// `InvalidRevision` error for anything that is present but malformed.
    pub fn parse(board: Board, raw: &str) -> Result<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let well_formed = trimmed.len() == Self::LEN
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
        if !well_formed {
            return Err(GeneratorError::InvalidRevision {
                board,
                value: raw.to_string(),
            });
        }
        Ok(Some(Revision(trimmed.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Revisions reported by detection, before any fallback is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedBoards {
    pub main: Option<Revision>,
    pub expansion: Option<Revision>,
}

/// Revisions after fallback: the main board is always known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRevisions {
    pub main: Revision,
    pub expansion: Option<Revision>,
    /// Set when `main` came from the fallback rather than detection.
    pub main_is_fallback: bool,
}

impl DetectedBoards {
    /// Apply the documented fallback for a missing main board.
    pub fn with_fallback(self, fallback_main: &str) -> Result<BoardRevisions> {
        if let Some(expansion) = &self.expansion {
            tracing::info!("Found Reach rev. {}", expansion);
        }
        match self.main {
            Some(main) => {
                tracing::info!("Found Replicape rev. {}", main);
                Ok(BoardRevisions {
                    main,
                    expansion: self.expansion,
                    main_is_fallback: false,
                })
            }
            None => {
                let main = Revision::parse(Board::Main, fallback_main)?.ok_or_else(|| {
                    GeneratorError::InvalidRevision {
                        board: Board::Main,
                        value: fallback_main.to_string(),
                    }
                })?;
                tracing::warn!("No Replicape detected, assuming rev. {}", main);
                Ok(BoardRevisions {
                    main,
                    expansion: self.expansion,
                    main_is_fallback: true,
                })
            }
        }
    }
}

/// Source of the installed board revisions.
pub trait RevisionResolver {
    fn resolve(&self) -> Result<DetectedBoards>;
}

/// Resolver over revisions that are already known, e.g. from the command line.
#[derive(Debug, Clone, Default)]
pub struct FixedRevisions {
    main: Option<String>,
    expansion: Option<String>,
}

impl FixedRevisions {
    pub fn new(main: Option<&str>, expansion: Option<&str>) -> Self {
        Self {
            main: main.map(str::to_string),
            expansion: expansion.map(str::to_string),
        }
    }
}

impl RevisionResolver for FixedRevisions {
    fn resolve(&self) -> Result<DetectedBoards> {
        let main = match &self.main {
            Some(raw) => Revision::parse(Board::Main, raw)?,
            None => None,
        };
        let expansion = match &self.expansion {
            Some(raw) => Revision::parse(Board::Expansion, raw)?,
            None => None,
        };
        Ok(DetectedBoards { main, expansion })
    }
}
