//! The host side of a placement run.
//!
//! [`Board`] is the narrow surface the applier needs from a PCB editor. The
//! [`MemoryBoard`] implementation keeps footprints in insertion order and can
//! round-trip a JSON board file, preserving fields it does not understand.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::Side;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("footprint not found: {0}")]
    NotFound(String),
    #[error("error placing {reference}: {message}")]
    Rejected { reference: String, message: String },
}

#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("could not read board {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write board {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid board file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board lists footprint {0} more than once")]
    DuplicateReference(String),
}

/// Footprint lookup and manipulation by reference designator.
pub trait Board {
    fn contains(&self, reference: &str) -> bool;

    /// Move the footprint so its anchor sits at `position` (millimetres).
    fn move_to(&mut self, reference: &str, position: [f64; 2]) -> Result<(), BoardError>;

    /// Set the absolute orientation in degrees.
    fn set_rotation(&mut self, reference: &str, degrees: f64) -> Result<(), BoardError>;

    /// Put the footprint on `side`. Returns whether it had to be flipped.
    fn set_side(&mut self, reference: &str, side: Side) -> Result<bool, BoardError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub reference: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub side: Side,
    /// Locked footprints refuse to move, like in the PCB editor.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Footprint {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            side: Side::Front,
            locked: false,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BoardFile {
    footprints: Vec<Footprint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryBoard {
    footprints: IndexMap<String, Footprint>,
    flips: usize,
}

impl MemoryBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_footprints<I>(footprints: I) -> Result<Self, BoardFileError>
    where
        I: IntoIterator<Item = Footprint>,
    {
        let mut board = Self::new();
        for fp in footprints {
            if board.footprints.contains_key(&fp.reference) {
                return Err(BoardFileError::DuplicateReference(fp.reference));
            }
            board.footprints.insert(fp.reference.clone(), fp);
        }
        Ok(board)
    }

    pub fn from_json_str(json: &str) -> Result<Self, BoardFileError> {
        let file: BoardFile = serde_json::from_str(json)?;
        Self::with_footprints(file.footprints)
    }

    pub fn load(path: &Path) -> Result<Self, BoardFileError> {
        let raw = std::fs::read_to_string(path).map_err(|source| BoardFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let board = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), footprints = board.len(), "loaded board");
        Ok(board)
    }

    pub fn to_json_string(&self) -> Result<String, BoardFileError> {
        let file = BoardFile {
            footprints: self.footprints.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), BoardFileError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| BoardFileError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&Footprint> {
        self.footprints.get(reference)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    /// Number of side changes performed since the board was created.
    #[must_use]
    pub fn flips(&self) -> usize {
        self.flips
    }

    fn unlocked_mut(&mut self, reference: &str) -> Result<&mut Footprint, BoardError> {
        let fp = self
            .footprints
            .get_mut(reference)
            .ok_or_else(|| BoardError::NotFound(reference.to_string()))?;
        if fp.locked {
            return Err(BoardError::Rejected {
                reference: reference.to_string(),
                message: "footprint is locked".to_string(),
            });
        }
        Ok(fp)
    }
}

impl Board for MemoryBoard {
    fn contains(&self, reference: &str) -> bool {
        self.footprints.contains_key(reference)
    }

    fn move_to(&mut self, reference: &str, position: [f64; 2]) -> Result<(), BoardError> {
        let fp = self.unlocked_mut(reference)?;
        fp.x = position[0];
        fp.y = position[1];
        Ok(())
    }

    fn set_rotation(&mut self, reference: &str, degrees: f64) -> Result<(), BoardError> {
        self.unlocked_mut(reference)?.rotation = degrees;
        Ok(())
    }

    fn set_side(&mut self, reference: &str, side: Side) -> Result<bool, BoardError> {
        let fp = self.unlocked_mut(reference)?;
        if fp.side == side {
            return Ok(false);
        }
        fp.side = side;
        self.flips += 1;
        Ok(true)
    }
}
