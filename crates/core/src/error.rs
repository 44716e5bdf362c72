use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Cell;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("maze text contains no rows")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("unknown glyph {glyph:?} at {cell:?}")]
    UnknownGlyph { glyph: char, cell: Cell },
    #[error("border cell {cell:?} must be a wall")]
    OpenBorder { cell: Cell },
    #[error("maze has no player spawn")]
    MissingPlayerSpawn,
    #[error("maze has a second player spawn at {cell:?}")]
    DuplicatePlayerSpawn { cell: Cell },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("cell {cell:?} is outside the {rows}x{cols} grid")]
    OutOfBounds { cell: Cell, rows: usize, cols: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config TOML")]
    Parse(#[from] toml::de::Error),
    #[error("unknown difficulty {0:?}")]
    UnknownDifficulty(String),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
