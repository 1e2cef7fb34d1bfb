use std::io;

use thiserror::Error;

use crate::map::Cell;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Level has {boxes} boxes but {goals} goals")]
    BoxGoalMismatch { boxes: usize, goals: usize },

    #[error("Level has no boxes")]
    NoBoxes,

    #[error("Level has no cells")]
    EmptyMap,

    #[error("Level is too large: {rows}x{cols}")]
    TooLarge { rows: usize, cols: usize },

    #[error("Cell {cell} is a wall or lies outside the grid")]
    Blocked { cell: Cell },

    #[error("Cell {cell} is occupied twice")]
    Overlap { cell: Cell },

    #[error("Invalid move {step}: {reason}")]
    InvalidMove { step: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<toml::de::Error> for SolverError {
    fn from(err: toml::de::Error) -> Self {
        SolverError::Config(format!("TOML parse error: {}", err))
    }
}
