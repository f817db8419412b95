//! Error types for the tactics core.

use thiserror::Error;

use crate::components::{Position, UnitId};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all tactics core errors.
///
/// `OutOfBounds`, `OccupiedCell` and `Impassable` are invariant violations:
/// a correctly operating orchestrator never produces them, so callers treat
/// them as assertions rather than retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Position lies outside the grid.
    #[error("Position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending position.
        position: Position,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },

    /// Destination cell already holds a different unit.
    #[error("Cell {position} is already occupied by unit {occupant}")]
    OccupiedCell {
        /// Destination position.
        position: Position,
        /// Unit currently standing there.
        occupant: UnitId,
    },

    /// Destination cell cannot be entered at all.
    #[error("Cell {0} is impassable")]
    Impassable(Position),

    /// Unit identifier does not resolve to a living unit.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Malformed or inconsistent level/unit configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Scenario or terrain data failed to parse.
    #[error("Failed to parse data: {message}")]
    DataParse {
        /// Parser error message.
        message: String,
    },
}

impl From<ron::error::SpannedError> for GameError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::DataParse {
            message: err.to_string(),
        }
    }
}
