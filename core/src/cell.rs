use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
///
/// `Revealed` carries the adjacent-mine count; 0 means a blank cell. A
/// revealed cell can never be flagged or highlighted, the variants make
/// that structural.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed(u8),
    Flagged,
    /// Chord-preview marker on a hidden neighbor of a pressed revealed cell.
    Highlighted,
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged | Self::Highlighted)
    }

    /// Whether a reveal would change this cell (flags must be cleared first
    /// by the player, but flood fill overrides them).
    pub const fn is_revealable(self) -> bool {
        matches!(self, Self::Hidden | Self::Highlighted)
    }

    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Revealed(0))
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}
