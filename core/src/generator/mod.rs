use crate::*;
pub use random::*;

mod random;

/// Places mines for a board whose first click is at `seed_cell`.
pub trait MinefieldGenerator {
    fn generate(self, config: BoardConfig, seed_cell: Coords) -> Result<Minefield>;
}
