use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Inclusive range of accepted board side lengths.
pub const DIMENSION_RANGE: core::ops::RangeInclusive<Coord> = 3..=99;

/// Mines may occupy at most a third of the board.
pub const MAX_MINE_DENSITY: f64 = 1.0 / 3.0;

/// Validated board dimensions and mine count.
///
/// Misconfiguration is rejected here; the generator and engine assume a
/// config that already passed validation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        if !DIMENSION_RANGE.contains(&width) || !DIMENSION_RANGE.contains(&height) {
            return Err(GameError::InvalidDimensions);
        }

        let total = mult(width, height);
        if mines == 0 || f64::from(mines) > f64::from(total) * MAX_MINE_DENSITY {
            return Err(GameError::InvalidDensity);
        }

        Ok(Self {
            width,
            height,
            mines,
        })
    }

    pub const fn size(&self) -> Coords {
        Coords::new(self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub fn density(&self) -> f64 {
        f64::from(self.mines) / f64::from(self.total_cells())
    }
}

/// Mine placement for one board: a boolean mask plus its cached count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl Minefield {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coords, mine_coords: &[Coords]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.x >= size.x || coords.y >= size.y {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    /// Out-of-range coordinates are a not-found condition; board state is
    /// never touched on the error path.
    pub fn validate_coords(&self, coords: Coords) -> Result<Coords> {
        let size = self.size();
        if coords.x < size.x && coords.y < size.y {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coords {
        let dim = self.mine_mask.dim();
        Coords::new(
            dim.0.try_into().expect("width fits Coord"),
            dim.1.try_into().expect("height fits Coord"),
        )
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coords) -> bool {
        self.mine_mask[coords.to_nd_index()]
    }

    pub fn adjacent_mine_count(&self, coords: Coords) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.contains_mine(pos))
            .count() as u8
    }

    pub fn iter_neighbors(&self, coords: Coords) -> NeighborIter {
        coords.neighbors(self.size())
    }

    pub(crate) fn iter_coords(&self) -> impl Iterator<Item = Coords> + use<> {
        let size = self.size();
        (0..size.y).flat_map(move |y| (0..size.x).map(move |x| Coords::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_tiny_and_huge_dimensions() {
        assert_eq!(BoardConfig::new(2, 9, 1), Err(GameError::InvalidDimensions));
        assert_eq!(
            BoardConfig::new(9, 100, 1),
            Err(GameError::InvalidDimensions)
        );
    }

    #[test]
    fn config_rejects_density_out_of_range() {
        assert_eq!(BoardConfig::new(9, 9, 0), Err(GameError::InvalidDensity));
        // 28 of 81 cells is above a third
        assert_eq!(BoardConfig::new(9, 9, 28), Err(GameError::InvalidDensity));
        assert!(BoardConfig::new(9, 9, 27).is_ok());
    }

    #[test]
    fn minefield_counts_adjacent_mines() {
        let field =
            Minefield::from_mine_coords(Coords::new(3, 3), &[Coords::new(0, 0), Coords::new(2, 2)])
                .unwrap();

        assert_eq!(field.adjacent_mine_count(Coords::new(1, 1)), 2);
        assert_eq!(field.adjacent_mine_count(Coords::new(2, 0)), 0);
        assert_eq!(field.safe_cell_count(), 7);
    }

    #[test]
    fn out_of_range_coords_are_not_found() {
        let field = Minefield::from_mine_coords(Coords::new(3, 3), &[]).unwrap();
        assert_eq!(
            field.validate_coords(Coords::new(3, 0)),
            Err(GameError::InvalidCoords)
        );
    }
}
