use ndarray::Array2;

use super::*;

/// Uniform random placement that keeps the seed cell and all of its
/// neighbors mine-free, so the first click always opens a blank region.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: BoardConfig, seed_cell: Coords) -> Result<Minefield> {
        use rand::prelude::*;

        let size = config.size();
        if seed_cell.x >= size.x || seed_cell.y >= size.y {
            return Err(GameError::InvalidCoords);
        }

        let total_cells = config.total_cells();
        let mut mask: Array2<bool> = Array2::default(size.to_nd_index());

        // Pre-mark the exclusion zone so the sampler skips it.
        mask[seed_cell.to_nd_index()] = true;
        for coords in seed_cell.neighbors(size) {
            mask[coords.to_nd_index()] = true;
        }
        let zone_cells: CellCount = mask.iter().filter(|&&taken| taken).count() as CellCount;

        let mut free_cells = total_cells - zone_cells;
        if config.mines > free_cells {
            log::warn!(
                "cannot fit {} mines outside the seed zone of {} cells on a {}x{} board",
                config.mines,
                zone_cells,
                size.x,
                size.y
            );
            return Err(GameError::TooManyMines);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines_placed = 0;
        {
            let cells = mask.as_slice_mut().expect("layout should be standard");
            while mines_placed < config.mines && free_cells > 0 {
                let mut place: CellCount = rng.random_range(0..free_cells);
                for (i, cell) in cells.iter_mut().enumerate() {
                    let i = i as CellCount;
                    if *cell {
                        place += 1;
                    }
                    if i == place {
                        *cell = true;
                        mines_placed += 1;
                        free_cells -= 1;
                        break;
                    }
                }
            }
        }

        // Unmark the exclusion zone, leaving only real mines.
        mask[seed_cell.to_nd_index()] = false;
        for coords in seed_cell.neighbors(size) {
            mask[coords.to_nd_index()] = false;
        }

        let field = Minefield::from_mine_mask(mask);
        if field.mine_count() != config.mines {
            log::warn!(
                "generated minefield count mismatch, actual: {}, requested: {}",
                field.mine_count(),
                config.mines
            );
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64, config: BoardConfig, seed_cell: Coords) -> Minefield {
        RandomMinefieldGenerator::new(seed)
            .generate(config, seed_cell)
            .unwrap()
    }

    #[test]
    fn places_exactly_the_requested_mine_count() {
        let config = BoardConfig::new(9, 9, 10).unwrap();
        let field = generate(7, config, Coords::new(4, 4));
        assert_eq!(field.mine_count(), 10);
    }

    #[test]
    fn seed_cell_and_neighbors_are_never_mined() {
        for seed in 0..50 {
            let config = BoardConfig::new(9, 9, 27).unwrap();
            let seed_cell = Coords::new(0, 0);
            let field = generate(seed, config, seed_cell);

            assert!(!field.contains_mine(seed_cell), "seed {seed}");
            for coords in field.iter_neighbors(seed_cell) {
                assert!(!field.contains_mine(coords), "seed {seed} at {coords:?}");
            }
            assert_eq!(field.adjacent_mine_count(seed_cell), 0);
        }
    }

    #[test]
    fn fails_fast_when_mines_exceed_free_cells() {
        // 9 mines fit outside the 9-cell exclusion zone of a 9x3 board,
        // but a centered seed on a 3x3 board leaves no free cell at all.
        let config = BoardConfig::new(9, 3, 9).unwrap();
        let result =
            RandomMinefieldGenerator::new(1).generate(config, Coords::new(4, 1));
        assert!(result.is_ok());

        let tight = BoardConfig::new(3, 3, 3).unwrap();
        let result = RandomMinefieldGenerator::new(1).generate(tight, Coords::new(1, 1));
        assert_eq!(result, Err(GameError::TooManyMines));
    }

    #[test]
    fn same_seed_reproduces_the_same_field() {
        let config = BoardConfig::new(16, 16, 40).unwrap();
        let a = generate(42, config, Coords::new(8, 8));
        let b = generate(42, config, Coords::new(8, 8));
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_seed_cell_is_rejected() {
        let config = BoardConfig::new(9, 9, 10).unwrap();
        let result = RandomMinefieldGenerator::new(1).generate(config, Coords::new(9, 0));
        assert_eq!(result, Err(GameError::InvalidCoords));
    }
}
