use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional cell position.
///
/// Ordering is row-major, `(y, x)`, matching the order cells are listed in
/// reveal batches and roster-style enumerations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub x: Coord,
    pub y: Coord,
}

impl Coords {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    pub const fn to_nd_index(self) -> [usize; 2] {
        [self.x as usize, self.y as usize]
    }

    /// Up to 8 in-bounds neighbors, in the fixed NW, N, NE, W, E, SW, S, SE
    /// scan order.
    pub fn neighbors(self, bounds: Coords) -> NeighborIter {
        NeighborIter::new(self, bounds)
    }
}

impl From<(Coord, Coord)> for Coords {
    fn from((x, y): (Coord, Coord)) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for Coords {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coords {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coords, delta: (isize, isize), bounds: Coords) -> Option<Coords> {
    let (dx, dy) = delta;

    let next_x = coords.x.checked_add_signed(dx.try_into().ok()?)?;
    if next_x >= bounds.x {
        return None;
    }

    let next_y = coords.y.checked_add_signed(dy.try_into().ok()?)?;
    if next_y >= bounds.y {
        return None;
    }

    Some(Coords::new(next_x, next_y))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coords,
    bounds: Coords,
    index: u8,
}

impl NeighborIter {
    fn new(center: Coords, bounds: Coords) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coords;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        let mut coords = vec![
            Coords::new(2, 0),
            Coords::new(0, 1),
            Coords::new(1, 0),
            Coords::new(0, 0),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                Coords::new(0, 0),
                Coords::new(1, 0),
                Coords::new(2, 0),
                Coords::new(0, 1),
            ]
        );
    }

    #[test]
    fn corner_cell_has_three_neighbors() {
        let bounds = Coords::new(3, 3);
        let neighbors: Vec<_> = Coords::new(0, 0).neighbors(bounds).collect();
        assert_eq!(
            neighbors,
            vec![Coords::new(1, 0), Coords::new(0, 1), Coords::new(1, 1)]
        );
    }

    #[test]
    fn interior_cell_has_eight_neighbors_in_scan_order() {
        let bounds = Coords::new(3, 3);
        let neighbors: Vec<_> = Coords::new(1, 1).neighbors(bounds).collect();
        assert_eq!(neighbors.len(), 8);
        assert_eq!(neighbors[0], Coords::new(0, 0));
        assert_eq!(neighbors[7], Coords::new(2, 2));
    }

    #[test]
    fn neighbors_clip_at_the_far_edge() {
        let bounds = Coords::new(2, 2);
        let neighbors: Vec<_> = Coords::new(1, 1).neighbors(bounds).collect();
        assert_eq!(
            neighbors,
            vec![Coords::new(0, 0), Coords::new(1, 0), Coords::new(0, 1)]
        );
    }
}
