use std::collections::VecDeque;

use chrono::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Timer ceiling: a sweep longer than this scores as this.
pub const MAX_SCORE_SECS: f64 = 999.99;

/// 3BV: the minimum number of clicks needed to clear the board. Each
/// connected blank region costs one click and also opens its numbered
/// border for free; every other safe cell costs one click of its own.
pub fn bbbv(field: &Minefield) -> CellCount {
    let size = field.size();
    let mut opened: Array2<bool> = Array2::default(size.to_nd_index());
    let mut clicks: CellCount = 0;

    for coords in field.iter_coords() {
        if field.contains_mine(coords) || opened[coords.to_nd_index()] {
            continue;
        }
        if field.adjacent_mine_count(coords) != 0 {
            continue;
        }

        clicks += 1;
        opened[coords.to_nd_index()] = true;
        let mut to_visit = VecDeque::from([coords]);
        while let Some(visit_coords) = to_visit.pop_front() {
            for pos in field.iter_neighbors(visit_coords) {
                if field.contains_mine(pos) || opened[pos.to_nd_index()] {
                    continue;
                }
                opened[pos.to_nd_index()] = true;
                if field.adjacent_mine_count(pos) == 0 {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    for coords in field.iter_coords() {
        if !field.contains_mine(coords) && !opened[coords.to_nd_index()] {
            clicks += 1;
        }
    }

    clicks
}

/// Stats computed once when a game reaches a terminal status.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    /// Elapsed seconds, capped at [`MAX_SCORE_SECS`].
    pub score: f64,
    pub bbbv: CellCount,
    /// 3BV per second of play.
    pub bbbvps: f64,
    /// 3BV divided by the reveal clicks actually made; 1.0 is a perfect game.
    pub efficiency: f64,
}

impl GameStats {
    pub fn compute(
        field: &Minefield,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        reveal_clicks: usize,
    ) -> Self {
        let bbbv = bbbv(field);
        let elapsed = (ended_at - started_at)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0;
        let score = elapsed.min(MAX_SCORE_SECS);

        // guard both divisions: a sub-second game counts as one second, a
        // zero-click defeat as one click
        let bbbvps = f64::from(bbbv) / score.max(1.0);
        let efficiency = f64::from(bbbv) / (reveal_clicks.max(1) as f64);

        Self {
            score,
            bbbv,
            bbbvps,
            efficiency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(size: (Coord, Coord), mines: &[(Coord, Coord)]) -> Minefield {
        let mines: Vec<Coords> = mines.iter().map(|&m| m.into()).collect();
        Minefield::from_mine_coords(size.into(), &mines).unwrap()
    }

    #[test]
    fn single_blank_region_board_is_one_click() {
        // 3x3 with one corner mine: everything else is one flood
        assert_eq!(bbbv(&field((3, 3), &[(2, 2)])), 1);
    }

    #[test]
    fn board_without_blank_regions_costs_one_click_per_safe_cell() {
        // every safe cell on this 3x3 touches a mine
        let field = field((3, 3), &[(1, 1)]);
        assert_eq!(bbbv(&field), field.safe_cell_count());
    }

    #[test]
    fn numbered_cells_beyond_a_region_border_cost_extra_clicks() {
        // 7x1 strip with mines at 1 and 5: the middle blank at 3 opens its
        // border (2 and 4) for free, but the numbered ends at 0 and 6 touch
        // no blank region and cost a click each
        let field = field((7, 1), &[(1, 0), (5, 0)]);
        assert_eq!(bbbv(&field), 3);
    }

    #[test]
    fn two_separate_blank_regions_count_twice() {
        let field = field((7, 1), &[(3, 0)]);
        // blanks 0..=1 and 5..=6 flood from either side of the mine, with
        // the numbered border cells 2 and 4 opened for free
        assert_eq!(bbbv(&field), 2);
    }

    #[test]
    fn stats_cap_score_and_guard_divisions() {
        let field = field((3, 3), &[(2, 2)]);
        let started = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let slow = GameStats::compute(&field, started, started + chrono::Duration::seconds(2000), 1);
        assert_eq!(slow.score, MAX_SCORE_SECS);

        let instant = GameStats::compute(&field, started, started, 0);
        assert_eq!(instant.score, 0.0);
        assert_eq!(instant.bbbv, 1);
        assert_eq!(instant.bbbvps, 1.0);
        assert_eq!(instant.efficiency, 1.0);
    }

    #[test]
    fn efficiency_decreases_with_wasted_clicks() {
        let field = field((3, 3), &[(2, 2)]);
        let started = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let ended = started + chrono::Duration::seconds(10);

        let stats = GameStats::compute(&field, started, ended, 4);
        assert_eq!(stats.bbbv, 1);
        assert_eq!(stats.efficiency, 0.25);
        assert_eq!(stats.bbbvps, 0.1);
    }
}
