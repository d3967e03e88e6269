use core::num::Saturating;
use core::ops::BitOr;
use std::collections::{HashSet, VecDeque};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Lifecycle of one game. `StandingBy` only exists before the first reveal,
/// while mines are not yet placed; the engine itself is created mid-sweep.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    StandingBy,
    SweepInProgress,
    AllianceWins,
    MinesWin,
}

impl GameStatus {
    /// Terminal states are absorbing, no further moves are accepted.
    pub const fn is_over(self) -> bool {
        matches!(self, Self::AllianceWins | Self::MinesWin)
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Self::StandingBy | Self::SweepInProgress)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::StandingBy
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Used to merge outcomes when chord-revealing several neighbors.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Result of one reveal call: the merged outcome plus every cell the call
/// touched, in `(y, x)` order, so persistence and broadcast can run once
/// per batch instead of once per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub cells: Vec<Coords>,
}

impl RevealReport {
    pub(crate) fn no_change() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            cells: Vec::new(),
        }
    }

    pub fn has_update(&self) -> bool {
        self.outcome.has_update()
    }

    fn finish(mut self) -> Self {
        self.cells.sort_unstable();
        self
    }
}

/// Gameplay engine for one board: reveal with flood fill, flags, chord
/// reveal, and the highlight preview shown while a revealed cell is pressed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepEngine {
    minefield: Minefield,
    board: Array2<CellState>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    status: GameStatus,
    triggered_mine: Option<Coords>,
    highlight_origin: Option<Coords>,
}

impl SweepEngine {
    pub fn new(minefield: Minefield) -> Self {
        let size = minefield.size();
        Self {
            minefield,
            board: Array2::default(size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            status: GameStatus::SweepInProgress,
            triggered_mine: None,
            highlight_origin: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn size(&self) -> Coords {
        self.minefield.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield.mine_count()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn mines_left(&self) -> isize {
        (self.minefield.mine_count() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn cell_at(&self, coords: Coords) -> CellState {
        self.board[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coords) -> bool {
        self.minefield.contains_mine(coords)
    }

    pub fn triggered_mine(&self) -> Option<Coords> {
        self.triggered_mine
    }

    pub fn highlight_origin(&self) -> Option<Coords> {
        self.highlight_origin
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    /// Reveal one cell, flooding out from blank cells. Revealing an already
    /// revealed or flagged cell changes nothing.
    pub fn reveal(&mut self, coords: Coords) -> Result<RevealReport> {
        let coords = self.minefield.validate_coords(coords)?;

        if self.cell_at(coords).is_revealable() {
            self.check_on()?;
            let mut report = RevealReport::no_change();
            report.outcome = self.reveal_single_cell(coords, &mut report.cells);
            Ok(report.finish())
        } else {
            Ok(RevealReport::no_change())
        }
    }

    /// Chord precondition: the cell is revealed, its flagged neighbors match
    /// its count, and at least one neighbor is still revealable.
    pub fn neighbors_revealable(&self, coords: Coords) -> bool {
        if self.status.is_over() {
            return false;
        }

        match self.cell_at(coords) {
            CellState::Revealed(count) => {
                count == self.count_flagged_neighbors(coords)
                    && self
                        .iter_neighbors(coords)
                        .any(|pos| self.cell_at(pos).is_revealable())
            }
            _ => false,
        }
    }

    /// Chord reveal: open every revealable neighbor of a satisfied revealed
    /// cell in one batch.
    pub fn reveal_neighbors(&mut self, coords: Coords) -> Result<RevealReport> {
        let coords = self.minefield.validate_coords(coords)?;
        self.check_on()?;

        if !self.neighbors_revealable(coords) {
            return Ok(RevealReport::no_change());
        }

        let neighbors: SmallVec<[Coords; 8]> = self.iter_neighbors(coords).collect();
        let mut report = RevealReport::no_change();
        for pos in neighbors {
            if self.cell_at(pos).is_revealable() {
                report.outcome = report.outcome | self.reveal_single_cell(pos, &mut report.cells);
            }
        }
        Ok(report.finish())
    }

    /// Pure toggle: flags a hidden cell, unflags a flagged one, and never
    /// touches a revealed cell.
    pub fn toggle_flag(&mut self, coords: Coords) -> Result<FlagOutcome> {
        use CellState::*;

        let coords = self.minefield.validate_coords(coords)?;
        self.check_on()?;

        Ok(match self.cell_at(coords) {
            Hidden | Highlighted => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                FlagOutcome::Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                FlagOutcome::Changed
            }
            Revealed(_) => FlagOutcome::NoChange,
        })
    }

    /// Mark the revealable neighbors of a revealed cell as a chord preview.
    /// Returns the cells that changed, for broadcast.
    pub fn highlight_neighbors(&mut self, coords: Coords) -> Result<SmallVec<[Coords; 8]>> {
        let coords = self.minefield.validate_coords(coords)?;
        self.check_on()?;

        let mut changed = SmallVec::new();
        if !matches!(self.cell_at(coords), CellState::Revealed(_)) {
            return Ok(changed);
        }

        let neighbors: SmallVec<[Coords; 8]> = self.iter_neighbors(coords).collect();
        for pos in neighbors {
            if self.cell_at(pos) == CellState::Hidden {
                self.board[pos.to_nd_index()] = CellState::Highlighted;
                changed.push(pos);
            }
        }
        if !changed.is_empty() {
            self.highlight_origin = Some(coords);
        }
        Ok(changed)
    }

    /// Undo a highlight preview. Allowed even after the game ended, so a
    /// client can always clean up a pressed cell.
    pub fn dehighlight_neighbors(&mut self, coords: Coords) -> Result<SmallVec<[Coords; 8]>> {
        let coords = self.minefield.validate_coords(coords)?;

        let mut changed = SmallVec::new();
        let neighbors: SmallVec<[Coords; 8]> = self.iter_neighbors(coords).collect();
        for pos in neighbors {
            if self.cell_at(pos) == CellState::Highlighted {
                self.board[pos.to_nd_index()] = CellState::Hidden;
                changed.push(pos);
            }
        }
        if self.highlight_origin == Some(coords) {
            self.highlight_origin = None;
        }
        Ok(changed)
    }

    fn reveal_single_cell(&mut self, coords: Coords, touched: &mut Vec<Coords>) -> RevealOutcome {
        let cell_state = self.cell_at(coords);
        let has_mine = self.minefield.contains_mine(coords);

        match (cell_state, has_mine) {
            (state, true) if state.is_revealable() => {
                let adjacent_mines = self.minefield.adjacent_mine_count(coords);
                self.board[coords.to_nd_index()] = CellState::Revealed(adjacent_mines);
                touched.push(coords);
                self.triggered_mine = Some(coords);
                self.end_game(false);
                RevealOutcome::HitMine
            }
            (state, false) if state.is_revealable() => {
                let adjacent_mines = self.reveal_at(coords, touched);
                log::debug!("revealed {coords:?}, adjacent mines: {adjacent_mines}");

                if adjacent_mines == 0 {
                    self.flood_from(coords, touched);
                }

                if self.revealed_count == Saturating(self.minefield.safe_cell_count()) {
                    self.end_game(true);
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    /// Iterative flood fill from a freshly revealed blank cell. Wrongly
    /// flagged neighbors inside the region are unflagged and revealed,
    /// since no neighbor of a blank cell can hold a mine.
    fn flood_from(&mut self, start: Coords, touched: &mut Vec<Coords>) {
        let mut visited = HashSet::from([start]);
        let mut to_visit: VecDeque<_> = self
            .iter_neighbors(start)
            .filter(|&pos| self.cell_at(pos).is_unrevealed())
            .collect();
        log::trace!("flood fill from {start:?}, initial frontier: {to_visit:?}");

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            match self.cell_at(visit_coords) {
                CellState::Revealed(_) => continue,
                CellState::Flagged => {
                    self.flagged_count -= 1;
                }
                CellState::Hidden | CellState::Highlighted => {}
            }

            let visit_adjacent_mines = self.reveal_at(visit_coords, touched);
            log::trace!("flood revealed {visit_coords:?}, adjacent mines: {visit_adjacent_mines}");

            if visit_adjacent_mines == 0 {
                to_visit.extend(
                    self.iter_neighbors(visit_coords)
                        .filter(|&pos| self.cell_at(pos).is_unrevealed())
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn reveal_at(&mut self, coords: Coords, touched: &mut Vec<Coords>) -> u8 {
        let adjacent_mines = self.minefield.adjacent_mine_count(coords);
        self.board[coords.to_nd_index()] = CellState::Revealed(adjacent_mines);
        self.revealed_count += 1;
        touched.push(coords);
        adjacent_mines
    }

    fn end_game(&mut self, won: bool) {
        if self.status.is_over() {
            return;
        }

        self.status = if won {
            GameStatus::AllianceWins
        } else {
            GameStatus::MinesWin
        };
        if won {
            self.triggered_mine = None;
        }
        self.highlight_origin = None;
    }

    fn count_flagged_neighbors(&self, coords: Coords) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.cell_at(pos) == CellState::Flagged)
            .count() as u8
    }

    fn check_on(&self) -> Result<()> {
        if self.status.is_over() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn iter_neighbors(&self, coords: Coords) -> NeighborIter {
        self.minefield.iter_neighbors(coords)
    }
}
