use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// One entry of the append-only reveal log, the basis for the efficiency
/// stat.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealClick {
    pub coords: Coords,
    pub at: DateTime<Utc>,
}

/// A game from stand-by to a terminal status.
///
/// Mines are placed lazily: the board does not exist until the first
/// reveal, which becomes the generator's seed cell so the opening click is
/// always safe and blank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: BoardConfig,
    seed: u64,
    engine: Option<SweepEngine>,
    reveal_log: Vec<RevealClick>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    stats: Option<GameStats>,
}

impl Game {
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            engine: None,
            reveal_log: Vec::new(),
            started_at: None,
            ended_at: None,
            stats: None,
        }
    }

    /// Start a game over an already placed minefield, skipping the lazy
    /// generation step. Used to resume persisted games and by tests that
    /// need a known layout.
    pub fn from_minefield(minefield: Minefield) -> Self {
        let size = minefield.size();
        let config = BoardConfig {
            width: size.x,
            height: size.y,
            mines: minefield.mine_count(),
        };
        Self {
            config,
            seed: 0,
            engine: Some(SweepEngine::new(minefield)),
            reveal_log: Vec::new(),
            started_at: Some(Utc::now()),
            ended_at: None,
            stats: None,
        }
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn status(&self) -> GameStatus {
        self.engine
            .as_ref()
            .map_or(GameStatus::StandingBy, SweepEngine::status)
    }

    pub fn is_over(&self) -> bool {
        self.status().is_over()
    }

    pub fn size(&self) -> Coords {
        self.config.size()
    }

    pub fn engine(&self) -> Option<&SweepEngine> {
        self.engine.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Stats are only available once the game reached a terminal status.
    pub fn stats(&self) -> Option<GameStats> {
        self.stats
    }

    pub fn reveal_log(&self) -> &[RevealClick] {
        &self.reveal_log
    }

    pub fn mines_left(&self) -> isize {
        self.engine
            .as_ref()
            .map_or(self.config.mines as isize, SweepEngine::mines_left)
    }

    /// Seconds since the first reveal, 0 while standing by.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    pub fn reveal(&mut self, coords: Coords) -> Result<RevealReport> {
        if self.is_over() {
            return Err(GameError::AlreadyEnded);
        }

        if self.engine.is_none() {
            self.place_mines(coords)?;
        }

        let engine = self.engine.as_mut().expect("engine placed above");
        let report = engine.reveal(coords)?;
        self.record_click(coords, &report);
        self.check_ended();
        Ok(report)
    }

    pub fn reveal_neighbors(&mut self, coords: Coords) -> Result<RevealReport> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(RevealReport::no_change());
        };

        let report = engine.reveal_neighbors(coords)?;
        self.record_click(coords, &report);
        self.check_ended();
        Ok(report)
    }

    pub fn neighbors_revealable(&self, coords: Coords) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|engine| engine.neighbors_revealable(coords))
    }

    /// Before the first reveal there is no board yet, so flagging is a
    /// no-op rather than an error.
    pub fn toggle_flag(&mut self, coords: Coords) -> Result<FlagOutcome> {
        match self.engine.as_mut() {
            Some(engine) => engine.toggle_flag(coords),
            None => Ok(FlagOutcome::NoChange),
        }
    }

    pub fn highlight_neighbors(&mut self, coords: Coords) -> Result<SmallVec<[Coords; 8]>> {
        match self.engine.as_mut() {
            Some(engine) => engine.highlight_neighbors(coords),
            None => Ok(SmallVec::new()),
        }
    }

    pub fn dehighlight_neighbors(&mut self, coords: Coords) -> Result<SmallVec<[Coords; 8]>> {
        match self.engine.as_mut() {
            Some(engine) => engine.dehighlight_neighbors(coords),
            None => Ok(SmallVec::new()),
        }
    }

    fn place_mines(&mut self, seed_cell: Coords) -> Result<()> {
        let minefield =
            RandomMinefieldGenerator::new(self.seed).generate(self.config, seed_cell)?;
        log::debug!(
            "placed {} mines at first reveal, seed cell {seed_cell:?}",
            minefield.mine_count()
        );
        self.engine = Some(SweepEngine::new(minefield));
        self.started_at = Some(Utc::now());
        Ok(())
    }

    fn record_click(&mut self, coords: Coords, report: &RevealReport) {
        if report.has_update() {
            self.reveal_log.push(RevealClick {
                coords,
                at: Utc::now(),
            });
        }
    }

    fn check_ended(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        if !engine.is_over() || self.ended_at.is_some() {
            return;
        }

        let ended_at = Utc::now();
        self.ended_at = Some(ended_at);
        if let Some(started_at) = self.started_at {
            self.stats = Some(GameStats::compute(
                engine.minefield(),
                started_at,
                ended_at,
                self.reveal_log.len(),
            ));
        }
        log::debug!("game ended with status {:?}", engine.status());
    }
}
