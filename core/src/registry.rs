use std::sync::{Arc, Mutex, MutexGuard};

use crate::*;

/// Handle to a game shared between connection handlers.
pub type SharedGame = Arc<Mutex<Game>>;

/// Process-wide slot for the single "current" game, the one game in a
/// non-terminal status.
///
/// Creation is optimistic: callers first look for a live game, then try to
/// install a fresh one. Losing the install race is not an error, the loser
/// simply re-finds the winner's game.
#[derive(Debug, Default)]
pub struct GameRegistry {
    current: Mutex<Option<SharedGame>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current game, if one is live. A terminal game left in the slot
    /// is vacated here.
    pub fn current(&self) -> Option<SharedGame> {
        let mut slot = self.lock_slot();

        match slot.as_ref() {
            Some(game) if game.lock().expect("game lock poisoned").status().is_on() => {
                Some(Arc::clone(game))
            }
            Some(_) => {
                log::debug!("vacating finished game from the current slot");
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Find the current game or create one from `config`, retrying the find
    /// when another caller wins the creation race.
    pub fn find_or_create(&self, config: BoardConfig, seed: u64) -> SharedGame {
        loop {
            if let Some(game) = self.current() {
                return game;
            }

            match self.try_create(config, seed) {
                Ok(game) => return game,
                Err(GameError::Conflict) => {
                    log::debug!("lost current-game creation race, re-finding");
                }
                Err(_) => unreachable!("try_create only fails with Conflict"),
            }
        }
    }

    fn try_create(&self, config: BoardConfig, seed: u64) -> Result<SharedGame> {
        let mut slot = self.lock_slot();

        let occupied = slot
            .as_ref()
            .is_some_and(|game| game.lock().expect("game lock poisoned").status().is_on());
        if occupied {
            return Err(GameError::Conflict);
        }

        let game = Arc::new(Mutex::new(Game::new(config, seed)));
        *slot = Some(Arc::clone(&game));
        log::debug!("created current game, {}x{}", config.width, config.height);
        Ok(game)
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<SharedGame>> {
        self.current.lock().expect("registry lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BoardConfig {
        BoardConfig::new(9, 9, 10).unwrap()
    }

    #[test]
    fn find_or_create_returns_the_same_game_twice() {
        let registry = GameRegistry::new();

        let first = registry.find_or_create(config(), 1);
        let second = registry.find_or_create(config(), 2);

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn concurrent_callers_share_exactly_one_game() {
        let registry = GameRegistry::new();

        let registry = &registry;
        let games: Vec<SharedGame> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|seed| scope.spawn(move || registry.find_or_create(config(), seed)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for game in &games[1..] {
            assert!(Arc::ptr_eq(&games[0], game));
        }
        assert_eq!(
            games[0].lock().unwrap().status(),
            GameStatus::StandingBy
        );
    }

    #[test]
    fn finished_game_vacates_the_slot() {
        let registry = GameRegistry::new();

        let first = registry.find_or_create(config(), 1);
        {
            let mines = [Coords::new(1, 1)];
            let field = Minefield::from_mine_coords(Coords::new(3, 3), &mines).unwrap();
            let mut game = first.lock().unwrap();
            *game = Game::from_minefield(field);
            game.reveal(Coords::new(1, 1)).unwrap();
            assert!(game.is_over());
        }

        assert!(registry.current().is_none());
        let second = registry.find_or_create(config(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
