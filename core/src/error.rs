use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board dimensions out of range")]
    InvalidDimensions,
    #[error("Mine density out of range")]
    InvalidDensity,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Another current game already exists")]
    Conflict,
}

pub type Result<T> = core::result::Result<T, GameError>;
