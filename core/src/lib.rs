//! Board and reveal engine for the War Room multiplayer minesweeper.
//!
//! The crate covers the game-rule core: coordinates and neighbor
//! enumeration, the per-cell state machine, seeded mine placement with a
//! safe first click, the flood-fill reveal engine with batched cell
//! reports, win/loss detection, 3BV scoring, and the process-wide
//! current-game registry. Transport and persistence live elsewhere and
//! consume the batches this crate produces.

pub use board::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use registry::*;
pub use score::*;
pub use settings::*;
pub use types::*;

mod board;
mod cell;
mod engine;
mod error;
mod game;
mod generator;
mod registry;
mod score;
mod settings;
mod types;
