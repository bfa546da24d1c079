//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Per-tick constants, the frame delta only drives the clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod director;
pub mod lifecycle;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, overlaps};
pub use state::{
    Banner, CameraView, Cloud, GameEvent, GamePhase, GameState, Player, Session, Star, Storm, Wind,
};
pub use tick::{TickInput, tick};
