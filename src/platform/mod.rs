//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Keyboard mapping and held-key tracking
//! - Frame timing and the wasm export (web only)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{InputTracker, KeyAction};
