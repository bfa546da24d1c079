//! Host-facing game facade
//!
//! Wraps a [`GameState`] with the score listener and read accessors a
//! presentation layer needs. Renderers read a [`Snapshot`] after each frame.

use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::{SimConfig, Variant};
use crate::sim::lifecycle;
use crate::sim::{
    CameraView, Cloud, GameEvent, GamePhase, GameState, Player, Star, Storm, TickInput, tick,
};

/// Callback invoked once per scoring event with the increment
pub type ScoreListener = Box<dyn FnMut(u32)>;

/// A running game plus its host hooks
pub struct Game {
    state: GameState,
    score_listener: Option<ScoreListener>,
}

impl Game {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        log::info!(
            "New {} game with seed {}",
            config.variant.as_str(),
            seed
        );
        Self {
            state: GameState::new(config, seed),
            score_listener: None,
        }
    }

    pub fn from_variant(variant: Variant, seed: u64) -> Self {
        Self::new(SimConfig::preset(variant), seed)
    }

    /// Game drawing from an injected generator
    pub fn with_rng(config: SimConfig, rng: Pcg32) -> Self {
        Self {
            state: GameState::with_rng(config, rng),
            score_listener: None,
        }
    }

    /// Register the score callback (replaces any previous one)
    pub fn set_score_listener(&mut self, listener: impl FnMut(u32) + 'static) {
        self.score_listener = Some(Box::new(listener));
    }

    pub fn clear_score_listener(&mut self) {
        self.score_listener = None;
    }

    /// Advance one frame. Returns false when the frame was dropped.
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> bool {
        if !tick(&mut self.state, input, dt) {
            return false;
        }
        if let Some(listener) = self.score_listener.as_mut() {
            for event in &self.state.events {
                if let GameEvent::ScoreChanged { delta, .. } = event {
                    listener(*delta);
                }
            }
        }
        true
    }

    /// Award host-defined points through the regular scoring path
    pub fn add_score(&mut self, amount: u32) -> bool {
        let awarded = lifecycle::award_score(&mut self.state, amount);
        if awarded {
            if let Some(listener) = self.score_listener.as_mut() {
                listener(amount);
            }
        }
        awarded
    }

    pub fn restart(&mut self) {
        self.state.events.clear();
        self.state.restart();
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for hosts and tests that stage scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.state.config
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn stars(&self) -> &[Star] {
        &self.state.stars
    }

    pub fn storms(&self) -> &[Storm] {
        &self.state.storms
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.state.clouds
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.state.events
    }

    pub fn phase(&self) -> GamePhase {
        self.state.session.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.state.session.is_game_over()
    }

    pub fn score(&self) -> u64 {
        self.state.session.score
    }

    pub fn best_score(&self) -> u64 {
        self.state.session.best_score
    }

    pub fn level(&self) -> u32 {
        self.state.session.level
    }

    pub fn lives(&self) -> Option<u8> {
        self.state.session.lives
    }

    pub fn message(&self) -> Option<&str> {
        self.state.session.message(self.state.time)
    }

    pub fn wind_force(&self) -> f32 {
        self.state.wind.force_at(self.state.time)
    }

    pub fn is_flashing(&self) -> bool {
        self.state.session.is_flashing(self.state.time)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.state.session.is_invulnerable(self.state.time)
    }

    pub fn view(&self) -> CameraView {
        self.state.view
    }

    /// Borrowed view of everything a renderer draws
    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = &self.state;
        Snapshot {
            variant: state.config.variant,
            phase: state.session.phase,
            time: state.time,
            score: state.session.score,
            best_score: state.session.best_score,
            level: state.session.level,
            lives: state.session.lives,
            next_level_threshold: state.session.next_level_threshold,
            message: self.message(),
            flashing: self.is_flashing(),
            invulnerable: self.is_invulnerable(),
            wind_force: self.wind_force(),
            view: state.view,
            player: &state.player,
            stars: &state.stars,
            storms: &state.storms,
            clouds: &state.clouds,
        }
    }
}

/// Read-only frame of the game for presentation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub variant: Variant,
    pub phase: GamePhase,
    pub time: f32,
    pub score: u64,
    pub best_score: u64,
    pub level: u32,
    pub lives: Option<u8>,
    pub next_level_threshold: u32,
    pub message: Option<&'a str>,
    pub flashing: bool,
    pub invulnerable: bool,
    pub wind_force: f32,
    pub view: CameraView,
    pub player: &'a Player,
    pub stars: &'a [Star],
    pub storms: &'a [Storm],
    pub clouds: &'a [Cloud],
}

impl Snapshot<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
