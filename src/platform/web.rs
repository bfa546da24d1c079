//! Browser bindings
//!
//! Exposes the game to a JavaScript presenter. The page drives `frame()` from
//! `requestAnimationFrame`, forwards keyboard events and draws the snapshot.

use wasm_bindgen::prelude::*;
use web_sys::KeyboardEvent;

use super::InputTracker;
use crate::config::{SimConfig, Variant};
use crate::consts::FRAME_DT;
use crate::game::Game;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Dream Dash core loaded");
}

/// Game instance owned by the page
#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    input: InputTracker,
    last_time: Option<f64>,
}

impl WebGame {
    fn from_config(config: SimConfig, seed: f64) -> WebGame {
        WebGame {
            game: Game::new(config, seed as u64),
            input: InputTracker::new(),
            last_time: None,
        }
    }
}

#[wasm_bindgen]
impl WebGame {
    /// New game for a variant name ("classic", "enhanced", "3d")
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str, seed: f64) -> Result<WebGame, JsValue> {
        let variant: Variant = variant.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(Self::from_config(SimConfig::preset(variant), seed))
    }

    /// New game from a JSON config override
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str, seed: f64) -> Result<WebGame, JsValue> {
        let config = SimConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(Self::from_config(config, seed))
    }

    /// Forward a `keydown`/`keyup` event. Bound keys get `preventDefault`.
    #[wasm_bindgen(js_name = onKey)]
    pub fn on_key(&mut self, event: &KeyboardEvent) -> bool {
        let key = event.key();
        let handled = match event.type_().as_str() {
            "keydown" => self.input.key_down(&key),
            "keyup" => self.input.key_up(&key),
            _ => false,
        };
        if handled {
            event.prevent_default();
        }
        handled
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, key: &str) -> bool {
        self.input.key_up(key)
    }

    /// Release held keys (window blur)
    pub fn blur(&mut self) {
        self.input.release_all();
    }

    /// Run one tick for an animation frame timestamp (ms)
    pub fn frame(&mut self, time_ms: f64) -> bool {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => FRAME_DT,
        };
        self.last_time = Some(time_ms);

        let advanced = self.game.tick(dt, &self.input.current());
        if advanced {
            self.input.consume_edges();
        }
        advanced
    }

    pub fn restart(&mut self) {
        self.game.restart();
        self.input.release_all();
    }

    /// Call `callback(amount)` on every scoring event
    #[wasm_bindgen(js_name = setScoreCallback)]
    pub fn set_score_callback(&mut self, callback: js_sys::Function) {
        self.game.set_score_listener(move |amount| {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(amount)) {
                log::warn!("Score callback failed: {:?}", e);
            }
        });
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.game
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn score(&self) -> f64 {
        self.game.score() as f64
    }

    pub fn level(&self) -> u32 {
        self.game.level()
    }

    /// Remaining lives, or -1 when storms are instantly fatal
    pub fn lives(&self) -> i32 {
        self.game.lives().map_or(-1, i32::from)
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }

    pub fn message(&self) -> Option<String> {
        self.game.message().map(str::to_owned)
    }
}
