//! Per-frame simulation tick
//!
//! Order within a tick: physics, event director, collisions and scoring,
//! lifecycle timers. Everything runs synchronously on the caller's thread.

use super::state::{GamePhase, GameState};
use super::{collision, director, lifecycle, physics};
use crate::consts::MAX_FRAME_DT;

/// Logical input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump when grounded; air boost while held if the variant allows it
    pub up: bool,
    pub down: bool,
    /// Edge-triggered: start a new run from `GameOver`
    pub restart: bool,
    /// Edge-triggered: flip the 3D camera view
    pub toggle_view: bool,
}

/// Advance the game by one frame of `dt` seconds.
///
/// Frames longer than [`MAX_FRAME_DT`] (or non-positive ones) are dropped
/// without touching the state. Returns whether the frame was simulated.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> bool {
    if !(dt > 0.0 && dt <= MAX_FRAME_DT) {
        log::debug!("Dropping frame (dt = {dt})");
        return false;
    }

    state.events.clear();
    state.time += dt;
    state.time_ticks += 1;
    let now = state.time;

    if input.toggle_view && state.config.variant.is_3d() {
        state.view = state.view.toggled();
    }

    if input.restart && state.session.phase == GamePhase::GameOver {
        state.restart();
        return true;
    }

    state.wind.expire(now);
    let playing = state.session.phase == GamePhase::Playing;

    if playing {
        let wind = state.wind.force_at(now);
        physics::step_player(&mut state.player, input, wind, &state.config, now);
    }
    physics::scroll_entities(state, playing);

    if playing {
        director::direct(state);
    }

    collision::resolve(state);
    lifecycle::expire_timers(state);

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimConfig, Variant};
    use crate::consts::FRAME_DT;
    use crate::sim::state::GameEvent;

    /// Config with the director switched off so tests control every entity
    fn quiet(variant: Variant) -> SimConfig {
        let mut cfg = SimConfig::preset(variant);
        cfg.storms.spawn_chance = 0.0;
        cfg.storms.spawn_chance_per_level = 0.0;
        cfg.wind.gust_chance = 0.0;
        cfg
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_long_frame_is_dropped() {
        let mut state = GameState::new(SimConfig::default(), 1);
        let star = state.stars[0].pos;
        assert!(!tick(&mut state, &idle(), 0.2));
        assert!(!tick(&mut state, &idle(), 0.0));
        assert!(!tick(&mut state, &idle(), f32::NAN));
        assert_eq!(state.time, 0.0);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.stars[0].pos, star);

        assert!(tick(&mut state, &idle(), FRAME_DT));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_star_at_player_scores_once() {
        for variant in [Variant::Classic, Variant::Enhanced, Variant::Dash3d] {
            let mut state = GameState::new(quiet(variant), 3);
            let center = state.player.center();
            state.stars[0].pos = center;

            tick(&mut state, &idle(), FRAME_DT);
            assert_eq!(state.session.score, 1, "{variant:?}");
            let star = &state.stars[0];
            assert_ne!(star.pos, center);
            assert!(!collision::overlaps(state.config.shape, &state.player, star.pos, star.radius));
            assert!(state.events.contains(&GameEvent::ScoreChanged { delta: 1, total: 1 }));
        }
    }

    #[test]
    fn test_classic_storm_is_fatal() {
        let mut state = GameState::new(quiet(Variant::Classic), 3);
        state.spawn_storm();
        state.storms[0].pos = state.player.center();
        state.storms[0].speed = 0.0;

        tick(&mut state, &idle(), FRAME_DT);
        assert_eq!(state.session.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0, level: 1 }));
    }

    #[test]
    fn test_lives_with_invulnerability_window() {
        let mut state = GameState::new(quiet(Variant::Enhanced), 3);
        state.spawn_storm();

        let hit = |state: &mut GameState| {
            state.storms[0].pos = state.player.center();
            state.storms[0].speed = 0.0;
            tick(state, &TickInput::default(), FRAME_DT);
        };
        let wait = |state: &mut GameState, secs: f32| {
            state.storms[0].pos.y = -1000.0;
            let frames = (secs / FRAME_DT).ceil() as usize;
            for _ in 0..frames {
                tick(state, &TickInput::default(), FRAME_DT);
            }
        };

        hit(&mut state);
        assert_eq!(state.session.lives, Some(2));

        // Second overlap inside the window costs nothing
        wait(&mut state, 0.3);
        hit(&mut state);
        assert_eq!(state.session.lives, Some(2));

        wait(&mut state, 1.1);
        hit(&mut state);
        assert_eq!(state.session.lives, Some(1));
        assert_eq!(state.session.phase, GamePhase::Playing);

        wait(&mut state, 1.1);
        hit(&mut state);
        assert_eq!(state.session.lives, Some(0));
        assert_eq!(state.session.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_freezes_play() {
        let mut state = GameState::new(quiet(Variant::Classic), 3);
        state.spawn_storm();
        state.storms[0].pos = state.player.center();
        tick(&mut state, &idle(), FRAME_DT);
        assert!(state.session.is_game_over());

        let player = state.player.pos;
        let star = state.stars[1].pos;
        let cloud = state.clouds[0].pos;
        let jump = TickInput {
            up: true,
            right: true,
            ..Default::default()
        };
        tick(&mut state, &jump, FRAME_DT);
        assert_eq!(state.player.pos, player);
        assert_eq!(state.stars[1].pos, star);
        assert_ne!(state.clouds[0].pos, cloud);
    }

    #[test]
    fn test_restart_input_only_from_game_over() {
        let mut state = GameState::new(quiet(Variant::Classic), 3);
        state.session.score = 4;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, FRAME_DT);
        assert_eq!(state.session.score, 4);

        state.spawn_storm();
        state.storms[0].pos = state.player.center();
        tick(&mut state, &idle(), FRAME_DT);
        assert!(state.session.is_game_over());

        tick(&mut state, &restart, FRAME_DT);
        assert_eq!(state.session.phase, GamePhase::Playing);
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.level, 1);
        assert_eq!(state.session.lives, None);
        assert_eq!(state.events, vec![GameEvent::Restarted]);
    }

    #[test]
    fn test_level_up_through_ticks() {
        let mut state = GameState::new(quiet(Variant::Enhanced), 3);
        let threshold = state.session.next_level_threshold;
        for _ in 0..threshold {
            state.stars[0].pos = state.player.center();
            tick(&mut state, &idle(), FRAME_DT);
        }
        assert_eq!(state.session.score, threshold as u64);
        assert_eq!(state.session.level, 2);
        assert_eq!(state.session.next_level_threshold, threshold + state.config.rules.threshold_step);
        assert_eq!(state.session.message(state.time), Some("Level 2"));
    }

    #[test]
    fn test_wind_zero_from_expiry() {
        let mut state = GameState::new(quiet(Variant::Enhanced), 3);
        state.player.pos.x = 300.0;
        state.wind.start(1.0, 0.0, 0.1);

        let mut pushed = 0;
        while state.time < 0.1 {
            let before = state.player.pos.x;
            tick(&mut state, &idle(), FRAME_DT);
            if state.time < 0.1 {
                assert_eq!(state.wind.force, 1.0);
            }
            if state.player.pos.x > before {
                pushed += 1;
            }
        }
        assert!(pushed > 0);
        assert_eq!(state.wind.force, 0.0);

        let x = state.player.pos.x;
        tick(&mut state, &idle(), FRAME_DT);
        assert_eq!(state.player.pos.x, x);
        assert_eq!(state.wind.force_at(state.time), 0.0);
    }

    #[test]
    fn test_view_toggle_only_in_3d() {
        let toggle = TickInput {
            toggle_view: true,
            ..Default::default()
        };
        let mut flat = GameState::new(quiet(Variant::Enhanced), 3);
        let view = flat.view;
        tick(&mut flat, &toggle, FRAME_DT);
        assert_eq!(flat.view, view);

        let mut deep = GameState::new(quiet(Variant::Dash3d), 3);
        tick(&mut deep, &toggle, FRAME_DT);
        assert_ne!(deep.view, view);
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed and inputs stay identical
        let mut a = GameState::new(SimConfig::preset(Variant::Enhanced), 99999);
        let mut b = GameState::new(SimConfig::preset(Variant::Enhanced), 99999);

        for i in 0..600 {
            let input = TickInput {
                up: i % 40 < 3,
                right: i % 100 < 50,
                left: i % 100 >= 70,
                ..Default::default()
            };
            tick(&mut a, &input, FRAME_DT);
            tick(&mut b, &input, FRAME_DT);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.session.score, b.session.score);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.storms.len(), b.storms.len());
        for (sa, sb) in a.storms.iter().zip(&b.storms) {
            assert_eq!(sa.pos, sb.pos);
        }
    }
}
