//! Game lifecycle: scoring, levels, lives, game over and restart
//!
//! The only module that writes session state. Physics, collision and the
//! director request changes through these functions.

use super::state::{Banner, GameEvent, GamePhase, GameState, Player, Session, Wind};
use crate::config::HazardRule;

/// Credit `amount` points. Ignored for zero or outside `Playing`.
///
/// Returns whether the score changed.
pub fn award_score(state: &mut GameState, amount: u32) -> bool {
    let session = &mut state.session;
    if amount == 0 || session.phase != GamePhase::Playing {
        return false;
    }
    session.score = session.score.saturating_add(amount as u64);
    session.best_score = session.best_score.max(session.score);
    session.flash_until = state.time + state.config.rules.flash_secs;
    state.events.push(GameEvent::ScoreChanged {
        delta: amount,
        total: session.score,
    });
    true
}

/// Credit collected stars, one scoring event per star, and advance the
/// level if due
pub fn collect_stars(state: &mut GameState, count: u32) {
    if count == 0 || state.session.phase != GamePhase::Playing {
        return;
    }
    for _ in 0..count {
        award_score(state, 1);
    }
    state.session.stars_collected = state.session.stars_collected.saturating_add(count);
    state.events.push(GameEvent::StarCollected { amount: count });
    check_level_up(state);
}

/// Raise the level for every threshold the star count has reached.
///
/// Thresholds saturate at `u32::MAX`; once one stops growing no further
/// level is granted.
pub fn check_level_up(state: &mut GameState) {
    let rules = &state.config.rules;
    let session = &mut state.session;
    while session.phase == GamePhase::Playing && session.stars_collected >= session.next_level_threshold {
        let next = session.next_level_threshold.saturating_add(rules.threshold_step);
        if next == session.next_level_threshold {
            break;
        }
        session.level = session.level.saturating_add(1);
        session.next_level_threshold = next;
        session.banner = Some(Banner {
            text: format!("Level {}", session.level),
            until: state.time + rules.banner_secs,
        });
        state.events.push(GameEvent::LevelUp { level: session.level });
        log::info!(
            "Level {} reached (next at {} stars)",
            session.level,
            session.next_level_threshold
        );
    }
}

/// Apply a registered storm hit
pub fn hazard_hit(state: &mut GameState) {
    match state.config.rules.hazard {
        HazardRule::InstantGameOver => {
            state.events.push(GameEvent::HazardHit { lives_left: None });
            game_over(state);
        }
        HazardRule::Lives {
            invulnerability_secs,
            ..
        } => {
            let lives = state.session.lives.unwrap_or(0).saturating_sub(1);
            state.session.lives = Some(lives);
            state.session.invulnerable_until = state.time + invulnerability_secs;
            state.events.push(GameEvent::HazardHit {
                lives_left: Some(lives),
            });
            log::debug!("Storm hit, {} lives left", lives);
            if lives == 0 {
                game_over(state);
            }
        }
    }
}

/// Enter the terminal `GameOver` phase
pub fn game_over(state: &mut GameState) {
    let session = &mut state.session;
    if session.phase == GamePhase::GameOver {
        return;
    }
    session.phase = GamePhase::GameOver;
    session.banner = None;
    state.events.push(GameEvent::GameOver {
        score: session.score,
        level: session.level,
    });
    log::info!("Game over: score {} at level {}", session.score, session.level);
}

/// Drop timers that have run out
pub fn expire_timers(state: &mut GameState) {
    let now = state.time;
    if state.session.banner.as_ref().is_some_and(|b| now >= b.until) {
        state.session.banner = None;
    }
    state.wind.expire(now);
}

impl GameState {
    /// Start a fresh run.
    ///
    /// Session, player, entities and every expiry field are replaced in one
    /// go; only the best score, camera view and the RNG stream carry over.
    pub fn restart(&mut self) {
        let best_score = self.session.best_score;
        self.session = Session {
            best_score,
            ..Session::new(&self.config)
        };
        self.player = Player::new(&self.config);
        self.wind = Wind::default();
        self.populate();
        self.events.push(GameEvent::Restarted);
        log::info!("Restarted ({} variant)", self.config.variant.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimConfig, Variant};

    #[test]
    fn test_award_score_notifies() {
        let mut state = GameState::new(SimConfig::default(), 1);
        assert!(award_score(&mut state, 5));
        assert_eq!(state.session.score, 5);
        assert_eq!(state.session.best_score, 5);
        assert_eq!(state.events, vec![GameEvent::ScoreChanged { delta: 5, total: 5 }]);
        assert!(!award_score(&mut state, 0));
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_level_up_at_threshold() {
        let mut state = GameState::new(SimConfig::preset(Variant::Enhanced), 1);
        assert_eq!(state.session.next_level_threshold, 8);

        collect_stars(&mut state, 7);
        assert_eq!(state.session.level, 1);

        collect_stars(&mut state, 1);
        assert_eq!(state.session.level, 2);
        assert_eq!(state.session.next_level_threshold, 14);
        assert_eq!(state.session.message(state.time), Some("Level 2"));
        assert!(state.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_level_up_with_huge_step_saturates() {
        let mut cfg = SimConfig::preset(Variant::Enhanced);
        cfg.rules.threshold_step = u32::MAX;
        let mut state = GameState::new(cfg, 1);

        collect_stars(&mut state, 8);
        assert_eq!(state.session.level, 2);
        assert_eq!(state.session.next_level_threshold, u32::MAX);

        state.session.stars_collected = u32::MAX - 1;
        collect_stars(&mut state, 3);
        assert_eq!(state.session.stars_collected, u32::MAX);
        assert_eq!(state.session.level, 2);
    }

    #[test]
    fn test_level_up_stops_when_step_is_zero() {
        let mut cfg = SimConfig::preset(Variant::Classic);
        cfg.rules.threshold_step = 0;
        let mut state = GameState::new(cfg, 1);
        collect_stars(&mut state, 50);
        assert_eq!(state.session.level, 1);
        assert_eq!(state.session.next_level_threshold, 10);
    }

    #[test]
    fn test_level_up_3d_step() {
        let mut state = GameState::new(SimConfig::preset(Variant::Dash3d), 1);
        collect_stars(&mut state, 5);
        assert_eq!(state.session.level, 2);
        assert_eq!(state.session.next_level_threshold, 10);
    }

    #[test]
    fn test_banner_expires() {
        let mut state = GameState::new(SimConfig::preset(Variant::Dash3d), 1);
        collect_stars(&mut state, 5);
        state.time += 1.0;
        expire_timers(&mut state);
        assert!(state.session.banner.is_some());
        state.time += 0.7;
        expire_timers(&mut state);
        assert!(state.session.banner.is_none());
    }

    #[test]
    fn test_instant_game_over() {
        let mut state = GameState::new(SimConfig::preset(Variant::Classic), 1);
        hazard_hit(&mut state);
        assert!(state.session.is_game_over());
        assert_eq!(state.session.message(state.time), Some("Game Over"));
        // Score is frozen once the run is over
        assert!(!award_score(&mut state, 1));
    }

    #[test]
    fn test_lives_count_down() {
        let mut state = GameState::new(SimConfig::preset(Variant::Enhanced), 1);
        hazard_hit(&mut state);
        assert_eq!(state.session.lives, Some(2));
        assert!(state.session.is_invulnerable(state.time));
        assert!(!state.session.is_invulnerable(state.time + 1.0));
        hazard_hit(&mut state);
        hazard_hit(&mut state);
        assert_eq!(state.session.lives, Some(0));
        assert!(state.session.is_game_over());
    }

    #[test]
    fn test_restart_resets_session() {
        let mut state = GameState::new(SimConfig::preset(Variant::Enhanced), 1);
        collect_stars(&mut state, 9);
        state.wind.start(1.0, state.time, 5.0);
        state.player.pos.y -= 100.0;
        state.player.last_fast_fall = Some(0.5);
        hazard_hit(&mut state);
        hazard_hit(&mut state);
        hazard_hit(&mut state);
        assert!(state.session.is_game_over());

        state.restart();
        let s = &state.session;
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.score, 0);
        assert_eq!(s.best_score, 9);
        assert_eq!(s.level, 1);
        assert_eq!(s.lives, Some(3));
        assert_eq!(s.next_level_threshold, 8);
        assert_eq!(s.invulnerable_until, 0.0);
        assert_eq!(s.flash_until, 0.0);
        assert!(s.banner.is_none());
        assert_eq!(state.wind, Wind::default());
        assert!(state.player.grounded);
        assert_eq!(state.player.last_fast_fall, None);
        assert_eq!(state.active_storms(), 0);
        assert_eq!(state.stars.len(), state.config.stars.count);
    }
}
