//! Environmental event director
//!
//! Rolls the dice once per tick for new storms and wind gusts.

use super::state::{GameEvent, GameState};
use crate::{chance, random_between};

/// Maybe spawn a storm and maybe start a gust
pub fn direct(state: &mut GameState) {
    let level = state.session.level;
    let now = state.time;

    if state.active_storms() < state.config.storm_cap(level)
        && chance(&mut state.rng, state.config.storm_spawn_chance(level))
    {
        let id = state.spawn_storm();
        log::debug!("Storm {} spawned ({} active)", id, state.active_storms());
    }

    let wind = &state.config.wind;
    if chance(&mut state.rng, wind.gust_chance) {
        let force = random_between(&mut state.rng, -wind.max_force, wind.max_force) * state.config.gust_scale(level);
        state.wind.start(force, now, wind.duration_secs);
        state.events.push(GameEvent::GustStarted { force });
        log::debug!("Gust {:.2} until {:.2}s", force, state.wind.until);
    }
}
