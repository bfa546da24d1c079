//! Collision detection and scoring
//!
//! Every overlap test reduces to closest-point clamping: clamp the entity
//! center onto the player's box and compare the squared distance against the
//! squared radius. The circle shape swaps the box for the player's inscribed
//! circle.

use glam::{Vec3, Vec3Swizzles};

use super::lifecycle;
use super::state::{GamePhase, GameState, Player};
use crate::closest_point_on_box;
use crate::config::CollisionShape;

/// Outcome of one collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Stars collected this pass
    pub stars: u32,
    /// Whether a storm hit was registered (ignored overlaps don't count)
    pub hazard_hit: bool,
}

/// Does a sphere (or circle) at `center` touch the player?
pub fn overlaps(shape: CollisionShape, player: &Player, center: Vec3, radius: f32) -> bool {
    match shape {
        CollisionShape::Circle => {
            let player_radius = player.size / 2.0;
            let reach = player_radius + radius;
            player.center().xy().distance_squared(center.xy()) < reach * reach
        }
        CollisionShape::Box => {
            let closest = closest_point_on_box(center, player.min(), player.max());
            closest.xy().distance_squared(center.xy()) < radius * radius
        }
        CollisionShape::SphereAabb => {
            let closest = closest_point_on_box(center, player.min(), player.max());
            closest.distance_squared(center) < radius * radius
        }
    }
}

/// Test the player against every star and storm, applying score, respawn,
/// pushback and life loss.
///
/// All stars are tested even after one scores, so simultaneous overlaps all
/// count. At most one storm hit is registered per pass.
pub fn resolve(state: &mut GameState) -> CollisionReport {
    let mut report = CollisionReport::default();
    if state.session.phase != GamePhase::Playing {
        return report;
    }

    let shape = state.config.shape;
    let level = state.session.level;

    for star in state.stars.iter_mut().filter(|s| s.active) {
        if overlaps(shape, &state.player, star.pos, star.radius) {
            star.active = false;
            star.respawn(&state.config, &mut state.rng, level);
            report.stars += 1;
        }
    }
    if report.stars > 0 {
        lifecycle::collect_stars(state, report.stars);
    }

    if state.session.is_invulnerable(state.time) {
        return report;
    }

    let hit = state
        .storms
        .iter()
        .filter(|s| s.active)
        .find(|s| overlaps(shape, &state.player, s.pos, s.radius))
        .map(|s| s.pos);

    if let Some(storm_pos) = hit {
        apply_pushback(state, storm_pos);
        lifecycle::hazard_hit(state);
        report.hazard_hit = true;
    }

    report
}

/// Knock the player away from a storm. The vertical kick takes effect on the
/// next physics step; x is clamped back into the world straight away.
fn apply_pushback(state: &mut GameState, storm_pos: Vec3) {
    let storms = &state.config.storms;
    let player = &mut state.player;
    let away = if player.center().x < storm_pos.x { -1.0 } else { 1.0 };
    player.pos.x = state.config.clamp_player_x(player.pos.x + away * storms.pushback_x);
    player.vy = storms.pushback_vy;
    player.grounded = false;
}
