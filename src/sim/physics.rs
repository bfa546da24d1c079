//! Player motion and entity scrolling
//!
//! Gameplay constants are per tick. The clock passed in is only used for
//! rate limits, never to scale motion.

use super::state::{GameState, Player};
use super::tick::TickInput;
use crate::config::{AirControl, ScrollAxis, SimConfig};

/// Advance the player by one tick.
///
/// Bounds, ground and ceiling are restored unconditionally at the end, so the
/// player is inside the world afterwards whatever the input or wind.
pub fn step_player(player: &mut Player, input: &TickInput, wind_force: f32, config: &SimConfig, now: f32) {
    let params = &config.player;

    // Horizontal: held directions cancel each other out
    let mut dx = 0.0;
    if input.left {
        dx -= params.speed;
    }
    if input.right {
        dx += params.speed;
    }
    player.pos.x += dx + wind_force;
    player.pos.x = config.clamp_player_x(player.pos.x);

    // Jumps need a fresh press; holding Up only feeds the air boost
    let pressed = input.up && !player.up_held;
    player.up_held = input.up;
    if input.up {
        if player.grounded {
            if pressed {
                player.vy = params.jump_power;
                player.grounded = false;
            }
        } else if let AirControl::Boost { accel } = params.air {
            player.vy -= accel;
        }
    }

    if input.down {
        let ready = match params.fast_fall_interval {
            None => true,
            Some(gap) => player.last_fast_fall.is_none_or(|last| now - last >= gap),
        };
        if ready {
            player.vy += params.fast_fall;
            player.last_fast_fall = Some(now);
        }
    }

    player.vy += params.gravity;
    player.pos.y += player.vy;

    player.clamp_to_world(config);
}

/// Scroll stars, storms and clouds towards the player, recycling whatever
/// leaves the play area.
///
/// With `gameplay` false only the decorative clouds move.
pub fn scroll_entities(state: &mut GameState, gameplay: bool) {
    let level = state.session.level;
    let world = &state.config.world;

    match state.config.axis {
        ScrollAxis::Lateral => {
            let exit_x = world.min_x - world.offscreen_margin;
            if gameplay {
                for star in &mut state.stars {
                    star.pos.x -= star.speed;
                    if star.pos.x + star.radius < exit_x {
                        star.respawn(&state.config, &mut state.rng, level);
                    }
                }
                for storm in state.storms.iter_mut().filter(|s| s.active) {
                    storm.pos.x -= storm.speed;
                    if storm.pos.x + storm.half_extents.x < exit_x {
                        storm.respawn(&state.config, &mut state.rng, level);
                    }
                }
            }
            for cloud in &mut state.clouds {
                cloud.pos.x -= cloud.speed;
                if cloud.pos.x + cloud.size < world.min_x {
                    cloud.wrap(&state.config, &mut state.rng);
                }
            }
        }
        ScrollAxis::Depth => {
            let forward = state.config.forward_speed(level);
            let exit_z = world.despawn_z;
            if gameplay {
                for star in &mut state.stars {
                    star.pos.z += forward;
                    if star.pos.z - star.radius > exit_z {
                        star.respawn(&state.config, &mut state.rng, level);
                    }
                }
                // Storms that pass the camera free their slot for the director
                for storm in state.storms.iter_mut().filter(|s| s.active) {
                    storm.pos.z += forward;
                    if storm.pos.z - storm.radius > exit_z {
                        storm.active = false;
                    }
                }
            }
            for cloud in &mut state.clouds {
                cloud.pos.z += cloud.speed;
                if cloud.pos.z > exit_z {
                    cloud.wrap(&state.config, &mut state.rng);
                }
            }
        }
    }
}
