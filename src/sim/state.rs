//! Game state and core simulation types
//!
//! The Entity Store (player, stars, storms, clouds, wind) and the session
//! aggregate. All of it is owned by one `GameState` that is passed by
//! reference into every step of the tick.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_STORMS, ScrollAxis, SimConfig};
use crate::random_between;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Run ended, waiting for restart
    GameOver,
}

/// Camera framing requested by the 3D presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraView {
    #[default]
    Chase,
    Overhead,
}

impl CameraView {
    pub fn toggled(self) -> Self {
        match self {
            CameraView::Chase => CameraView::Overhead,
            CameraView::Overhead => CameraView::Chase,
        }
    }
}

/// Something that happened during a tick, for hosts to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StarCollected { amount: u32 },
    ScoreChanged { delta: u32, total: u64 },
    /// `lives_left` is None when hits are instantly fatal
    HazardHit { lives_left: Option<u8> },
    LevelUp { level: u32 },
    GustStarted { force: f32 },
    GameOver { score: u64, level: u32 },
    Restarted,
}

/// The player's kinematic state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Minimum corner of the player's box (y grows towards the ground)
    pub pos: Vec3,
    /// Vertical velocity per tick (negative is up)
    pub vy: f32,
    pub grounded: bool,
    pub size: f32,
    /// Simulation time of the last fast-fall impulse
    pub last_fast_fall: Option<f32>,
    /// Up was held on the previous step; jumps start only on a fresh press
    #[serde(default)]
    pub up_held: bool,
}

impl Player {
    /// Player standing on the ground at its start position
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: Vec3::new(config.player.start_x, config.rest_y(), config.player.start_z),
            vy: 0.0,
            grounded: true,
            size: config.player.size,
            last_fast_fall: None,
            up_held: false,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.pos + Vec3::splat(self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.pos + Vec3::splat(self.size / 2.0)
    }

    /// Restore the world-bound invariants (x range, ground, ceiling)
    pub fn clamp_to_world(&mut self, config: &SimConfig) {
        self.pos.x = config.clamp_player_x(self.pos.x);

        let rest_y = config.rest_y();
        if self.pos.y >= rest_y {
            self.pos.y = rest_y;
            self.vy = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }

        if let Some(ceiling) = config.world.ceiling_y {
            if self.pos.y < ceiling {
                self.pos.y = ceiling;
                if self.vy < 0.0 {
                    self.vy = 0.0;
                }
            }
        }
    }
}

/// A collectible star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub id: u32,
    /// Center
    pub pos: Vec3,
    pub radius: f32,
    /// Own scroll speed (lateral scrolling only)
    pub speed: f32,
    pub active: bool,
}

impl Star {
    /// Move the star somewhere ahead of the player, ready to scroll in again
    pub fn respawn(&mut self, config: &SimConfig, rng: &mut Pcg32, level: u32) {
        let world = &config.world;
        let y = random_between(rng, config.stars.min_y, config.stars.max_y);
        match config.axis {
            ScrollAxis::Lateral => {
                let x = world.max_x + world.offscreen_margin + random_between(rng, 0.0, world.respawn_jitter);
                self.pos = Vec3::new(x, y, 0.0);
                self.speed = config.star_speed(level) + random_between(rng, 0.0, config.stars.speed_variance);
            }
            ScrollAxis::Depth => {
                let x = random_between(rng, world.min_x + self.radius, world.max_x - self.radius);
                let z = world.spawn_z - random_between(rng, 0.0, world.respawn_jitter);
                self.pos = Vec3::new(x, y, z);
                self.speed = 0.0;
            }
        }
        self.active = true;
    }
}

/// A storm hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storm {
    pub id: u32,
    /// Center
    pub pos: Vec3,
    /// Collision radius
    pub radius: f32,
    pub half_extents: Vec2,
    pub speed: f32,
    pub active: bool,
}

impl Storm {
    /// Place the storm at the spawn edge with a level-scaled speed
    pub fn respawn(&mut self, config: &SimConfig, rng: &mut Pcg32, level: u32) {
        let world = &config.world;
        let storms = &config.storms;
        let y = random_between(rng, storms.min_y, storms.max_y);
        match config.axis {
            ScrollAxis::Lateral => {
                let x = world.max_x
                    + world.offscreen_margin
                    + random_between(rng, 0.0, world.respawn_jitter * 0.5);
                self.pos = Vec3::new(x, y, 0.0);
                self.speed = (storms.speed + random_between(rng, 0.0, storms.speed_variance))
                    * config.storm_speed_scale(level);
            }
            ScrollAxis::Depth => {
                let x = random_between(rng, world.min_x, world.max_x);
                let z = world.spawn_z - random_between(rng, 0.0, world.respawn_jitter);
                self.pos = Vec3::new(x, y, z);
                self.speed = 0.0;
            }
        }
        self.active = true;
    }
}

/// Decorative cloud, no gameplay interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec3,
    pub size: f32,
    pub speed: f32,
}

impl Cloud {
    fn random(config: &SimConfig, rng: &mut Pcg32) -> Self {
        let world = &config.world;
        let clouds = &config.clouds;
        let y = random_between(rng, clouds.min_y, clouds.max_y);
        let pos = match config.axis {
            ScrollAxis::Lateral => Vec3::new(random_between(rng, world.min_x, world.max_x), y, 0.0),
            ScrollAxis::Depth => Vec3::new(
                random_between(rng, world.min_x * 3.0, world.max_x * 3.0),
                y,
                random_between(rng, world.spawn_z, world.despawn_z),
            ),
        };
        Self {
            pos,
            size: random_between(rng, clouds.min_size, clouds.max_size),
            speed: random_between(rng, clouds.min_speed, clouds.max_speed),
        }
    }

    /// Send the cloud back to the far edge
    pub fn wrap(&mut self, config: &SimConfig, rng: &mut Pcg32) {
        let world = &config.world;
        self.pos.y = random_between(rng, config.clouds.min_y, config.clouds.max_y);
        match config.axis {
            ScrollAxis::Lateral => {
                self.pos.x = world.max_x + random_between(rng, 0.0, world.respawn_jitter);
            }
            ScrollAxis::Depth => {
                self.pos.x = random_between(rng, world.min_x * 3.0, world.max_x * 3.0);
                self.pos.z = world.spawn_z - random_between(rng, 0.0, world.respawn_jitter);
            }
        }
    }
}

/// Lateral wind gust
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub force: f32,
    /// Simulation time the gust ends at
    pub until: f32,
}

impl Wind {
    /// Effective force at `now` (zero at or after expiry)
    #[inline]
    pub fn force_at(&self, now: f32) -> f32 {
        if now < self.until { self.force } else { 0.0 }
    }

    pub fn is_active(&self, now: f32) -> bool {
        self.force_at(now) != 0.0
    }

    /// Start a gust, replacing any current one
    pub fn start(&mut self, force: f32, now: f32, duration: f32) {
        self.force = force;
        self.until = now + duration;
    }

    /// Zero the stored force once the gust has run out
    pub fn expire(&mut self, now: f32) {
        if now >= self.until {
            self.force = 0.0;
        }
    }
}

/// Transient on-screen message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    pub until: f32,
}

/// Score, level and lives of the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub phase: GamePhase,
    pub score: u64,
    /// Best score seen since the process started
    pub best_score: u64,
    pub level: u32,
    /// None when hazards are instantly fatal
    pub lives: Option<u8>,
    pub stars_collected: u32,
    pub next_level_threshold: u32,
    pub invulnerable_until: f32,
    pub flash_until: f32,
    pub banner: Option<Banner>,
}

impl Session {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            phase: GamePhase::Playing,
            score: 0,
            best_score: 0,
            level: 1,
            lives: config.initial_lives(),
            stars_collected: 0,
            next_level_threshold: config.rules.first_threshold,
            invulnerable_until: 0.0,
            flash_until: 0.0,
            banner: None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_invulnerable(&self, now: f32) -> bool {
        now < self.invulnerable_until
    }

    pub fn is_flashing(&self, now: f32) -> bool {
        now < self.flash_until
    }

    /// Active banner text, or the game-over notice
    pub fn message(&self, now: f32) -> Option<&str> {
        match &self.banner {
            Some(banner) if now < banner.until => Some(banner.text.as_str()),
            _ if self.is_game_over() => Some("Game Over"),
            _ => None,
        }
    }
}

/// Complete simulation state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    /// Seed the RNG was created from (0 for injected generators)
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock in seconds (advanced by accepted frames only)
    pub time: f32,
    pub time_ticks: u64,
    pub session: Session,
    pub player: Player,
    /// Fixed-size pool, sorted by id
    pub stars: Vec<Star>,
    /// Grows up to the level cap, sorted by id
    pub storms: Vec<Storm>,
    pub clouds: Vec<Cloud>,
    pub wind: Wind,
    pub view: CameraView,
    /// Events produced by the most recent accepted tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let mut state = Self::with_rng(config, Pcg32::seed_from_u64(seed));
        state.seed = seed;
        state
    }

    /// Create a new game state drawing from an injected generator.
    ///
    /// The config is expected to have passed [`SimConfig::validate`]. An
    /// invalid one still runs (bounds resolve towards `min_x`) but is logged.
    pub fn with_rng(config: SimConfig, rng: Pcg32) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Starting with an invalid config: {e}");
        }
        let mut state = Self {
            session: Session::new(&config),
            player: Player::new(&config),
            config,
            seed: 0,
            rng,
            time: 0.0,
            time_ticks: 0,
            stars: Vec::new(),
            storms: Vec::new(),
            clouds: Vec::new(),
            wind: Wind::default(),
            view: CameraView::default(),
            events: Vec::new(),
            next_id: 1,
        };
        state.populate();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fill the store with a fresh star field and cloud layer
    pub(crate) fn populate(&mut self) {
        self.stars.clear();
        self.storms.clear();
        self.clouds.clear();

        for _ in 0..self.config.stars.count {
            let id = self.next_entity_id();
            let mut star = Star {
                id,
                pos: Vec3::ZERO,
                radius: self.config.stars.radius,
                speed: 0.0,
                active: true,
            };
            star.respawn(&self.config, &mut self.rng, 1);
            self.scatter_initial(&mut star.pos);
            self.stars.push(star);
        }

        // Depth scrolling keeps a fixed pool of storm slots toggled by `active`
        if self.config.axis == ScrollAxis::Depth {
            let slots = self.config.storms.max_active.min(MAX_STORMS);
            for _ in 0..slots {
                let id = self.next_entity_id();
                self.storms.push(Storm {
                    id,
                    pos: Vec3::new(0.0, 0.0, self.config.world.spawn_z),
                    radius: self.config.storms.radius,
                    half_extents: self.config.storms.half_extents,
                    speed: 0.0,
                    active: false,
                });
            }
        }

        for _ in 0..self.config.clouds.count {
            let cloud = Cloud::random(&self.config, &mut self.rng);
            self.clouds.push(cloud);
        }
    }

    /// Spread a fresh entity over the approach lane so the first wave
    /// doesn't arrive all at once
    fn scatter_initial(&mut self, pos: &mut Vec3) {
        let world = &self.config.world;
        match self.config.axis {
            ScrollAxis::Lateral => {
                let width = world.max_x - world.min_x;
                pos.x = random_between(
                    &mut self.rng,
                    world.min_x + width * 0.4,
                    world.max_x + world.respawn_jitter,
                );
            }
            ScrollAxis::Depth => {
                pos.z = random_between(
                    &mut self.rng,
                    world.spawn_z - world.respawn_jitter,
                    world.spawn_z * 0.5,
                );
            }
        }
    }

    /// Add a storm (reusing an inactive slot when one exists)
    pub fn spawn_storm(&mut self) -> u32 {
        let level = self.session.level;
        if let Some(storm) = self.storms.iter_mut().find(|s| !s.active) {
            storm.respawn(&self.config, &mut self.rng, level);
            return storm.id;
        }

        let id = self.next_entity_id();
        let mut storm = Storm {
            id,
            pos: Vec3::ZERO,
            radius: self.config.storms.radius,
            half_extents: self.config.storms.half_extents,
            speed: 0.0,
            active: true,
        };
        storm.respawn(&self.config, &mut self.rng, level);
        self.storms.push(storm);
        id
    }

    pub fn active_storms(&self) -> usize {
        self.storms.iter().filter(|s| s.active).count()
    }

    /// Current shared forward speed (depth scrolling)
    pub fn forward_speed(&self) -> f32 {
        self.config.forward_speed(self.session.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    #[test]
    fn test_new_state_layout() {
        for variant in [Variant::Classic, Variant::Enhanced, Variant::Dash3d] {
            let cfg = SimConfig::preset(variant);
            let state = GameState::new(cfg.clone(), 42);
            assert_eq!(state.stars.len(), cfg.stars.count);
            assert_eq!(state.clouds.len(), cfg.clouds.count);
            assert_eq!(state.active_storms(), 0);
            let slots = if cfg.axis == ScrollAxis::Depth { cfg.storms.max_active } else { 0 };
            assert_eq!(state.storms.len(), slots);
            assert!(state.stars.iter().all(|s| s.active));
            assert!(state.player.grounded);
            assert_eq!(state.player.pos.y, cfg.rest_y());
            assert_eq!(state.session.level, 1);
            assert_eq!(state.session.score, 0);
            assert_eq!(state.session.lives, cfg.initial_lives());
        }
    }

    #[test]
    fn test_stars_start_clear_of_player() {
        let state = GameState::new(SimConfig::preset(Variant::Classic), 7);
        for star in &state.stars {
            assert!(star.pos.x > state.player.max().x + star.radius);
        }
        let state = GameState::new(SimConfig::preset(Variant::Dash3d), 7);
        for star in &state.stars {
            assert!(star.pos.z < state.player.min().z - star.radius);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameState::new(SimConfig::default(), 1234);
        let b = GameState::new(SimConfig::default(), 1234);
        for (sa, sb) in a.stars.iter().zip(&b.stars) {
            assert_eq!(sa.pos, sb.pos);
        }
    }

    #[test]
    fn test_spawn_storm_reuses_inactive_slot() {
        let mut state = GameState::new(SimConfig::default(), 3);
        let first = state.spawn_storm();
        state.storms[0].active = false;
        let second = state.spawn_storm();
        assert_eq!(first, second);
        assert_eq!(state.storms.len(), 1);
        assert_eq!(state.active_storms(), 1);
    }

    #[test]
    fn test_depth_storms_use_fixed_pool() {
        let mut state = GameState::new(SimConfig::preset(Variant::Dash3d), 3);
        let pool: Vec<u32> = state.storms.iter().map(|s| s.id).collect();

        let first = state.spawn_storm();
        assert_eq!(first, pool[0]);
        assert_eq!(state.active_storms(), 1);

        // Past the camera the slot goes idle and is the next one handed out
        state.storms[0].pos.z = state.config.world.despawn_z + 10.0;
        crate::sim::physics::scroll_entities(&mut state, true);
        assert!(!state.storms[0].active);
        assert_eq!(state.active_storms(), 0);

        assert_eq!(state.spawn_storm(), first);
        assert!(state.storms[0].pos.z <= state.config.world.spawn_z);
        assert_eq!(state.storms.len(), pool.len());
    }

    #[test]
    fn test_invalid_bounds_do_not_panic() {
        let mut cfg = SimConfig::preset(Variant::Classic);
        cfg.world.min_x = 700.0;
        cfg.world.max_x = 100.0;
        assert!(cfg.validate().is_err());

        let mut state = GameState::new(cfg, 3);
        state.player.clamp_to_world(&state.config);
        assert_eq!(state.player.pos.x, 700.0);
        for _ in 0..30 {
            crate::sim::tick(&mut state, &crate::sim::TickInput::default(), crate::consts::FRAME_DT);
        }
        assert_eq!(state.player.pos.x, 700.0);
    }

    #[test]
    fn test_wind_expiry() {
        let mut wind = Wind::default();
        wind.start(1.5, 10.0, 2.0);
        assert_eq!(wind.force_at(10.0), 1.5);
        assert_eq!(wind.force_at(11.999), 1.5);
        assert_eq!(wind.force_at(12.0), 0.0);
        wind.expire(11.0);
        assert_eq!(wind.force, 1.5);
        wind.expire(12.0);
        assert_eq!(wind.force, 0.0);
    }

    #[test]
    fn test_clamp_to_world() {
        let cfg = SimConfig::preset(Variant::Enhanced);
        let mut player = Player::new(&cfg);
        player.pos = Vec3::new(-50.0, cfg.world.ground_y + 40.0, 0.0);
        player.vy = 9.0;
        player.clamp_to_world(&cfg);
        assert_eq!(player.pos.x, cfg.world.min_x);
        assert_eq!(player.pos.y, cfg.rest_y());
        assert_eq!(player.vy, 0.0);
        assert!(player.grounded);

        player.pos = Vec3::new(5000.0, -100.0, 0.0);
        player.vy = -4.0;
        player.clamp_to_world(&cfg);
        assert_eq!(player.pos.x, cfg.player_max_x());
        assert_eq!(Some(player.pos.y), cfg.world.ceiling_y);
        assert_eq!(player.vy, 0.0);
        assert!(!player.grounded);
    }

    #[test]
    fn test_session_message() {
        let cfg = SimConfig::default();
        let mut session = Session::new(&cfg);
        assert_eq!(session.message(0.0), None);
        session.banner = Some(Banner {
            text: "Level 2".into(),
            until: 1.6,
        });
        assert_eq!(session.message(1.0), Some("Level 2"));
        assert_eq!(session.message(1.6), None);
        session.phase = GamePhase::GameOver;
        assert_eq!(session.message(2.0), Some("Game Over"));
    }
}
