//! Simulation configuration and variant presets
//!
//! Every tunable of the simulation lives here. The three shipped variants are
//! plain presets of the same struct; hosts may override any subset of fields
//! through JSON.

use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::{BANNER_SECS, FAST_FALL_INTERVAL, FLASH_SECS, INVULNERABILITY_SECS};

/// Upper bound for level thresholds and their step
pub const MAX_THRESHOLD: u32 = 1_000_000;
/// Upper bound for simultaneously tracked storms
pub const MAX_STORMS: usize = 256;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown variant '{0}' (expected classic, enhanced or 3d)")]
    UnknownVariant(String),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Game variant presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Canvas 2D, one touch of a storm ends the run
    Classic,
    /// Canvas 2D with lives, levels, air boost and ceiling
    #[default]
    Enhanced,
    /// Forward-scrolling 3D lane runner
    Dash3d,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Enhanced => "enhanced",
            Variant::Dash3d => "dash3d",
        }
    }

    /// Whether the variant renders in 3D (enables the camera view toggle)
    pub fn is_3d(&self) -> bool {
        matches!(self, Variant::Dash3d)
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "basic" | "2d" => Ok(Variant::Classic),
            "enhanced" => Ok(Variant::Enhanced),
            "dash3d" | "3d" => Ok(Variant::Dash3d),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// What a storm overlap does to the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HazardRule {
    /// Any overlap ends the run
    InstantGameOver,
    /// Overlaps cost a life; further overlaps inside the window are ignored
    Lives { lives: u8, invulnerability_secs: f32 },
}

/// Behaviour of "up" while airborne
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirControl {
    None,
    /// Continuous upward acceleration while up is held
    Boost { accel: f32 },
}

/// Overlap test used between the player and entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionShape {
    /// Player treated as a circle inscribed in its box (xy plane)
    Circle,
    /// Player rectangle vs entity circle (xy plane)
    Box,
    /// Player box vs entity sphere
    SphereAabb,
}

/// Direction entities travel to fake forward motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxis {
    /// Right-to-left along x, each entity at its own speed
    Lateral,
    /// Towards the camera along +z at a shared forward speed
    Depth,
}

/// World bounds. The vertical axis points down towards the ground line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub min_x: f32,
    pub max_x: f32,
    pub ground_y: f32,
    pub ceiling_y: Option<f32>,
    /// Lateral scroll: how far past the edges entities wrap
    pub offscreen_margin: f32,
    /// Random extra distance added to every respawn
    pub respawn_jitter: f32,
    /// Depth scroll: where entities respawn (far ahead)
    pub spawn_z: f32,
    /// Depth scroll: entities behind this are recycled
    pub despawn_z: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub start_x: f32,
    pub start_z: f32,
    /// Edge length of the player's box
    pub size: f32,
    pub gravity: f32,
    /// Initial vertical velocity of a jump (negative is up)
    pub jump_power: f32,
    /// Horizontal distance per tick per held direction
    pub speed: f32,
    pub air: AirControl,
    /// Downward acceleration applied by "down"
    pub fast_fall: f32,
    /// Minimum seconds between fast-fall impulses (None = every tick)
    pub fast_fall_interval: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarConfig {
    pub count: usize,
    pub radius: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub speed: f32,
    pub speed_variance: f32,
    /// Extra respawn speed per level above 1
    pub speed_per_level: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormConfig {
    /// Collision radius (ellipse approximation)
    pub radius: f32,
    /// Visual half extents, carried for the presenter
    pub half_extents: Vec2,
    pub base_cap: usize,
    pub cap_per_level: usize,
    pub max_active: usize,
    pub spawn_chance: f32,
    pub spawn_chance_per_level: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub speed: f32,
    pub speed_variance: f32,
    /// Fractional speed increase per level above 1
    pub speed_per_level: f32,
    /// Horizontal nudge away from the storm on a hit
    pub pushback_x: f32,
    /// Vertical velocity given to the player on a hit
    pub pushback_vy: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    pub count: usize,
    pub min_y: f32,
    pub max_y: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindConfig {
    pub gust_chance: f32,
    pub max_force: f32,
    pub duration_secs: f32,
    /// Fractional force increase per level above 1 (0 disables scaling)
    pub level_scale: f32,
}

/// Shared forward speed for depth scrolling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardConfig {
    pub base: f32,
    pub per_level: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub hazard: HazardRule,
    pub first_threshold: u32,
    pub threshold_step: u32,
    pub banner_secs: f32,
    pub flash_secs: f32,
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub variant: Variant,
    pub shape: CollisionShape,
    pub axis: ScrollAxis,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub stars: StarConfig,
    pub storms: StormConfig,
    pub clouds: CloudConfig,
    pub wind: WindConfig,
    pub forward: ForwardConfig,
    pub rules: RulesConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::preset(Variant::default())
    }
}

impl SimConfig {
    /// Build the preset for a variant
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::classic(),
            Variant::Enhanced => Self::enhanced(),
            Variant::Dash3d => Self::dash3d(),
        }
    }

    fn classic() -> Self {
        Self {
            variant: Variant::Classic,
            shape: CollisionShape::Circle,
            axis: ScrollAxis::Lateral,
            world: WorldConfig {
                min_x: 0.0,
                max_x: 800.0,
                ground_y: 360.0,
                ceiling_y: None,
                offscreen_margin: 60.0,
                respawn_jitter: 200.0,
                spawn_z: 0.0,
                despawn_z: 0.0,
            },
            player: PlayerConfig {
                start_x: 80.0,
                start_z: 0.0,
                size: 32.0,
                gravity: 0.6,
                jump_power: -12.0,
                speed: 5.0,
                air: AirControl::None,
                fast_fall: 0.8,
                fast_fall_interval: None,
            },
            stars: StarConfig {
                count: 5,
                radius: 10.0,
                min_y: 140.0,
                max_y: 320.0,
                speed: 3.0,
                speed_variance: 1.0,
                speed_per_level: 0.0,
            },
            storms: StormConfig {
                radius: 24.0,
                half_extents: Vec2::new(48.0, 26.0),
                base_cap: 2,
                cap_per_level: 1,
                max_active: 8,
                spawn_chance: 0.01,
                spawn_chance_per_level: 0.003,
                min_y: 200.0,
                max_y: 320.0,
                speed: 4.0,
                speed_variance: 2.0,
                speed_per_level: 0.0,
                pushback_x: 12.0,
                pushback_vy: -6.0,
            },
            clouds: CloudConfig {
                count: 4,
                min_y: 20.0,
                max_y: 110.0,
                min_size: 50.0,
                max_size: 110.0,
                min_speed: 0.3,
                max_speed: 0.9,
            },
            wind: WindConfig {
                gust_chance: 0.004,
                max_force: 2.0,
                duration_secs: 2.5,
                level_scale: 0.0,
            },
            forward: ForwardConfig {
                base: 0.0,
                per_level: 0.0,
                max: 0.0,
            },
            rules: RulesConfig {
                hazard: HazardRule::InstantGameOver,
                first_threshold: 10,
                threshold_step: 10,
                banner_secs: BANNER_SECS,
                flash_secs: FLASH_SECS,
            },
        }
    }

    fn enhanced() -> Self {
        let mut cfg = Self::classic();
        cfg.variant = Variant::Enhanced;
        cfg.shape = CollisionShape::Box;
        cfg.world.ceiling_y = Some(40.0);
        cfg.player.air = AirControl::Boost { accel: 0.35 };
        cfg.player.fast_fall = 1.5;
        cfg.player.fast_fall_interval = Some(FAST_FALL_INTERVAL);
        cfg.stars.count = 6;
        cfg.stars.speed_per_level = 0.4;
        cfg.storms.spawn_chance = 0.012;
        cfg.storms.spawn_chance_per_level = 0.004;
        cfg.storms.speed_per_level = 0.12;
        cfg.wind.max_force = 1.8;
        cfg.wind.level_scale = 0.2;
        cfg.rules.hazard = HazardRule::Lives {
            lives: 3,
            invulnerability_secs: INVULNERABILITY_SECS,
        };
        cfg.rules.first_threshold = 8;
        cfg.rules.threshold_step = 6;
        cfg
    }

    fn dash3d() -> Self {
        Self {
            variant: Variant::Dash3d,
            shape: CollisionShape::SphereAabb,
            axis: ScrollAxis::Depth,
            world: WorldConfig {
                min_x: -5.0,
                max_x: 5.0,
                ground_y: 0.0,
                ceiling_y: Some(-7.0),
                offscreen_margin: 0.0,
                respawn_jitter: 20.0,
                spawn_z: -60.0,
                despawn_z: 4.0,
            },
            player: PlayerConfig {
                start_x: -0.5,
                start_z: -0.5,
                size: 1.0,
                gravity: 0.025,
                jump_power: -0.5,
                speed: 0.15,
                air: AirControl::Boost { accel: 0.012 },
                fast_fall: 0.06,
                fast_fall_interval: Some(FAST_FALL_INTERVAL),
            },
            stars: StarConfig {
                count: 8,
                radius: 0.5,
                min_y: -4.0,
                max_y: -0.5,
                speed: 0.0,
                speed_variance: 0.0,
                speed_per_level: 0.0,
            },
            storms: StormConfig {
                radius: 1.1,
                half_extents: Vec2::new(1.4, 1.0),
                base_cap: 3,
                cap_per_level: 1,
                max_active: 10,
                spawn_chance: 0.02,
                spawn_chance_per_level: 0.004,
                min_y: -3.0,
                max_y: -1.0,
                speed: 0.0,
                speed_variance: 0.0,
                speed_per_level: 0.0,
                pushback_x: 0.6,
                pushback_vy: -0.25,
            },
            clouds: CloudConfig {
                count: 6,
                min_y: -14.0,
                max_y: -9.0,
                min_size: 3.0,
                max_size: 6.0,
                min_speed: 0.05,
                max_speed: 0.15,
            },
            wind: WindConfig {
                gust_chance: 0.004,
                max_force: 0.06,
                duration_secs: 2.0,
                level_scale: 0.15,
            },
            forward: ForwardConfig {
                base: 0.35,
                per_level: 0.04,
                max: 0.8,
            },
            rules: RulesConfig {
                hazard: HazardRule::Lives {
                    lives: 3,
                    invulnerability_secs: INVULNERABILITY_SECS,
                },
                first_threshold: 5,
                threshold_step: 5,
                banner_secs: BANNER_SECS,
                flash_secs: FLASH_SECS,
            },
        }
    }

    /// Parse a JSON override on top of a preset.
    ///
    /// The optional `"variant"` field picks the preset; every other field
    /// present in the document replaces the preset's value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut patch: Value = serde_json::from_str(json)?;
        let variant = match patch.get("variant").and_then(Value::as_str) {
            Some(name) => name.parse::<Variant>()?,
            None => Variant::default(),
        };
        if let Some(obj) = patch.as_object_mut() {
            obj.insert("variant".into(), Value::String(variant.as_str().into()));
        }

        let mut merged = serde_json::to_value(Self::preset(variant))?;
        merge_json(&mut merged, patch);
        let cfg: SimConfig = serde_json::from_value(merged)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }
        fn probability(field: &'static str, p: f32) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(invalid(field, format!("{p} is not a probability")))
            }
        }

        let w = &self.world;
        if !(w.max_x - self.player.size > w.min_x) {
            return Err(invalid("world.max_x", "world is narrower than the player"));
        }
        if let Some(ceiling) = w.ceiling_y {
            if !(ceiling < w.ground_y - self.player.size) {
                return Err(invalid("world.ceiling_y", "ceiling must sit above the player's rest height"));
            }
        }
        if !(self.player.size > 0.0) {
            return Err(invalid("player.size", "must be positive"));
        }
        if !(self.stars.radius > 0.0) {
            return Err(invalid("stars.radius", "must be positive"));
        }
        if !(self.storms.radius > 0.0) {
            return Err(invalid("storms.radius", "must be positive"));
        }
        probability("storms.spawn_chance", self.storms.spawn_chance)?;
        probability("wind.gust_chance", self.wind.gust_chance)?;
        if !(1..=MAX_THRESHOLD).contains(&self.rules.threshold_step) {
            return Err(invalid("rules.threshold_step", format!("must be in 1..={MAX_THRESHOLD}")));
        }
        if !(1..=MAX_THRESHOLD).contains(&self.rules.first_threshold) {
            return Err(invalid("rules.first_threshold", format!("must be in 1..={MAX_THRESHOLD}")));
        }
        let storms = &self.storms;
        if storms.max_active > MAX_STORMS {
            return Err(invalid("storms.max_active", format!("must be at most {MAX_STORMS}")));
        }
        if storms.base_cap > storms.max_active {
            return Err(invalid("storms.base_cap", "must not exceed storms.max_active"));
        }
        if storms.cap_per_level > storms.max_active {
            return Err(invalid("storms.cap_per_level", "must not exceed storms.max_active"));
        }
        if let HazardRule::Lives { lives, invulnerability_secs } = self.rules.hazard {
            if lives == 0 {
                return Err(invalid("rules.hazard.lives", "must be at least 1"));
            }
            if invulnerability_secs < 0.0 {
                return Err(invalid("rules.hazard.invulnerability_secs", "must not be negative"));
            }
        }
        if self.axis == ScrollAxis::Depth && !(w.spawn_z < w.despawn_z) {
            return Err(invalid("world.spawn_z", "must be ahead of despawn_z"));
        }
        Ok(())
    }

    /// Starting life count, or None when storms are instantly fatal
    pub fn initial_lives(&self) -> Option<u8> {
        match self.rules.hazard {
            HazardRule::InstantGameOver => None,
            HazardRule::Lives { lives, .. } => Some(lives),
        }
    }

    /// Player rest height (top of the box when standing on the ground)
    pub fn rest_y(&self) -> f32 {
        self.world.ground_y - self.player.size
    }

    /// Highest x the player's box may start at
    pub fn player_max_x(&self) -> f32 {
        self.world.max_x - self.player.size
    }

    /// Pull `x` into `[min_x, player_max_x]`. Never panics, even when the
    /// bounds are inverted by an unvalidated config (`min_x` wins).
    pub fn clamp_player_x(&self, x: f32) -> f32 {
        x.min(self.player_max_x()).max(self.world.min_x)
    }

    // === Difficulty curves ===

    pub fn storm_cap(&self, level: u32) -> usize {
        let extra = self.storms.cap_per_level.saturating_mul(level.saturating_sub(1) as usize);
        self.storms.base_cap.saturating_add(extra).min(self.storms.max_active)
    }

    pub fn storm_spawn_chance(&self, level: u32) -> f32 {
        let p = self.storms.spawn_chance + self.storms.spawn_chance_per_level * levels_above_one(level);
        p.clamp(0.0, 1.0)
    }

    pub fn storm_speed_scale(&self, level: u32) -> f32 {
        1.0 + self.storms.speed_per_level * levels_above_one(level)
    }

    pub fn star_speed(&self, level: u32) -> f32 {
        self.stars.speed + self.stars.speed_per_level * levels_above_one(level)
    }

    pub fn forward_speed(&self, level: u32) -> f32 {
        (self.forward.base + self.forward.per_level * levels_above_one(level)).min(self.forward.max)
    }

    pub fn gust_scale(&self, level: u32) -> f32 {
        1.0 + self.wind.level_scale * levels_above_one(level)
    }
}

fn levels_above_one(level: u32) -> f32 {
    level.saturating_sub(1) as f32
}

/// Recursively overlay `patch` onto `base` (objects merge, everything else replaces)
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
