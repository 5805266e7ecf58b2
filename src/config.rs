//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`ROLLPOOL_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use rollpool_core::{PoolSettings, RollSettings};
use rollpool_physics::{PhysicsConfig, TriangleFeatures};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sphere sweep and integrator settings
    #[serde(default)]
    pub physics: PhysicsSection,
    /// Roll game settings
    #[serde(default)]
    pub roll: RollSection,
    /// Pool game settings
    #[serde(default)]
    pub pool: PoolSettings,
    /// Headless run settings
    #[serde(default)]
    pub run: RunConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`ROLLPOOL_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // ROLLPOOL_PHYSICS__OVERSHOOT=1.2 -> physics.overshoot = 1.2
        figment = figment.merge(Env::prefixed("ROLLPOOL_").split("__"));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        if !(1.0..=2.0).contains(&physics.overshoot) {
            return Err(ConfigError::invalid("physics.overshoot", "must be within [1, 2]"));
        }
        if physics.max_iterations == 0 {
            return Err(ConfigError::invalid("physics.max_iterations", "must be at least 1"));
        }
        if !(physics.sphere_radius > 0.0) {
            return Err(ConfigError::invalid("physics.sphere_radius", "must be positive"));
        }
        if !(self.pool.body_radius > 0.0) {
            return Err(ConfigError::invalid("pool.body_radius", "must be positive"));
        }
        if !(self.run.frame_dt > 0.0) {
            return Err(ConfigError::invalid("run.frame_dt", "must be positive"));
        }
        Ok(())
    }

    /// Runtime integrator configuration
    pub fn to_physics_config(&self) -> PhysicsConfig {
        let p = &self.physics;
        let mut features = TriangleFeatures::empty();
        features.set(TriangleFeatures::PLANE, p.triangle_planes);
        features.set(TriangleFeatures::EDGES, p.triangle_edges);
        features.set(TriangleFeatures::VERTICES, p.triangle_vertices);

        let mut config = PhysicsConfig::default()
            .with_max_iterations(p.max_iterations)
            .with_overshoot(p.overshoot)
            .with_triangle_features(features);
        config.aabb_prefilter = p.aabb_prefilter;
        config
    }

    /// Roll mode settings, including the sphere radius from the physics section
    pub fn to_roll_settings(&self) -> RollSettings {
        let r = &self.roll;
        RollSettings {
            shove_speed: r.shove_speed,
            velocity_half_life: r.velocity_half_life,
            camera_distance: r.camera_distance,
            goal_spin_period: r.goal_spin_period,
            sphere_radius: self.physics.sphere_radius,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSection {
    /// Radius of the rolling sphere
    pub sphere_radius: f32,
    /// Sweeps allowed per frame
    pub max_iterations: u32,
    /// Multiple of the inward velocity removed on contact, within [1, 2]
    pub overshoot: f32,
    /// Test triangle faces
    pub triangle_planes: bool,
    /// Test triangle edges
    pub triangle_edges: bool,
    /// Test triangle corners
    pub triangle_vertices: bool,
    /// Skip mesh colliders whose bounds miss the sweep
    pub aabb_prefilter: bool,
}

impl Default for PhysicsSection {
    fn default() -> Self {
        let defaults = PhysicsConfig::default();
        Self {
            sphere_radius: 1.0,
            max_iterations: defaults.max_iterations,
            overshoot: defaults.overshoot,
            triangle_planes: true,
            triangle_edges: true,
            triangle_vertices: true,
            aabb_prefilter: defaults.aabb_prefilter,
        }
    }
}

/// Roll game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RollSection {
    /// Speed the held keys push toward (units per second)
    pub shove_speed: f32,
    /// Seconds for the velocity to close half the gap to the shove
    pub velocity_half_life: f32,
    /// Camera distance behind the player
    pub camera_distance: f32,
    /// Seconds per goal turn
    pub goal_spin_period: f32,
    /// RON level to play (the built-in demo level when unset)
    pub level_path: Option<String>,
    /// RON mesh table (the stock roll parts table when unset)
    pub level_table: Option<String>,
}

impl Default for RollSection {
    fn default() -> Self {
        let defaults = RollSettings::default();
        Self {
            shove_speed: defaults.shove_speed,
            velocity_half_life: defaults.velocity_half_life,
            camera_distance: defaults.camera_distance,
            goal_spin_period: defaults.goal_spin_period,
            level_path: None,
            level_table: None,
        }
    }
}

/// Which game the headless binary plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Roll,
    Pool,
}

/// Headless run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub game: GameKind,
    /// Frames to simulate
    pub frames: u32,
    /// Seconds per frame
    pub frame_dt: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            game: GameKind::Roll,
            frames: 600,
            frame_dt: 1.0 / 60.0,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Collect the sweep's debug lines every frame
    pub collect_lines: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            collect_lines: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape
    Figment(figment::Error),
    /// A value parsed but is out of range
    Invalid { key: &'static str, message: &'static str },
}

impl ConfigError {
    fn invalid(key: &'static str, message: &'static str) -> Self {
        ConfigError::Invalid { key, message }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Figment(e) => write!(f, "Configuration error: {}", e),
            ConfigError::Invalid { key, message } => write!(f, "Configuration error: {} {}", key, message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Figment(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}
