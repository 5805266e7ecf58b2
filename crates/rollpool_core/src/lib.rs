//! Scenes, levels and game modes for rollpool
//!
//! This crate turns scene files into playable levels:
//!
//! - [`SceneFile`] / [`Scene`] - RON level descriptions and their runtime form
//! - [`LevelTable`] - which meshes are the player start, goals, and colliders
//! - [`RollLevel`] / [`RollMode`] - roll a sphere around a level
//! - [`PoolLevel`] / [`PoolSession`] - drive dozers around a pool table
//! - [`DozerControls`] and the control message codec used by pool clients
//! - [`roll_parts`], [`demo_roll_scene`], [`demo_pool_scene`] - built-in content

mod controls;
mod demo;
mod level_error;
mod level_table;
mod pool_level;
mod pool_session;
mod roll_level;
mod roll_mode;
mod scene;

pub use controls::{
    drain_controls, encode_controls, next_message, ControlError, DozerControls, Message, CONTROLS_MESSAGE,
    HEADER_LEN,
};
pub use demo::{demo_pool_scene, demo_roll_scene, roll_parts};
pub use level_error::LevelError;
pub use level_table::{LevelTable, MeshRole};
pub use pool_level::{Ball, Dozer, DozerKey, PoolLevel, PoolSettings, Team};
pub use pool_session::{ConnectionId, ConnectionInfo, PoolSession};
pub use roll_level::{Goal, Player, RollLevel, PLAYER_CAMERA_FOVY, PLAYER_CAMERA_NEAR};
pub use roll_mode::{RollControls, RollMode, RollSettings, MAX_ELEVATION};
pub use scene::{Camera, CameraEntry, Drawable, MeshInstance, Scene, SceneError, SceneFile, TransformEntry};

// Re-export the physics types levels are built from
pub use rollpool_physics::{DebugLines, MeshBuffer, PhysicsConfig, StepReport, TransformKey};
