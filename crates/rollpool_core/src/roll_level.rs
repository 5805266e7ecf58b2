//! Roll game levels
//!
//! A roll level is a scene whose mesh instances have been sorted, using a
//! [`LevelTable`], into the player start, goals, solid colliders and plain
//! decoration. The level owns everything a frame mutates, so a pristine copy
//! kept aside can be restored with `clone()`.

use std::path::Path;
use std::sync::Arc;

use rollpool_math::Vec3;
use rollpool_physics::{
    BoxCollider, ColliderSet, MeshBuffer, MeshCollider, PrimitiveType, Transform, TransformKey,
};

use crate::level_error::LevelError;
use crate::level_table::{LevelTable, MeshRole};
use crate::scene::{Camera, Scene, SceneFile};

/// Vertical field of view of the player camera (radians)
pub const PLAYER_CAMERA_FOVY: f32 = 60.0 * std::f32::consts::PI / 180.0;
pub const PLAYER_CAMERA_NEAR: f32 = 0.05;

/// The rolling sphere and the angles the camera orbits it at
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub transform: TransformKey,
    pub velocity: Vec3,
    /// Axis scaled by radians per second
    pub rotational_velocity: Vec3,
    pub view_azimuth: f32,
    pub view_elevation: f32,
}

impl Player {
    pub fn new(transform: TransformKey) -> Self {
        Self {
            transform,
            velocity: Vec3::ZERO,
            rotational_velocity: Vec3::ZERO,
            view_azimuth: 0.0,
            view_elevation: 45.0_f32.to_radians(),
        }
    }
}

/// A spinning goal marker
#[derive(Clone, Debug, PartialEq)]
pub struct Goal {
    pub transform: TransformKey,
    /// Fraction of a full turn, kept in `[0, 1)`
    pub spin_acc: f32,
}

#[derive(Clone, Debug)]
pub struct RollLevel {
    pub scene: Scene,
    pub colliders: ColliderSet,
    pub goals: Vec<Goal>,
    pub player: Player,
    /// Transform of the camera following the player
    pub camera: TransformKey,
    pub meshes: Arc<MeshBuffer>,
}

impl RollLevel {
    /// Build a level from a scene file
    ///
    /// Every mesh instance must name a mesh in `meshes`, exactly one of them
    /// must be the table's sphere mesh, and every mesh collider must be a
    /// triangle list.
    pub fn from_scene(file: &SceneFile, table: &LevelTable, meshes: Arc<MeshBuffer>) -> Result<Self, LevelError> {
        let level = file.name.clone();
        let mut colliders = ColliderSet::new();
        let mut goals = Vec::new();
        let mut sphere: Option<TransformKey> = None;

        let mut scene = Scene::instantiate(file, |_, key, name| {
            let Some(mesh) = meshes.lookup(name) else {
                return Err(LevelError::UnknownMesh {
                    level: level.clone(),
                    mesh: name.to_string(),
                });
            };

            match table.classify(name) {
                MeshRole::Sphere => {
                    if sphere.is_some() {
                        return Err(LevelError::DuplicateSphere { level: level.clone() });
                    }
                    sphere = Some(key);
                }
                MeshRole::Goal => goals.push(Goal {
                    transform: key,
                    spin_acc: 0.0,
                }),
                MeshRole::Box(radius) => colliders.add_box(BoxCollider::new(key, radius)),
                MeshRole::Mesh => {
                    if mesh.primitive != PrimitiveType::TriangleList {
                        return Err(LevelError::InvalidPrimitive {
                            level: level.clone(),
                            mesh: name.to_string(),
                        });
                    }
                    colliders.add_mesh(MeshCollider::new(key, *mesh, Arc::clone(&meshes)));
                }
                MeshRole::Decoration => {}
            }
            Ok(())
        })?;

        let sphere = sphere.ok_or_else(|| LevelError::MissingSphere { level: level.clone() })?;

        let start = scene.transforms.world_position(sphere).unwrap_or(Vec3::ZERO);
        let camera = scene.transforms.insert(Transform::named("Player Camera", start));
        scene.cameras.push(Camera {
            transform: camera,
            fovy: PLAYER_CAMERA_FOVY,
            near: PLAYER_CAMERA_NEAR,
        });

        log::info!(
            "Level '{}' has {} box colliders, {} mesh colliders and {} goals",
            level,
            colliders.boxes.len(),
            colliders.meshes.len(),
            goals.len()
        );

        Ok(Self {
            scene,
            colliders,
            goals,
            player: Player::new(sphere),
            camera,
            meshes,
        })
    }

    /// Load a level from a RON scene file
    pub fn load<P: AsRef<Path>>(path: P, table: &LevelTable, meshes: Arc<MeshBuffer>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        log::debug!("Loading roll level from {}", path.display());
        let file = SceneFile::load(path)?;
        Self::from_scene(&file, table, meshes)
    }

    pub fn player_position(&self) -> Vec3 {
        self.scene.transforms.world_position(self.player.transform).unwrap_or(Vec3::ZERO)
    }

    /// The camera following the player
    pub fn player_camera(&self) -> Option<&Camera> {
        self.scene.cameras.iter().find(|c| c.transform == self.camera)
    }
}
