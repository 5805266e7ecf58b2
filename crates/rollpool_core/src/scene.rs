//! Scene files and runtime scenes
//!
//! A [`SceneFile`] is the on-disk (RON) description of a level: a flat list
//! of transforms with optional parent indices, mesh instances referring to
//! those transforms by index, and cameras. [`Scene::instantiate`] turns it
//! into a runtime [`Scene`] backed by a transform arena, calling back once
//! per mesh instance so each game mode can classify what it loads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use rollpool_math::{Quat, Vec3};
use rollpool_physics::{Transform, TransformArena, TransformKey};

/// One transform in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformEntry {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Rotation quaternion as `[x, y, z, w]`
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Index of the parent transform in the same file
    #[serde(default)]
    pub parent: Option<usize>,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl TransformEntry {
    pub fn new(name: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: identity_rotation(),
            scale: unit_scale(),
            parent: None,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = [rotation.x, rotation.y, rotation.z, rotation.w];
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A mesh placed at a transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshInstance {
    pub transform: usize,
    pub mesh: String,
}

/// A camera attached to a transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraEntry {
    pub transform: usize,
    /// Vertical field of view in radians
    pub fovy: f32,
    pub near: f32,
}

/// Serializable scene description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub name: String,
    #[serde(default)]
    pub transforms: Vec<TransformEntry>,
    #[serde(default)]
    pub meshes: Vec<MeshInstance>,
    #[serde(default)]
    pub cameras: Vec<CameraEntry>,
}

impl SceneFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, SceneError> {
        Ok(ron::from_str(contents)?)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn to_ron(&self) -> Result<String, SceneError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Append a transform and return its index
    pub fn add_transform(&mut self, entry: TransformEntry) -> usize {
        self.transforms.push(entry);
        self.transforms.len() - 1
    }

    /// Place a mesh at a new root transform named after the mesh
    pub fn place(&mut self, mesh: &str, position: [f32; 3]) -> usize {
        let index = self.add_transform(TransformEntry::new(mesh, position));
        self.meshes.push(MeshInstance {
            transform: index,
            mesh: mesh.to_string(),
        });
        index
    }

    pub fn add_camera(&mut self, transform: usize, fovy: f32, near: f32) {
        self.cameras.push(CameraEntry { transform, fovy, near });
    }
}

/// Error loading, saving, or instantiating a scene
#[derive(Debug)]
pub enum SceneError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
    /// A transform names a parent index that does not exist (or itself)
    BadParent { transform: usize, parent: usize },
    /// A mesh instance or camera names a transform index that does not exist
    BadTransformIndex(usize),
}

impl From<io::Error> for SceneError {
    fn from(e: io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::Serialize(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Serialize(e) => write!(f, "Serialize error: {}", e),
            SceneError::BadParent { transform, parent } => {
                write!(f, "Transform {} has invalid parent index {}", transform, parent)
            }
            SceneError::BadTransformIndex(index) => write!(f, "Invalid transform index {}", index),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Parse(e) => Some(e),
            SceneError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

/// Something to draw: a mesh (by name) at a transform
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub transform: TransformKey,
    pub mesh: String,
}

/// A viewpoint attached to a transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub transform: TransformKey,
    pub fovy: f32,
    pub near: f32,
}

/// Runtime scene: transforms, drawables and cameras
///
/// Every handle in a scene points into its own arena, so cloning a scene
/// yields an independent copy whose handles are already valid.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    pub transforms: TransformArena,
    pub drawables: Vec<Drawable>,
    pub cameras: Vec<Camera>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a scene from a file
    ///
    /// Each mesh instance becomes a drawable, and `on_mesh` is called with the
    /// scene, the instance's transform and the mesh name. An error from the
    /// callback aborts instantiation.
    pub fn instantiate<E, F>(file: &SceneFile, mut on_mesh: F) -> Result<Self, E>
    where
        E: From<SceneError>,
        F: FnMut(&mut Scene, TransformKey, &str) -> Result<(), E>,
    {
        let mut scene = Scene::new(file.name.clone());

        let keys: Vec<TransformKey> = file
            .transforms
            .iter()
            .map(|entry| {
                scene.transforms.insert(Transform {
                    name: entry.name.clone(),
                    position: Vec3::from_array(entry.position),
                    rotation: Quat::from_array(entry.rotation).normalize(),
                    scale: Vec3::from_array(entry.scale),
                    parent: None,
                })
            })
            .collect();

        for (index, entry) in file.transforms.iter().enumerate() {
            if let Some(parent) = entry.parent {
                if parent == index || parent >= keys.len() {
                    return Err(SceneError::BadParent { transform: index, parent }.into());
                }
                if let Some(t) = scene.transforms.get_mut(keys[index]) {
                    t.parent = Some(keys[parent]);
                }
            }
        }

        let key_at = |index: usize| keys.get(index).copied().ok_or(SceneError::BadTransformIndex(index));

        for instance in &file.meshes {
            let key = key_at(instance.transform)?;
            scene.drawables.push(Drawable {
                transform: key,
                mesh: instance.mesh.clone(),
            });
            on_mesh(&mut scene, key, &instance.mesh)?;
        }

        for camera in &file.cameras {
            scene.cameras.push(Camera {
                transform: key_at(camera.transform)?,
                fovy: camera.fovy,
                near: camera.near,
            });
        }

        Ok(scene)
    }

    /// Add a root transform with a drawable and return its key
    pub fn add_drawable(&mut self, transform: Transform, mesh: impl Into<String>) -> TransformKey {
        let key = self.transforms.insert(transform);
        self.drawables.push(Drawable {
            transform: key,
            mesh: mesh.into(),
        });
        key
    }

    /// Remove a transform along with any drawables and cameras using it
    pub fn remove_transform(&mut self, key: TransformKey) -> Option<Transform> {
        self.drawables.retain(|d| d.transform != key);
        self.cameras.retain(|c| c.transform != key);
        self.transforms.remove(key)
    }
}
