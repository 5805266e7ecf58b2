//! Mesh classification for roll levels
//!
//! Which meshes mark the start sphere or a goal, and which ones are solid,
//! is data handed to the loader rather than process-wide state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rollpool_math::Vec3;

use crate::scene::SceneError;

/// What a mesh instance means to a roll level
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeshRole {
    /// The player's starting location
    Sphere,
    Goal,
    /// Solid box with the given local half-extents
    Box(Vec3),
    /// Solid triangle mesh
    Mesh,
    Decoration,
}

/// Mesh names to roles
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    pub sphere_mesh: String,
    pub goal_mesh: String,
    #[serde(default)]
    pub box_colliders: BTreeMap<String, Vec3>,
    #[serde(default)]
    pub mesh_colliders: BTreeSet<String>,
}

impl LevelTable {
    /// The table for the stock roll parts
    pub fn roll_parts() -> Self {
        let box_colliders = ["Block.Dark", "Block.Light"]
            .into_iter()
            .map(|name| (name.to_string(), Vec3::ONE))
            .collect();
        let mesh_colliders = ["Round.Quarter", "Round.Corner", "Round.Corner.Outer"]
            .into_iter()
            .map(String::from)
            .collect();
        Self {
            sphere_mesh: "Sphere".to_string(),
            goal_mesh: "Goal".to_string(),
            box_colliders,
            mesh_colliders,
        }
    }

    /// Load a table from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn classify(&self, mesh: &str) -> MeshRole {
        if mesh == self.sphere_mesh {
            MeshRole::Sphere
        } else if mesh == self.goal_mesh {
            MeshRole::Goal
        } else if let Some(&radius) = self.box_colliders.get(mesh) {
            MeshRole::Box(radius)
        } else if self.mesh_colliders.contains(mesh) {
            MeshRole::Mesh
        } else {
            MeshRole::Decoration
        }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::roll_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_parts_classification() {
        let table = LevelTable::roll_parts();
        assert_eq!(table.classify("Sphere"), MeshRole::Sphere);
        assert_eq!(table.classify("Goal"), MeshRole::Goal);
        assert_eq!(table.classify("Block.Dark"), MeshRole::Box(Vec3::ONE));
        assert_eq!(table.classify("Round.Corner.Outer"), MeshRole::Mesh);
        assert_eq!(table.classify("Tree"), MeshRole::Decoration);
    }

    #[test]
    fn test_table_from_ron() {
        let text = r#"(
            sphere_mesh: "Ball",
            goal_mesh: "Flag",
            box_colliders: { "Crate": (x: 0.5, y: 0.5, z: 0.5) },
        )"#;
        let table: LevelTable = ron::from_str(text).unwrap();
        assert_eq!(table.classify("Ball"), MeshRole::Sphere);
        assert_eq!(table.classify("Crate"), MeshRole::Box(Vec3::splat(0.5)));
        assert_eq!(table.classify("Round.Quarter"), MeshRole::Decoration);
    }
}
