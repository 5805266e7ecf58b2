//! Static level colliders
//!
//! Colliders never own geometry placement: each refers to a transform in the
//! level's [`TransformArena`] and derives its world-space bounds from it on
//! every query.

use std::sync::Arc;

use rollpool_math::{Mat4x3, Vec3};

use crate::mesh::{Mesh, MeshBuffer, PrimitiveType};
use crate::shapes::Aabb;
use crate::transform::{TransformArena, TransformKey};

/// Box collider given by local half-extents around the transform origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCollider {
    pub transform: TransformKey,
    /// Half-extents in collider-local space
    pub radius: Vec3,
}

impl BoxCollider {
    pub fn new(transform: TransformKey, radius: Vec3) -> Self {
        Self { transform, radius }
    }

    /// World-space bounds of the (possibly rotated) box
    pub fn world_aabb(&self, transforms: &TransformArena) -> Option<Aabb> {
        let m = transforms.make_local_to_world(self.transform)?;
        let local = Aabb::from_center_half_extents(Vec3::ZERO, self.radius);
        let (min, max) = m.transform_aabb(local.min, local.max);
        Some(Aabb::new(min, max))
    }
}

/// Triangle mesh collider over a range of the shared mesh buffer
#[derive(Clone, Debug)]
pub struct MeshCollider {
    pub transform: TransformKey,
    pub mesh: Mesh,
    pub buffer: Arc<MeshBuffer>,
}

impl MeshCollider {
    /// # Panics
    /// Panics if `mesh` is not a triangle list. Level loading checks this
    /// first and reports it as an error.
    pub fn new(transform: TransformKey, mesh: Mesh, buffer: Arc<MeshBuffer>) -> Self {
        assert_eq!(
            mesh.primitive,
            PrimitiveType::TriangleList,
            "mesh colliders need triangle lists"
        );
        Self { transform, mesh, buffer }
    }

    /// World-space bounds of the mesh's local box
    pub fn world_aabb(&self, transforms: &TransformArena) -> Option<Aabb> {
        let m = transforms.make_local_to_world(self.transform)?;
        Some(self.bounds_in(&m))
    }

    /// Bounds of the mesh's local box under an already built local-to-world matrix
    pub fn bounds_in(&self, local_to_world: &Mat4x3) -> Aabb {
        let (min, max) = local_to_world.transform_aabb(self.mesh.min, self.mesh.max);
        Aabb::new(min, max)
    }
}

/// Every static collider of one level
#[derive(Clone, Debug, Default)]
pub struct ColliderSet {
    pub boxes: Vec<BoxCollider>,
    pub meshes: Vec<MeshCollider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_box(&mut self, collider: BoxCollider) {
        self.boxes.push(collider);
    }

    pub fn add_mesh(&mut self, collider: MeshCollider) {
        self.meshes.push(collider);
    }

    pub fn len(&self) -> usize {
        self.boxes.len() + self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.meshes.is_empty()
    }
}
