//! Shared vertex positions with named mesh ranges
//!
//! A level's geometry lives in one [`MeshBuffer`]; each named [`Mesh`] is a
//! contiguous range of it plus precomputed local bounds. The buffer is
//! immutable once built and shared between level copies through an `Arc`.

use std::collections::BTreeMap;
use std::fmt;

use rollpool_math::Vec3;

use crate::shapes::Aabb;

/// How the vertices of a mesh range are assembled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    TriangleList,
    LineList,
    Points,
}

/// A named range of the shared vertex buffer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mesh {
    pub primitive: PrimitiveType,
    /// Index of the first vertex
    pub start: usize,
    /// Number of vertices
    pub count: usize,
    /// Local-space bounds
    pub min: Vec3,
    pub max: Vec3,
}

impl Mesh {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Error raised while building a mesh buffer
#[derive(Debug)]
pub enum MeshBufferError {
    /// Flat position data could not be viewed as `Vec3`s
    BadPositionData {
        name: String,
        source: bytemuck::PodCastError,
    },
    /// A triangle list whose vertex count is not a multiple of three
    PartialTriangle { name: String, count: usize },
}

impl fmt::Display for MeshBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshBufferError::BadPositionData { name, source } => {
                write!(f, "Mesh '{}' has malformed position data: {}", name, source)
            }
            MeshBufferError::PartialTriangle { name, count } => {
                write!(f, "Mesh '{}' is a triangle list with {} vertices", name, count)
            }
        }
    }
}

impl std::error::Error for MeshBufferError {}

/// Immutable collection of meshes over one position buffer
#[derive(Clone, Debug, Default)]
pub struct MeshBuffer {
    positions: Vec<Vec3>,
    meshes: BTreeMap<String, Mesh>,
}

impl MeshBuffer {
    pub fn builder() -> MeshBufferBuilder {
        MeshBufferBuilder::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&Mesh> {
        self.meshes.get(name)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mesh names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.meshes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Triangles of a mesh range in local space
    ///
    /// A range that does not fit the buffer yields nothing; a trailing
    /// partial triangle is ignored.
    pub fn triangles<'a>(&'a self, mesh: &Mesh) -> impl Iterator<Item = [Vec3; 3]> + 'a {
        self.positions
            .get(mesh.range())
            .unwrap_or(&[])
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
    }
}

/// Accumulates meshes into a single buffer
#[derive(Debug, Default)]
pub struct MeshBufferBuilder {
    positions: Vec<Vec3>,
    meshes: BTreeMap<String, Mesh>,
}

impl MeshBufferBuilder {
    /// Append a mesh; a later mesh with the same name replaces the earlier entry
    pub fn push(
        &mut self,
        name: impl Into<String>,
        primitive: PrimitiveType,
        positions: &[Vec3],
    ) -> Result<&mut Self, MeshBufferError> {
        let name = name.into();
        if primitive == PrimitiveType::TriangleList && positions.len() % 3 != 0 {
            return Err(MeshBufferError::PartialTriangle {
                name,
                count: positions.len(),
            });
        }

        let bounds = Aabb::from_points(positions);
        let mesh = Mesh {
            primitive,
            start: self.positions.len(),
            count: positions.len(),
            min: bounds.min,
            max: bounds.max,
        };
        self.positions.extend_from_slice(positions);
        self.meshes.insert(name, mesh);
        Ok(self)
    }

    /// Append a mesh from tightly packed `x, y, z` floats
    pub fn push_f32(
        &mut self,
        name: impl Into<String>,
        primitive: PrimitiveType,
        flat: &[f32],
    ) -> Result<&mut Self, MeshBufferError> {
        let name = name.into();
        let positions: &[Vec3] = bytemuck::try_cast_slice(flat)
            .map_err(|source| MeshBufferError::BadPositionData { name: name.clone(), source })?;
        self.push(name, primitive, positions)
    }

    pub fn build(self) -> MeshBuffer {
        log::debug!(
            "Built mesh buffer: {} meshes, {} vertices",
            self.meshes.len(),
            self.positions.len()
        );
        MeshBuffer {
            positions: self.positions,
            meshes: self.meshes,
        }
    }
}
