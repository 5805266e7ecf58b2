//! Collision shapes
//!
//! Axis-aligned boxes used by the swept tests and the mesh prefilter. They
//! carry no transform; callers hand them over in world space.

use rollpool_math::Vec3;

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Bounds of a sphere swept from `from` to `to`
    pub fn swept_sphere(from: Vec3, to: Vec3, radius: f32) -> Self {
        let r = Vec3::splat(radius);
        Self {
            min: from.min_components(to) - r,
            max: from.max_components(to) + r,
        }
    }

    /// Smallest box containing every point (empty input gives a zero box at the origin)
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::new(Vec3::ZERO, Vec3::ZERO);
        };
        points.iter().fold(Self::new(first, first), |b, &p| Self {
            min: b.min.min_components(p),
            max: b.max.max_components(p),
        })
    }

    /// Closest point inside or on the AABB to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp_components(self.min, self.max)
    }

    /// The eight corners, indexed by bit pattern (bit 0 = x max, bit 1 = y max, bit 2 = z max)
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// The twelve edges as corner pairs
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let c = self.corners();
        let mut edges = [(Vec3::ZERO, Vec3::ZERO); 12];
        let mut n = 0;
        for i in 0..8 {
            for bit in [1, 2, 4] {
                if i & bit == 0 {
                    edges[n] = (c[i], c[i | bit]);
                    n += 1;
                }
            }
        }
        edges
    }
}
