//! Continuous (swept) collision tests
//!
//! Every test takes a `limit` and only reports a [`Hit`] whose time is
//! strictly below it. Chaining calls with the previous hit's `t` as the new
//! limit therefore keeps only the earliest contact, which is how a sweep
//! reduces over many colliders.
//!
//! The ray tests (`ray_vs_sphere`, `ray_vs_cylinder_segment`) move a point
//! `start + s * direction`; their hit point is that point. The swept sphere
//! tests grow the target by the radius, run the ray tests on the center, then
//! report the contact on the sphere surface.

use bitflags::bitflags;

use crate::shapes::Aabb;
use rollpool_math::Vec3;

/// Quadratic leading coefficients and squared lengths below this are treated as zero
const DEGENERATE: f32 = 1e-12;

/// Result of a swept test
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Time of impact as a fraction of the sweep
    pub t: f32,
    /// Contact point
    pub point: Vec3,
    /// Unit push-out direction
    pub normal: Vec3,
}

impl Hit {
    pub fn new(t: f32, point: Vec3, normal: Vec3) -> Self {
        Self { t, point, normal }
    }

    /// Move a ray hit (on the sphere center path) onto the sphere surface
    fn onto_surface(self, radius: f32) -> Self {
        Self {
            point: self.point - self.normal * radius,
            ..self
        }
    }
}

/// Keep whichever hit is earlier
pub fn earliest(a: Option<Hit>, b: Option<Hit>) -> Option<Hit> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

bitflags! {
    /// Which features of a triangle take part in the swept test
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TriangleFeatures: u8 {
        /// Face interior
        const PLANE = 1 << 0;
        /// The three edges (lateral cylinders)
        const EDGES = 1 << 1;
        /// The three corners
        const VERTICES = 1 << 2;
    }
}

impl Default for TriangleFeatures {
    fn default() -> Self {
        Self::all()
    }
}

/// Both roots of `a s^2 + b s + c = 0`, smaller first
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a.abs() < DEGENERATE {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let s0 = (-b - sq) / (2.0 * a);
    let s1 = (-b + sq) / (2.0 * a);
    if !(s0.is_finite() && s1.is_finite()) {
        return None;
    }
    Some((s0.min(s1), s0.max(s1)))
}

/// Point moving along `start + s * direction` against a sphere
///
/// A point already moving away from the center (or not moving) never hits.
/// A point starting inside the sphere hits at `t = 0`.
pub fn ray_vs_sphere(start: Vec3, direction: Vec3, center: Vec3, radius: f32, limit: f32) -> Option<Hit> {
    let rel = start - center;
    if rel.dot(direction) >= 0.0 {
        return None;
    }

    let a = direction.length_squared();
    let b = 2.0 * rel.dot(direction);
    let c = rel.length_squared() - radius * radius;
    let (s0, s1) = solve_quadratic(a, b, c)?;
    if s1 < 0.0 {
        return None;
    }

    if s0 <= 0.0 {
        if limit <= 0.0 {
            return None;
        }
        return Some(Hit::new(0.0, start, rel.careful_normalized()));
    }
    if s0 >= limit {
        return None;
    }

    let at = start + direction * s0;
    Some(Hit::new(s0, at, (at - center).careful_normalized()))
}

/// Point moving along `start + s * direction` against the side of a capsule
/// without its caps
///
/// Only contacts whose closest point on the axis lies between `a` and `b`
/// count; the rounded ends belong to [`ray_vs_sphere`].
pub fn ray_vs_cylinder_segment(
    start: Vec3,
    direction: Vec3,
    a: Vec3,
    b: Vec3,
    radius: f32,
    limit: f32,
) -> Option<Hit> {
    let axis = b - a;
    let axis_len_sq = axis.length_squared();
    if axis_len_sq < DEGENERATE {
        return None;
    }

    let rel = start - a;

    // Times during which the closest axis point stays inside the segment
    let u0 = rel.dot(axis) / axis_len_sq;
    let du = direction.dot(axis) / axis_len_sq;
    let (a0, a1) = if du.abs() < DEGENERATE {
        if !(0.0..=1.0).contains(&u0) {
            return None;
        }
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        let enter = -u0 / du;
        let leave = (1.0 - u0) / du;
        (enter.min(leave), enter.max(leave))
    };

    // Distance to the infinite line, perpendicular parts only
    let perp_rel = rel - axis * u0;
    let perp_dir = direction - axis * du;
    let qa = perp_dir.length_squared();
    let qb = 2.0 * perp_rel.dot(perp_dir);
    if qb >= 0.0 {
        return None;
    }
    let qc = perp_rel.length_squared() - radius * radius;
    let (s0, s1) = solve_quadratic(qa, qb, qc)?;
    if s1 < 0.0 {
        return None;
    }

    let t = if s0 <= 0.0 {
        if !(a0 <= 0.0 && 0.0 <= a1) {
            return None;
        }
        0.0
    } else {
        if s0 < a0 || s0 > a1 {
            return None;
        }
        s0
    };
    if t >= limit {
        return None;
    }

    let at = start + direction * t;
    let on_axis = a + axis * (u0 + du * t).clamp(0.0, 1.0);
    Some(Hit::new(t, at, (at - on_axis).careful_normalized()))
}

/// Separating-axis overlap check (touching counts as overlap)
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> bool {
    !(a.max.x < b.min.x
        || a.min.x > b.max.x
        || a.max.y < b.min.y
        || a.min.y > b.max.y
        || a.max.z < b.min.z
        || a.min.z > b.max.z)
}

/// Shortest way out of a box for a point inside it
fn escape_direction(aabb: &Aabb, point: Vec3) -> Vec3 {
    let to_min = point - aabb.min;
    let to_max = aabb.max - point;

    let mut min_dist = to_min.x;
    let mut normal = -Vec3::X;
    for axis in 0..3 {
        if to_min.axis(axis) < min_dist {
            min_dist = to_min.axis(axis);
            normal = -Vec3::unit(axis);
        }
        if to_max.axis(axis) < min_dist {
            min_dist = to_max.axis(axis);
            normal = Vec3::unit(axis);
        }
    }
    normal
}

/// Sphere of `radius` swept from `from` to `to` against a world-space box
///
/// A sphere that already overlaps the box hits at `t = 0` if it is heading
/// further in, and never hits if it is heading out. Otherwise the box faces,
/// edges and corners are all tested.
pub fn swept_sphere_vs_box(from: Vec3, to: Vec3, radius: f32, aabb: &Aabb, limit: f32) -> Option<Hit> {
    let direction = to - from;

    let closest = aabb.closest_point(from);
    let delta = from - closest;
    let dist_sq = delta.length_squared();
    if dist_sq < radius * radius {
        let out = if dist_sq > 0.0001 * 0.0001 {
            delta.careful_normalized()
        } else {
            escape_direction(aabb, from)
        };
        if direction.dot(out) < 0.0 && limit > 0.0 {
            return Some(Hit::new(0.0, from - out * radius, out));
        }
        return None;
    }

    let mut best: Option<Hit> = None;
    let mut lim = limit;

    // Faces
    for axis in 0..3 {
        for side in [-1.0_f32, 1.0] {
            let plane = if side > 0.0 { aabb.max.axis(axis) } else { aabb.min.axis(axis) };
            let d0 = side * (from.axis(axis) - plane);
            let dn = side * direction.axis(axis);
            if d0 < radius || dn >= 0.0 {
                continue;
            }
            let t = (radius - d0) / dn;
            if t >= lim {
                continue;
            }
            let center = from + direction * t;
            let inside = (0..3).filter(|&o| o != axis).all(|o| {
                let v = center.axis(o);
                v >= aabb.min.axis(o) && v <= aabb.max.axis(o)
            });
            if inside {
                let normal = Vec3::unit(axis) * side;
                best = Some(Hit::new(t, center - normal * radius, normal));
                lim = t;
            }
        }
    }

    // Edges
    for (a, b) in aabb.edges() {
        if let Some(hit) = ray_vs_cylinder_segment(from, direction, a, b, radius, lim) {
            lim = hit.t;
            best = Some(hit.onto_surface(radius));
        }
    }

    // Corners
    for corner in aabb.corners() {
        if let Some(hit) = ray_vs_sphere(from, direction, corner, radius, lim) {
            lim = hit.t;
            best = Some(hit.onto_surface(radius));
        }
    }

    best
}

/// Sphere of `radius` swept from `from` to `to` against the triangle `tri`
///
/// The face interior, edges and vertices are tested according to `features`;
/// whichever is touched first wins.
pub fn swept_sphere_vs_triangle(
    from: Vec3,
    to: Vec3,
    radius: f32,
    tri: [Vec3; 3],
    features: TriangleFeatures,
    limit: f32,
) -> Option<Hit> {
    let direction = to - from;
    let [a, b, c] = tri;

    let mut best: Option<Hit> = None;
    let mut lim = limit;

    let winding = (b - a).cross(c - a);
    if features.contains(TriangleFeatures::PLANE) && winding.length_squared() > DEGENERATE {
        // Face the normal toward the side the sphere starts on
        let mut normal = winding.normalized();
        let mut d0 = (from - a).dot(normal);
        if d0 < 0.0 {
            normal = -normal;
            d0 = -d0;
        }
        let dn = direction.dot(normal);
        if dn < 0.0 {
            let t = if d0 >= radius { (radius - d0) / dn } else { 0.0 };
            if t < lim {
                let center = from + direction * t;
                let on_plane = center - normal * (center - a).dot(normal);
                let inside = [(a, b), (b, c), (c, a)]
                    .iter()
                    .all(|&(e0, e1)| (e1 - e0).cross(on_plane - e0).dot(winding) >= 0.0);
                if inside {
                    best = Some(Hit::new(t, center - normal * radius, normal));
                    lim = t;
                }
            }
        }
    }

    if features.contains(TriangleFeatures::EDGES) {
        for (e0, e1) in [(a, b), (b, c), (c, a)] {
            if let Some(hit) = ray_vs_cylinder_segment(from, direction, e0, e1, radius, lim) {
                lim = hit.t;
                best = Some(hit.onto_surface(radius));
            }
        }
    }

    if features.contains(TriangleFeatures::VERTICES) {
        for v in tri {
            if let Some(hit) = ray_vs_sphere(from, direction, v, radius, lim) {
                lim = hit.t;
                best = Some(hit.onto_surface(radius));
            }
        }
    }

    best
}
