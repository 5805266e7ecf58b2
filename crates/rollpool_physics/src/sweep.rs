//! Time-of-impact sweep over a whole collider set

use rollpool_math::Vec3;

use crate::collider::ColliderSet;
use crate::collision::{aabb_vs_aabb, earliest, swept_sphere_vs_box, swept_sphere_vs_triangle, Hit};
use crate::debug::{self, DebugLines};
use crate::integrator::PhysicsConfig;
use crate::shapes::Aabb;
use crate::transform::TransformArena;

/// Earliest contact of a sphere swept from `from` to `to` against every collider
///
/// Mesh colliders whose world bounds miss the swept bounds are skipped
/// (unless the prefilter is disabled). When `debug` is given, every tested
/// box and triangle is recorded, colored by outcome, plus the final contact.
pub fn sweep_sphere(
    colliders: &ColliderSet,
    transforms: &TransformArena,
    from: Vec3,
    to: Vec3,
    radius: f32,
    config: &PhysicsConfig,
    mut debug: Option<&mut DebugLines>,
) -> Option<Hit> {
    let swept = Aabb::swept_sphere(from, to, radius);
    let mut best: Option<Hit> = None;
    let limit = |best: &Option<Hit>| best.map_or(1.0, |h| h.t);

    for collider in &colliders.boxes {
        let Some(aabb) = collider.world_aabb(transforms) else {
            log::trace!("Box collider lost its transform; skipping");
            continue;
        };
        let hit = swept_sphere_vs_box(from, to, radius, &aabb, limit(&best));
        if let Some(lines) = debug.as_deref_mut() {
            lines.aabb(&aabb, if hit.is_some() { debug::HIT } else { debug::TESTED });
        }
        best = earliest(best, hit);
    }

    for collider in &colliders.meshes {
        let Some(local_to_world) = transforms.make_local_to_world(collider.transform) else {
            log::trace!("Mesh collider lost its transform; skipping");
            continue;
        };

        if config.aabb_prefilter {
            let bounds = collider.bounds_in(&local_to_world);
            if !aabb_vs_aabb(&bounds, &swept) {
                if let Some(lines) = debug.as_deref_mut() {
                    lines.aabb(&bounds, debug::REJECTED);
                }
                continue;
            }
        }

        for tri in collider.buffer.triangles(&collider.mesh) {
            let world = tri.map(|p| local_to_world.transform_point(p));
            let hit = swept_sphere_vs_triangle(from, to, radius, world, config.triangle_features, limit(&best));
            if let Some(lines) = debug.as_deref_mut() {
                lines.triangle(world, if hit.is_some() { debug::HIT } else { debug::TESTED });
            }
            best = earliest(best, hit);
        }
    }

    if let (Some(lines), Some(hit)) = (debug, best) {
        lines.contact(hit.point, hit.normal);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{BoxCollider, MeshCollider};
    use crate::collision::TriangleFeatures;
    use crate::mesh::{MeshBuffer, PrimitiveType};
    use crate::transform::Transform;
    use std::sync::Arc;

    const EPSILON: f32 = 0.001;

    /// Two triangles covering [-1,1]^2 at z = 0
    fn floor_buffer() -> Arc<MeshBuffer> {
        let a = Vec3::new(-1.0, -1.0, 0.0);
        let b = Vec3::new(1.0, -1.0, 0.0);
        let c = Vec3::new(1.0, 1.0, 0.0);
        let d = Vec3::new(-1.0, 1.0, 0.0);
        let mut builder = MeshBuffer::builder();
        builder.push("Floor", PrimitiveType::TriangleList, &[a, b, c, a, c, d]).unwrap();
        Arc::new(builder.build())
    }

    fn floor_level(offset: Vec3) -> (ColliderSet, TransformArena) {
        let buffer = floor_buffer();
        let mesh = *buffer.lookup("Floor").unwrap();
        let mut transforms = TransformArena::new();
        let key = transforms.insert(Transform::named("floor", offset).with_scale(Vec3::new(5.0, 5.0, 1.0)));
        let mut colliders = ColliderSet::new();
        colliders.add_mesh(MeshCollider::new(key, mesh, buffer));
        (colliders, transforms)
    }

    #[test]
    fn test_mesh_sweep_hits_floor() {
        let (colliders, transforms) = floor_level(Vec3::ZERO);
        let hit = sweep_sphere(
            &colliders,
            &transforms,
            Vec3::new(0.5, 0.5, 3.0),
            Vec3::new(0.5, 0.5, -1.0),
            1.0,
            &PhysicsConfig::default(),
            None,
        )
        .expect("Should hit");
        assert!((hit.t - 0.5).abs() < EPSILON);
        assert!((hit.normal - Vec3::Z).length() < EPSILON);
    }

    #[test]
    fn test_earliest_collider_wins() {
        let (mut colliders, mut transforms) = floor_level(Vec3::ZERO);
        // a box sitting on the floor is reached before the floor itself
        let key = transforms.insert(Transform::named("box", Vec3::new(0.0, 0.0, 1.0)));
        colliders.add_box(BoxCollider::new(key, Vec3::ONE));

        let hit = sweep_sphere(
            &colliders,
            &transforms,
            Vec3::new(0.0, 0.0, 6.0),
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            &PhysicsConfig::default(),
            None,
        )
        .expect("Should hit");
        // box top at z=2, so the center stops at z=3
        assert!((hit.t - 3.0 / 8.0).abs() < EPSILON, "t = {}", hit.t);
    }

    #[test]
    fn test_prefilter_skips_distant_mesh() {
        let (colliders, transforms) = floor_level(Vec3::new(100.0, 0.0, 0.0));
        let mut lines = DebugLines::new();
        let hit = sweep_sphere(
            &colliders,
            &transforms,
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            &PhysicsConfig::default(),
            Some(&mut lines),
        );
        assert!(hit.is_none());
        // only the rejected bounds are drawn, no triangles
        assert_eq!(lines.len(), 12);
        assert!(lines.lines().iter().all(|l| l.color == debug::REJECTED));
    }

    #[test]
    fn test_prefilter_does_not_change_result() {
        let (colliders, transforms) = floor_level(Vec3::new(0.0, 0.0, -0.5));
        let from = Vec3::new(2.0, -1.0, 4.0);
        let to = Vec3::new(-1.0, 2.0, -2.0);
        let filtered = sweep_sphere(&colliders, &transforms, from, to, 1.0, &PhysicsConfig::default(), None);
        let unfiltered_config = PhysicsConfig {
            aabb_prefilter: false,
            ..Default::default()
        };
        let unfiltered = sweep_sphere(&colliders, &transforms, from, to, 1.0, &unfiltered_config, None);
        assert_eq!(filtered, unfiltered);
        assert!(filtered.is_some());
    }

    #[test]
    fn test_debug_lines_record_tests_and_contact() {
        let (colliders, transforms) = floor_level(Vec3::ZERO);
        let mut lines = DebugLines::new();
        sweep_sphere(
            &colliders,
            &transforms,
            Vec3::new(0.5, 0.5, 3.0),
            Vec3::new(0.5, 0.5, -1.0),
            1.0,
            &PhysicsConfig::default(),
            Some(&mut lines),
        );
        // two triangles (3 lines each) plus the contact gizmo (4 lines)
        assert_eq!(lines.len(), 10);
        assert!(lines.lines().iter().any(|l| l.color == debug::HIT));
    }

    #[test]
    fn test_edges_only_misses_floor_interior() {
        let (colliders, transforms) = floor_level(Vec3::ZERO);
        let config = PhysicsConfig {
            triangle_features: TriangleFeatures::EDGES,
            ..Default::default()
        };
        // straight down onto the middle of one triangle, far from every edge
        let hit = sweep_sphere(
            &colliders,
            &transforms,
            Vec3::new(2.0, -2.5, 3.0),
            Vec3::new(2.0, -2.5, -1.0),
            0.5,
            &config,
            None,
        );
        assert!(hit.is_none());
    }
}
