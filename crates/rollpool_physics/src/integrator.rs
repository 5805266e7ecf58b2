//! Slide-and-resweep integration of a rolling sphere

use crate::body::RollingBody;
use crate::collider::ColliderSet;
use crate::collision::TriangleFeatures;
use crate::debug::DebugLines;
use crate::sweep::sweep_sphere;
use crate::transform::TransformArena;
use rollpool_math::Vec3;

/// Configuration for the integrator and the sweeps it runs
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Sub-steps allowed per frame before the body is left where it is
    pub max_iterations: u32,
    /// Multiple of the inward normal velocity removed on contact (1 = slide exactly)
    pub overshoot: f32,
    /// Triangle features tested against mesh colliders
    pub triangle_features: TriangleFeatures,
    /// Skip mesh colliders whose bounds miss the swept bounds
    pub aabb_prefilter: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            overshoot: 1.5,
            triangle_features: TriangleFeatures::all(),
            aabb_prefilter: true,
        }
    }
}

impl PhysicsConfig {
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Overshoot is kept within `[1, 2]`: below 1 resting contacts re-collide,
    /// above 2 contacts would add energy
    pub fn with_overshoot(mut self, overshoot: f32) -> Self {
        self.overshoot = overshoot.clamp(1.0, 2.0);
        self
    }

    pub fn with_triangle_features(mut self, features: TriangleFeatures) -> Self {
        self.triangle_features = features;
        self
    }
}

/// What happened during one [`integrate`] call
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Sweeps performed
    pub iterations: u32,
    /// Sweeps that ended in a contact
    pub collisions: u32,
    /// False if the iteration cap cut the frame short
    pub converged: bool,
}

/// Spin up the body from the slip at a contact point
///
/// Slip is the surface velocity at the contact, `w x r + v`. Adding
/// `slip x r` to the angular velocity pushes the body toward rolling without
/// slipping.
pub fn apply_rolling(body: &mut RollingBody, contact: Vec3) {
    let r = contact - body.position;
    let slip = body.angular_velocity.cross(r) + body.velocity;
    body.angular_velocity += slip.cross(r);
}

/// Advance `body` by `elapsed` seconds through the static colliders
///
/// Each sub-step sweeps along the remaining displacement. On contact the
/// body stops at the impact, loses its inward velocity (times the
/// overshoot), picks up spin, and sweeps again for the time that is left.
/// Hitting the iteration cap keeps the last clamped position.
pub fn integrate(
    body: &mut RollingBody,
    elapsed: f32,
    colliders: &ColliderSet,
    transforms: &TransformArena,
    config: &PhysicsConfig,
    mut debug: Option<&mut DebugLines>,
) -> StepReport {
    let mut report = StepReport {
        converged: true,
        ..Default::default()
    };
    let mut remain = elapsed.max(0.0);

    while remain > 0.0 {
        if report.iterations >= config.max_iterations {
            log::debug!(
                "Integrator hit {} iterations with {:.4}s left at {:?}",
                report.iterations,
                remain,
                body.position
            );
            report.converged = false;
            break;
        }
        report.iterations += 1;

        let from = body.position;
        let to = from + body.velocity * remain;
        let hit = sweep_sphere(colliders, transforms, from, to, body.radius, config, debug.as_deref_mut());

        let Some(hit) = hit else {
            body.position = to;
            break;
        };

        report.collisions += 1;
        body.position = from.lerp(to, hit.t);

        let d = body.velocity.dot(hit.normal);
        if d < 0.0 {
            body.velocity -= hit.normal * (config.overshoot * d);
        }
        apply_rolling(body, hit.point);

        remain *= 1.0 - hit.t;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::BoxCollider;
    use crate::transform::Transform;

    const EPSILON: f32 = 0.001;

    fn room_with_box(center: Vec3, half: Vec3) -> (ColliderSet, TransformArena) {
        let mut transforms = TransformArena::new();
        let key = transforms.insert(Transform::named("wall", center));
        let mut colliders = ColliderSet::new();
        colliders.add_box(BoxCollider::new(key, half));
        (colliders, transforms)
    }

    #[test]
    fn test_free_flight() {
        let colliders = ColliderSet::new();
        let transforms = TransformArena::new();
        let mut body = RollingBody::new(Vec3::ZERO, 1.0).with_velocity(Vec3::new(1.0, 2.0, 0.0));
        let report = integrate(&mut body, 0.5, &colliders, &transforms, &PhysicsConfig::default(), None);
        assert!((body.position - Vec3::new(0.5, 1.0, 0.0)).length() < EPSILON);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.collisions, 0);
        assert!(report.converged);
    }

    #[test]
    fn test_zero_elapsed_does_nothing() {
        let (colliders, transforms) = room_with_box(Vec3::new(6.0, 0.0, 0.0), Vec3::new(1.0, 10.0, 10.0));
        let mut body = RollingBody::new(Vec3::ZERO, 1.0).with_velocity(Vec3::X);
        let before = body;
        let report = integrate(&mut body, 0.0, &colliders, &transforms, &PhysicsConfig::default(), None);
        assert_eq!(body, before);
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn test_wall_never_penetrated_with_single_iteration() {
        let (colliders, transforms) = room_with_box(Vec3::new(6.0, 0.0, 0.0), Vec3::new(1.0, 10.0, 10.0));
        let config = PhysicsConfig::default().with_max_iterations(1);
        let mut body = RollingBody::new(Vec3::ZERO, 1.0);
        let dt = 1.0 / 60.0;

        for _ in 0..600 {
            body.velocity = Vec3::X;
            integrate(&mut body, dt, &colliders, &transforms, &config, None);
            // wall face at x = 5, sphere radius 1
            assert!(body.position.x <= 4.0 + EPSILON, "penetrated: {:?}", body.position);
        }
        assert!(body.position.x > 4.0 - 0.05, "stalled at {:?}", body.position);
    }

    #[test]
    fn test_iteration_cap_reported() {
        let (colliders, transforms) = room_with_box(Vec3::new(6.0, 0.0, 0.0), Vec3::new(1.0, 10.0, 10.0));
        let config = PhysicsConfig::default().with_max_iterations(1);
        let mut body = RollingBody::new(Vec3::new(3.0, 0.0, 0.0), 1.0).with_velocity(Vec3::new(2.0, 1.0, 0.0));
        let report = integrate(&mut body, 1.0, &colliders, &transforms, &config, None);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.collisions, 1);
        assert!(!report.converged);
        // clamped at the impact, half way along the first sweep
        assert!((body.position - Vec3::new(4.0, 0.5, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_slides_along_wall() {
        let (colliders, transforms) = room_with_box(Vec3::new(6.0, 0.0, 0.0), Vec3::new(1.0, 10.0, 10.0));
        let config = PhysicsConfig::default().with_overshoot(1.0);
        let mut body = RollingBody::new(Vec3::new(3.0, 0.0, 0.0), 1.0).with_velocity(Vec3::new(2.0, 1.0, 0.0));
        let report = integrate(&mut body, 1.0, &colliders, &transforms, &config, None);
        assert!(report.converged);
        assert_eq!(report.collisions, 1);
        // half a second to reach the wall, then half a second sliding in y
        assert!((body.position - Vec3::new(4.0, 1.0, 0.0)).length() < EPSILON, "got {:?}", body.position);
        assert!(body.velocity.x.abs() < EPSILON);
    }

    #[test]
    fn test_displacement_bound() {
        let mut transforms = TransformArena::new();
        let mut colliders = ColliderSet::new();
        // floor and two walls forming a corner
        for (center, half) in [
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(10.0, 10.0, 1.0)),
            (Vec3::new(4.0, 0.0, 0.0), Vec3::new(1.0, 10.0, 10.0)),
            (Vec3::new(0.0, 4.0, 0.0), Vec3::new(10.0, 1.0, 10.0)),
        ] {
            let key = transforms.insert(Transform::named("wall", center));
            colliders.add_box(BoxCollider::new(key, half));
        }

        let config = PhysicsConfig::default();
        let mut body = RollingBody::new(Vec3::new(0.0, 0.0, 1.0), 1.0);
        let dt = 1.0 / 30.0;
        for frame in 0..200 {
            body.velocity = Vec3::new(5.0, 4.0, -3.0) + Vec3::new(0.0, 0.0, (frame % 7) as f32);
            let speed = body.velocity.length();
            let before = body.position;
            integrate(&mut body, dt, &colliders, &transforms, &config, None);
            let moved = (body.position - before).length();
            assert!(moved <= speed * dt + EPSILON, "frame {}: moved {} > {}", frame, moved, speed * dt);
            assert!(body.position.is_finite());
            assert!(body.position.x <= 2.0 + EPSILON && body.position.y <= 2.0 + EPSILON);
            assert!(body.position.z >= 1.0 - EPSILON);
        }
    }

    #[test]
    fn test_rolling_spin_from_floor_contact() {
        let (colliders, transforms) = room_with_box(Vec3::new(0.0, 0.0, -1.0), Vec3::new(100.0, 100.0, 1.0));
        let mut body = RollingBody::new(Vec3::new(0.0, 0.0, 1.0), 1.0).with_velocity(Vec3::new(2.0, 0.0, -1.0));
        integrate(&mut body, 0.1, &colliders, &transforms, &PhysicsConfig::default(), None);
        // rolling toward +x on a z-up floor spins about +y
        assert!((body.angular_velocity - Vec3::new(0.0, 2.0, 0.0)).length() < EPSILON, "got {:?}", body.angular_velocity);
    }

    #[test]
    fn test_rolling_without_slip_is_stable() {
        let mut body = RollingBody::new(Vec3::new(0.0, 0.0, 1.0), 1.0)
            .with_velocity(Vec3::new(2.0, 0.0, 0.0))
            .with_angular_velocity(Vec3::new(0.0, 2.0, 0.0));
        apply_rolling(&mut body, Vec3::ZERO);
        assert!((body.angular_velocity - Vec3::new(0.0, 2.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_config_builders_clamp() {
        let config = PhysicsConfig::default().with_overshoot(5.0).with_max_iterations(0);
        assert_eq!(config.overshoot, 2.0);
        assert_eq!(config.max_iterations, 1);
    }
}
