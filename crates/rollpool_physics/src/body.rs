//! Moving sphere state

use rollpool_math::{Quat, Vec3};

/// A sphere moved by the integrator
///
/// The owner (the roll-mode player, say) copies its state in, integrates,
/// and copies it back out. Nothing else mutates it during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollingBody {
    /// Center in world space
    pub position: Vec3,
    /// Linear velocity (units per second)
    pub velocity: Vec3,
    /// Angular velocity (axis scaled by radians per second)
    pub angular_velocity: Vec3,
    pub radius: f32,
}

impl RollingBody {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            radius,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Rotation accumulated over `dt` seconds of the current angular velocity
    pub fn spin(&self, dt: f32) -> Quat {
        let rate = self.angular_velocity.length();
        if rate == 0.0 || !rate.is_finite() {
            return Quat::IDENTITY;
        }
        Quat::from_axis_angle(self.angular_velocity, rate * dt)
    }
}
