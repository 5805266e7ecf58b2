//! Roll game mode: steer a sphere around a level with an orbiting camera

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use rollpool_math::{Quat, Vec3};
use rollpool_physics::{integrate, DebugLines, PhysicsConfig, RollingBody, StepReport};

use crate::roll_level::RollLevel;

bitflags! {
    /// Held movement keys
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RollControls: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const FORWARD = 1 << 2;
        const BACKWARD = 1 << 3;
    }
}

/// Largest camera elevation either way
pub const MAX_ELEVATION: f32 = 85.0 * PI / 180.0;

/// Tunables for the roll mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollSettings {
    /// Speed the player is pushed toward while a key is held
    pub shove_speed: f32,
    /// Seconds for the velocity to close half the gap to the shove
    pub velocity_half_life: f32,
    pub camera_distance: f32,
    /// Seconds per full goal turn
    pub goal_spin_period: f32,
    pub sphere_radius: f32,
}

impl Default for RollSettings {
    fn default() -> Self {
        Self {
            shove_speed: 10.0,
            velocity_half_life: 0.25,
            camera_distance: 10.0,
            goal_spin_period: 10.0,
            sphere_radius: 1.0,
        }
    }
}

/// Wrap an angle into `(-PI, PI]`
fn wrap_angle(angle: f32) -> f32 {
    PI - (PI - angle).rem_euclid(TAU)
}

/// A running roll game
///
/// Holds the level as loaded so [`RollMode::restart`] can put everything
/// back, and the live copy that frames advance.
pub struct RollMode {
    pristine: RollLevel,
    pub level: RollLevel,
    pub controls: RollControls,
    pub settings: RollSettings,
    pub physics: PhysicsConfig,
    debug: Option<DebugLines>,
}

impl RollMode {
    pub fn new(level: RollLevel, settings: RollSettings, physics: PhysicsConfig) -> Self {
        let mut mode = Self {
            level: level.clone(),
            pristine: level,
            controls: RollControls::empty(),
            settings,
            physics,
            debug: None,
        };
        mode.place_camera();
        mode
    }

    /// Collect the sweep's debug lines on every update
    pub fn with_debug_lines(mut self, enabled: bool) -> Self {
        self.debug = enabled.then(DebugLines::new);
        self
    }

    /// Lines drawn by the last update, if collection is on
    pub fn debug_lines(&self) -> Option<&DebugLines> {
        self.debug.as_ref()
    }

    /// Drag the camera around the player (radians)
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        let player = &mut self.level.player;
        player.view_azimuth = wrap_angle(player.view_azimuth + d_azimuth);
        player.view_elevation = (player.view_elevation + d_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Put the live level back the way it was loaded
    pub fn restart(&mut self) {
        log::info!("Restarting level '{}'", self.pristine.scene.name);
        self.level = self.pristine.clone();
        self.place_camera();
    }

    /// Direction the held keys push in, in world space and scaled to the shove speed
    fn shove(&self) -> Vec3 {
        let mut local = Vec3::ZERO;
        if self.controls.contains(RollControls::LEFT) {
            local.x -= 1.0;
        }
        if self.controls.contains(RollControls::RIGHT) {
            local.x += 1.0;
        }
        if self.controls.contains(RollControls::FORWARD) {
            local.y += 1.0;
        }
        if self.controls.contains(RollControls::BACKWARD) {
            local.y -= 1.0;
        }
        let local = local.normalized();

        let (sa, ca) = self.level.player.view_azimuth.sin_cos();
        let world = Vec3::new(ca, sa, 0.0) * local.x + Vec3::new(-sa, ca, 0.0) * local.y;
        world * self.settings.shove_speed
    }

    /// Advance the game by `elapsed` seconds
    pub fn update(&mut self, elapsed: f32) -> StepReport {
        let shove = self.shove();
        let keep = if self.settings.velocity_half_life > 0.0 {
            0.5_f32.powf(elapsed / self.settings.velocity_half_life)
        } else {
            0.0
        };
        let player = &mut self.level.player;
        player.velocity = shove.lerp(player.velocity, keep);

        let mut body = RollingBody::new(self.level.player_position(), self.settings.sphere_radius)
            .with_velocity(self.level.player.velocity)
            .with_angular_velocity(self.level.player.rotational_velocity);

        if let Some(lines) = self.debug.as_mut() {
            lines.clear();
        }
        let report = integrate(
            &mut body,
            elapsed,
            &self.level.colliders,
            &self.level.scene.transforms,
            &self.physics,
            self.debug.as_mut(),
        );

        let player = &mut self.level.player;
        player.velocity = body.velocity;
        player.rotational_velocity = body.angular_velocity;
        // the body lives in world space; the transform may sit under a parent
        let transforms = &mut self.level.scene.transforms;
        transforms.set_world_position(player.transform, body.position);
        transforms.rotate_world(player.transform, body.spin(elapsed));

        self.spin_goals(elapsed);
        self.place_camera();

        log::trace!(
            "Player at {:?} after {} sweeps ({} contacts)",
            body.position,
            report.iterations,
            report.collisions
        );
        report
    }

    fn spin_goals(&mut self, elapsed: f32) {
        if self.settings.goal_spin_period <= 0.0 {
            return;
        }
        let axis = Vec3::ONE.normalized();
        for goal in &mut self.level.goals {
            goal.spin_acc = (goal.spin_acc + elapsed / self.settings.goal_spin_period).fract();
            if let Some(t) = self.level.scene.transforms.get_mut(goal.transform) {
                t.rotation = Quat::from_axis_angle(axis, goal.spin_acc * TAU);
            }
        }
    }

    /// Orientation of the camera for the current view angles
    pub fn camera_rotation(&self) -> Quat {
        let player = &self.level.player;
        Quat::from_axis_angle(Vec3::Z, player.view_azimuth)
            * Quat::from_axis_angle(Vec3::X, FRAC_PI_2 - player.view_elevation)
    }

    /// Keep the camera `camera_distance` behind the player along the view direction
    fn place_camera(&mut self) {
        let rotation = self.camera_rotation();
        let forward = rotation.rotate(Vec3::new(0.0, 0.0, -1.0));
        let position = self.level.player_position() - forward * self.settings.camera_distance;
        if let Some(t) = self.level.scene.transforms.get_mut(self.level.camera) {
            t.position = position;
            t.rotation = rotation;
        }
    }
}
