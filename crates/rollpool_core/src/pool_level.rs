//! Pool-dozer levels
//!
//! A pool table with fifteen numbered balls, goal pockets, and any number
//! of tread-driven dozers that shove the balls around. There is no swept
//! collision here: after every move, bodies are relaxed apart on the table
//! plane for a fixed number of passes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use rollpool_math::{Quat, Vec3};
use rollpool_physics::{Transform, TransformKey};

use crate::controls::DozerControls;
use crate::level_error::LevelError;
use crate::scene::{Scene, SceneFile};

new_key_type! {
    /// Handle to a dozer in a [`PoolLevel`]
    pub struct DozerKey;
}

/// Distance between the treads of a dozer
const TREAD_SPACING: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Solid,
    Diamond,
}

impl Team {
    /// Mesh drawn for a dozer on this team
    pub fn dozer_mesh(self) -> &'static str {
        match self {
            Team::Solid => "Dozer.Solid",
            Team::Diamond => "Dozer.Diamond",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub transform: TransformKey,
    /// 1..=15
    pub index: u32,
    /// Team of the last dozer that shoved this ball
    pub last_to_touch: Option<Team>,
}

impl Ball {
    pub fn is_solid(&self) -> bool {
        self.index < 8
    }

    pub fn is_diamond(&self) -> bool {
        self.index > 8
    }

    pub fn is_eight(&self) -> bool {
        self.index == 8
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dozer {
    pub transform: TransformKey,
    pub name: String,
    pub team: Team,
    /// Current tread speeds, ramping toward the control targets
    pub left_tread: f32,
    pub right_tread: f32,
    pub controls: DozerControls,
}

/// Tunables for the pool game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// How fast tread speeds approach their targets (per second)
    pub tread_acceleration: f32,
    /// Relaxation passes per update
    pub separation_iterations: u32,
    /// Radius of balls and dozers on the table plane
    pub body_radius: f32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            tread_acceleration: 10.0,
            separation_iterations: 10,
            body_radius: 0.15,
        }
    }
}

/// Move `value` toward `target` by at most `step`
fn approach(value: f32, target: f32, step: f32) -> f32 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

/// Push `a` and `b` apart on the xy plane until they are `radius` apart
///
/// `mix` is the share of the correction applied to `b`. Returns true if
/// the two were overlapping. Coincident points are left alone.
fn push_apart(a: &mut Vec3, b: &mut Vec3, radius: f32, mix: f32) -> bool {
    let ab = Vec3::new(b.x - a.x, b.y - a.y, 0.0);
    let len2 = ab.length_squared();
    if len2 >= radius * radius || len2 == 0.0 {
        return false;
    }
    let len = len2.sqrt();
    let dir = ab / len;
    *a -= dir * ((1.0 - mix) * (radius - len));
    *b += dir * (mix * (radius - len));
    true
}

#[derive(Clone, Debug)]
pub struct PoolLevel {
    pub scene: Scene,
    pub level_min: [f32; 2],
    pub level_max: [f32; 2],
    /// Pocket locations on the table plane
    pub goals: Vec<[f32; 2]>,
    pub balls: Vec<Ball>,
    pub dozers: SlotMap<DozerKey, Dozer>,
    pub settings: PoolSettings,
}

impl PoolLevel {
    /// Build a level from a scene: `Ball.N` meshes become balls and `Goal.*` meshes pockets
    pub fn from_scene(file: &SceneFile, settings: PoolSettings) -> Result<Self, LevelError> {
        let level = file.name.clone();
        let mut balls = Vec::new();
        let mut goals = Vec::new();

        let scene = Scene::instantiate(file, |scene, key, name| {
            if let Some(number) = name.strip_prefix("Ball.") {
                let index = number
                    .parse::<u32>()
                    .ok()
                    .filter(|i| (1..=15).contains(i))
                    .ok_or_else(|| LevelError::BadBallIndex {
                        level: level.clone(),
                        mesh: name.to_string(),
                    })?;
                balls.push(Ball {
                    transform: key,
                    index,
                    last_to_touch: None,
                });
            } else if name.starts_with("Goal.") {
                if let Some(p) = scene.transforms.world_position(key) {
                    goals.push([p.x, p.y]);
                }
            }
            Ok::<(), LevelError>(())
        })?;

        log::info!("Pool level '{}' has {} balls and {} goals", level, balls.len(), goals.len());

        Ok(Self {
            scene,
            level_min: [-3.0, -2.0],
            level_max: [3.0, 2.0],
            goals,
            balls,
            dozers: SlotMap::with_key(),
            settings,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P, settings: PoolSettings) -> Result<Self, LevelError> {
        let file = SceneFile::load(path)?;
        Self::from_scene(&file, settings)
    }

    /// Add a dozer with its own transform and drawable
    pub fn add_dozer(&mut self, name: &str, team: Team) -> DozerKey {
        let transform = self.scene.add_drawable(Transform::named(name, Vec3::ZERO), team.dozer_mesh());
        log::debug!("Adding dozer '{}' to team {:?}", name, team);
        self.dozers.insert(Dozer {
            transform,
            name: name.to_string(),
            team,
            left_tread: 0.0,
            right_tread: 0.0,
            controls: DozerControls::empty(),
        })
    }

    /// Remove a dozer along with its transform and drawable
    pub fn remove_dozer(&mut self, key: DozerKey) -> Option<Dozer> {
        let dozer = self.dozers.remove(key)?;
        self.scene.remove_transform(dozer.transform);
        log::debug!("Removed dozer '{}'", dozer.name);
        Some(dozer)
    }

    /// Add a dozer to the smaller team (ties go to Diamond) at the table center
    pub fn spawn_dozer(&mut self, name: &str) -> DozerKey {
        let solid = self.dozers.values().filter(|d| d.team == Team::Solid).count();
        let diamond = self.dozers.len() - solid;
        let team = if solid < diamond { Team::Solid } else { Team::Diamond };
        self.add_dozer(name, team)
    }

    pub fn dozer(&self, key: DozerKey) -> Option<&Dozer> {
        self.dozers.get(key)
    }

    pub fn dozer_mut(&mut self, key: DozerKey) -> Option<&mut Dozer> {
        self.dozers.get_mut(key)
    }

    /// World-space position of a transform in this level
    pub fn position_of(&self, transform: TransformKey) -> Option<Vec3> {
        self.scene.transforms.world_position(transform)
    }

    fn keep_in_level(&self, p: &mut Vec3, radius: f32) {
        p.x = p.x.max(self.level_min[0] + radius).min(self.level_max[0] - radius);
        p.y = p.y.max(self.level_min[1] + radius).min(self.level_max[1] - radius);
    }

    /// Advance the game by `elapsed` seconds
    pub fn update(&mut self, elapsed: f32) {
        let step = self.settings.tread_acceleration * elapsed;
        for dozer in self.dozers.values_mut() {
            let (left_target, right_target) = dozer.controls.tread_targets();
            dozer.left_tread = approach(dozer.left_tread, left_target, step);
            dozer.right_tread = approach(dozer.right_tread, right_target, step);

            let Some(t) = self.scene.transforms.get_mut(dozer.transform) else {
                continue;
            };
            let angle = t.rotation.angle_about_z();
            let speed = elapsed * 0.5 * (dozer.left_tread + dozer.right_tread);
            let spin = elapsed * (dozer.right_tread - dozer.left_tread) / TREAD_SPACING;
            t.position += Vec3::new(angle.cos(), angle.sin(), 0.0) * speed;
            t.rotation = Quat::from_axis_angle(Vec3::Z, angle + spin);
        }

        self.separate();
    }

    /// Relax dozers apart, then balls apart and away from dozers
    fn separate(&mut self) {
        let radius = self.settings.body_radius;
        let push = 2.0 * radius;

        let dozer_keys: Vec<DozerKey> = self.dozers.keys().collect();
        let mut dozer_pos: Vec<Vec3> = dozer_keys
            .iter()
            .map(|&k| self.position_of(self.dozers[k].transform).unwrap_or(Vec3::ZERO))
            .collect();
        let ball_start: Vec<Vec3> = self
            .balls
            .iter()
            .map(|b| self.position_of(b.transform).unwrap_or(Vec3::ZERO))
            .collect();
        let mut ball_pos = ball_start.clone();
        let mut touched: Vec<Option<Team>> = vec![None; self.balls.len()];

        for _ in 0..self.settings.separation_iterations {
            for i in 0..dozer_pos.len() {
                let (earlier, rest) = dozer_pos.split_at_mut(i);
                for other in earlier.iter_mut() {
                    push_apart(&mut rest[0], other, push, 0.5);
                }
                self.keep_in_level(&mut rest[0], radius);
            }
        }

        for _ in 0..self.settings.separation_iterations {
            for i in 0..ball_pos.len() {
                let (earlier, rest) = ball_pos.split_at_mut(i);
                for other in earlier.iter_mut() {
                    push_apart(&mut rest[0], other, push, 0.5);
                }
                for (d, dozer) in dozer_pos.iter_mut().enumerate() {
                    if push_apart(dozer, &mut rest[0], push, 1.0) {
                        touched[i] = Some(self.dozers[dozer_keys[d]].team);
                    }
                }
                self.keep_in_level(&mut rest[0], radius);
            }
        }

        // later pushes can move an already clamped body back off the table
        for p in dozer_pos.iter_mut().chain(ball_pos.iter_mut()) {
            self.keep_in_level(p, radius);
        }

        let transforms = &mut self.scene.transforms;
        for (key, p) in dozer_keys.iter().zip(&dozer_pos) {
            transforms.set_world_position(self.dozers[*key].transform, *p);
        }

        for (i, ball) in self.balls.iter_mut().enumerate() {
            if let Some(team) = touched[i] {
                ball.last_to_touch = Some(team);
            }
            if !transforms.set_world_position(ball.transform, ball_pos[i]) {
                continue;
            }
            let delta = ball_pos[i] - ball_start[i];
            let len = delta.length();
            if len != 0.0 {
                let axis = Vec3::new(-delta.y, delta.x, 0.0);
                transforms.rotate_world(ball.transform, Quat::from_axis_angle(axis, len / radius));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_pool_scene;
    use crate::scene::{MeshInstance, TransformEntry};

    const EPSILON: f32 = 0.001;

    fn empty_table() -> PoolLevel {
        PoolLevel::from_scene(&SceneFile::new("empty"), PoolSettings::default()).unwrap()
    }

    fn place(level: &mut PoolLevel, transform: TransformKey, x: f32, y: f32) {
        level.scene.transforms.get_mut(transform).unwrap().position = Vec3::new(x, y, 0.0);
    }

    #[test]
    fn test_demo_level_contents() {
        let level = PoolLevel::from_scene(&demo_pool_scene(), PoolSettings::default()).unwrap();
        assert_eq!(level.balls.len(), 15);
        assert_eq!(level.goals.len(), 6);
        assert!(level.goals.contains(&[3.0, 2.0]));
        assert_eq!(level.balls.iter().filter(|b| b.is_solid()).count(), 7);
        assert_eq!(level.balls.iter().filter(|b| b.is_diamond()).count(), 7);
        assert_eq!(level.balls.iter().filter(|b| b.is_eight()).count(), 1);
    }

    #[test]
    fn test_bad_ball_index() {
        for name in ["Ball.0", "Ball.16", "Ball.x"] {
            let mut file = SceneFile::new("bad");
            file.place(name, [0.0, 0.0, 0.0]);
            let err = PoolLevel::from_scene(&file, PoolSettings::default()).unwrap_err();
            assert!(matches!(err, LevelError::BadBallIndex { .. }), "{} accepted", name);
        }
    }

    #[test]
    fn test_add_and_remove_dozer() {
        let mut level = empty_table();
        let key = level.add_dozer("Local", Team::Solid);
        assert_eq!(level.scene.drawables.len(), 1);
        assert_eq!(level.scene.drawables[0].mesh, "Dozer.Solid");
        assert_eq!(level.scene.transforms.len(), 1);

        let dozer = level.remove_dozer(key).unwrap();
        assert_eq!(dozer.name, "Local");
        assert!(level.scene.drawables.is_empty());
        assert!(level.scene.transforms.is_empty());
        assert!(level.dozers.is_empty());
        assert!(level.remove_dozer(key).is_none());
    }

    #[test]
    fn test_spawn_balances_teams() {
        let mut level = empty_table();
        let teams: Vec<Team> = (0..4)
            .map(|i| {
                let key = level.spawn_dozer(&format!("[{}]", i));
                level.dozers[key].team
            })
            .collect();
        assert_eq!(teams, vec![Team::Diamond, Team::Solid, Team::Diamond, Team::Solid]);
    }

    #[test]
    fn test_drive_straight() {
        let mut level = empty_table();
        let key = level.add_dozer("d", Team::Solid);
        level.dozers[key].controls = DozerControls::LEFT_FORWARD | DozerControls::RIGHT_FORWARD;
        for _ in 0..100 {
            level.update(0.01);
        }
        let dozer = &level.dozers[key];
        assert!((dozer.left_tread - 1.0).abs() < EPSILON);
        let p = level.position_of(dozer.transform).unwrap();
        // 0.1 s of ramp-up covers half the distance of full speed
        assert!((p.x - 0.95).abs() < 0.01, "dozer at {:?}", p);
        assert!(p.y.abs() < EPSILON);
    }

    #[test]
    fn test_spin_in_place() {
        let mut level = empty_table();
        let key = level.add_dozer("d", Team::Solid);
        level.dozers[key].controls = DozerControls::LEFT_BACKWARD | DozerControls::RIGHT_FORWARD;
        for _ in 0..10 {
            level.update(0.01);
        }
        let t = level.scene.transforms.get(level.dozers[key].transform).unwrap();
        assert!(t.position.length() < EPSILON);
        assert!(t.rotation.angle_about_z() > 0.0);
    }

    #[test]
    fn test_dozers_pushed_apart() {
        let mut level = empty_table();
        let a = level.add_dozer("a", Team::Solid);
        let b = level.add_dozer("b", Team::Diamond);
        let (ta, tb) = (level.dozers[a].transform, level.dozers[b].transform);
        place(&mut level, ta, 0.0, 0.0);
        place(&mut level, tb, 0.1, 0.0);
        level.update(0.0);
        let (pa, pb) = (level.position_of(ta).unwrap(), level.position_of(tb).unwrap());
        assert!(((pb - pa).length() - 0.3).abs() < EPSILON);
        assert!((pa.x + pb.x - 0.1).abs() < EPSILON, "split was uneven: {:?} {:?}", pa, pb);
    }

    #[test]
    fn test_dozer_shoves_ball() {
        let mut file = SceneFile::new("one ball");
        file.place("Ball.3", [0.1, 0.0, 0.0]);
        let mut level = PoolLevel::from_scene(&file, PoolSettings::default()).unwrap();
        let key = level.add_dozer("d", Team::Diamond);

        level.update(0.0);
        let dozer_p = level.position_of(level.dozers[key].transform).unwrap();
        let ball = &level.balls[0];
        let ball_p = level.position_of(ball.transform).unwrap();
        assert!(dozer_p.length() < EPSILON);
        assert!((ball_p.x - 0.3).abs() < EPSILON);
        assert_eq!(ball.last_to_touch, Some(Team::Diamond));
        let t = level.scene.transforms.get(ball.transform).unwrap();
        assert!(t.rotation != Quat::IDENTITY);
    }

    #[test]
    fn test_parented_ball_and_goal_use_world_positions() {
        let mut file = SceneFile::new("racked");
        let rack = file.add_transform(TransformEntry::new("Rack", [1.0, 0.5, 0.0]));
        let ball = file.add_transform(TransformEntry::new("Ball.7", [0.1, 0.0, 0.15]).with_parent(rack));
        file.meshes.push(MeshInstance {
            transform: ball,
            mesh: "Ball.7".to_string(),
        });
        let goal = file.add_transform(TransformEntry::new("Goal.0", [2.0, 1.5, 0.0]).with_parent(rack));
        file.meshes.push(MeshInstance {
            transform: goal,
            mesh: "Goal.0".to_string(),
        });

        let mut level = PoolLevel::from_scene(&file, PoolSettings::default()).unwrap();
        assert_eq!(level.goals, vec![[3.0, 2.0]]);

        // nothing touches the ball, so it stays where the file put it
        let start = level.position_of(level.balls[0].transform).unwrap();
        assert!((start - Vec3::new(1.1, 0.5, 0.15)).length() < EPSILON);
        level.update(1.0 / 60.0);
        let p = level.position_of(level.balls[0].transform).unwrap();
        assert!((p - start).length() < EPSILON, "ball drifted to {:?}", p);
    }

    #[test]
    fn test_kept_in_level() {
        let mut level = empty_table();
        let key = level.add_dozer("d", Team::Solid);
        let t = level.dozers[key].transform;
        place(&mut level, t, 5.0, -5.0);
        level.update(0.0);
        let p = level.position_of(t).unwrap();
        assert!((p.x - 2.85).abs() < EPSILON);
        assert!((p.y + 1.85).abs() < EPSILON);
    }

    #[test]
    fn test_push_apart_is_symmetric() {
        let mut a = Vec3::new(0.0, 0.0, 0.0);
        let mut b = Vec3::new(0.0, 0.2, 0.0);
        assert!(push_apart(&mut a, &mut b, 0.3, 0.5));
        assert!((a.y + 0.05).abs() < EPSILON);
        assert!((b.y - 0.25).abs() < EPSILON);

        let mut far = Vec3::new(1.0, 0.0, 0.0);
        assert!(!push_apart(&mut a, &mut far, 0.3, 0.5));
        assert_eq!(far, Vec3::new(1.0, 0.0, 0.0));
    }
}
