//! Integration tests for levels driving the physics
//!
//! These tests run whole game modes on the built-in content:
//! 1. Scene files survive a trip through RON and still load as levels
//! 2. The rolling player stays on and outside the level geometry
//! 3. Pool sessions keep every body on the table

use std::sync::Arc;

use rollpool_core::{
    demo_pool_scene, demo_roll_scene, encode_controls, roll_parts, DozerControls, LevelTable, PhysicsConfig,
    PoolLevel, PoolSession, PoolSettings, RollControls, RollLevel, RollMode, RollSettings, SceneFile,
};
use rollpool_math::Vec3;

const EPSILON: f32 = 0.01;

fn demo_mode() -> RollMode {
    let level = RollLevel::from_scene(
        &demo_roll_scene(),
        &LevelTable::roll_parts(),
        Arc::new(roll_parts().expect("stock parts should build")),
    )
    .expect("demo level should load");
    RollMode::new(level, RollSettings::default(), PhysicsConfig::default())
}

/// Distance from `p` to the closest point of any box collider
fn distance_to_boxes(mode: &RollMode, p: Vec3) -> f32 {
    mode.level
        .colliders
        .boxes
        .iter()
        .filter_map(|b| b.world_aabb(&mode.level.scene.transforms))
        .map(|aabb| (aabb.closest_point(p) - p).length())
        .fold(f32::INFINITY, f32::min)
}

// ==================== Scene Files ====================

#[test]
fn test_demo_level_ron_roundtrip() {
    let file = demo_roll_scene();
    let text = file.to_ron().expect("scene should serialize");
    let back = SceneFile::from_ron(&text).expect("scene should parse");
    assert_eq!(back, file);

    let parts = Arc::new(roll_parts().unwrap());
    let a = RollLevel::from_scene(&file, &LevelTable::roll_parts(), Arc::clone(&parts)).unwrap();
    let b = RollLevel::from_scene(&back, &LevelTable::roll_parts(), parts).unwrap();
    assert_eq!(a.colliders.boxes.len(), b.colliders.boxes.len());
    assert_eq!(a.colliders.meshes.len(), b.colliders.meshes.len());
    assert_eq!(a.goals.len(), 2);
}

#[test]
fn test_level_file_on_disk() {
    let path = std::env::temp_dir().join(format!("rollpool-level-{}.ron", std::process::id()));
    demo_roll_scene().save(&path).expect("scene should save");
    let level = RollLevel::load(&path, &LevelTable::roll_parts(), Arc::new(roll_parts().unwrap()));
    let _ = std::fs::remove_file(&path);
    assert!(level.is_ok(), "saved level failed to load: {:?}", level.err());
}

// ==================== Rolling ====================

#[test]
fn test_player_never_enters_blocks() {
    let mut mode = demo_mode();
    let script = [
        RollControls::FORWARD,
        RollControls::FORWARD | RollControls::RIGHT,
        RollControls::RIGHT,
        RollControls::BACKWARD | RollControls::LEFT,
    ];
    for controls in script {
        mode.controls = controls;
        for _ in 0..90 {
            mode.update(1.0 / 60.0);
            let p = mode.level.player_position();
            assert!(p.is_finite(), "player position went non-finite");
            let d = distance_to_boxes(&mode, p);
            assert!(d >= 1.0 - EPSILON, "player at {:?} is {} from a block", p, d);
        }
    }
}

#[test]
fn test_quarter_pipe_lifts_player() {
    let mut mode = demo_mode();
    mode.controls = RollControls::BACKWARD;
    let mut highest = 0.0_f32;
    for _ in 0..180 {
        mode.update(1.0 / 60.0);
        let p = mode.level.player_position();
        highest = highest.max(p.z);
        // the pipe's wall stands at y = -8
        if p.z < 2.0 {
            assert!(p.y > -7.0 - EPSILON, "player went through the pipe: {:?}", p);
        }
    }
    assert!(highest > 1.1, "player never climbed the pipe (max z {})", highest);
}

/// One seamless floor slab, 20 units square
fn slab_mode() -> RollMode {
    let mut file = SceneFile::new("slab");
    let floor = file.place("Block.Dark", [0.0, 0.0, -1.0]);
    file.transforms[floor].scale = [10.0, 10.0, 1.0];
    file.place("Sphere", [0.0, 0.0, 1.0]);
    let level = RollLevel::from_scene(&file, &LevelTable::roll_parts(), Arc::new(roll_parts().unwrap())).unwrap();
    RollMode::new(level, RollSettings::default(), PhysicsConfig::default())
}

#[test]
fn test_frame_rate_independent_path() {
    let mut coarse = slab_mode();
    let mut fine = slab_mode();
    coarse.controls = RollControls::RIGHT;
    fine.controls = RollControls::RIGHT;
    for _ in 0..15 {
        coarse.update(1.0 / 30.0);
        fine.update(1.0 / 120.0);
        fine.update(1.0 / 120.0);
        fine.update(1.0 / 120.0);
        fine.update(1.0 / 120.0);
    }
    let (a, b) = (coarse.level.player_position(), fine.level.player_position());
    // explicit steps differ by about half a step of velocity change
    assert!((a - b).length() < 0.2, "paths diverged: {:?} vs {:?}", a, b);
    assert!((a.z - 1.0).abs() < EPSILON && (b.z - 1.0).abs() < EPSILON);
}

#[test]
fn test_restart_after_play() {
    let mut mode = demo_mode();
    mode.controls = RollControls::LEFT;
    for _ in 0..60 {
        mode.update(1.0 / 60.0);
    }
    mode.restart();
    assert_eq!(mode.level.player_position(), Vec3::new(0.0, 0.0, 1.0));
}

// ==================== Pool ====================

#[test]
fn test_pool_session_keeps_bodies_on_table() {
    let level = PoolLevel::from_scene(&demo_pool_scene(), PoolSettings::default()).unwrap();
    let mut session = PoolSession::new(level).unwrap();

    session.on_open(10);
    session.on_open(11);
    let mut left = encode_controls(DozerControls::LEFT_FORWARD | DozerControls::RIGHT_FORWARD).to_vec();
    let mut right = encode_controls(DozerControls::LEFT_BACKWARD | DozerControls::RIGHT_FORWARD).to_vec();
    session.on_recv(10, &mut left).unwrap();
    session.on_recv(11, &mut right).unwrap();
    session.set_local_controls(DozerControls::LEFT_FORWARD | DozerControls::RIGHT_FORWARD);

    for _ in 0..300 {
        session.update(1.0 / 60.0);
    }

    let level = &session.level;
    let radius = level.settings.body_radius;
    let bodies = level
        .balls
        .iter()
        .map(|b| b.transform)
        .chain(level.dozers.values().map(|d| d.transform));
    for transform in bodies {
        let p = level.position_of(transform).unwrap();
        assert!(p.x >= level.level_min[0] + radius - EPSILON && p.x <= level.level_max[0] - radius + EPSILON);
        assert!(p.y >= level.level_min[1] + radius - EPSILON && p.y <= level.level_max[1] - radius + EPSILON);
    }

    // the local dozer drove straight into the rack
    assert!(level.balls.iter().any(|b| b.last_to_touch.is_some()));
}
