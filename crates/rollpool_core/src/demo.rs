//! Built-in parts and levels
//!
//! Procedural stand-ins for the art assets so the game modes (and their
//! tests) can run without any files on disk.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use rollpool_math::{Quat, Vec3};
use rollpool_physics::{MeshBuffer, MeshBufferError, PrimitiveType};

use crate::scene::{SceneFile, TransformEntry};

/// Triangulate a parametric patch over `[0,1]^2`
fn grid(nu: usize, nv: usize, f: impl Fn(f32, f32) -> Vec3) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(nu * nv * 6);
    for i in 0..nu {
        for j in 0..nv {
            let (u0, u1) = (i as f32 / nu as f32, (i + 1) as f32 / nu as f32);
            let (v0, v1) = (j as f32 / nv as f32, (j + 1) as f32 / nv as f32);
            let (a, b, c, d) = (f(u0, v0), f(u1, v0), f(u1, v1), f(u0, v1));
            out.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    out
}

/// Axis-aligned cube spanning [-1,1]^3
fn cube() -> Vec<Vec3> {
    let mut out = Vec::new();
    for axis in 0..3 {
        let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
        for side in [-1.0_f32, 1.0] {
            out.extend(grid(1, 1, |u, v| {
                Vec3::unit(axis) * side + Vec3::unit(b) * (2.0 * u - 1.0) + Vec3::unit(c) * (2.0 * v - 1.0)
            }));
        }
    }
    out
}

/// Part of a sphere surface: azimuth and polar angle ranges in radians
fn sphere_patch(center: Vec3, radius: f32, azimuth: (f32, f32), polar: (f32, f32), steps: (usize, usize)) -> Vec<Vec3> {
    grid(steps.0, steps.1, |u, v| {
        let az = azimuth.0 + (azimuth.1 - azimuth.0) * u;
        let po = polar.0 + (polar.1 - polar.0) * v;
        center + Vec3::new(po.sin() * az.cos(), po.sin() * az.sin(), po.cos()) * radius
    })
}

/// Mesh buffer with the stock roll-game parts
///
/// All parts are about 2 units across, matching the unit sphere that rolls
/// over them.
pub fn roll_parts() -> Result<MeshBuffer, MeshBufferError> {
    let mut builder = MeshBuffer::builder();
    let block = cube();
    builder.push("Block.Dark", PrimitiveType::TriangleList, &block)?;
    builder.push("Block.Light", PrimitiveType::TriangleList, &block)?;
    builder.push(
        "Sphere",
        PrimitiveType::TriangleList,
        &sphere_patch(Vec3::ZERO, 1.0, (0.0, TAU), (0.0, PI), (12, 8)),
    )?;
    builder.push(
        "Goal",
        PrimitiveType::TriangleList,
        &sphere_patch(Vec3::ZERO, 0.5, (0.0, TAU), (0.0, PI), (4, 2)),
    )?;
    // concave quarter pipe from the floor edge (y=1, z=-1) up to the wall top (y=-1, z=1)
    builder.push(
        "Round.Quarter",
        PrimitiveType::TriangleList,
        &grid(1, 6, |u, v| {
            let theta = PI + FRAC_PI_2 * v;
            Vec3::new(2.0 * u - 1.0, 1.0 + 2.0 * theta.cos(), 1.0 + 2.0 * theta.sin())
        }),
    )?;
    builder.push(
        "Round.Corner",
        PrimitiveType::TriangleList,
        &sphere_patch(Vec3::ONE, 2.0, (PI, 1.5 * PI), (FRAC_PI_2, PI), (4, 4)),
    )?;
    builder.push(
        "Round.Corner.Outer",
        PrimitiveType::TriangleList,
        &sphere_patch(-Vec3::ONE, 2.0, (0.0, FRAC_PI_2), (0.0, FRAC_PI_2), (4, 4)),
    )?;
    builder.push("Marker", PrimitiveType::Points, &[Vec3::ZERO])?;
    Ok(builder.build())
}

/// A small walled courtyard with a ramp, two goals and the start sphere
pub fn demo_roll_scene() -> SceneFile {
    let mut file = SceneFile::new("demo-roll");

    for i in -3..=3 {
        for j in -3..=3 {
            let mesh = if (i + j) % 2 == 0 { "Block.Dark" } else { "Block.Light" };
            file.place(mesh, [2.0 * i as f32, 2.0 * j as f32, -1.0]);
        }
    }
    for k in -3..=3 {
        let k = 2.0 * k as f32;
        file.place("Block.Light", [8.0, k, 1.0]);
        file.place("Block.Light", [-8.0, k, 1.0]);
        file.place("Block.Light", [k, 8.0, 1.0]);
    }

    // quarter pipe along the -y edge, rising from the floor at y = -6
    file.place("Round.Quarter", [0.0, -7.0, 1.0]);

    file.place("Goal", [4.0, 4.0, 1.0]);
    file.place("Goal", [-4.0, 4.0, 1.0]);
    file.place("Marker", [0.0, 0.0, 4.0]);
    file.place("Sphere", [0.0, 0.0, 1.0]);
    file
}

/// Pool table with a racked triangle of fifteen balls, six pockets and a camera
pub fn demo_pool_scene() -> SceneFile {
    let mut file = SceneFile::new("demo-pool");

    let spacing = 0.32;
    let mut index = 1;
    for row in 0..5 {
        for k in 0..=row {
            let x = 1.0 + row as f32 * spacing * 0.866;
            let y = (k as f32 - row as f32 * 0.5) * spacing;
            file.place(&format!("Ball.{}", index), [x, y, 0.15]);
            index += 1;
        }
    }

    for (n, (x, y)) in [(-3.0, -2.0), (0.0, -2.0), (3.0, -2.0), (-3.0, 2.0), (0.0, 2.0), (3.0, 2.0)]
        .into_iter()
        .enumerate()
    {
        file.place(&format!("Goal.{}", n), [x, y, 0.0]);
    }

    let camera = file.add_transform(
        TransformEntry::new("Camera", [0.0, -5.0, 6.0]).with_rotation(Quat::from_axis_angle(Vec3::X, 0.7)),
    );
    file.add_camera(camera, 60.0_f32.to_radians(), 0.05);
    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level_table::{LevelTable, MeshRole};

    #[test]
    fn test_roll_parts_cover_table() {
        let parts = roll_parts().unwrap();
        let table = LevelTable::roll_parts();
        for name in table.box_colliders.keys().chain(table.mesh_colliders.iter()) {
            let mesh = parts.lookup(name).expect(name);
            assert_eq!(mesh.primitive, PrimitiveType::TriangleList);
        }
        assert!(parts.lookup(&table.sphere_mesh).is_some());
        assert!(parts.lookup(&table.goal_mesh).is_some());
    }

    #[test]
    fn test_block_bounds() {
        let parts = roll_parts().unwrap();
        let block = parts.lookup("Block.Dark").unwrap();
        assert_eq!(block.count, 36);
        assert_eq!(block.min, -Vec3::ONE);
        assert_eq!(block.max, Vec3::ONE);
    }

    #[test]
    fn test_demo_roll_scene_has_one_sphere() {
        let file = demo_roll_scene();
        let table = LevelTable::roll_parts();
        let spheres = file.meshes.iter().filter(|m| table.classify(&m.mesh) == MeshRole::Sphere).count();
        assert_eq!(spheres, 1);
    }

    #[test]
    fn test_demo_pool_scene_balls() {
        let file = demo_pool_scene();
        let balls = file.meshes.iter().filter(|m| m.mesh.starts_with("Ball.")).count();
        assert_eq!(balls, 15);
        assert_eq!(file.cameras.len(), 1);
    }
}
