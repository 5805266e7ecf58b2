//! Debug line list filled by sweeps
//!
//! Nothing in the physics crate draws; an overlay (or a test) reads the
//! segments back out.

use rollpool_math::Vec3;

use crate::shapes::Aabb;

/// RGBA color, 0..=255 per channel
pub type Rgba = [u8; 4];

pub const TESTED: Rgba = [0x88, 0x88, 0x88, 0xff];
pub const REJECTED: Rgba = [0x44, 0x44, 0x44, 0x88];
pub const HIT: Rgba = [0xff, 0x44, 0x44, 0xff];
pub const CONTACT: Rgba = [0xff, 0xff, 0x00, 0xff];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugLine {
    pub a: Vec3,
    pub b: Vec3,
    pub color: Rgba,
}

#[derive(Clone, Debug, Default)]
pub struct DebugLines {
    lines: Vec<DebugLine>,
}

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, a: Vec3, b: Vec3, color: Rgba) {
        self.lines.push(DebugLine { a, b, color });
    }

    pub fn triangle(&mut self, [a, b, c]: [Vec3; 3], color: Rgba) {
        self.line(a, b, color);
        self.line(b, c, color);
        self.line(c, a, color);
    }

    pub fn aabb(&mut self, aabb: &Aabb, color: Rgba) {
        for (a, b) in aabb.edges() {
            self.line(a, b, color);
        }
    }

    /// Small cross at the contact point plus an arrow along the normal
    pub fn contact(&mut self, point: Vec3, normal: Vec3) {
        const SIZE: f32 = 0.1;
        for axis in 0..3 {
            let d = Vec3::unit(axis) * SIZE;
            self.line(point - d, point + d, CONTACT);
        }
        self.line(point, point + normal * (SIZE * 5.0), CONTACT);
    }

    pub fn lines(&self) -> &[DebugLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
