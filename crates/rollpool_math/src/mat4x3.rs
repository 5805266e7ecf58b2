//! Affine 4x3 matrix (column-major)
//!
//! The first three columns are the images of the local x, y and z axes; the
//! fourth column is the translation. This is exactly the local-to-world data
//! colliders need, without the unused projective row.

use serde::{Serialize, Deserialize};
use crate::{Quat, Vec3};

/// Column-major affine transform
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mat4x3 {
    pub cols: [Vec3; 4],
}

impl Default for Mat4x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4x3 {
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ZERO],
    };

    #[inline]
    pub const fn from_cols(x: Vec3, y: Vec3, z: Vec3, translation: Vec3) -> Self {
        Self { cols: [x, y, z, translation] }
    }

    /// Translate * rotate * scale
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let [rx, ry, rz] = rotation.to_columns();
        Self::from_cols(rx * scale.x, ry * scale.y, rz * scale.z, translation)
    }

    /// Inverse of [`from_trs`](Self::from_trs): un-scale * un-rotate * un-translate
    ///
    /// A zero scale component inverts to zero rather than infinity.
    pub fn from_inverse_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let inv = |s: f32| if s == 0.0 { 0.0 } else { 1.0 / s };
        let inv_scale = Vec3::new(inv(scale.x), inv(scale.y), inv(scale.z));
        let [rx, ry, rz] = rotation.inverse().to_columns();
        let linear = Self::from_cols(
            rx.component_mul(inv_scale),
            ry.component_mul(inv_scale),
            rz.component_mul(inv_scale),
            Vec3::ZERO,
        );
        let t = linear.transform_direction(-translation);
        Self::from_cols(linear.cols[0], linear.cols[1], linear.cols[2], t)
    }

    /// Translation column
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3]
    }

    /// Apply the linear part only (directions ignore translation)
    #[inline]
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.cols[0] * d.x + self.cols[1] * d.y + self.cols[2] * d.z
    }

    /// Apply the full affine transform to a point
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_direction(p) + self.cols[3]
    }

    /// World-space bounds of a transformed local box
    ///
    /// Uses the center/extent form: the world half-extent along each axis is
    /// the sum of the absolute, scaled local axes.
    pub fn transform_aabb(&self, min: Vec3, max: Vec3) -> (Vec3, Vec3) {
        let center = self.transform_point((min + max) * 0.5);
        let half = (max - min) * 0.5;
        let extent = self.cols[0].abs() * half.x
            + self.cols[1].abs() * half.y
            + self.cols[2].abs() * half.z;
        (center - extent, center + extent)
    }
}

impl std::ops::Mul for Mat4x3 {
    type Output = Self;
    /// `a * b` applies `b` first, then `a`
    fn mul(self, b: Self) -> Self {
        Self::from_cols(
            self.transform_direction(b.cols[0]),
            self.transform_direction(b.cols[1]),
            self.transform_direction(b.cols[2]),
            self.transform_point(b.cols[3]),
        )
    }
}
