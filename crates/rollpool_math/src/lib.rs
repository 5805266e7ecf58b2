//! 3D Mathematics Library
//!
//! Vector, rotation and affine matrix types shared by the rollpool crates.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Quat`] - unit quaternion rotation
//! - [`Mat4x3`] - column-major affine transform (local-to-world)

mod vec3;
mod quat;
pub mod mat4x3;

pub use vec3::Vec3;
pub use quat::Quat;
pub use mat4x3::Mat4x3;
