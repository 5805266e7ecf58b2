//! Swept-sphere physics for rollpool
//!
//! This crate moves a sphere through static level geometry without tunneling:
//! - Continuous collision tests (sphere vs box, sphere vs triangle, and the
//!   ray-vs-sphere / ray-vs-cylinder pieces they are built from)
//! - A collider registry over a transform arena and a shared mesh buffer
//! - A time-of-impact sweep that keeps the earliest contact
//! - A slide-and-resweep integrator with a rolling spin response

pub mod body;
pub mod collider;
pub mod collision;
pub mod debug;
pub mod integrator;
pub mod mesh;
pub mod shapes;
pub mod sweep;
pub mod transform;

// Re-export commonly used types
pub use body::RollingBody;
pub use collider::{BoxCollider, ColliderSet, MeshCollider};
pub use collision::{
    aabb_vs_aabb, ray_vs_cylinder_segment, ray_vs_sphere, swept_sphere_vs_box, swept_sphere_vs_triangle, Hit,
    TriangleFeatures,
};
pub use debug::{DebugLine, DebugLines};
pub use integrator::{apply_rolling, integrate, PhysicsConfig, StepReport};
pub use mesh::{Mesh, MeshBuffer, MeshBufferBuilder, MeshBufferError, PrimitiveType};
pub use shapes::Aabb;
pub use sweep::sweep_sphere;
pub use transform::{Transform, TransformArena, TransformKey};
