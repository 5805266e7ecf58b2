//! rollpool application: configuration and frame-stepping systems

pub mod config;
pub mod systems;
