//! Application systems
//!
//! Frame-stepping systems kept out of main.rs so they can be tested headlessly.

mod simulation;

pub use simulation::{SimulationResult, SimulationSystem, MAX_FRAME_DT};
