//! Game simulation system
//!
//! Manages the frame loop of a roll game:
//! - Delta time capping
//! - Controls and camera orbit → roll mode
//! - Per-frame physics reporting

use rollpool_core::{RollControls, RollMode, StepReport};
use rollpool_math::Vec3;

/// Longest frame the simulation will advance in one step
pub const MAX_FRAME_DT: f32 = 0.25;

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    /// Seconds actually simulated
    pub dt: f32,
    /// What the integrator did this frame
    pub report: StepReport,
    /// Debug line segments collected this frame (0 when collection is off)
    pub debug_lines: usize,
    /// Player position after the frame
    pub player_position: Vec3,
}

/// Drives a [`RollMode`] one frame at a time
pub struct SimulationSystem {
    mode: RollMode,
    frames: u64,
    elapsed: f64,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new(mode: RollMode) -> Self {
        Self {
            mode,
            frames: 0,
            elapsed: 0.0,
        }
    }

    pub fn mode(&self) -> &RollMode {
        &self.mode
    }

    pub fn mode_mut(&mut self) -> &mut RollMode {
        &mut self.mode
    }

    /// Frames simulated so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds simulated so far
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn set_controls(&mut self, controls: RollControls) {
        self.mode.controls = controls;
    }

    /// Run one simulation frame
    ///
    /// `raw_dt` is capped at [`MAX_FRAME_DT`] so a stall (first frame, a
    /// debugger pause) does not turn into one huge sweep.
    pub fn update(&mut self, raw_dt: f32) -> SimulationResult {
        let dt = raw_dt.clamp(0.0, MAX_FRAME_DT);
        if raw_dt > MAX_FRAME_DT {
            log::debug!("Frame of {:.3}s capped to {:.3}s", raw_dt, MAX_FRAME_DT);
        }

        let report = self.mode.update(dt);
        self.frames += 1;
        self.elapsed += f64::from(dt);

        if !report.converged {
            log::trace!("Frame {} ended at the iteration cap", self.frames);
        }

        SimulationResult {
            dt,
            report,
            debug_lines: self.mode.debug_lines().map_or(0, |d| d.len()),
            player_position: self.mode.level.player_position(),
        }
    }
}
