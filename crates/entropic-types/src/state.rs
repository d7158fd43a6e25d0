// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — State Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{EntropicError, EntropicResult};

/// D-dimensional observable agent state.
pub type Macrostate = Vec<f64>;

/// D-dimensional latent state of one simulated trajectory step.
pub type Microstate = Vec<f64>;

/// D-dimensional force vector.
pub type Force = Vec<f64>;

/// Constants every environment supplies to the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvConstants {
    /// State-space dimensionality D.
    pub dims: usize,
    /// Causal horizon of each sampled walk.
    pub tau: f64,
    /// Duration of one microstate step.
    pub timestep: f64,
    /// Causal path temperature.
    pub tc: f64,
    /// Reservoir temperature.
    pub tr: f64,
}

impl EnvConstants {
    /// Walk length K = floor(tau / timestep).
    pub fn walk_len(&self) -> usize {
        (self.tau / self.timestep).floor() as usize
    }

    /// Check the ranges the core relies on.
    pub fn validate(&self) -> EntropicResult<()> {
        if self.dims < 1 {
            return Err(EntropicError::EnvironmentContract(
                "dims must be >= 1".to_string(),
            ));
        }
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(EntropicError::EnvironmentContract(format!(
                "tau must be finite and > 0, got {}",
                self.tau
            )));
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(EntropicError::EnvironmentContract(format!(
                "timestep must be finite and > 0, got {}",
                self.timestep
            )));
        }
        if !self.tc.is_finite() {
            return Err(EntropicError::EnvironmentContract(format!(
                "tc must be finite, got {}",
                self.tc
            )));
        }
        if !(self.tr.is_finite() && self.tr > 0.0) {
            return Err(EntropicError::EnvironmentContract(format!(
                "tr must be finite and > 0, got {}",
                self.tr
            )));
        }
        Ok(())
    }
}

/// Control loop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    Running,
    TerminatedSuccess,
    TerminatedInvalidState,
    /// Halted by a fatal pipeline or environment error.
    TerminatedError,
}

impl LoopState {
    pub fn is_terminated(self) -> bool {
        !matches!(self, LoopState::Running)
    }
}

/// Log entry for one control tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// 1-based tick index.
    pub tick: usize,
    /// Aggregated causal entropic force applied this tick.
    pub force: Force,
    /// Macrostate proposed by the environment.
    pub macrostate: Macrostate,
    /// Whether the proposal passed the feasibility predicate.
    pub accepted: bool,
    /// Rejected microstate candidates summed over all walks.
    pub rejections: u64,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub state: LoopState,
    pub path: Vec<Macrostate>,
    pub ticks: Vec<TickRecord>,
}

impl RunReport {
    pub fn final_macrostate(&self) -> Option<&Macrostate> {
        self.path.last()
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn total_rejections(&self) -> u64 {
        self.ticks.iter().map(|t| t.rejections).sum()
    }
}
