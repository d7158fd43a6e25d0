// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for every failure of the entropic forcing pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntropicError {
    /// Missing or malformed configuration option. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// The endpoint density could not be fitted (duplicate, collinear or
    /// too few endpoints).
    #[error("sampling degeneracy: {0}")]
    SamplingDegeneracy(String),

    /// The environment rejected the proposed next macrostate.
    #[error("invalid macrostate at tick {tick}: {state:?}")]
    InvalidMacrostate { tick: usize, state: Vec<f64> },

    /// An environment transition or validity function failed or broke
    /// its contract (wrong dimension, empty output).
    #[error("environment contract violation: {0}")]
    EnvironmentContract(String),

    /// Rejection sampling exceeded the configured retry budget.
    #[error("sampling exhausted: walk {walk} step {step} rejected {attempts} candidates")]
    SamplingExhausted {
        walk: usize,
        step: usize,
        attempts: u64,
    },

    /// Numerical error (NaN/Inf in the aggregated force).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Session used outside its initialize → run → shutdown order.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),
}

impl EntropicError {
    /// Whether this error halts the run because the agent left the
    /// feasible region (as opposed to a broken model or configuration).
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, EntropicError::InvalidMacrostate { .. })
    }
}

pub type EntropicResult<T> = Result<T, EntropicError>;
