// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Gaussian Drift Line
// ─────────────────────────────────────────────────────────────────────
//! Unbounded one-dimensional walk:
//!
//!   microstate:  x' = x + σ η,   η ~ N(0, 1),   f' = σ η
//!   macrostate:  X' = X + F dt
//!
//! Every finite state is feasible.

use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};
use serde::Deserialize;

use entropic_core::Environment;
use entropic_types::{
    EntropicError, EntropicResult, EnvConstants, Force, Macrostate, Microstate,
};

/// Parameters of [`GaussianDrift`].
///
/// Deserialized from `environment_params`; omitted fields keep their
/// defaults and unknown fields are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaussianDriftParams {
    pub start: f64,
    /// Standard deviation of each microstate increment.
    pub sigma: f64,
    pub tau: f64,
    pub timestep: f64,
    pub tc: f64,
    pub tr: f64,
}

impl Default for GaussianDriftParams {
    fn default() -> Self {
        Self {
            start: 0.0,
            sigma: 1.0,
            tau: 1.0,
            timestep: 0.1,
            tc: 1.0,
            tr: 1.0,
        }
    }
}

pub struct GaussianDrift {
    params: GaussianDriftParams,
}

impl GaussianDrift {
    pub fn new(params: GaussianDriftParams) -> EntropicResult<Self> {
        if !(params.sigma.is_finite() && params.sigma >= 0.0) {
            return Err(EntropicError::Config(format!(
                "gaussian_drift sigma must be finite and >= 0, got {}",
                params.sigma
            )));
        }
        if !params.start.is_finite() {
            return Err(EntropicError::Config(format!(
                "gaussian_drift start must be finite, got {}",
                params.start
            )));
        }
        Ok(Self { params })
    }

    /// Defaults: start 0, σ = 1, tau = 1, dt = 0.1, T_c = T_r = 1.
    pub fn default_params() -> Self {
        Self {
            params: GaussianDriftParams::default(),
        }
    }

    pub fn params(&self) -> &GaussianDriftParams {
        &self.params
    }
}

impl Environment for GaussianDrift {
    fn name(&self) -> &str {
        "gaussian_drift"
    }

    fn constants(&self) -> EnvConstants {
        EnvConstants {
            dims: 1,
            tau: self.params.tau,
            timestep: self.params.timestep,
            tc: self.params.tc,
            tr: self.params.tr,
        }
    }

    fn start(&self) -> Macrostate {
        vec![self.params.start]
    }

    fn step_microstate(
        &self,
        state: &[f64],
        _force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        let eta: f64 = StandardNormal.sample(rng);
        let kick = self.params.sigma * eta;
        Ok((vec![state[0] + kick], vec![kick]))
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        Ok(vec![state[0] + causal_force[0] * self.params.timestep])
    }

    fn valid(&self, _path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        Ok(candidate.iter().all(|x| x.is_finite()))
    }
}
