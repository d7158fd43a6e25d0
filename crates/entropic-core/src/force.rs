// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Causal Entropic Force
// ─────────────────────────────────────────────────────────────────────
//! Aggregation of per-walk forces into the control force:
//!
//!   F = 2·T_c · Σ_i w_i f_i / (T_r · N)
//!
//! and the per-tick pipeline sample → weight → aggregate.

use entropic_types::{AgentConfig, EntropicError, EntropicResult, EnvConstants, Force};

use crate::density::DensityEstimator;
use crate::environment::Environment;
use crate::sampler::PathSampler;

/// Combine first-step forces with their entropy weights.
///
/// Pure and linear in `weights`; all-zero weights give an exact zero force.
pub fn aggregate_force(
    forces: &[Force],
    weights: &[f64],
    dims: usize,
    tc: f64,
    tr: f64,
) -> EntropicResult<Force> {
    if forces.len() != weights.len() {
        return Err(EntropicError::EnvironmentContract(format!(
            "{} forces but {} weights",
            forces.len(),
            weights.len()
        )));
    }
    if forces.is_empty() {
        return Err(EntropicError::EnvironmentContract(
            "cannot aggregate an empty force set".to_string(),
        ));
    }

    let mut total = vec![0.0; dims];
    for (i, (f, &w)) in forces.iter().zip(weights).enumerate() {
        if f.len() != dims {
            return Err(EntropicError::EnvironmentContract(format!(
                "force {i} has {} dims, expected {dims}",
                f.len()
            )));
        }
        for (t, fk) in total.iter_mut().zip(f) {
            *t += w * fk;
        }
    }

    let scale = 2.0 * tc / (tr * forces.len() as f64);
    for t in total.iter_mut() {
        *t *= scale;
    }
    Ok(total)
}

/// Result of one force computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceEstimate {
    pub force: Force,
    /// Entropy weight of each walk (empty when K = 0).
    pub weights: Vec<f64>,
    /// Candidates rejected across all walks.
    pub rejections: u64,
}

/// The "compute force" operation: sampler, density weighting, aggregation.
#[derive(Debug, Clone)]
pub struct ForceEstimator {
    sampler: PathSampler,
    density: DensityEstimator,
}

impl ForceEstimator {
    pub fn new(sampler: PathSampler, density: DensityEstimator) -> Self {
        Self { sampler, density }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            PathSampler::from_config(config),
            DensityEstimator::new(config.bandwidth, config.weighting),
        )
    }

    pub fn sampler(&self) -> &PathSampler {
        &self.sampler
    }

    pub fn density(&self) -> &DensityEstimator {
        &self.density
    }

    /// Causal entropic force at `macrostate`, sampling walks from `seed`.
    ///
    /// Zero-length walks (K = 0) carry no information about the future,
    /// so the force is the zero vector.
    pub fn compute(
        &self,
        env: &dyn Environment,
        macrostate: &[f64],
        seed: u64,
    ) -> EntropicResult<ForceEstimate> {
        let EnvConstants { dims, tc, tr, .. } = env.constants();
        let paths = self.sampler.sample(env, macrostate, seed)?;
        let rejections = paths.total_rejections();

        if paths.steps == 0 {
            log::warn!(
                "{}: walk length is zero (tau < timestep), applying zero force",
                env.name()
            );
            return Ok(ForceEstimate {
                force: vec![0.0; dims],
                weights: Vec::new(),
                rejections,
            });
        }

        let weights = self.density.weights(&paths.endpoints())?;
        let force = aggregate_force(&paths.first_forces(), &weights, dims, tc, tr)?;
        Ok(ForceEstimate {
            force,
            weights,
            rejections,
        })
    }
}
