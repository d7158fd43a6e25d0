// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Particle in a Box
// ─────────────────────────────────────────────────────────────────────
//! Disk of radius r in a closed W × H box, driven by thermal kicks:
//!
//!   microstate:  f' ~ N(0, σ_f² I),   x' = x + f' dt / m
//!   macrostate:  X' = X + F dt / m
//!
//! A state is feasible while the disk lies inside the walls. The box is
//! convex, so checking the candidate alone also covers the segment from
//! the previous state.

use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};
use serde::Deserialize;

use entropic_core::Environment;
use entropic_types::{
    EntropicError, EntropicResult, EnvConstants, Force, Macrostate, Microstate,
};

pub const BOX_WIDTH: f64 = 400.0;
pub const BOX_HEIGHT: f64 = 80.0;

/// Parameters of [`ParticleBox`].
///
/// Deserialized from `environment_params`; omitted fields keep their
/// defaults and unknown fields are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleBoxParams {
    pub width: f64,
    pub height: f64,
    /// Disk radius kept clear of the walls.
    pub radius: f64,
    pub mass: f64,
    /// Standard deviation of each thermal kick component.
    pub force_sigma: f64,
    pub start: [f64; 2],
    pub tau: f64,
    pub timestep: f64,
    pub tc: f64,
    pub tr: f64,
}

impl Default for ParticleBoxParams {
    fn default() -> Self {
        Self {
            width: BOX_WIDTH,
            height: BOX_HEIGHT,
            radius: 1.0,
            mass: 1.0,
            force_sigma: 40.0,
            start: [20.0, 20.0],
            tau: 2.0,
            timestep: 0.05,
            tc: 0.5,
            tr: 1.0,
        }
    }
}

pub struct ParticleBox {
    params: ParticleBoxParams,
}

impl ParticleBox {
    pub fn new(params: ParticleBoxParams) -> EntropicResult<Self> {
        let ParticleBoxParams {
            width,
            height,
            radius,
            mass,
            force_sigma,
            ..
        } = params;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EntropicError::Config(format!(
                "particle_box dimensions must be positive, got {width} × {height}"
            )));
        }
        if !(radius >= 0.0 && 2.0 * radius < width.min(height)) {
            return Err(EntropicError::Config(format!(
                "particle_box radius {radius} does not fit a {width} × {height} box"
            )));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(EntropicError::Config(format!(
                "particle_box mass must be > 0, got {mass}"
            )));
        }
        if !(force_sigma.is_finite() && force_sigma >= 0.0) {
            return Err(EntropicError::Config(format!(
                "particle_box force_sigma must be >= 0, got {force_sigma}"
            )));
        }
        let env = Self { params };
        if !env.inside(&env.params.start) {
            return Err(EntropicError::Config(format!(
                "particle_box start {:?} lies outside the walls",
                env.params.start
            )));
        }
        Ok(env)
    }

    /// Defaults: 400 × 80 box, unit disk starting near the lower-left corner.
    pub fn default_params() -> Self {
        Self {
            params: ParticleBoxParams::default(),
        }
    }

    pub fn params(&self) -> &ParticleBoxParams {
        &self.params
    }

    fn inside(&self, p: &[f64]) -> bool {
        let r = self.params.radius;
        p.len() == 2
            && p[0] >= r
            && p[0] <= self.params.width - r
            && p[1] >= r
            && p[1] <= self.params.height - r
    }
}

impl Environment for ParticleBox {
    fn name(&self) -> &str {
        "particle_box"
    }

    fn constants(&self) -> EnvConstants {
        EnvConstants {
            dims: 2,
            tau: self.params.tau,
            timestep: self.params.timestep,
            tc: self.params.tc,
            tr: self.params.tr,
        }
    }

    fn start(&self) -> Macrostate {
        self.params.start.to_vec()
    }

    fn step_microstate(
        &self,
        state: &[f64],
        _force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        let step = self.params.timestep / self.params.mass;
        let mut next = Vec::with_capacity(2);
        let mut kick = Vec::with_capacity(2);
        for &x in state.iter().take(2) {
            let eta: f64 = StandardNormal.sample(rng);
            let f = self.params.force_sigma * eta;
            next.push(x + f * step);
            kick.push(f);
        }
        Ok((next, kick))
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        let step = self.params.timestep / self.params.mass;
        Ok(state
            .iter()
            .zip(causal_force)
            .map(|(x, f)| x + f * step)
            .collect())
    }

    fn valid(&self, _path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        if candidate.len() != 2 {
            return Err(EntropicError::EnvironmentContract(format!(
                "particle_box expects 2-D states, got {}",
                candidate.len()
            )));
        }
        Ok(self.inside(candidate))
    }

    fn plot(&self) {
        log::info!(
            "particle_box: {} × {} walls, disk radius {} at {:?}",
            self.params.width,
            self.params.height,
            self.params.radius,
            self.params.start
        );
    }

    fn update_plot(&self, path: &[Macrostate]) {
        let Some(last) = path.last() else {
            return;
        };
        let (mut lo, mut hi) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
        for p in path {
            for k in 0..2 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
        }
        log::info!(
            "particle_box: {} states, at ({:.2}, {:.2}), visited x ∈ [{:.2}, {:.2}], y ∈ [{:.2}, {:.2}]",
            path.len(),
            last[0],
            last[1],
            lo[0],
            hi[0],
            lo[1],
            hi[1]
        );
    }
}
