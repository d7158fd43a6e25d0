// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Test Environments
// ─────────────────────────────────────────────────────────────────────
//! Small environment models shared by the unit tests of this crate.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

use entropic_types::{EntropicError, EntropicResult, EnvConstants, Force, Macrostate, Microstate};

use crate::environment::Environment;

/// D-dimensional random walk: each microstate adds `sigma · N(0, 1)` per
/// axis, the macrostate moves by `force × timestep`. Optionally bounded
/// to `|x_i| <= bound`.
pub struct NoiseEnv {
    pub constants: EnvConstants,
    pub start: Macrostate,
    pub sigma: f64,
    pub bound: Option<f64>,
}

impl NoiseEnv {
    pub fn line() -> Self {
        Self {
            constants: EnvConstants {
                dims: 1,
                tau: 1.0,
                timestep: 0.1,
                tc: 1.0,
                tr: 1.0,
            },
            start: vec![0.0],
            sigma: 1.0,
            bound: None,
        }
    }

    pub fn plane(bound: f64) -> Self {
        Self {
            constants: EnvConstants {
                dims: 2,
                tau: 2.0,
                timestep: 0.25,
                tc: 1.0,
                tr: 2.0,
            },
            start: vec![0.0, 0.0],
            sigma: 0.5,
            bound: Some(bound),
        }
    }
}

impl Environment for NoiseEnv {
    fn name(&self) -> &str {
        "noise"
    }

    fn constants(&self) -> EnvConstants {
        self.constants
    }

    fn start(&self) -> Macrostate {
        self.start.clone()
    }

    fn step_microstate(
        &self,
        state: &[f64],
        _force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        let force: Force = (0..state.len())
            .map(|_| {
                let z: f64 = StandardNormal.sample(rng);
                self.sigma * z
            })
            .collect();
        let next = state.iter().zip(&force).map(|(x, f)| x + f).collect();
        Ok((next, force))
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        let dt = self.constants.timestep;
        Ok(state
            .iter()
            .zip(causal_force)
            .map(|(x, f)| x + f * dt)
            .collect())
    }

    fn valid(&self, _path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        Ok(match self.bound {
            Some(b) => candidate.iter().all(|x| x.abs() <= b),
            None => true,
        })
    }
}

/// Feasibility predicate rejects every candidate.
pub struct RejectAllEnv(pub NoiseEnv);

impl Environment for RejectAllEnv {
    fn name(&self) -> &str {
        "reject_all"
    }

    fn constants(&self) -> EnvConstants {
        self.0.constants
    }

    fn start(&self) -> Macrostate {
        self.0.start()
    }

    fn step_microstate(
        &self,
        state: &[f64],
        force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        self.0.step_microstate(state, force, rng)
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        self.0.step_macrostate(state, causal_force)
    }

    fn valid(&self, _path: &[Vec<f64>], _candidate: &[f64]) -> EntropicResult<bool> {
        Ok(false)
    }
}

/// Microstate walks stay near the origin and are feasible; every
/// macrostate proposal is pushed to `FAR` and rejected.
pub struct RejectMacroEnv(pub NoiseEnv);

impl RejectMacroEnv {
    pub const FAR: f64 = 1.0e9;
}

impl Environment for RejectMacroEnv {
    fn name(&self) -> &str {
        "reject_macro"
    }

    fn constants(&self) -> EnvConstants {
        self.0.constants
    }

    fn start(&self) -> Macrostate {
        self.0.start()
    }

    fn step_microstate(
        &self,
        state: &[f64],
        force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        self.0.step_microstate(state, force, rng)
    }

    fn step_macrostate(&self, state: &[f64], _causal_force: &[f64]) -> EntropicResult<Macrostate> {
        Ok(state.iter().map(|x| x + Self::FAR).collect())
    }

    fn valid(&self, _path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        Ok(candidate.iter().all(|x| x.abs() < Self::FAR / 2.0))
    }
}

/// Transition function fails outright.
pub struct BrokenEnv(pub NoiseEnv);

impl Environment for BrokenEnv {
    fn name(&self) -> &str {
        "broken"
    }

    fn constants(&self) -> EnvConstants {
        self.0.constants
    }

    fn start(&self) -> Macrostate {
        self.0.start()
    }

    fn step_microstate(
        &self,
        _state: &[f64],
        _force: &[f64],
        _rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        Err(EntropicError::EnvironmentContract(
            "transition table missing".to_string(),
        ))
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        self.0.step_macrostate(state, causal_force)
    }

    fn valid(&self, path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        self.0.valid(path, candidate)
    }
}

/// One walk feasibility query: prefix, candidate, verdict.
pub type WalkCall = (Vec<Vec<f64>>, Vec<f64>, bool);

/// 1-D noise walk whose feasibility depends on the path: a candidate
/// must lie within `max_jump` of the last state of the prefix. Every
/// feasibility query is recorded, split into walk and macrostate calls.
pub struct PrefixEnv {
    pub inner: NoiseEnv,
    pub max_jump: f64,
    pub walk_calls: Mutex<Vec<WalkCall>>,
    pub macro_calls: Mutex<Vec<Vec<Vec<f64>>>>,
    macro_pending: AtomicBool,
}

impl PrefixEnv {
    pub fn new(max_jump: f64) -> Self {
        Self {
            inner: NoiseEnv::line(),
            max_jump,
            walk_calls: Mutex::new(Vec::new()),
            macro_calls: Mutex::new(Vec::new()),
            macro_pending: AtomicBool::new(false),
        }
    }
}

impl Environment for PrefixEnv {
    fn name(&self) -> &str {
        "prefix"
    }

    fn constants(&self) -> EnvConstants {
        self.inner.constants
    }

    fn start(&self) -> Macrostate {
        self.inner.start()
    }

    fn step_microstate(
        &self,
        state: &[f64],
        force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        self.inner.step_microstate(state, force, rng)
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        self.macro_pending.store(true, Ordering::SeqCst);
        self.inner.step_macrostate(state, causal_force)
    }

    fn valid(&self, path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        let last = path.last().ok_or_else(|| {
            EntropicError::EnvironmentContract("valid called with an empty path".to_string())
        })?;
        let ok = (candidate[0] - last[0]).abs() <= self.max_jump;
        if self.macro_pending.swap(false, Ordering::SeqCst) {
            self.macro_calls.lock().push(path.to_vec());
        } else {
            self.walk_calls
                .lock()
                .push((path.to_vec(), candidate.to_vec(), ok));
        }
        Ok(ok)
    }
}
