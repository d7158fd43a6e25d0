// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Environment Capability Set
// ─────────────────────────────────────────────────────────────────────
//! The interface the core consumes from a controlled domain.
//!
//! The core never owns or mutates environment internals: it reads the
//! constants and invokes the behaviour functions. During a tick the
//! sampler calls `step_microstate` and `valid` from many rayon workers at
//! once, so implementations must be `Send + Sync`. Models that need
//! `&mut self` implement [`SequentialEnvironment`] instead and are wrapped
//! in [`Serialized`], which takes a lock around every call.

use parking_lot::Mutex;
use rand::RngCore;

use entropic_types::{EntropicResult, EnvConstants, Force, Macrostate, Microstate};

/// Trait for environment models driven by the entropic forcing core.
pub trait Environment: Send + Sync {
    /// Human-readable identifier, used in logs.
    fn name(&self) -> &str;

    fn constants(&self) -> EnvConstants;

    /// Initial macrostate of a run.
    fn start(&self) -> Macrostate;

    /// Propose one microscopic transition from `(state, force)`.
    ///
    /// Returns the candidate microstate and the force that produced it.
    /// All randomness must come from `rng` so that walks are reproducible.
    fn step_microstate(
        &self,
        state: &[f64],
        force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)>;

    /// Apply one macroscopic control update.
    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate>;

    /// Feasibility predicate for `candidate` following `path`.
    fn valid(&self, path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool>;

    /// Prepare visualization. No-op by default.
    fn plot(&self) {}

    /// Redraw with the run's path so far. No-op by default.
    fn update_plot(&self, _path: &[Macrostate]) {}
}

/// Environment model whose behaviour functions need exclusive access.
pub trait SequentialEnvironment: Send {
    fn name(&self) -> &str;

    fn constants(&self) -> EnvConstants;

    fn start(&self) -> Macrostate;

    fn step_microstate(
        &mut self,
        state: &[f64],
        force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)>;

    fn step_macrostate(
        &mut self,
        state: &[f64],
        causal_force: &[f64],
    ) -> EntropicResult<Macrostate>;

    fn valid(&mut self, path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool>;

    fn plot(&mut self) {}

    fn update_plot(&mut self, _path: &[Macrostate]) {}
}

/// Adapter serializing every call into a [`SequentialEnvironment`].
///
/// Thread-safe: the inner model is guarded by a `parking_lot::Mutex`.
/// Parallel walks stay correct but contend on the lock.
pub struct Serialized<E> {
    name: String,
    constants: EnvConstants,
    inner: Mutex<E>,
}

impl<E: SequentialEnvironment> Serialized<E> {
    pub fn new(inner: E) -> Self {
        Self {
            name: inner.name().to_string(),
            constants: inner.constants(),
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> E {
        self.inner.into_inner()
    }
}

impl<E: SequentialEnvironment> Environment for Serialized<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn constants(&self) -> EnvConstants {
        self.constants
    }

    fn start(&self) -> Macrostate {
        self.inner.lock().start()
    }

    fn step_microstate(
        &self,
        state: &[f64],
        force: &[f64],
        rng: &mut dyn RngCore,
    ) -> EntropicResult<(Microstate, Force)> {
        self.inner.lock().step_microstate(state, force, rng)
    }

    fn step_macrostate(&self, state: &[f64], causal_force: &[f64]) -> EntropicResult<Macrostate> {
        self.inner.lock().step_macrostate(state, causal_force)
    }

    fn valid(&self, path: &[Vec<f64>], candidate: &[f64]) -> EntropicResult<bool> {
        self.inner.lock().valid(path, candidate)
    }

    fn plot(&self) {
        self.inner.lock().plot();
    }

    fn update_plot(&self, path: &[Macrostate]) {
        self.inner.lock().update_plot(path);
    }
}
