// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Control Loop
// ─────────────────────────────────────────────────────────────────────
//! Reflex loop applying the causal entropic force tick by tick.
//!
//! Each tick:
//!   1. Compute force at the current macrostate (sample → weight → aggregate)
//!   2. Ask the environment to advance the macrostate
//!   3. Validate the candidate against the accumulated path
//!   4. Append, redraw, report
//!
//! Ticks are strictly sequential. An invalid macrostate is terminal and
//! is never retried; any other failure moves the loop to
//! `TerminatedError`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use entropic_types::{
    AgentConfig, EntropicError, EntropicResult, LoopState, Macrostate, RunReport, TickRecord,
};

use crate::environment::Environment;
use crate::force::ForceEstimator;

/// Sequential controller driving one environment for a fixed tick budget.
pub struct ControlLoop<'e> {
    env: &'e dyn Environment,
    estimator: ForceEstimator,
    plot: bool,
    total_ticks: usize,
    remaining: usize,
    state: LoopState,
    path: Vec<Macrostate>,
    log: Vec<TickRecord>,
    rng: ChaCha8Rng,
}

impl<'e> ControlLoop<'e> {
    /// Create a loop at the environment's start macrostate.
    ///
    /// `seed = None` seeds the tick RNG from OS entropy.
    pub fn new(
        env: &'e dyn Environment,
        estimator: ForceEstimator,
        steps: usize,
        plot: bool,
        seed: Option<u64>,
    ) -> EntropicResult<Self> {
        let constants = env.constants();
        constants.validate()?;
        let start = env.start();
        if start.len() != constants.dims {
            return Err(EntropicError::EnvironmentContract(format!(
                "{}: start has {} dims, environment declares {}",
                env.name(),
                start.len(),
                constants.dims
            )));
        }

        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            env,
            estimator,
            plot,
            total_ticks: steps,
            remaining: steps,
            state: LoopState::Running,
            path: vec![start],
            log: Vec::with_capacity(steps),
            rng,
        })
    }

    pub fn from_config(env: &'e dyn Environment, config: &AgentConfig) -> EntropicResult<Self> {
        Self::new(
            env,
            ForceEstimator::from_config(config),
            config.steps,
            config.plot,
            config.seed,
        )
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn macrostate(&self) -> &[f64] {
        self.path.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn path(&self) -> &[Macrostate] {
        &self.path
    }

    pub fn ticks(&self) -> &[TickRecord] {
        &self.log
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Execute one tick.
    pub fn tick(&mut self) -> EntropicResult<TickRecord> {
        if self.state.is_terminated() {
            return Err(EntropicError::Lifecycle(format!(
                "control loop is not running ({:?})",
                self.state
            )));
        }
        if self.remaining == 0 {
            self.state = LoopState::TerminatedSuccess;
            return Err(EntropicError::Lifecycle(
                "tick budget already exhausted".to_string(),
            ));
        }

        let result = self.advance();
        if let Err(e) = &result {
            if self.state == LoopState::Running {
                self.state = LoopState::TerminatedError;
                log::error!("control loop halted: {e}");
            }
        }
        result
    }

    fn advance(&mut self) -> EntropicResult<TickRecord> {
        let tick = self.total_ticks - self.remaining + 1;
        let current = self.macrostate().to_vec();
        let tick_seed: u64 = self.rng.gen();

        // 1. Causal entropic force
        let estimate = self.estimator.compute(self.env, &current, tick_seed)?;
        if estimate.force.iter().any(|f| !f.is_finite()) {
            return Err(EntropicError::Numerical(format!(
                "causal entropic force at tick {tick} is not finite: {:?}",
                estimate.force
            )));
        }

        // 2. Advance macrostate
        let candidate = self.env.step_macrostate(&current, &estimate.force)?;
        if candidate.len() != current.len() {
            return Err(EntropicError::EnvironmentContract(format!(
                "{}: step_macrostate returned {} dims, expected {}",
                self.env.name(),
                candidate.len(),
                current.len()
            )));
        }

        // 3. Validate against the accumulated path
        let accepted = self.env.valid(&self.path, &candidate)?;
        let record = TickRecord {
            tick,
            force: estimate.force,
            macrostate: candidate.clone(),
            accepted,
            rejections: estimate.rejections,
        };
        self.log.push(record.clone());

        if !accepted {
            self.state = LoopState::TerminatedInvalidState;
            log::error!(
                "tick {tick}/{}: agent in invalid environment state {candidate:?}",
                self.total_ticks
            );
            return Err(EntropicError::InvalidMacrostate {
                tick,
                state: candidate,
            });
        }

        // 4. Record, redraw, report
        log::info!("tick {tick}/{}: macrostate {candidate:?}", self.total_ticks);
        self.path.push(candidate);
        if self.plot {
            self.env.update_plot(&self.path);
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.state = LoopState::TerminatedSuccess;
        }
        Ok(record)
    }

    /// Run every remaining tick. Stops at the first failure.
    pub fn run(&mut self) -> EntropicResult<RunReport> {
        log::info!(
            "{}: start {:?}, {} ticks",
            self.env.name(),
            self.macrostate(),
            self.remaining
        );
        while self.remaining > 0 {
            self.tick()?;
        }
        self.state = LoopState::TerminatedSuccess;
        Ok(self.report())
    }

    /// Snapshot of the run so far.
    pub fn report(&self) -> RunReport {
        RunReport {
            state: self.state,
            path: self.path.clone(),
            ticks: self.log.clone(),
        }
    }
}
