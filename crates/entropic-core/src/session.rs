// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Run Session (initialize → run → shutdown)
// ─────────────────────────────────────────────────────────────────────
//! Owns the validated configuration and the environment for one run.

use entropic_types::{AgentConfig, EntropicError, EntropicResult, RunReport};

use crate::control::ControlLoop;
use crate::environment::Environment;

/// Phase of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Initialized,
    Finished,
}

/// One agent run with an explicit lifecycle.
pub struct Session {
    config: AgentConfig,
    env: Box<dyn Environment>,
    phase: SessionPhase,
    report: Option<RunReport>,
}

impl Session {
    /// Validate `config` and `env`, then prepare visualization if enabled.
    pub fn initialize(config: AgentConfig, env: Box<dyn Environment>) -> EntropicResult<Self> {
        config.validate()?;
        let constants = env.constants();
        constants.validate()?;
        log::info!(
            "session init: environment={} dims={} K={} N={} steps={}",
            env.name(),
            constants.dims,
            constants.walk_len(),
            config.num_sample_paths,
            config.steps
        );
        if config.plot {
            env.plot();
        }
        Ok(Self {
            config,
            env,
            phase: SessionPhase::Initialized,
            report: None,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn environment(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Run the control loop once. The report is kept even when the run
    /// fails, so the offending tick can be inspected.
    pub fn run(&mut self) -> EntropicResult<&RunReport> {
        if self.phase != SessionPhase::Initialized {
            return Err(EntropicError::Lifecycle(
                "session has already run".to_string(),
            ));
        }
        self.phase = SessionPhase::Finished;

        let mut ctl = ControlLoop::from_config(self.env.as_ref(), &self.config)?;
        let outcome = ctl.run();
        let report = self.report.insert(ctl.report());
        outcome?;
        Ok(&*report)
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    /// End the session, returning the report of the run if there was one.
    pub fn shutdown(self) -> Option<RunReport> {
        match &self.report {
            Some(r) => log::info!(
                "session shutdown: {:?} after {} ticks, final macrostate {:?}",
                r.state,
                r.tick_count(),
                r.final_macrostate()
            ),
            None => log::info!("session shutdown before run"),
        }
        self.report
    }
}
