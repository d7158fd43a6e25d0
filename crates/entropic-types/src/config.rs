// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Run Configuration
// ─────────────────────────────────────────────────────────────────────

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EntropicError, EntropicResult};

/// Kernel bandwidth selection rule for the endpoint density fit.
///
/// The kernel covariance is the sample covariance scaled by `factor²`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthRule {
    /// Scott's rule: `n^(-1/(d+4))`.
    #[default]
    Scott,
    /// Silverman's rule: `(n (d + 2) / 4)^(-1/(d+4))`.
    Silverman,
}

impl BandwidthRule {
    /// Covariance scaling factor for `n` points in `d` dimensions.
    pub fn factor(self, n: usize, d: usize) -> f64 {
        let n = n as f64;
        let d = d as f64;
        let exponent = -1.0 / (d + 4.0);
        match self {
            BandwidthRule::Scott => n.powf(exponent),
            BandwidthRule::Silverman => (n * (d + 2.0) / 4.0).powf(exponent),
        }
    }
}

/// How a walk's endpoint density is turned into its entropy weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyWeighting {
    /// `-ln p(x)`: large where trajectories are rare.
    #[default]
    NegLogDensity,
    /// `-p(x)`: the raw negated density.
    NegDensity,
}

/// Runtime configuration for one agent run, read once at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Identifier of the environment implementation to run against.
    pub environment: String,

    /// Number of Monte Carlo walks sampled per tick (N, at least 2).
    pub num_sample_paths: usize,

    /// Number of control ticks to execute.
    pub steps: usize,

    /// Invoke the environment's plot hooks.
    pub plot: bool,

    /// Candidate proposals allowed per walk step before sampling gives up.
    /// Default: 10 000.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u64,

    /// Retry rejected proposals forever instead of honouring `max_attempts`.
    #[serde(default)]
    pub unbounded_retries: bool,

    /// Default: Scott's rule.
    #[serde(default)]
    pub bandwidth: BandwidthRule,

    /// Default: negative log-density.
    #[serde(default)]
    pub weighting: EntropyWeighting,

    /// Master seed. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Fan walks out over the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Parameter overrides handed to the selected environment. Keys the
    /// environment does not recognise are rejected when it is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_params: Option<serde_json::Value>,
}

fn default_max_attempts() -> u64 {
    10_000
}

fn default_parallel() -> bool {
    true
}

impl AgentConfig {
    /// Minimal configuration with every optional field at its default.
    pub fn new(environment: impl Into<String>, num_sample_paths: usize, steps: usize) -> Self {
        Self {
            environment: environment.into(),
            num_sample_paths,
            steps,
            plot: false,
            max_attempts: default_max_attempts(),
            unbounded_retries: false,
            bandwidth: BandwidthRule::default(),
            weighting: EntropyWeighting::default(),
            seed: None,
            parallel: default_parallel(),
            environment_params: None,
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> EntropicResult<()> {
        if self.environment.trim().is_empty() {
            return Err(EntropicError::Config(
                "environment must name an environment".to_string(),
            ));
        }
        if self.num_sample_paths < 2 {
            return Err(EntropicError::Config(format!(
                "num_sample_paths must be >= 2 for the endpoint density fit, got {}",
                self.num_sample_paths
            )));
        }
        if !self.unbounded_retries && self.max_attempts == 0 {
            return Err(EntropicError::Config(
                "max_attempts must be > 0 unless unbounded_retries is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> EntropicResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EntropicError::Config(format!("JSON parse error: {e}")))
    }

    /// Load and validate from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> EntropicResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EntropicError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_json(&raw)?;
        config.validate()?;
        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }
}
