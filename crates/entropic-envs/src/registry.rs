// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Environment Registry
// ─────────────────────────────────────────────────────────────────────
//! Compile-time set of environments selectable from configuration.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use entropic_core::Environment;
use entropic_types::{EntropicError, EntropicResult};

use crate::gaussian_drift::{GaussianDrift, GaussianDriftParams};
use crate::particle_box::{ParticleBox, ParticleBoxParams};

/// Every environment compiled into this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentKind {
    ParticleBox,
    GaussianDrift,
}

impl EnvironmentKind {
    pub const ALL: [EnvironmentKind; 2] = [EnvironmentKind::ParticleBox, EnvironmentKind::GaussianDrift];

    /// Canonical configuration identifier.
    pub fn id(self) -> &'static str {
        match self {
            EnvironmentKind::ParticleBox => "particle_box",
            EnvironmentKind::GaussianDrift => "gaussian_drift",
        }
    }

    /// Construct the environment with its default parameters.
    pub fn build(self) -> Box<dyn Environment> {
        match self {
            EnvironmentKind::ParticleBox => Box::new(ParticleBox::default_params()),
            EnvironmentKind::GaussianDrift => Box::new(GaussianDrift::default_params()),
        }
    }

    /// Construct the environment, overriding defaults with `params`.
    pub fn build_with(self, params: Option<&Value>) -> EntropicResult<Box<dyn Environment>> {
        let Some(params) = params else {
            return Ok(self.build());
        };
        let env: Box<dyn Environment> = match self {
            EnvironmentKind::ParticleBox => {
                let p: ParticleBoxParams = parse_params(self, params)?;
                Box::new(ParticleBox::new(p)?)
            }
            EnvironmentKind::GaussianDrift => {
                let p: GaussianDriftParams = parse_params(self, params)?;
                Box::new(GaussianDrift::new(p)?)
            }
        };
        Ok(env)
    }
}

fn parse_params<P: DeserializeOwned>(kind: EnvironmentKind, params: &Value) -> EntropicResult<P> {
    serde_json::from_value(params.clone())
        .map_err(|e| EntropicError::Config(format!("{kind} environment_params: {e}")))
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EnvironmentKind {
    type Err = EntropicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "particle_box" | "particleBox" | "particle-box" => Ok(EnvironmentKind::ParticleBox),
            "gaussian_drift" | "gaussianDrift" | "gaussian-drift" => {
                Ok(EnvironmentKind::GaussianDrift)
            }
            other => {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.id()).collect();
                Err(EntropicError::Config(format!(
                    "unknown environment {other:?}; known: {}",
                    known.join(", ")
                )))
            }
        }
    }
}

/// Look up `name` and build that environment with default parameters.
pub fn resolve(name: &str) -> EntropicResult<Box<dyn Environment>> {
    resolve_with(name, None)
}

/// Look up `name` and build that environment from optional overrides.
pub fn resolve_with(name: &str, params: Option<&Value>) -> EntropicResult<Box<dyn Environment>> {
    let kind: EnvironmentKind = name.parse()?;
    log::debug!("resolved environment {name:?} → {kind} (params: {params:?})");
    kind.build_with(params)
}
