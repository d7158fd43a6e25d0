// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Microstate Path Sampler
// ─────────────────────────────────────────────────────────────────────
//! Monte Carlo generation of candidate future trajectories.
//!
//! Every walk starts at the current macrostate and grows by rejection
//! sampling: the environment proposes `(microstate, force)` from the last
//! accepted pair, and the proposal is kept only if the feasibility
//! predicate holds for the prefix plus the candidate. A rejected step is
//! resampled without advancing.
//!
//! Walks are independent. Walk `i` owns a `ChaCha8Rng` seeded from
//! `(tick seed, i)`, so the sampled set does not depend on whether walks
//! run sequentially or across the rayon pool.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use entropic_types::{
    AgentConfig, EntropicError, EntropicResult, Force, Macrostate, Microstate,
};

use crate::environment::Environment;

/// Rejections per accepted step above which a tick's sampling is reported.
const HIGH_REJECTION_RATIO: u64 = 10;

/// Retry budget for a single rejected walk step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Fail with `SamplingExhausted` after this many rejected candidates.
    Bounded(u64),
    /// Retry until a candidate is accepted.
    Unbounded,
}

impl RetryPolicy {
    pub fn from_config(config: &AgentConfig) -> Self {
        if config.unbounded_retries {
            RetryPolicy::Unbounded
        } else {
            RetryPolicy::Bounded(config.max_attempts)
        }
    }

    #[inline]
    fn exhausted(self, rejected: u64) -> bool {
        match self {
            RetryPolicy::Bounded(max) => rejected >= max,
            RetryPolicy::Unbounded => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Bounded(10_000)
    }
}

/// One sampled trajectory of K accepted microstates.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    /// Accepted microstates, origin excluded.
    pub states: Vec<Microstate>,
    /// Force produced at the first accepted step (`None` when K = 0).
    pub first_force: Option<Force>,
    /// Candidates rejected while growing this walk.
    pub rejections: u64,
}

impl Walk {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn endpoint(&self) -> Option<&[f64]> {
        self.states.last().map(Vec::as_slice)
    }
}

/// All walks sampled from one macrostate in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePaths {
    pub origin: Macrostate,
    /// Walk length K shared by every walk.
    pub steps: usize,
    pub walks: Vec<Walk>,
}

impl SamplePaths {
    pub fn len(&self) -> usize {
        self.walks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walks.is_empty()
    }

    /// Walk endpoints in walk order. Empty when K = 0.
    pub fn endpoints(&self) -> Vec<Vec<f64>> {
        self.walks
            .iter()
            .filter_map(|w| w.endpoint().map(<[f64]>::to_vec))
            .collect()
    }

    /// First-step forces in walk order. Empty when K = 0.
    pub fn first_forces(&self) -> Vec<Force> {
        self.walks
            .iter()
            .filter_map(|w| w.first_force.clone())
            .collect()
    }

    pub fn total_rejections(&self) -> u64 {
        self.walks.iter().map(|w| w.rejections).sum()
    }
}

/// Derive the seed of walk `index` from a tick seed (splitmix64 finaliser).
#[inline]
pub fn walk_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Rejection-sampling generator of `num_paths` walks per call.
#[derive(Debug, Clone)]
pub struct PathSampler {
    num_paths: usize,
    retry: RetryPolicy,
    parallel: bool,
}

impl PathSampler {
    pub fn new(num_paths: usize, retry: RetryPolicy) -> Self {
        Self {
            num_paths,
            retry,
            parallel: true,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.num_sample_paths, RetryPolicy::from_config(config))
            .with_parallel(config.parallel)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Sample `num_paths` walks of length K = floor(TAU / TIMESTEP) from
    /// `origin`. Returns once every walk is complete.
    pub fn sample(
        &self,
        env: &dyn Environment,
        origin: &[f64],
        seed: u64,
    ) -> EntropicResult<SamplePaths> {
        let constants = env.constants();
        if origin.len() != constants.dims {
            return Err(EntropicError::EnvironmentContract(format!(
                "origin has {} dims, environment declares {}",
                origin.len(),
                constants.dims
            )));
        }
        let steps = constants.walk_len();

        let run_walk = |i: usize| {
            let mut rng = ChaCha8Rng::seed_from_u64(walk_seed(seed, i));
            self.sample_walk(env, origin, steps, i, &mut rng)
        };

        let walks: Vec<Walk> = if self.parallel {
            (0..self.num_paths)
                .into_par_iter()
                .map(run_walk)
                .collect::<EntropicResult<_>>()?
        } else {
            (0..self.num_paths)
                .map(run_walk)
                .collect::<EntropicResult<_>>()?
        };

        let paths = SamplePaths {
            origin: origin.to_vec(),
            steps,
            walks,
        };
        let rejections = paths.total_rejections();
        let accepted = (paths.len() * steps) as u64;
        if accepted > 0 && rejections > HIGH_REJECTION_RATIO * accepted {
            log::warn!(
                "{}: {rejections} rejected microstates for {accepted} accepted at {origin:?}",
                env.name()
            );
        }
        log::debug!(
            "sampled {} walks × {} steps from {:?} ({} rejections)",
            paths.len(),
            steps,
            origin,
            rejections
        );
        Ok(paths)
    }

    /// Grow a single walk of `steps` accepted microstates.
    pub fn sample_walk(
        &self,
        env: &dyn Environment,
        origin: &[f64],
        steps: usize,
        walk_index: usize,
        rng: &mut ChaCha8Rng,
    ) -> EntropicResult<Walk> {
        let dims = origin.len();
        let mut prefix: Vec<Vec<f64>> = Vec::with_capacity(steps + 1);
        prefix.push(origin.to_vec());
        let mut last_force: Force = vec![0.0; dims];
        let mut first_force = None;
        let mut rejections = 0u64;

        for step in 0..steps {
            let mut rejected_here = 0u64;
            loop {
                let last = prefix.last().map(Vec::as_slice).unwrap_or(origin);
                let (candidate, force) = env.step_microstate(last, &last_force, rng)?;
                if candidate.len() != dims || force.len() != dims {
                    return Err(EntropicError::EnvironmentContract(format!(
                        "{}: step_microstate returned state/force of {}/{} dims, expected {dims}",
                        env.name(),
                        candidate.len(),
                        force.len()
                    )));
                }
                if env.valid(&prefix, &candidate)? {
                    if step == 0 {
                        first_force = Some(force.clone());
                    }
                    prefix.push(candidate);
                    last_force = force;
                    break;
                }
                rejected_here += 1;
                if self.retry.exhausted(rejected_here) {
                    return Err(EntropicError::SamplingExhausted {
                        walk: walk_index,
                        step,
                        attempts: rejected_here,
                    });
                }
            }
            rejections += rejected_here;
        }

        Ok(Walk {
            states: prefix.split_off(1),
            first_force,
            rejections,
        })
    }
}
