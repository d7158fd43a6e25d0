// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Causal Entropic Forcing Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Causal entropic forcing: steer a macrostate toward regions with the
//! most diverse accessible futures.
//!
//! Per tick, the pipeline is
//!
//!   sampler (N walks × K steps) → density (−ln p at each endpoint)
//!   → force (2·T_c Σ w_i f_i / (T_r N))
//!
//! and the control loop applies that force through the environment.
//!
//! # Invariants
//!
//! 1. **Walks are independent**: each draws from its own seeded RNG, so a
//!    tick's sample set is identical sequentially and on the rayon pool.
//!
//! 2. **Degeneracy is explicit**: a singular endpoint covariance or a
//!    non-finite weight fails with `SamplingDegeneracy`; no NaN weights
//!    reach the aggregator.
//!
//! 3. **Invalid macrostates are terminal**: the loop moves to
//!    `TerminatedInvalidState` and never retries the tick.
//!
//! 4. **Rejection sampling is bounded by default**: unbounded retry is an
//!    explicit `RetryPolicy::Unbounded`.

pub mod control;
pub mod density;
pub mod environment;
pub mod force;
pub mod sampler;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use control::ControlLoop;
pub use density::{entropy_weights, DensityEstimator, GaussianKde};
pub use environment::{Environment, SequentialEnvironment, Serialized};
pub use force::{aggregate_force, ForceEstimate, ForceEstimator};
pub use sampler::{PathSampler, RetryPolicy, SamplePaths, Walk};
pub use session::{Session, SessionPhase};
