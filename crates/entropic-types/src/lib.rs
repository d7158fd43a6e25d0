// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Shared Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! State types, run configuration, and error hierarchy shared by the
//! causal entropic forcing core, its environments, and the CLI.

pub mod config;
pub mod error;
pub mod state;

pub use config::{AgentConfig, BandwidthRule, EntropyWeighting};
pub use error::{EntropicError, EntropicResult};
pub use state::{EnvConstants, Force, LoopState, Macrostate, Microstate, RunReport, TickRecord};
