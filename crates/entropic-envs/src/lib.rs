// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Environment Models
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Concrete environments for the causal entropic forcing core: a 2-D
//! particle in a box and a 1-D Gaussian drift line, plus the static
//! registry mapping configuration identifiers to them.

pub mod gaussian_drift;
pub mod particle_box;
pub mod registry;

pub use gaussian_drift::{GaussianDrift, GaussianDriftParams};
pub use particle_box::{ParticleBox, ParticleBoxParams, BOX_HEIGHT, BOX_WIDTH};
pub use registry::{resolve, resolve_with, EnvironmentKind};
