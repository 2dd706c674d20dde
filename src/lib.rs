//! # TPL Core
//!
//! The analytic (quadratic) placement core of a VLSI cell placer.
//!
//! This library provides:
//! - A circuit database of modules, nets and pins loaded from Bookshelf files
//! - A bound-to-bound net weight model
//! - Sparse net force systems per axis, solved with a Cholesky factorization
//! - Write-back of the solved centres and `.pl` placement snapshots
//!
//! ## Architecture
//!
//! - [`bookshelf`] - Reader for `.nodes`, `.pl`, `.nets` and writer for `.pl`
//! - [`circuit`] - Circuit database and validation
//! - [`solver`] - Net model, force systems and the round runner
//! - [`config`] - JSON configuration
//!
//! ## Usage
//!
//! ```bash
//! tpl benchmarks/adaptec1 --rounds 3 --output-dir out -v
//! ```
//!
//! ## Placement Method
//!
//! For each round:
//!
//! 1. Replace every net by springs between its boundary and interior pins,
//!    weighted by the inverse of their current distance
//! 2. Stamp the springs into `C x = -d` for each axis, folding fixed modules
//!    into `d`
//! 3. Solve both systems and move every free module to its target centre

pub mod bookshelf;
pub mod circuit;
pub mod config;
pub mod error;
pub mod solver;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use config::PlacerConfig;
pub use error::{PlacerError, Result};
pub use solver::{NetModel, Placer};

/// Power density assigned to every module at load
pub const DEFAULT_POWER_DENSITY: f64 = 1.0;
