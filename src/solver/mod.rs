//! Quadratic placement solver.
//!
//! Each round turns the nets into springs and solves for the free-module
//! centres that minimise the total spring energy, one axis at a time:
//!
//! ```text
//! C x = -d
//! ```
//!
//! where:
//! - x holds the centres of the free modules along one axis
//! - C is a weighted Laplacian over the free modules, with an extra
//!   diagonal term for every spring to a fixed module
//! - d collects the pin offsets and the fixed-module positions
//!
//! C is symmetric, and positive definite as long as every group of
//! connected free modules has a spring to some fixed module, so the system
//! is solved with a sparse Cholesky factorization.

mod model;
mod placer;
mod system;
mod weights;

pub use model::{NetForceTarget, NetModel};
pub use placer::{Placer, RoundReport};
pub use system::ForceSystem;
pub use weights::NetWeights;

/// Minimum pin separation for a bound-to-bound spring.
pub const DEFAULT_EPSILON: f64 = 0.001;
