//! Circuit database and validation.
//!
//! This module provides the in-memory representation of a placement
//! benchmark. The [`Circuit`] struct holds all modules, nets and pins, with
//! free modules ordered ahead of fixed ones so that a free module's index is
//! also its position in the net force systems.

mod graph;
mod types;
mod validate;

pub use graph::Circuit;
pub use types::*;
pub use validate::{unanchored_modules, validate_circuit, validate_records};
