//! Placement round runner.

use std::path::Path;

use tracing::info;

use super::model::{NetForceTarget, NetModel};
use super::weights::NetWeights;
use crate::circuit::{Axis, Circuit};
use crate::config::PlacerConfig;
use crate::error::Result;

/// Wirelength before and after one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReport {
    /// Round number, starting at 0
    pub round: usize,
    /// Total HPWL before the free modules moved
    pub hpwl_before: f64,
    /// Total HPWL after the free modules moved
    pub hpwl_after: f64,
}

/// Runs weight, solve and write rounds on a circuit.
///
/// Each round recomputes the net weights at the current placement, solves
/// both axes and moves every free module to its target centre. There is no
/// convergence test; the caller decides how many rounds to run.
pub struct Placer {
    /// The circuit being placed
    circuit: Circuit,
    /// Weight model and system builder
    model: NetModel,
    /// Run settings
    config: PlacerConfig,
    /// Weights along x from the last round
    nwx: NetWeights,
    /// Weights along y from the last round
    nwy: NetWeights,
    /// Rounds completed so far
    rounds_done: usize,
}

impl Placer {
    /// Create a new placer with default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self::with_config(circuit, PlacerConfig::default())
    }

    /// Create a new placer with custom configuration.
    pub fn with_config(circuit: Circuit, config: PlacerConfig) -> Self {
        let model = NetModel::new(config.net_model.clone());
        let nwx = model.new_weights();
        let nwy = model.new_weights();
        Self {
            circuit,
            model,
            config,
            nwx,
            nwy,
            rounds_done: 0,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn config(&self) -> &PlacerConfig {
        &self.config
    }

    /// Hand the circuit back to the caller.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Weights computed in the last round.
    pub fn weights(&self, axis: Axis) -> &NetWeights {
        match axis {
            Axis::X => &self.nwx,
            Axis::Y => &self.nwy,
        }
    }

    pub fn rounds_done(&self) -> usize {
        self.rounds_done
    }

    /// Run one round and move the free modules.
    ///
    /// On error the circuit is left as it was.
    pub fn place_round(&mut self) -> Result<RoundReport> {
        let round = self.rounds_done;
        let hpwl_before = self.circuit.hpwl()?;

        self.model
            .compute_net_weight(&self.circuit, &mut self.nwx, &mut self.nwy)?;
        let NetForceTarget { x, y } = self
            .model
            .compute_net_force_target(&self.circuit, &self.nwx, &self.nwy)?;
        self.circuit.set_free_module_coordinates(&x, &y)?;

        let hpwl_after = self.circuit.hpwl()?;
        self.rounds_done += 1;
        info!(round, hpwl_before, hpwl_after, "placement round complete");

        Ok(RoundReport {
            round,
            hpwl_before,
            hpwl_after,
        })
    }

    /// Run the configured number of rounds.
    ///
    /// With an output directory, a final `<name>.pl` is written there, plus
    /// a versioned snapshot after every round if `snapshot_each_round` is set.
    pub fn run(&mut self, output_dir: Option<&Path>) -> Result<Vec<RoundReport>> {
        let mut reports = Vec::with_capacity(self.config.rounds);
        for _ in 0..self.config.rounds {
            reports.push(self.place_round()?);
            if let (Some(dir), true) = (output_dir, self.config.snapshot_each_round) {
                self.circuit.generate_placement_snapshot(dir, true)?;
            }
        }

        if let Some(dir) = output_dir {
            self.circuit.generate_placement_snapshot(dir, false)?;
        }
        Ok(reports)
    }
}
