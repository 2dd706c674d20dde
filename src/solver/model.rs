//! Bound-to-bound net model.
//!
//! Every net is replaced, per axis, by two-pin springs between its two
//! extreme (boundary) pins and each pin in between. A spring between pins
//! `a` and `b` on a net of degree `p` has weight `2 / (p - 1) / |a - b|`,
//! so the quadratic spring energy equals the net's half-perimeter
//! wirelength at the current placement.

use tracing::debug;

use super::system::ForceSystem;
use super::weights::NetWeights;
use crate::circuit::{Axis, Circuit, PinRef};
use crate::config::{FixedAnchor, NetModelConfig};
use crate::error::{PlacerError, Result};

/// Target centres of the free modules, index-aligned with
/// [`Circuit::free_modules`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetForceTarget {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl NetForceTarget {
    /// Target coordinates along one axis.
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Net weight model and net force system builder.
#[derive(Debug, Clone, Default)]
pub struct NetModel {
    config: NetModelConfig,
}

impl NetModel {
    pub fn new(config: NetModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NetModelConfig {
        &self.config
    }

    /// An empty weight map using this model's merge policy.
    pub fn new_weights(&self) -> NetWeights {
        NetWeights::new(self.config.weight_merge)
    }

    /// Compute the bound-to-bound weights of every net at the current
    /// placement. Both maps are cleared first.
    pub fn compute_net_weight(
        &self,
        circuit: &Circuit,
        nwx: &mut NetWeights,
        nwy: &mut NetWeights,
    ) -> Result<()> {
        self.compute_axis_weights(circuit, Axis::X, nwx)?;
        self.compute_axis_weights(circuit, Axis::Y, nwy)?;
        debug!(x = nwx.len(), y = nwy.len(), "computed net weights");
        Ok(())
    }

    fn compute_axis_weights(
        &self,
        circuit: &Circuit,
        axis: Axis,
        weights: &mut NetWeights,
    ) -> Result<()> {
        weights.clear();
        let epsilon = self.config.epsilon;
        let mut pins: Vec<(PinRef, f64)> = Vec::new();

        for (net_id, net) in circuit.nets() {
            let degree = net.degree();
            if degree < 2 {
                continue;
            }

            pins.clear();
            for (index, pin) in net.pins.iter().enumerate() {
                pins.push((PinRef::new(net_id, index), circuit.pin_position(pin, axis)?));
            }
            // stable: tied pins keep net order
            pins.sort_by(|a, b| a.1.total_cmp(&b.1));

            let scale = 2.0 / (degree - 1) as f64;
            let (low, low_pos) = pins[0];
            let (high, high_pos) = pins[degree - 1];
            for &(pin, pos) in &pins[1..degree - 1] {
                let to_low = pos - low_pos;
                if to_low > epsilon {
                    weights.insert(low, pin, scale / to_low);
                }
                let to_high = high_pos - pos;
                if to_high > epsilon {
                    weights.insert(high, pin, scale / to_high);
                }
            }
        }
        Ok(())
    }

    /// Stamp the weights into the per-axis force systems.
    ///
    /// `cx` and `cy` must have one unknown per free module; both are cleared
    /// first.
    pub fn compute_net_force_matrix(
        &self,
        circuit: &Circuit,
        nwx: &NetWeights,
        nwy: &NetWeights,
        cx: &mut ForceSystem,
        cy: &mut ForceSystem,
    ) -> Result<()> {
        for (what, system) in [("x force system", &*cx), ("y force system", &*cy)] {
            if system.size() != circuit.num_free() {
                return Err(PlacerError::DimensionMismatch {
                    what,
                    expected: circuit.num_free(),
                    actual: system.size(),
                });
            }
        }

        let anchor = self.config.fixed_anchor;
        assemble(circuit, Axis::X, anchor, nwx, cx)?;
        assemble(circuit, Axis::Y, anchor, nwy, cy)?;
        debug!(
            x_triplets = cx.num_triplets(),
            y_triplets = cy.num_triplets(),
            "assembled net force systems"
        );
        Ok(())
    }

    /// Solve for the free-module centres that minimise the weighted spring
    /// energy.
    ///
    /// Every free module must be pulled along both axes by some weight, and
    /// every group of connected free modules must reach a fixed one.
    pub fn compute_net_force_target(
        &self,
        circuit: &Circuit,
        nwx: &NetWeights,
        nwy: &NetWeights,
    ) -> Result<NetForceTarget> {
        let size = circuit.num_free();
        let mut cx = ForceSystem::new(Axis::X, size);
        let mut cy = ForceSystem::new(Axis::Y, size);
        self.compute_net_force_matrix(circuit, nwx, nwy, &mut cx, &mut cy)?;

        for system in [&cx, &cy] {
            if let Some(row) = system.first_unconstrained_row() {
                return Err(PlacerError::UnconstrainedModule {
                    module: circuit.module_at(row)?.id.clone(),
                    axis: system.axis(),
                });
            }
        }

        let x = cx.solve()?;
        let y = cy.solve()?;
        Ok(NetForceTarget {
            x: x.iter().copied().collect(),
            y: y.iter().copied().collect(),
        })
    }
}

/// Resolved end of a weighted pin pair.
struct PairEnd {
    /// System row for free modules
    row: Option<usize>,
    /// Pin offset from the module centre
    offset: f64,
    /// Module position a free pin is pulled towards when this end is fixed
    anchor: f64,
}

fn resolve(circuit: &Circuit, pin: PinRef, axis: Axis, anchor: FixedAnchor) -> Result<PairEnd> {
    let pin = circuit.pin(pin)?;
    let index = circuit.module_index(&pin.module)?;
    let module = circuit.module_at(index)?;
    let anchor = match anchor {
        FixedAnchor::LowerLeft => module.lower(axis),
        FixedAnchor::Center => module.center(axis),
    };
    Ok(PairEnd {
        row: circuit.system_index(index),
        offset: pin.offset(axis),
        anchor,
    })
}

fn assemble(
    circuit: &Circuit,
    axis: Axis,
    anchor: FixedAnchor,
    weights: &NetWeights,
    system: &mut ForceSystem,
) -> Result<()> {
    system.clear();

    for ((a, b), w) in weights.iter() {
        let a = resolve(circuit, a, axis, anchor)?;
        let b = resolve(circuit, b, axis, anchor)?;

        match (a.row, b.row) {
            (Some(i), Some(j)) => {
                system.stamp_spring(i, j, w);
                system.add_rhs(i, w * (a.offset - b.offset));
                system.add_rhs(j, w * (b.offset - a.offset));
            }
            (Some(i), None) => {
                system.stamp_anchor(i, w);
                system.add_rhs(i, w * (a.offset - b.offset - b.anchor));
            }
            (None, Some(j)) => {
                system.stamp_anchor(j, w);
                system.add_rhs(j, w * (b.offset - a.offset - a.anchor));
            }
            (None, None) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NetId;
    use crate::config::WeightMerge;
    use crate::test_support::CircuitBuilder;
    use approx::assert_relative_eq;
    use nalgebra_sparse::convert::serial::convert_csc_dense;

    fn p(net: usize, index: usize) -> PinRef {
        PinRef::new(NetId(net), index)
    }

    fn weights_of(model: &NetModel, circuit: &Circuit) -> (NetWeights, NetWeights) {
        let mut nwx = model.new_weights();
        let mut nwy = model.new_weights();
        model.compute_net_weight(circuit, &mut nwx, &mut nwy).unwrap();
        (nwx, nwy)
    }

    /// Two fixed modules at (0,0) and (100,0), two free ones between them,
    /// one net over all four pins at the module centres.
    fn four_module_circuit() -> Circuit {
        CircuitBuilder::new()
            .module("f1", 0.0, 0.0, 10, 10, true)
            .module("a", 30.0, 20.0, 10, 10, false)
            .module("b", 60.0, 40.0, 10, 10, false)
            .module("f2", 100.0, 0.0, 10, 10, true)
            .net(
                "n0",
                &[("f1", 0.0, 0.0), ("a", 0.0, 0.0), ("b", 0.0, 0.0), ("f2", 0.0, 0.0)],
            )
            .build()
    }

    #[test]
    fn test_small_nets_have_no_weight() {
        let circuit = CircuitBuilder::new()
            .module("a", 0.0, 0.0, 2, 2, false)
            .module("b", 10.0, 30.0, 2, 2, false)
            .net("single", &[("a", 0.0, 0.0)])
            .net("pair", &[("a", 0.0, 0.0), ("b", 0.0, 0.0)])
            .build();
        let (nwx, nwy) = weights_of(&NetModel::default(), &circuit);
        assert!(nwx.is_empty());
        assert!(nwy.is_empty());
    }

    #[test]
    fn test_three_pin_net_weights() {
        // x centres 0, 5, 10; y centres 5, 0, 10
        let circuit = CircuitBuilder::new()
            .module("a", -1.0, 4.0, 2, 2, false)
            .module("b", 4.0, -1.0, 2, 2, false)
            .module("c", 9.0, 9.0, 2, 2, false)
            .net("n0", &[("a", 0.0, 0.0), ("b", 0.0, 0.0), ("c", 0.0, 0.0)])
            .build();
        let (nwx, nwy) = weights_of(&NetModel::default(), &circuit);

        assert_eq!(nwx.len(), 2);
        assert_relative_eq!(nwx.get(p(0, 0), p(0, 1)).unwrap(), 0.2);
        assert_relative_eq!(nwx.get(p(0, 2), p(0, 1)).unwrap(), 0.2);
        assert_eq!(nwx.get(p(0, 0), p(0, 2)), None);
        assert_eq!(nwx.get(p(0, 2), p(0, 0)), None);

        // y is sorted by y: low is b, interior is a
        assert_eq!(nwy.len(), 2);
        assert_relative_eq!(nwy.get(p(0, 1), p(0, 0)).unwrap(), 0.2);
        assert_relative_eq!(nwy.get(p(0, 2), p(0, 0)).unwrap(), 0.2);
    }

    #[test]
    fn test_pins_within_epsilon_are_skipped() {
        let circuit = CircuitBuilder::new()
            .module("a", -1.0, -1.0, 2, 2, false)
            .module("b", -1.0, -1.0, 2, 2, false)
            .module("c", -1.0, -1.0, 2, 2, false)
            .net("n0", &[("a", 0.0, 0.0), ("b", 0.0005, 0.0), ("c", 10.0, 0.0)])
            .build();
        let (nwx, nwy) = weights_of(&NetModel::default(), &circuit);

        assert_eq!(nwx.len(), 1);
        assert_eq!(nwx.get(p(0, 0), p(0, 1)), None);
        assert_relative_eq!(nwx.get(p(0, 2), p(0, 1)).unwrap(), 1.0 / 9.9995);
        assert!(nwy.is_empty());

        let coarse = NetModel::new(NetModelConfig::new().with_epsilon(20.0));
        let (nwx, _) = weights_of(&coarse, &circuit);
        assert!(nwx.is_empty());
    }

    #[test]
    fn test_weights_use_configured_merge() {
        let config = NetModelConfig::new()
            .with_weight_merge(WeightMerge::Accumulate);
        let model = NetModel::new(config);
        assert_eq!(model.new_weights().merge(), WeightMerge::Accumulate);
        assert_eq!(NetModel::default().new_weights().merge(), WeightMerge::Overwrite);
    }

    #[test]
    fn test_weights_are_recomputed_from_scratch() {
        let circuit = four_module_circuit();
        let model = NetModel::default();
        let mut nwx = model.new_weights();
        let mut nwy = model.new_weights();
        nwx.insert(p(7, 0), p(7, 1), 1.0);
        model.compute_net_weight(&circuit, &mut nwx, &mut nwy).unwrap();
        assert_eq!(nwx.get(p(7, 0), p(7, 1)), None);
        assert_eq!(nwx.len(), 4);
    }

    #[test]
    fn test_free_free_assembly() {
        let circuit = CircuitBuilder::new()
            .module("a", 0.0, 0.0, 2, 2, false)
            .module("b", 10.0, 0.0, 2, 2, false)
            .net("n0", &[("a", 1.0, 0.0), ("b", -2.0, 0.0)])
            .build();
        let model = NetModel::default();
        let mut nwx = model.new_weights();
        nwx.insert(p(0, 0), p(0, 1), 0.5);
        let nwy = model.new_weights();

        let mut cx = ForceSystem::new(Axis::X, 2);
        let mut cy = ForceSystem::new(Axis::Y, 2);
        model
            .compute_net_force_matrix(&circuit, &nwx, &nwy, &mut cx, &mut cy)
            .unwrap();

        let c = convert_csc_dense(&cx.matrix());
        assert_relative_eq!(c[(0, 0)], 0.5);
        assert_relative_eq!(c[(1, 1)], 0.5);
        assert_relative_eq!(c[(0, 1)], -0.5);
        assert_relative_eq!(c[(1, 0)], -0.5);
        assert_relative_eq!(c.row(0).sum(), 0.0);
        assert_relative_eq!(c.row(1).sum(), 0.0);
        assert_relative_eq!(cx.rhs()[0], 1.5);
        assert_relative_eq!(cx.rhs()[1], -1.5);
        assert_eq!(cy.num_triplets(), 0);
    }

    /// Free-fixed x system of a net where fixed f has its lower-left corner
    /// at x = 10 and its centre at x = 12.
    fn free_fixed_system(anchor: FixedAnchor) -> ForceSystem {
        let circuit = CircuitBuilder::new()
            .module("f", 10.0, 0.0, 4, 4, true)
            .module("a", 0.0, 0.0, 2, 2, false)
            .module("g", 50.0, 0.0, 4, 4, true)
            .net("n0", &[("f", 1.0, 0.0), ("a", 0.5, 0.0), ("g", 0.0, 0.0)])
            .build();
        let model = NetModel::new(NetModelConfig::new().with_fixed_anchor(anchor));
        let mut nwx = model.new_weights();
        nwx.insert(p(0, 0), p(0, 1), 2.0);
        nwx.insert(p(0, 0), p(0, 2), 7.0);
        let nwy = model.new_weights();

        let mut cx = ForceSystem::new(Axis::X, 1);
        let mut cy = ForceSystem::new(Axis::Y, 1);
        model
            .compute_net_force_matrix(&circuit, &nwx, &nwy, &mut cx, &mut cy)
            .unwrap();
        cx
    }

    #[test]
    fn test_free_fixed_assembly() {
        let cx = free_fixed_system(FixedAnchor::LowerLeft);
        assert_eq!(cx.num_triplets(), 1);
        assert_relative_eq!(cx.diagonal()[0], 2.0);
        assert_relative_eq!(cx.rhs()[0], -21.0);
        // 10 + 1 - 0.5
        let x = cx.solve().unwrap();
        assert_relative_eq!(x[0], 10.5, epsilon = 1e-9);

        let cx = free_fixed_system(FixedAnchor::Center);
        assert_eq!(cx.num_triplets(), 1);
        assert_relative_eq!(cx.diagonal()[0], 2.0);
        assert_relative_eq!(cx.rhs()[0], -25.0);
        // the free pin lands on the fixed pin: 12 + 1 - 0.5
        let x = cx.solve().unwrap();
        assert_relative_eq!(x[0], 12.5, epsilon = 1e-9);
    }

    #[test]
    fn test_assembly_checks_sizes() {
        let circuit = four_module_circuit();
        let model = NetModel::default();
        let (nwx, nwy) = weights_of(&model, &circuit);
        let mut cx = ForceSystem::new(Axis::X, 3);
        let mut cy = ForceSystem::new(Axis::Y, 2);
        let err = model
            .compute_net_force_matrix(&circuit, &nwx, &nwy, &mut cx, &mut cy)
            .unwrap_err();
        assert!(matches!(
            err,
            PlacerError::DimensionMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_assembly_rejects_unknown_pin() {
        let circuit = four_module_circuit();
        let model = NetModel::default();
        let mut nwx = model.new_weights();
        nwx.insert(p(9, 0), p(0, 1), 1.0);
        let err = model
            .compute_net_force_target(&circuit, &nwx, &model.new_weights())
            .unwrap_err();
        assert!(matches!(err, PlacerError::IndexOutOfRange { what: "net", .. }));
    }

    #[test]
    fn test_isolated_module_is_reported() {
        let circuit = CircuitBuilder::new()
            .module("f", 0.0, 0.0, 2, 2, true)
            .module("a", 5.0, 5.0, 2, 2, false)
            .module("lonely", 9.0, 9.0, 2, 2, false)
            .net("n0", &[("f", 0.0, 0.0), ("a", 0.0, 0.0)])
            .build();
        let model = NetModel::default();
        let mut nwx = model.new_weights();
        let mut nwy = model.new_weights();
        nwx.insert(p(0, 0), p(0, 1), 1.0);
        nwy.insert(p(0, 0), p(0, 1), 1.0);

        let err = model.compute_net_force_target(&circuit, &nwx, &nwy).unwrap_err();
        assert!(matches!(
            err,
            PlacerError::UnconstrainedModule { module, axis: Axis::X } if module == "lonely"
        ));
    }

    #[test]
    fn test_floating_pair_is_singular() {
        let circuit = CircuitBuilder::new()
            .module("a", 0.0, 0.0, 2, 2, false)
            .module("b", 5.0, 5.0, 2, 2, false)
            .net("n0", &[("a", 0.0, 0.0), ("b", 0.0, 0.0)])
            .build();
        let model = NetModel::default();
        let mut nwx = model.new_weights();
        let mut nwy = model.new_weights();
        nwx.insert(p(0, 0), p(0, 1), 1.0);
        nwy.insert(p(0, 0), p(0, 1), 1.0);

        let err = model.compute_net_force_target(&circuit, &nwx, &nwy).unwrap_err();
        assert!(matches!(err, PlacerError::SingularMatrix { axis: Axis::X }));
    }

    #[test]
    fn test_no_free_modules() {
        let circuit = CircuitBuilder::new()
            .module("f", 0.0, 0.0, 2, 2, true)
            .module("g", 5.0, 5.0, 2, 2, true)
            .module("h", 9.0, 1.0, 2, 2, true)
            .net("n0", &[("f", 0.0, 0.0), ("g", 0.0, 0.0), ("h", 0.0, 0.0)])
            .build();
        let model = NetModel::default();
        let (nwx, nwy) = weights_of(&model, &circuit);
        assert!(!nwx.is_empty());
        let target = model.compute_net_force_target(&circuit, &nwx, &nwy).unwrap();
        assert_eq!(target, NetForceTarget::default());
    }

    #[test]
    fn test_four_module_round() {
        let mut circuit = four_module_circuit();
        let model = NetModel::default();
        let (nwx, nwy) = weights_of(&model, &circuit);

        // x: a and b are interior, each tied to both fixed pins
        assert_eq!(nwx.len(), 4);
        assert_relative_eq!(nwx.get(p(0, 0), p(0, 1)).unwrap(), 2.0 / 3.0 / 30.0);
        assert_relative_eq!(nwx.get(p(0, 3), p(0, 2)).unwrap(), 2.0 / 3.0 / 40.0);

        // pulled towards the fixed lower-left corners at x = 0 and x = 100
        let target = model.compute_net_force_target(&circuit, &nwx, &nwy).unwrap();
        assert_relative_eq!(target.axis(Axis::X)[0], 30.0, epsilon = 1e-9);
        assert_relative_eq!(target.axis(Axis::X)[1], 60.0, epsilon = 1e-9);
        assert_relative_eq!(target.y[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(target.y[1], 0.0, epsilon = 1e-9);

        circuit
            .set_free_module_coordinates(&target.x, &target.y)
            .unwrap();
        for id in ["a", "b"] {
            let m = circuit.module(id).unwrap();
            assert!(m.x > 0.0 && m.x < 100.0, "{} at {}", id, m.x);
        }
        assert_relative_eq!(circuit.module("a").unwrap().x, 25.0, epsilon = 1e-9);
        assert_relative_eq!(circuit.module("b").unwrap().y, -5.0, epsilon = 1e-9);
        assert_eq!(circuit.module("f1").unwrap().x, 0.0);
        assert_eq!(circuit.module("f2").unwrap().x, 100.0);
    }

    #[test]
    fn test_four_module_round_center_anchor() {
        let mut circuit = four_module_circuit();
        let config = NetModelConfig::new()
            .with_fixed_anchor(FixedAnchor::Center);
        let model = NetModel::new(config);
        let (nwx, nwy) = weights_of(&model, &circuit);

        // pulled towards the fixed centres at x = 5 and x = 105
        let target = model.compute_net_force_target(&circuit, &nwx, &nwy).unwrap();
        assert_relative_eq!(target.x[0], 35.0, epsilon = 1e-9);
        assert_relative_eq!(target.x[1], 65.0, epsilon = 1e-9);
        assert_relative_eq!(target.y[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(target.y[1], 5.0, epsilon = 1e-9);

        circuit
            .set_free_module_coordinates(&target.x, &target.y)
            .unwrap();
        assert_relative_eq!(circuit.module("a").unwrap().x, 30.0, epsilon = 1e-9);
        assert_relative_eq!(circuit.module("b").unwrap().y, 0.0, epsilon = 1e-9);
    }
}
