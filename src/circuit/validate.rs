//! Circuit validation.

use std::collections::HashSet;

use tracing::warn;

use super::Circuit;
use crate::bookshelf::{NetRecord, NodeRecord, PlRecord};
use crate::error::{PlacerError, Result};

/// Validate record collections before they are loaded.
///
/// Checks:
/// - Geometry and placement records pair up one-to-one, by position and name
/// - Module sizes are positive and positions finite
/// - Module and net names are unique
/// - Every net lists exactly its declared number of pins
/// - Every pin refers to a known module and has a finite offset
pub fn validate_records(
    nodes: &[NodeRecord],
    placements: &[PlRecord],
    nets: &[NetRecord],
) -> Result<()> {
    if nodes.len() != placements.len() {
        return Err(PlacerError::RecordCountMismatch {
            nodes: nodes.len(),
            placements: placements.len(),
        });
    }

    let mut module_names = HashSet::with_capacity(nodes.len());
    for (index, (node, pl)) in nodes.iter().zip(placements).enumerate() {
        if node.id != pl.id {
            return Err(PlacerError::RecordIdMismatch {
                index,
                node: node.id.clone(),
                placement: pl.id.clone(),
            });
        }
        if node.width <= 0 || node.height <= 0 {
            return Err(PlacerError::InvalidModule {
                module: node.id.clone(),
                message: format!("size {}x{} is not positive", node.width, node.height),
            });
        }
        if !pl.x.is_finite() || !pl.y.is_finite() {
            return Err(PlacerError::InvalidModule {
                module: node.id.clone(),
                message: format!("position ({}, {}) is not finite", pl.x, pl.y),
            });
        }
        if !module_names.insert(node.id.as_str()) {
            return Err(PlacerError::DuplicateModule {
                module: node.id.clone(),
            });
        }
    }

    let mut net_names = HashSet::with_capacity(nets.len());
    for net in nets {
        if net.degree != net.pins.len() {
            return Err(PlacerError::DegreeMismatch {
                net: net.id.clone(),
                declared: net.degree,
                actual: net.pins.len(),
            });
        }
        if !net_names.insert(net.id.as_str()) {
            return Err(PlacerError::DuplicateNet { net: net.id.clone() });
        }
        if let Some(pin) = net
            .pins
            .iter()
            .find(|pin| !module_names.contains(pin.module.as_str()))
        {
            return Err(PlacerError::unknown_module(&pin.module));
        }
        if let Some(pin) = net
            .pins
            .iter()
            .find(|pin| !pin.dx.is_finite() || !pin.dy.is_finite())
        {
            return Err(PlacerError::InvalidModule {
                module: pin.module.clone(),
                message: format!(
                    "pin offset ({}, {}) on net '{}' is not finite",
                    pin.dx, pin.dy, net.id
                ),
            });
        }
    }

    Ok(())
}

/// Indices of free modules with no path to a fixed module.
///
/// Only nets of degree three or more couple modules in the bound-to-bound
/// model, so connectivity is traced through those nets alone. A free module
/// in this list makes the net force system singular.
pub fn unanchored_modules(circuit: &Circuit) -> Result<Vec<usize>> {
    let mut components = DisjointSet::new(circuit.num_modules());

    for (_, net) in circuit.nets() {
        if net.degree() < 3 {
            continue;
        }
        let first = circuit.module_index(&net.pins[0].module)?;
        for pin in &net.pins[1..] {
            let other = circuit.module_index(&pin.module)?;
            components.union(first, other);
        }
    }

    let mut anchored = HashSet::new();
    for index in circuit.num_free()..circuit.num_modules() {
        anchored.insert(components.find(index));
    }

    Ok((0..circuit.num_free())
        .filter(|&index| !anchored.contains(&components.find(index)))
        .collect())
}

/// Validate a loaded circuit for a net force solve.
///
/// Fails on the first free module that cannot reach a fixed module.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    let floating = unanchored_modules(circuit)?;
    if let Some(&first) = floating.first() {
        warn!(
            count = floating.len(),
            "free modules without a path to a fixed module"
        );
        let module = circuit.module_at(first)?;
        return Err(PlacerError::FloatingModule {
            module: module.id.clone(),
            count: floating.len(),
        });
    }
    Ok(())
}

/// Union-find over module indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}
