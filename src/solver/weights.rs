//! Pairwise pin weights produced by the net model.

use std::collections::btree_map::{self, BTreeMap};

use tracing::warn;

use crate::circuit::PinRef;
use crate::config::WeightMerge;

/// Weight mapping for one axis, keyed by an ordered `(boundary, interior)`
/// pin pair.
///
/// Iteration order is the key order, so assembling a system from the same
/// weights always visits the pairs in the same sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetWeights {
    merge: WeightMerge,
    entries: BTreeMap<(PinRef, PinRef), f64>,
}

impl NetWeights {
    /// Create an empty mapping with the given merge policy.
    pub fn new(merge: WeightMerge) -> Self {
        Self {
            merge,
            entries: BTreeMap::new(),
        }
    }

    /// Merge policy for repeated keys.
    pub fn merge(&self) -> WeightMerge {
        self.merge
    }

    /// Record a weight for `(a, b)`.
    ///
    /// Returns the previous weight if the key was already present.
    pub fn insert(&mut self, a: PinRef, b: PinRef, weight: f64) -> Option<f64> {
        match self.entries.entry((a, b)) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(weight);
                None
            }
            btree_map::Entry::Occupied(mut slot) => {
                let previous = *slot.get();
                match self.merge {
                    WeightMerge::Overwrite => {
                        warn!(%a, %b, previous, weight, "overwriting net weight");
                        *slot.get_mut() = weight;
                    }
                    WeightMerge::Accumulate => *slot.get_mut() += weight,
                }
                Some(previous)
            }
        }
    }

    /// Weight recorded for `(a, b)`.
    pub fn get(&self, a: PinRef, b: PinRef) -> Option<f64> {
        self.entries.get(&(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries, keeping the merge policy.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over `((a, b), weight)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = ((PinRef, PinRef), f64)> + '_ {
        self.entries.iter().map(|(&key, &weight)| (key, weight))
    }
}
