//! Circuit database.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::{Axis, Module, Net, NetId, Pin, PinRef};
use super::validate::validate_records;
use crate::bookshelf::{self, NetRecord, NodeRecord, PlRecord};
use crate::error::{PlacerError, Result};
use crate::DEFAULT_POWER_DENSITY;

/// The in-memory circuit: modules, nets, pins and lookup tables.
///
/// Free modules always occupy indices `[0, num_free)` and fixed modules
/// `[num_free, num_modules)`, so a free module's index doubles as its row
/// and column in the net force systems.
#[derive(Debug, Default)]
pub struct Circuit {
    /// Benchmark name, used for snapshot file names
    name: String,

    /// All modules, free ones first
    modules: Vec<Module>,

    /// All nets, in load order
    nets: Vec<Net>,

    /// Mapping from module names to indices
    module_map: HashMap<String, usize>,

    /// Mapping from net names to net IDs
    net_map: HashMap<String, NetId>,

    /// Number of free modules
    num_free: usize,

    /// Total number of pins over all nets
    num_pins: usize,

    /// Largest right edge at load time
    chip_width: f64,

    /// Largest top edge at load time
    chip_height: f64,

    /// Counter for versioned placement snapshots
    snapshot_version: usize,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from parsed records.
    ///
    /// The i-th geometry record pairs with the i-th placement record. Free
    /// modules are moved ahead of fixed ones, keeping load order within each
    /// group.
    pub fn from_records(
        name: &str,
        nodes: &[NodeRecord],
        placements: &[PlRecord],
        nets: &[NetRecord],
    ) -> Result<Self> {
        validate_records(nodes, placements, nets)?;

        let (mut modules, fixed): (Vec<Module>, Vec<Module>) = nodes
            .iter()
            .zip(placements)
            .map(|(node, pl)| Module {
                id: node.id.clone(),
                x: pl.x,
                y: pl.y,
                width: node.width,
                height: node.height,
                fixed: node.fixed || pl.fixed,
                power_density: DEFAULT_POWER_DENSITY,
            })
            .partition(|module| !module.fixed);
        let num_free = modules.len();
        modules.extend(fixed);

        let mut module_map = HashMap::with_capacity(modules.len());
        let mut chip_width = 0.0f64;
        let mut chip_height = 0.0f64;
        for (index, module) in modules.iter().enumerate() {
            module_map.insert(module.id.clone(), index);
            chip_width = chip_width.max(module.right());
            chip_height = chip_height.max(module.top());
        }

        let mut net_map = HashMap::with_capacity(nets.len());
        let mut circuit_nets = Vec::with_capacity(nets.len());
        let mut num_pins = 0usize;
        for (index, record) in nets.iter().enumerate() {
            let pins: Vec<Pin> = record
                .pins
                .iter()
                .map(|p| Pin {
                    module: p.module.clone(),
                    io: p.io,
                    dx: p.dx,
                    dy: p.dy,
                })
                .collect();
            num_pins += pins.len();
            net_map.insert(record.id.clone(), NetId(index));
            circuit_nets.push(Net {
                id: record.id.clone(),
                pins,
            });
        }

        info!(
            benchmark = name,
            modules = modules.len(),
            free = num_free,
            nets = circuit_nets.len(),
            pins = num_pins,
            chip_width,
            chip_height,
            "loaded circuit"
        );

        Ok(Circuit {
            name: name.to_string(),
            modules,
            nets: circuit_nets,
            module_map,
            net_map,
            num_free,
            num_pins,
            chip_width,
            chip_height,
            snapshot_version: 0,
        })
    }

    /// Replace the contents of this database with the given records.
    ///
    /// The database is cleared first; if the records are rejected it stays
    /// empty.
    pub fn load(
        &mut self,
        name: &str,
        nodes: &[NodeRecord],
        placements: &[PlRecord],
        nets: &[NetRecord],
    ) -> Result<()> {
        self.clear();
        *self = Self::from_records(name, nodes, placements, nets)?;
        Ok(())
    }

    /// Remove all modules and nets.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.nets.is_empty()
    }

    /// Total number of modules.
    pub fn num_modules(&self) -> usize {
        self.modules.len()
    }

    /// Number of free modules.
    pub fn num_free(&self) -> usize {
        self.num_free
    }

    /// Number of fixed modules.
    pub fn num_fixed(&self) -> usize {
        self.modules.len() - self.num_free
    }

    /// Number of nets.
    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    /// Number of pins over all nets.
    pub fn num_pins(&self) -> usize {
        self.num_pins
    }

    /// Chip width (largest right edge at load time).
    pub fn chip_width(&self) -> f64 {
        self.chip_width
    }

    /// Chip height (largest top edge at load time).
    pub fn chip_height(&self) -> f64 {
        self.chip_height
    }

    /// All modules, free ones first.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// The free modules, in system index order.
    pub fn free_modules(&self) -> &[Module] {
        &self.modules[..self.num_free]
    }

    /// Look up a module by name.
    pub fn module(&self, id: &str) -> Result<&Module> {
        let index = self.module_index(id)?;
        Ok(&self.modules[index])
    }

    /// Look up a module by name, mutably.
    pub fn module_mut(&mut self, id: &str) -> Result<&mut Module> {
        let index = self.module_index(id)?;
        Ok(&mut self.modules[index])
    }

    /// Look up a module by index.
    pub fn module_at(&self, index: usize) -> Result<&Module> {
        let len = self.modules.len();
        self.modules.get(index).ok_or(PlacerError::IndexOutOfRange {
            what: "module",
            index,
            len,
        })
    }

    /// Look up a module by index, mutably.
    pub fn module_at_mut(&mut self, index: usize) -> Result<&mut Module> {
        let len = self.modules.len();
        self.modules.get_mut(index).ok_or(PlacerError::IndexOutOfRange {
            what: "module",
            index,
            len,
        })
    }

    /// Index of a module.
    pub fn module_index(&self, id: &str) -> Result<usize> {
        self.module_map
            .get(id)
            .copied()
            .ok_or_else(|| PlacerError::unknown_module(id))
    }

    /// Whether a module is fixed.
    pub fn is_module_fixed(&self, id: &str) -> Result<bool> {
        Ok(self.module(id)?.fixed)
    }

    /// Row/column of a module in the net force systems.
    /// Returns None for fixed modules.
    pub fn system_index(&self, index: usize) -> Option<usize> {
        (index < self.num_free).then_some(index)
    }

    /// Iterate over all nets.
    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets.iter().enumerate().map(|(i, net)| (NetId(i), net))
    }

    /// Look up a net by name.
    pub fn net(&self, id: &str) -> Result<&Net> {
        let net_id = self
            .net_map
            .get(id)
            .copied()
            .ok_or_else(|| PlacerError::UnknownNet { net: id.to_string() })?;
        self.net_at(net_id)
    }

    /// Look up a net by ID.
    pub fn net_at(&self, id: NetId) -> Result<&Net> {
        let len = self.nets.len();
        self.nets.get(id.0).ok_or(PlacerError::IndexOutOfRange {
            what: "net",
            index: id.0,
            len,
        })
    }

    /// Look up a pin.
    pub fn pin(&self, pin: PinRef) -> Result<&Pin> {
        let net = self.net_at(pin.net)?;
        net.pins.get(pin.index).ok_or(PlacerError::IndexOutOfRange {
            what: "pin",
            index: pin.index,
            len: net.pins.len(),
        })
    }

    /// Absolute coordinate of a pin along an axis.
    pub fn pin_position(&self, pin: &Pin, axis: Axis) -> Result<f64> {
        let module = self.module(&pin.module)?;
        Ok(module.center(axis) + pin.offset(axis))
    }

    /// Move the free modules to the given centre coordinates.
    ///
    /// `xs[i]`, `ys[i]` is the target centre of free module `i`; the stored
    /// lower-left corner becomes the centre minus half the module size.
    /// Fixed modules are not touched.
    pub fn set_free_module_coordinates(&mut self, xs: &[f64], ys: &[f64]) -> Result<()> {
        for (what, coords) in [("x targets", xs), ("y targets", ys)] {
            if coords.len() != self.num_free {
                return Err(PlacerError::DimensionMismatch {
                    what,
                    expected: self.num_free,
                    actual: coords.len(),
                });
            }
        }

        for (module, (&x, &y)) in self.modules[..self.num_free]
            .iter_mut()
            .zip(xs.iter().zip(ys))
        {
            module.set_center(Axis::X, x);
            module.set_center(Axis::Y, y);
        }

        debug!(count = self.num_free, "moved free modules");
        Ok(())
    }

    /// Placement records for every module, in database order.
    pub fn placement_records(&self) -> Vec<PlRecord> {
        self.modules
            .iter()
            .map(|m| PlRecord::new(m.id.clone(), m.x, m.y, m.fixed))
            .collect()
    }

    /// Half-perimeter wirelength of one net.
    pub fn net_hpwl(&self, net: &Net) -> Result<f64> {
        if net.degree() < 2 {
            return Ok(0.0);
        }

        let mut total = 0.0;
        for axis in Axis::ALL {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for pin in &net.pins {
                let pos = self.pin_position(pin, axis)?;
                lo = lo.min(pos);
                hi = hi.max(pos);
            }
            total += hi - lo;
        }
        Ok(total)
    }

    /// Total half-perimeter wirelength over all nets.
    pub fn hpwl(&self) -> Result<f64> {
        self.nets.iter().map(|net| self.net_hpwl(net)).sum()
    }

    /// Write the current placement as a Bookshelf `.pl` file in `dir`.
    ///
    /// With `with_version` the file is named `<name>_<n>.pl`, where `n`
    /// counts up from 0 on each call; otherwise `<name>.pl`.
    pub fn generate_placement_snapshot(
        &mut self,
        dir: &Path,
        with_version: bool,
    ) -> Result<PathBuf> {
        let file_name = if with_version {
            let name = format!("{}_{}.pl", self.name, self.snapshot_version);
            self.snapshot_version += 1;
            name
        } else {
            format!("{}.pl", self.name)
        };

        let path = dir.join(file_name);
        bookshelf::write_pl_file(&path, &self.placement_records())?;
        info!(path = %path.display(), "wrote placement snapshot");
        Ok(path)
    }
}
