//! Record and circuit builders shared by unit tests.

use crate::bookshelf::{NetRecord, NodeRecord, PinRecord, PlRecord};
use crate::circuit::{Circuit, IoType};

pub fn node(id: &str, width: i64, height: i64, fixed: bool) -> NodeRecord {
    NodeRecord::new(id, width, height, fixed)
}

pub fn pl(id: &str, x: f64, y: f64) -> PlRecord {
    PlRecord::new(id, x, y, false)
}

pub fn pin(module: &str, dx: f64, dy: f64) -> PinRecord {
    PinRecord::new(module, IoType::Input, dx, dy)
}

pub fn net(id: &str, pins: Vec<PinRecord>) -> NetRecord {
    NetRecord::new(id, pins)
}

/// Collects module and net records and loads them into a [`Circuit`].
#[derive(Default)]
pub struct CircuitBuilder {
    pub nodes: Vec<NodeRecord>,
    pub placements: Vec<PlRecord>,
    pub nets: Vec<NetRecord>,
}

impl CircuitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module with its lower-left corner at `(x, y)`.
    pub fn module(
        mut self,
        id: &str,
        x: f64,
        y: f64,
        width: i64,
        height: i64,
        fixed: bool,
    ) -> Self {
        self.nodes.push(node(id, width, height, fixed));
        self.placements.push(PlRecord::new(id, x, y, fixed));
        self
    }

    /// Add a net; each pin is `(module, dx, dy)`.
    pub fn net(mut self, id: &str, pins: &[(&str, f64, f64)]) -> Self {
        let pins = pins.iter().map(|&(m, dx, dy)| pin(m, dx, dy)).collect();
        self.nets.push(net(id, pins));
        self
    }

    pub fn build(&self) -> Circuit {
        Circuit::from_records("test", &self.nodes, &self.placements, &self.nets)
            .expect("test circuit should load")
    }
}
