//! Parsed Bookshelf records.
//!
//! These are the already-validated record collections the circuit database
//! is loaded from, and the placement records it hands back for printing.

use crate::circuit::IoType;

/// One line of a `.nodes` file: a module's geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Module name
    pub id: String,
    /// Width
    pub width: i64,
    /// Height
    pub height: i64,
    /// Set by a trailing `terminal` keyword
    pub fixed: bool,
    /// Source line number for error reporting
    pub line: usize,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, width: i64, height: i64, fixed: bool) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            fixed,
            line: 0,
        }
    }
}

/// Contents of a `.nodes` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodesFile {
    /// Declared `NumNodes`
    pub num_nodes: usize,
    /// Declared `NumTerminals`
    pub num_terminals: usize,
    /// Module geometry, in file order
    pub nodes: Vec<NodeRecord>,
}

/// One line of a `.pl` file: a module's lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlRecord {
    /// Module name
    pub id: String,
    /// Lower-left x
    pub x: f64,
    /// Lower-left y
    pub y: f64,
    /// Set by a trailing `/FIXED`
    pub fixed: bool,
}

impl PlRecord {
    pub fn new(id: impl Into<String>, x: f64, y: f64, fixed: bool) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            fixed,
        }
    }
}

/// One pin line inside a `.nets` net block.
#[derive(Debug, Clone, PartialEq)]
pub struct PinRecord {
    /// Owning module name
    pub module: String,
    /// Signal direction
    pub io: IoType,
    /// Offset from the module centre along x
    pub dx: f64,
    /// Offset from the module centre along y
    pub dy: f64,
}

impl PinRecord {
    pub fn new(module: impl Into<String>, io: IoType, dx: f64, dy: f64) -> Self {
        Self {
            module: module.into(),
            io,
            dx,
            dy,
        }
    }
}

/// One `NetDegree` block of a `.nets` file.
#[derive(Debug, Clone, PartialEq)]
pub struct NetRecord {
    /// Net name
    pub id: String,
    /// Declared degree
    pub degree: usize,
    /// Pins, in file order
    pub pins: Vec<PinRecord>,
}

impl NetRecord {
    /// Build a net record whose declared degree matches its pin list.
    pub fn new(id: impl Into<String>, pins: Vec<PinRecord>) -> Self {
        Self {
            id: id.into(),
            degree: pins.len(),
            pins,
        }
    }
}

/// Contents of a `.nets` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetsFile {
    /// Declared `NumNets`
    pub num_nets: usize,
    /// Declared `NumPins`
    pub num_pins: usize,
    /// Nets, in file order
    pub nets: Vec<NetRecord>,
}
