//! Core types for circuit representation.

use std::fmt;

/// A placement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Horizontal
    X,
    /// Vertical
    Y,
}

impl Axis {
    /// Both axes, in solve order.
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Index of a net in the circuit database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub usize);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Identity of one pin: the owning net and the pin's position in that net.
///
/// Pins belong to exactly one net, so this is unique across the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinRef {
    pub net: NetId,
    pub index: usize,
}

impl PinRef {
    pub fn new(net: NetId, index: usize) -> Self {
        Self { net, index }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.P{}", self.net, self.index)
    }
}

/// Signal direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoType {
    Output,
    Input,
    Bidirectional,
}

impl IoType {
    /// Parse the single-letter Bookshelf direction code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "O" => Some(IoType::Output),
            "I" => Some(IoType::Input),
            "B" => Some(IoType::Bidirectional),
            _ => None,
        }
    }

    /// The single-letter Bookshelf direction code.
    pub fn code(&self) -> &'static str {
        match self {
            IoType::Output => "O",
            IoType::Input => "I",
            IoType::Bidirectional => "B",
        }
    }
}

/// A placeable rectangle.
///
/// `x` and `y` locate the lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Unique module name
    pub id: String,
    /// Lower-left x coordinate
    pub x: f64,
    /// Lower-left y coordinate
    pub y: f64,
    /// Width in grid units (positive)
    pub width: i64,
    /// Height in grid units (positive)
    pub height: i64,
    /// Fixed modules never move
    pub fixed: bool,
    /// Power density (not used by the wirelength model)
    pub power_density: f64,
}

impl Module {
    /// Lower-left coordinate along an axis.
    pub fn lower(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Size along an axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width as f64,
            Axis::Y => self.height as f64,
        }
    }

    /// Geometric centre along an axis.
    pub fn center(&self, axis: Axis) -> f64 {
        self.lower(axis) + self.extent(axis) / 2.0
    }

    /// Move the module so its centre lands on `center` along `axis`.
    pub fn set_center(&mut self, axis: Axis, center: f64) {
        let lower = center - self.extent(axis) / 2.0;
        match axis {
            Axis::X => self.x = lower,
            Axis::Y => self.y = lower,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width as f64
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y + self.height as f64
    }
}

/// A connection point of a net on a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Name of the owning module, resolved through the database
    pub module: String,
    /// Signal direction
    pub io: IoType,
    /// Offset from the module centre along x
    pub dx: f64,
    /// Offset from the module centre along y
    pub dy: f64,
}

impl Pin {
    /// Offset from the module centre along an axis.
    pub fn offset(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
        }
    }
}

/// An ordered collection of pins sharing one electrical connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Net {
    /// Net name
    pub id: String,
    /// Pins, in file order
    pub pins: Vec<Pin>,
}

impl Net {
    /// Number of pins on the net.
    pub fn degree(&self) -> usize {
        self.pins.len()
    }
}
