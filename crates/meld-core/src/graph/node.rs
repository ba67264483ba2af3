//! Graph node types for the routing graph.
//!
//! Each node has a [`NodeId`], a shared reference to the [`ProcessingUnit`] it
//! hosts, and a canvas [`Position`]. Nodes never own connections; the
//! [`RoutingGraph`](super::RoutingGraph) holds the relation between them.

use std::fmt;
use std::sync::Arc;

use super::pin::{CONTROL_CHANNEL, PinRef};
use super::unit::ProcessingUnit;

/// Unique identifier for a node in the routing graph.
///
/// Node IDs are assigned sequentially above the highest id seen, so they are
/// not reused until that range runs out.
/// They remain stable across mutations, save/load round-trips and plan builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Highest id a node may carry. `u32::MAX` is never assigned.
    pub const MAX: NodeId = NodeId(u32::MAX - 1);

    /// Wraps a raw identifier, e.g. one read back from a session file.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric identifier.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Node position relative to the canvas, as fractions of its width and height.
///
/// The position addresses the node's centre. Stored values are always within
/// `[0, 1]` on both axes; see [`Position::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Position {
    /// Horizontal fraction of the canvas width.
    pub x: f64,
    /// Vertical fraction of the canvas height.
    pub y: f64,
}

impl Position {
    /// Creates a position without clamping.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the position with both coordinates clamped to `[0, 1]`.
    ///
    /// NaN coordinates collapse to `0.0`.
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            x: clamp(self.x),
            y: clamp(self.y),
        }
    }
}

/// A processing unit placed on the canvas.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    unit: Arc<dyn ProcessingUnit>,
    position: Position,
}

impl Node {
    pub(crate) fn new(id: NodeId, unit: Arc<dyn ProcessingUnit>, position: Position) -> Self {
        Self {
            id,
            unit,
            position: position.clamped(),
        }
    }

    /// Returns the node identifier.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the hosted processing unit.
    #[inline]
    pub fn unit(&self) -> &Arc<dyn ProcessingUnit> {
        &self.unit
    }

    /// Returns the node's relative canvas position.
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position.clamped();
    }

    /// Number of input pins, including the control input if the unit accepts one.
    pub fn num_inputs(&self) -> u32 {
        self.unit.total_input_channels() + u32::from(self.unit.accepts_control())
    }

    /// Number of output pins, including the control output if the unit produces one.
    pub fn num_outputs(&self) -> u32 {
        self.unit.total_output_channels() + u32::from(self.unit.produces_control())
    }

    /// Returns true if `pin` addresses a channel that currently exists on this node.
    pub fn has_pin(&self, pin: PinRef) -> bool {
        if pin.node != self.id {
            return false;
        }
        if pin.channel == CONTROL_CHANNEL {
            return if pin.is_input {
                self.unit.accepts_control()
            } else {
                self.unit.produces_control()
            };
        }
        let total = if pin.is_input {
            self.unit.total_input_channels()
        } else {
            self.unit.total_output_channels()
        };
        pin.channel < total
    }

    /// Enumerates every pin on one side of the node: audio channels in order,
    /// then the control channel if present.
    pub fn pins(&self, is_input: bool) -> Vec<PinRef> {
        let (total, control) = if is_input {
            (
                self.unit.total_input_channels(),
                self.unit.accepts_control(),
            )
        } else {
            (
                self.unit.total_output_channels(),
                self.unit.produces_control(),
            )
        };
        let mut pins: Vec<PinRef> = (0..total)
            .map(|ch| PinRef::new(self.id, ch, is_input))
            .collect();
        if control {
            pins.push(PinRef::new(self.id, CONTROL_CHANNEL, is_input));
        }
        pins
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("unit", &self.unit.display_name())
            .field("position", &self.position)
            .finish()
    }
}
