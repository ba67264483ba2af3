//! Connection values for the routing graph.
//!
//! A [`Connection`] links an output pin to an input pin. It carries no identity
//! beyond its two endpoints, so the same value can be removed, re-added, or
//! looked up by views without any handle bookkeeping.

use std::fmt;

use super::node::NodeId;
use super::pin::PinRef;

/// A directed link from an output pin to an input pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    /// Output pin the signal leaves from.
    pub source: PinRef,
    /// Input pin the signal arrives at.
    pub destination: PinRef,
}

impl Connection {
    /// Creates a connection between two pins.
    ///
    /// No validation happens here; see
    /// [`RoutingGraph::check_connection`](super::RoutingGraph::check_connection).
    #[inline]
    pub const fn new(source: PinRef, destination: PinRef) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Audio connection from `src` output `src_channel` to `dst` input `dst_channel`.
    #[inline]
    pub const fn audio(src: NodeId, src_channel: u32, dst: NodeId, dst_channel: u32) -> Self {
        Self::new(
            PinRef::output(src, src_channel),
            PinRef::input(dst, dst_channel),
        )
    }

    /// Control connection from `src`'s control output to `dst`'s control input.
    #[inline]
    pub const fn control(src: NodeId, dst: NodeId) -> Self {
        Self::new(PinRef::control_output(src), PinRef::control_input(dst))
    }

    /// Returns true if either endpoint belongs to `node`.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.source.node == node || self.destination.node == node
    }

    /// Returns true if either endpoint is a control pin.
    #[inline]
    pub fn is_control(&self) -> bool {
        self.source.is_control() || self.destination.is_control()
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
