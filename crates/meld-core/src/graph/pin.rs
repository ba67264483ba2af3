//! Pin references.
//!
//! A [`PinRef`] addresses a single channel on one side of a node. It is a plain
//! value: two references are equal iff node, channel and side all match.

use std::fmt;

use super::node::NodeId;

/// Reserved channel index addressing a node's control/event channel.
///
/// Audio channels are numbered from zero and never reach this value: a side
/// has at most `u32::MAX` audio channels, so the last index is `u32::MAX - 1`.
pub const CONTROL_CHANNEL: u32 = u32::MAX;

/// Kind of signal a channel carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Sample-rate audio.
    Audio,
    /// Note/event data carried alongside audio.
    Control,
}

/// Reference to one channel on one side of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinRef {
    /// Node owning the pin.
    pub node: NodeId,
    /// Audio channel index, or [`CONTROL_CHANNEL`].
    pub channel: u32,
    /// True for input pins, false for output pins.
    pub is_input: bool,
}

impl PinRef {
    /// Creates a pin reference.
    #[inline]
    pub const fn new(node: NodeId, channel: u32, is_input: bool) -> Self {
        Self {
            node,
            channel,
            is_input,
        }
    }

    /// Audio input channel `channel` of `node`.
    #[inline]
    pub const fn input(node: NodeId, channel: u32) -> Self {
        Self::new(node, channel, true)
    }

    /// Audio output channel `channel` of `node`.
    #[inline]
    pub const fn output(node: NodeId, channel: u32) -> Self {
        Self::new(node, channel, false)
    }

    /// Control input of `node`.
    #[inline]
    pub const fn control_input(node: NodeId) -> Self {
        Self::new(node, CONTROL_CHANNEL, true)
    }

    /// Control output of `node`.
    #[inline]
    pub const fn control_output(node: NodeId) -> Self {
        Self::new(node, CONTROL_CHANNEL, false)
    }

    /// Returns true if this pin addresses the control channel.
    #[inline]
    pub const fn is_control(self) -> bool {
        self.channel == CONTROL_CHANNEL
    }

    /// Returns the kind of signal carried by this pin.
    #[inline]
    pub const fn kind(self) -> ChannelKind {
        if self.is_control() {
            ChannelKind::Control
        } else {
            ChannelKind::Audio
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.is_input { "in" } else { "out" };
        if self.is_control() {
            write!(f, "{}:{side}:ctl", self.node.0)
        } else {
            write!(f, "{}:{side}:{}", self.node.0, self.channel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = PinRef::input(NodeId(1), 0);
        assert_eq!(a, PinRef::new(NodeId(1), 0, true));
        assert_ne!(a, PinRef::output(NodeId(1), 0));
        assert_ne!(a, PinRef::input(NodeId(2), 0));
        assert_ne!(a, PinRef::input(NodeId(1), 1));
    }

    #[test]
    fn control_sentinel_sets_kind() {
        assert_eq!(PinRef::control_input(NodeId(3)).kind(), ChannelKind::Control);
        assert_eq!(PinRef::output(NodeId(3), 7).kind(), ChannelKind::Audio);
    }

    #[test]
    fn display_names_side_and_channel() {
        assert_eq!(PinRef::output(NodeId(2), 1).to_string(), "2:out:1");
        assert_eq!(PinRef::control_input(NodeId(9)).to_string(), "9:in:ctl");
    }
}
