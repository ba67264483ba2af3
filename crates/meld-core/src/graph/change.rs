//! Change notifications raised by the routing graph.
//!
//! Every applied mutation produces exactly one [`GraphChange`], sent to each
//! subscriber after the mutation is complete. Subscribers receive them over an
//! unbounded `crossbeam_channel` and drain them on the interaction thread.

use super::connection::Connection;
use super::node::NodeId;

/// What a single mutation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// A node was added.
    NodeAdded(NodeId),
    /// A node was removed together with its connections.
    NodeRemoved {
        /// The removed node.
        node: NodeId,
        /// How many connections went with it.
        connections_removed: usize,
    },
    /// A node's canvas position changed.
    NodeMoved(NodeId),
    /// A connection was added.
    ConnectionAdded(Connection),
    /// A connection was removed.
    ConnectionRemoved(Connection),
    /// Every connection touching a node was removed.
    NodeDisconnected {
        /// The node whose pins were cleared.
        node: NodeId,
        /// Number of connections removed.
        connections_removed: usize,
    },
    /// The whole graph was emptied.
    Cleared,
}

/// A change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphChange {
    /// Graph revision after the change was applied.
    pub revision: u64,
    /// The mutation that happened.
    pub kind: ChangeKind,
}

impl GraphChange {
    /// Returns true if the change altered the connection set.
    pub fn affects_connections(&self) -> bool {
        match self.kind {
            ChangeKind::ConnectionAdded(_)
            | ChangeKind::ConnectionRemoved(_)
            | ChangeKind::Cleared => true,
            ChangeKind::NodeRemoved {
                connections_removed,
                ..
            }
            | ChangeKind::NodeDisconnected {
                connections_removed,
                ..
            } => connections_removed > 0,
            ChangeKind::NodeAdded(_) | ChangeKind::NodeMoved(_) => false,
        }
    }

    /// Returns true if the change can alter the processing order of an
    /// execution plan. Node moves are purely visual.
    pub fn affects_plan(&self) -> bool {
        !matches!(self.kind, ChangeKind::NodeMoved(_))
    }
}
