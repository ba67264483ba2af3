//! Routing graph: mutation API, connection validation, and change notification.
//!
//! [`RoutingGraph`] is the single source of truth for one editing session. It
//! owns every node and connection, validates each proposed connection, and
//! broadcasts one [`GraphChange`] per applied mutation. Views, execution plans
//! and session files are all derived from it.
//!
//! The graph is mutated on the interaction thread only. The audio path never
//! sees it directly: it reads an [`ExecutionPlan`](super::ExecutionPlan) built
//! after the mutation completes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use thiserror::Error;

use super::change::{ChangeKind, GraphChange};
use super::connection::Connection;
use super::node::{Node, NodeId, Position};
use super::pin::PinRef;
use super::unit::ProcessingUnit;

/// Why a proposed connection is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionRejection {
    /// The source pin is an input.
    #[error("source {0} is not an output pin")]
    SourceNotOutput(PinRef),
    /// The destination pin is an output.
    #[error("destination {0} is not an input pin")]
    DestinationNotInput(PinRef),
    /// Both ends sit on the same node.
    #[error("source and destination are both on node {0}")]
    SelfLoop(NodeId),
    /// An endpoint's node or channel does not exist.
    #[error("pin {0} does not exist")]
    MissingEndpoint(PinRef),
    /// Audio wired to control or vice versa.
    #[error("cannot wire an audio channel to a control channel")]
    KindMismatch,
    /// The exact connection is already present.
    #[error("connection already exists")]
    Duplicate,
}

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A caller-supplied node id is already taken.
    #[error("node {0} already exists")]
    DuplicateId(NodeId),
    /// A caller-supplied node id is above [`NodeId::MAX`].
    #[error("node id {} is out of range", .0.index())]
    IdOutOfRange(NodeId),
    /// The connection failed validation; the graph was not modified.
    #[error("invalid connection {connection}: {reason}")]
    InvalidConnection {
        /// The rejected connection.
        connection: Connection,
        /// Why it was rejected.
        reason: ConnectionRejection,
    },
}

/// Node/connection graph for one editing session.
///
/// # Invariants
///
/// - Every stored connection passed [`check_connection`](Self::check_connection)
///   when inserted, and removing a node removes its connections, so no stored
///   connection ever references a missing node.
/// - Node ids are unique. Auto-allocation never hands out a present id and
///   only reuses absent ones after the range above the highest id is spent.
/// - Each applied mutation bumps [`revision`](Self::revision) by one and sends
///   exactly one [`GraphChange`]; no-op calls send nothing.
///
/// A destination pin may receive any number of connections from distinct
/// sources. The engine sums them.
#[derive(Debug)]
pub struct RoutingGraph {
    nodes: BTreeMap<NodeId, Node>,
    connections: BTreeSet<Connection>,
    next_id: u32,
    revision: u64,
    subscribers: Vec<Sender<GraphChange>>,
}

impl Default for RoutingGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingGraph {
    /// Creates an empty graph. The first allocated id is 1.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            connections: BTreeSet::new(),
            next_id: 1,
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// Registers a new change subscriber.
    ///
    /// The receiver gets every notification raised after this call. Dropped
    /// receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<GraphChange> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Monotonic counter bumped once per applied mutation.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- Queries ---

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns true if the node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterates nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Iterates connections in a stable (sorted) order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.iter()
    }

    /// Iterates connections with either end on `node`.
    pub fn connections_of(&self, node: NodeId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.iter().filter(move |c| c.touches(node))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if exactly this connection is present.
    pub fn is_connected(&self, connection: &Connection) -> bool {
        self.connections.contains(connection)
    }

    /// Returns true if `pin` exists on its node.
    pub fn pin_exists(&self, pin: PinRef) -> bool {
        self.nodes.get(&pin.node).is_some_and(|n| n.has_pin(pin))
    }

    /// Validates a proposed connection without modifying the graph.
    ///
    /// Checks, in order: endpoint roles, self-loop, endpoint existence, channel
    /// kind, duplicate.
    pub fn check_connection(&self, connection: &Connection) -> Result<(), ConnectionRejection> {
        let Connection {
            source,
            destination,
        } = *connection;
        if source.is_input {
            return Err(ConnectionRejection::SourceNotOutput(source));
        }
        if !destination.is_input {
            return Err(ConnectionRejection::DestinationNotInput(destination));
        }
        if source.node == destination.node {
            return Err(ConnectionRejection::SelfLoop(source.node));
        }
        if !self.pin_exists(source) {
            return Err(ConnectionRejection::MissingEndpoint(source));
        }
        if !self.pin_exists(destination) {
            return Err(ConnectionRejection::MissingEndpoint(destination));
        }
        if source.kind() != destination.kind() {
            return Err(ConnectionRejection::KindMismatch);
        }
        if self.connections.contains(connection) {
            return Err(ConnectionRejection::Duplicate);
        }
        Ok(())
    }

    /// Pure predicate: would [`add_connection`](Self::add_connection) succeed?
    pub fn can_connect(&self, connection: &Connection) -> bool {
        self.check_connection(connection).is_ok()
    }

    // --- Node mutations ---

    /// Adds a node hosting `unit` at `position` and returns its fresh id.
    pub fn add_node(&mut self, unit: Arc<dyn ProcessingUnit>, position: Position) -> NodeId {
        let id = self.allocate_id();
        self.insert_node(id, unit, position);
        id
    }

    /// Adds a node under a caller-chosen id (used when restoring a session).
    ///
    /// Later auto-allocated ids continue above the highest id seen.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateId`] if the id is taken,
    /// [`GraphError::IdOutOfRange`] if it is above [`NodeId::MAX`].
    pub fn add_node_with_id(
        &mut self,
        id: NodeId,
        unit: Arc<dyn ProcessingUnit>,
        position: Position,
    ) -> Result<NodeId, GraphError> {
        if id > NodeId::MAX {
            return Err(GraphError::IdOutOfRange(id));
        }
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.insert_node(id, unit, position);
        Ok(id)
    }

    /// Next id above every id handed out so far. Once that range is used up,
    /// falls back to the lowest id not currently present.
    fn allocate_id(&mut self) -> NodeId {
        if self.next_id <= NodeId::MAX.0 {
            let id = NodeId(self.next_id);
            self.next_id += 1;
            return id;
        }
        let mut candidate = 1;
        for id in self.nodes.keys() {
            if id.0 < candidate {
                continue;
            }
            if id.0 != candidate {
                break;
            }
            candidate += 1;
        }
        NodeId(candidate)
    }

    fn insert_node(&mut self, id: NodeId, unit: Arc<dyn ProcessingUnit>, position: Position) {
        #[cfg(feature = "tracing")]
        let name = unit.display_name().to_string();
        debug_assert!(!self.nodes.contains_key(&id));
        self.nodes.insert(id, Node::new(id, unit, position));
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, unit = %name, "graph_add");
        self.notify(ChangeKind::NodeAdded(id));
    }

    /// Removes a node and every connection referencing it.
    ///
    /// Returns `false` (and does nothing) if the node is absent.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        let connections_removed = before - self.connections.len();
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, connections_removed, "graph_remove");
        self.notify(ChangeKind::NodeRemoved {
            node: id,
            connections_removed,
        });
        true
    }

    /// Moves a node; the position is clamped to the unit square.
    ///
    /// Returns `false` if the node is absent. Setting the current position
    /// again is a no-op.
    pub fn set_node_position(&mut self, id: NodeId, position: Position) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        let clamped = position.clamped();
        if node.position() == clamped {
            return true;
        }
        node.set_position(clamped);
        self.notify(ChangeKind::NodeMoved(id));
        true
    }

    /// Removes every node and connection.
    pub fn clear(&mut self) {
        if self.nodes.is_empty() && self.connections.is_empty() {
            return;
        }
        self.nodes.clear();
        self.connections.clear();
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_clear");
        self.notify(ChangeKind::Cleared);
    }

    // --- Connection mutations ---

    /// Adds a connection after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidConnection`] if
    /// [`check_connection`](Self::check_connection) rejects it. The graph is
    /// left untouched in that case.
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), GraphError> {
        self.check_connection(&connection)
            .map_err(|reason| GraphError::InvalidConnection { connection, reason })?;
        self.connections.insert(connection);
        #[cfg(feature = "tracing")]
        tracing::debug!(%connection, "graph_connect");
        self.notify(ChangeKind::ConnectionAdded(connection));
        Ok(())
    }

    /// Removes a connection. Returns `false` if it was not present.
    pub fn remove_connection(&mut self, connection: &Connection) -> bool {
        if !self.connections.remove(connection) {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(%connection, "graph_disconnect");
        self.notify(ChangeKind::ConnectionRemoved(*connection));
        true
    }

    /// Removes every connection touching `node` and returns how many went.
    pub fn disconnect_node(&mut self, node: NodeId) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(node));
        let connections_removed = before - self.connections.len();
        if connections_removed > 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(node = %node, connections_removed, "graph_disconnect_node");
            self.notify(ChangeKind::NodeDisconnected {
                node,
                connections_removed,
            });
        }
        connections_removed
    }

    fn notify(&mut self, kind: ChangeKind) {
        self.revision += 1;
        let change = GraphChange {
            revision: self.revision,
            kind,
        };
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::unit::UnitDescriptor;

    fn stereo(name: &str) -> Arc<dyn ProcessingUnit> {
        UnitDescriptor::new(format!("test.{name}"), name)
            .with_input_bus("Main", 2)
            .with_output_bus("Main", 2)
            .into_unit()
    }

    fn synth() -> Arc<dyn ProcessingUnit> {
        UnitDescriptor::new("test.synth", "Synth")
            .with_output_bus("Main", 2)
            .accepting_control()
            .into_unit()
    }

    fn keys() -> Arc<dyn ProcessingUnit> {
        UnitDescriptor::new("test.keys", "Keys")
            .producing_control()
            .into_unit()
    }

    fn pair() -> (RoutingGraph, NodeId, NodeId) {
        let mut graph = RoutingGraph::new();
        let a = graph.add_node(stereo("A"), Position::new(0.2, 0.2));
        let b = graph.add_node(stereo("B"), Position::new(0.8, 0.8));
        (graph, a, b)
    }

    #[test]
    fn allocated_ids_are_sequential_and_unique() {
        let (mut graph, a, b) = pair();
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        graph.remove_node(b);
        let c = graph.add_node(stereo("C"), Position::default());
        assert_eq!(c.index(), 3, "ids are never reused");
    }

    #[test]
    fn explicit_id_collision_is_rejected() {
        let (mut graph, a, _) = pair();
        let err = graph
            .add_node_with_id(a, stereo("X"), Position::default())
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateId(a));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn explicit_id_advances_allocator() {
        let mut graph = RoutingGraph::new();
        graph
            .add_node_with_id(NodeId(10), stereo("X"), Position::default())
            .unwrap();
        let next = graph.add_node(stereo("Y"), Position::default());
        assert_eq!(next, NodeId(11));
    }

    #[test]
    fn reserved_id_is_rejected() {
        let mut graph = RoutingGraph::new();
        let err = graph
            .add_node_with_id(NodeId(u32::MAX), stereo("X"), Position::default())
            .unwrap_err();
        assert_eq!(err, GraphError::IdOutOfRange(NodeId(u32::MAX)));
        assert!(graph.is_empty());
        assert_eq!(graph.revision(), 0);
    }

    #[test]
    fn allocation_after_highest_id_never_replaces_a_node() {
        let (mut graph, a, _) = pair();
        let top = graph
            .add_node_with_id(NodeId::MAX, stereo("Top"), Position::default())
            .unwrap();
        graph.add_connection(Connection::audio(a, 0, top, 0)).unwrap();

        let fresh = graph.add_node(keys(), Position::default());
        assert_eq!(fresh, NodeId(3), "lowest free id once the range is used up");
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.node(top).unwrap().unit().display_name(), "Top");
        assert!(graph.connections().all(|c| graph.pin_exists(c.source)
            && graph.pin_exists(c.destination)));

        let another = graph.add_node(keys(), Position::default());
        assert_eq!(another, NodeId(4));
    }

    #[test]
    fn duplicate_connection_scenario() {
        let (mut graph, a, b) = pair();
        let first = Connection::audio(a, 0, b, 0);
        assert!(graph.can_connect(&first));
        graph.add_connection(first).unwrap();
        assert!(graph.is_connected(&first));
        assert!(!graph.can_connect(&first));
        assert!(graph.can_connect(&Connection::audio(a, 1, b, 1)));
    }

    #[test]
    fn rejection_reasons() {
        let mut graph = RoutingGraph::new();
        let s = graph.add_node(synth(), Position::default());
        let k = graph.add_node(keys(), Position::default());
        let fx = graph.add_node(stereo("Fx"), Position::default());

        let backwards = Connection::new(PinRef::input(fx, 0), PinRef::input(s, 0));
        assert_eq!(
            graph.check_connection(&backwards),
            Err(ConnectionRejection::SourceNotOutput(PinRef::input(fx, 0)))
        );

        let to_output = Connection::new(PinRef::output(s, 0), PinRef::output(fx, 0));
        assert!(matches!(
            graph.check_connection(&to_output),
            Err(ConnectionRejection::DestinationNotInput(_))
        ));

        let self_loop = Connection::audio(fx, 0, fx, 1);
        assert_eq!(
            graph.check_connection(&self_loop),
            Err(ConnectionRejection::SelfLoop(fx))
        );

        let missing_channel = Connection::audio(s, 5, fx, 0);
        assert_eq!(
            graph.check_connection(&missing_channel),
            Err(ConnectionRejection::MissingEndpoint(PinRef::output(s, 5)))
        );

        let missing_node = Connection::audio(s, 0, NodeId(99), 0);
        assert!(matches!(
            graph.check_connection(&missing_node),
            Err(ConnectionRejection::MissingEndpoint(_))
        ));

        // Keys has a control output, Fx has no control input.
        let no_control_in = Connection::control(k, fx);
        assert!(matches!(
            graph.check_connection(&no_control_in),
            Err(ConnectionRejection::MissingEndpoint(_))
        ));

        let kinds = Connection::new(PinRef::output(fx, 0), PinRef::control_input(s));
        assert_eq!(
            graph.check_connection(&kinds),
            Err(ConnectionRejection::KindMismatch)
        );

        assert!(graph.can_connect(&Connection::control(k, s)));
    }

    #[test]
    fn invalid_connection_is_never_applied() {
        let (mut graph, a, _) = pair();
        let rev = graph.revision();
        let bad = Connection::audio(a, 0, a, 1);
        let err = graph.add_connection(bad).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConnection { .. }));
        assert_eq!(graph.connection_count(), 0);
        assert_eq!(graph.revision(), rev);
    }

    #[test]
    fn fan_in_from_distinct_sources_is_allowed() {
        let mut graph = RoutingGraph::new();
        let a = graph.add_node(stereo("A"), Position::default());
        let b = graph.add_node(stereo("B"), Position::default());
        let mix = graph.add_node(stereo("Mix"), Position::default());
        graph.add_connection(Connection::audio(a, 0, mix, 0)).unwrap();
        graph.add_connection(Connection::audio(b, 0, mix, 0)).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn remove_node_drops_only_its_connections() {
        let mut graph = RoutingGraph::new();
        let a = graph.add_node(stereo("A"), Position::default());
        let b = graph.add_node(stereo("B"), Position::default());
        let c = graph.add_node(stereo("C"), Position::default());
        let ab = Connection::audio(a, 0, b, 0);
        let bc = Connection::audio(b, 0, c, 0);
        let ac = Connection::audio(a, 1, c, 1);
        for conn in [ab, bc, ac] {
            graph.add_connection(conn).unwrap();
        }

        assert!(graph.remove_node(b));
        assert!(!graph.is_connected(&ab));
        assert!(!graph.is_connected(&bc));
        assert!(graph.is_connected(&ac));
        assert!(!graph.remove_node(b), "second removal is a no-op");
    }

    #[test]
    fn remove_connection_is_idempotent() {
        let (mut graph, a, b) = pair();
        let c = Connection::audio(a, 0, b, 0);
        graph.add_connection(c).unwrap();
        assert!(graph.remove_connection(&c));
        let rev = graph.revision();
        assert!(!graph.remove_connection(&c));
        assert_eq!(graph.revision(), rev);
    }

    #[test]
    fn disconnect_node_clears_both_directions() {
        let mut graph = RoutingGraph::new();
        let a = graph.add_node(stereo("A"), Position::default());
        let b = graph.add_node(stereo("B"), Position::default());
        let c = graph.add_node(stereo("C"), Position::default());
        graph.add_connection(Connection::audio(a, 0, b, 0)).unwrap();
        graph.add_connection(Connection::audio(b, 0, c, 0)).unwrap();
        graph.add_connection(Connection::audio(a, 1, c, 1)).unwrap();

        assert_eq!(graph.disconnect_node(b), 2);
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.contains_node(b));
        assert_eq!(graph.disconnect_node(b), 0);
    }

    #[test]
    fn set_position_clamps() {
        let (mut graph, a, _) = pair();
        assert!(graph.set_node_position(a, Position::new(1.5, -1.0)));
        assert_eq!(graph.node(a).unwrap().position(), Position::new(1.0, 0.0));
        assert!(!graph.set_node_position(NodeId(42), Position::default()));
    }

    #[test]
    fn one_notification_per_mutation() {
        let (mut graph, a, b) = pair();
        let rx = graph.subscribe();
        let c = Connection::audio(a, 0, b, 0);

        graph.add_connection(c).unwrap();
        graph.add_connection(Connection::audio(a, 1, b, 1)).unwrap();
        graph.remove_node(a);
        graph.remove_node(a);
        graph.set_node_position(b, Position::new(0.1, 0.1));

        let changes: Vec<GraphChange> = rx.try_iter().collect();
        assert_eq!(changes.len(), 4);
        assert_eq!(changes[0].kind, ChangeKind::ConnectionAdded(c));
        assert_eq!(
            changes[2].kind,
            ChangeKind::NodeRemoved {
                node: a,
                connections_removed: 2
            }
        );
        assert_eq!(changes[3].kind, ChangeKind::NodeMoved(b));
        assert_eq!(changes[3].revision, graph.revision());
    }

    #[test]
    fn notification_observes_completed_mutation() {
        let (mut graph, a, b) = pair();
        let rx = graph.subscribe();
        graph.add_connection(Connection::audio(a, 0, b, 0)).unwrap();
        graph.remove_node(a);
        for change in rx.try_iter() {
            if let ChangeKind::NodeRemoved { node, .. } = change.kind {
                assert!(!graph.contains_node(node));
                assert!(graph.connections_of(node).next().is_none());
            }
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let (mut graph, _, _) = pair();
        let rx = graph.subscribe();
        drop(rx);
        graph.add_node(stereo("C"), Position::default());
        assert!(graph.subscribers.is_empty());
    }

    #[test]
    fn clear_empties_and_notifies_once() {
        let (mut graph, a, b) = pair();
        graph.add_connection(Connection::audio(a, 0, b, 0)).unwrap();
        let rx = graph.subscribe();
        graph.clear();
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.connection_count(), 0);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn error_messages_name_the_connection() {
        let (mut graph, a, _) = pair();
        let err = graph
            .add_connection(Connection::audio(a, 0, a, 1))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1:out:0 -> 1:in:1"), "got: {msg}");
        assert!(msg.contains("both on node"), "got: {msg}");
    }
}
