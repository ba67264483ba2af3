//! Keeps the canvas views in step with the routing graph.
//!
//! Each pass drops views whose model entry is gone, creates views for entries
//! that lack one, then refreshes every survivor. A second pass over an
//! unchanged graph changes nothing.

use std::collections::BTreeMap;

use meld_core::{Connection, NodeId, RoutingGraph};

use crate::view::{CanvasContext, ConnectionView, NodeView};

/// What a reconciliation pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Node views created.
    pub nodes_added: usize,
    /// Node views dropped.
    pub nodes_removed: usize,
    /// Connection views created.
    pub connections_added: usize,
    /// Connection views dropped.
    pub connections_removed: usize,
}

impl ReconcileReport {
    /// True if no view was created or dropped.
    pub fn is_unchanged(&self) -> bool {
        *self == Self::default()
    }
}

/// Owns the node and connection views and their stacking order.
#[derive(Debug, Default)]
pub struct ViewReconciler {
    nodes: BTreeMap<NodeId, NodeView>,
    connections: BTreeMap<Connection, ConnectionView>,
    /// Bottom-most first.
    z_order: Vec<NodeId>,
}

impl ViewReconciler {
    /// Creates a reconciler with no views.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the views in line with `graph`.
    pub fn reconcile(&mut self, graph: &RoutingGraph, ctx: &CanvasContext<'_>) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let before = self.nodes.len();
        self.nodes.retain(|id, _| graph.contains_node(*id));
        report.nodes_removed = before - self.nodes.len();
        self.z_order.retain(|id| graph.contains_node(*id));

        let before = self.connections.len();
        self.connections.retain(|c, _| graph.is_connected(c));
        report.connections_removed = before - self.connections.len();

        for node in graph.nodes() {
            let view = self.nodes.entry(node.id()).or_insert_with(|| {
                report.nodes_added += 1;
                self.z_order.push(node.id());
                NodeView::new(node.id())
            });
            view.update(node, ctx);
        }

        for connection in graph.connections() {
            self.connections
                .entry(*connection)
                .or_insert_with(|| {
                    report.connections_added += 1;
                    ConnectionView::new(*connection)
                });
        }
        for view in self.connections.values_mut() {
            // Every stored connection has both nodes, so this always attaches.
            view.update(&self.nodes);
        }

        if !report.is_unchanged() {
            tracing::trace!(?report, "views reconciled");
        }
        report
    }

    /// Drops every view.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.z_order.clear();
    }

    /// Moves a node to the top of the stacking order.
    pub fn bring_to_front(&mut self, id: NodeId) {
        if let Some(index) = self.z_order.iter().position(|n| *n == id) {
            let id = self.z_order.remove(index);
            self.z_order.push(id);
        }
    }

    /// View of one node.
    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.get(&id)
    }

    /// View of one connection.
    pub fn connection(&self, connection: &Connection) -> Option<&ConnectionView> {
        self.connections.get(connection)
    }

    /// Node views in paint order (bottom-most first).
    pub fn nodes_bottom_up(&self) -> impl Iterator<Item = &NodeView> + '_ {
        self.z_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Node views in hit-test order (top-most first).
    pub fn nodes_top_down(&self) -> impl Iterator<Item = &NodeView> + '_ {
        self.z_order.iter().rev().filter_map(|id| self.nodes.get(id))
    }

    /// All connection views.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionView> + '_ {
        self.connections.values()
    }

    /// Number of node views.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of connection views.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
