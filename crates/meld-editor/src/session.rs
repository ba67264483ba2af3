//! One open routing document and the interaction state around it.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use egui::{Pos2, Vec2};
use meld_config::{ConfigError, EditorSettings, SessionFile};
use meld_core::{
    ChannelKind, Connection, GraphChange, GraphError, NodeId, PlanPublisher, Position,
    ProcessingUnit, RoutingGraph, UnitFactory,
};

use crate::drag::{ConnectionDragController, DragOutcome};
use crate::geometry::WireCurve;
use crate::layout::{EstimatedText, TextMeasure};
use crate::locate::{EndpointLocator, Hit};
use crate::reconcile::{ReconcileReport, ViewReconciler};
use crate::view::CanvasContext;

/// A node being moved with the pointer.
#[derive(Clone, Copy, Debug)]
struct NodeDrag {
    node: NodeId,
    /// Pointer position minus node centre at press time.
    grab: Vec2,
}

/// An editing session: the graph, its views, and the pointer gestures that
/// mutate it.
///
/// The session owns the [`RoutingGraph`] outright. After every mutation it
/// drains the graph's change channel, reconciles the views and, unless the
/// change was a pure move, publishes a fresh execution plan.
pub struct EditorSession {
    name: String,
    graph: RoutingGraph,
    changes: Receiver<GraphChange>,
    views: ViewReconciler,
    drag: ConnectionDragController,
    node_drag: Option<NodeDrag>,
    plans: Arc<PlanPublisher>,
    settings: EditorSettings,
    canvas: Vec2,
    text: Box<dyn TextMeasure>,
    dirty: bool,
}

impl EditorSession {
    /// Opens `graph` for editing.
    pub fn new(name: impl Into<String>, mut graph: RoutingGraph, settings: EditorSettings) -> Self {
        let changes = graph.subscribe();
        let plans = Arc::new(PlanPublisher::new());
        plans.republish(&graph);
        let mut session = Self {
            name: name.into(),
            graph,
            changes,
            views: ViewReconciler::new(),
            drag: ConnectionDragController::new(settings.drag_threshold),
            node_drag: None,
            plans,
            settings,
            canvas: Vec2::new(800.0, 600.0),
            text: Box::new(EstimatedText {
                char_width: settings.char_width,
            }),
            dirty: false,
        };
        session.reconcile();
        session
    }

    /// Opens a session file, creating units through `factory`.
    pub fn from_file(
        file: &SessionFile,
        factory: &dyn UnitFactory,
        settings: EditorSettings,
    ) -> Result<Self, ConfigError> {
        let graph = file.restore(factory)?;
        Ok(Self::new(file.name.clone(), graph, settings))
    }

    /// Replaces the document with the session stored at `path`.
    pub fn load(&mut self, path: impl AsRef<Path>, factory: &dyn UnitFactory) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let file = SessionFile::load(path)?;
        let graph = file.restore(factory)?;
        tracing::info!(path = %path.display(), nodes = graph.node_count(), "session loaded");
        self.replace_graph(file.name, graph);
        Ok(())
    }

    /// Writes the document to `path` and clears the dirty flag.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        self.to_session_file().save(path)?;
        tracing::info!(path = %path.display(), "session saved");
        self.dirty = false;
        Ok(())
    }

    /// Snapshot of the document as a session file.
    pub fn to_session_file(&self) -> SessionFile {
        SessionFile::from_graph(&self.name, &self.graph)
    }

    /// Swaps in a different graph, dropping every view and gesture.
    pub fn replace_graph(&mut self, name: impl Into<String>, mut graph: RoutingGraph) {
        self.changes = graph.subscribe();
        self.graph = graph;
        self.name = name.into();
        self.views.clear();
        self.drag.cancel();
        self.node_drag = None;
        self.plans.republish(&self.graph);
        self.dirty = false;
        self.reconcile();
    }

    // --- Accessors ---

    /// Document name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graph being edited.
    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    /// Current views.
    pub fn views(&self) -> &ViewReconciler {
        &self.views
    }

    /// Plan publisher shared with the audio path.
    pub fn plans(&self) -> Arc<PlanPublisher> {
        Arc::clone(&self.plans)
    }

    /// Current settings.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Canvas size in points.
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas
    }

    /// True if the graph changed since it was loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hit testing against the current views.
    pub fn locator(&self) -> EndpointLocator<'_> {
        EndpointLocator::new(&self.views, &self.settings)
    }

    /// Converts a canvas point into an unclamped relative position.
    pub fn relative_position(&self, pos: Pos2) -> Position {
        CanvasContext::new(self.canvas, &self.settings, self.text.as_ref()).to_relative(pos)
    }

    /// Classifies a canvas point.
    pub fn hit_test(&self, pos: Pos2) -> Hit {
        self.locator().hit_test(pos)
    }

    // --- Configuration ---

    /// Applies new settings and re-lays out every view.
    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
        self.drag.set_threshold(settings.drag_threshold);
        self.reconcile();
    }

    /// Uses real font metrics for node titles.
    pub fn set_text_measure(&mut self, text: Box<dyn TextMeasure>) {
        self.text = text;
        self.reconcile();
    }

    /// Resizes the canvas; views are re-laid out when the size changes.
    pub fn resize(&mut self, size: Vec2) {
        if size != self.canvas {
            self.canvas = size;
            self.reconcile();
        }
    }

    // --- Document commands ---

    /// Adds a node at a relative canvas position.
    pub fn create_node(&mut self, unit: Arc<dyn ProcessingUnit>, position: Position) -> NodeId {
        let id = self.graph.add_node(unit, position);
        self.pump();
        id
    }

    /// Deletes a node and its connections.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if self.node_drag.is_some_and(|d| d.node == id) {
            self.node_drag = None;
        }
        let removed = self.graph.remove_node(id);
        self.pump();
        removed
    }

    /// Removes every connection of a node.
    pub fn disconnect_node(&mut self, id: NodeId) -> usize {
        let removed = self.graph.disconnect_node(id);
        self.pump();
        removed
    }

    /// Adds a connection directly.
    pub fn connect(&mut self, connection: Connection) -> Result<(), GraphError> {
        let result = self.graph.add_connection(connection);
        self.pump();
        result
    }

    /// Removes a connection directly.
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let removed = self.graph.remove_connection(connection);
        self.pump();
        removed
    }

    // --- Pointer gestures ---

    /// Press at a canvas point: starts wiring on pins and wires, or picks up
    /// and raises the node under the pointer.
    pub fn pointer_down(&mut self, pos: Pos2) {
        let locator = EndpointLocator::new(&self.views, &self.settings);
        if self.drag.pointer_down(&locator, pos) {
            return;
        }
        if let Some(node) = locator.find_node_at(pos) {
            let grab = self
                .views
                .node(node)
                .map_or(Vec2::ZERO, |v| pos - v.rect().center());
            self.node_drag = Some(NodeDrag { node, grab });
            self.views.bring_to_front(node);
        }
    }

    /// Pointer travel with the button held.
    pub fn pointer_move(&mut self, pos: Pos2) {
        if self.drag.is_active() {
            let locator = EndpointLocator::new(&self.views, &self.settings);
            self.drag.pointer_move(&mut self.graph, &locator, pos);
        } else if let Some(NodeDrag { node, grab }) = self.node_drag {
            let position = self.relative_position(pos - grab);
            self.graph.set_node_position(node, position);
        }
        self.pump();
    }

    /// Release: completes any gesture in progress.
    pub fn pointer_up(&mut self, pos: Pos2) -> DragOutcome {
        self.node_drag = None;
        let locator = EndpointLocator::new(&self.views, &self.settings);
        let outcome = self.drag.pointer_up(&mut self.graph, &locator, pos);
        if outcome != DragOutcome::Nothing {
            tracing::debug!(?outcome, "wire drag finished");
        }
        self.pump();
        outcome
    }

    /// Abandons any gesture in progress.
    pub fn cancel_gesture(&mut self) -> DragOutcome {
        self.node_drag = None;
        let outcome = self.drag.cancel();
        self.pump();
        outcome
    }

    /// The wire being dragged, if any.
    pub fn drag_preview(&self) -> Option<(WireCurve, ChannelKind)> {
        self.drag.preview()
    }

    /// Text for the status line: the snapped pin during a drag, otherwise the
    /// pin under the pointer.
    pub fn tooltip_at(&self, pos: Pos2) -> Option<String> {
        if self.drag.is_active() {
            return self.drag.tooltip().map(str::to_string);
        }
        self.locator().find_pin_at(pos).map(|hit| hit.tooltip)
    }

    // --- Change handling ---

    /// Drains pending change notifications, refreshes the views and publishes
    /// a new plan if the processing order may have changed. Returns the number
    /// of changes handled.
    pub fn pump(&mut self) -> usize {
        let changes: Vec<GraphChange> = self.changes.try_iter().collect();
        if changes.is_empty() {
            return 0;
        }
        self.dirty = true;
        self.reconcile();
        if changes.iter().any(GraphChange::affects_plan) {
            self.plans.publish(&self.graph);
        }
        changes.len()
    }

    fn reconcile(&mut self) -> ReconcileReport {
        let ctx = CanvasContext::new(self.canvas, &self.settings, self.text.as_ref());
        self.views.reconcile(&self.graph, &ctx)
    }
}
