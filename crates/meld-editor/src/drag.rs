//! Interactive wiring: creating connections by dragging from a pin and
//! relocating existing connections by dragging their wire.
//!
//! The controller is a plain state value advanced by [`pointer_down`],
//! [`pointer_move`] and [`pointer_up`]. It mutates the graph in exactly two
//! places: when a wire drag starts (the dragged connection is removed) and on
//! release over a pin of the opposite role (the new connection is added if the
//! graph accepts it). Everything else only changes the preview.
//!
//! [`pointer_down`]: ConnectionDragController::pointer_down
//! [`pointer_move`]: ConnectionDragController::pointer_move
//! [`pointer_up`]: ConnectionDragController::pointer_up

use egui::Pos2;
use meld_core::{ChannelKind, Connection, PinRef, RoutingGraph};

use crate::geometry::WireCurve;
use crate::locate::{EndpointLocator, PinHit};

/// The loose wire being dragged.
#[derive(Clone, Debug, PartialEq)]
pub struct DragWire {
    /// Pin the wire stays attached to.
    pub anchor: PinRef,
    /// Canvas position of the anchor pin's centre.
    pub anchor_pos: Pos2,
    /// Canvas position of the free end.
    pub free_end: Pos2,
    /// Compatible pin the free end is snapped to, with its tooltip.
    pub snapped: Option<(PinRef, String)>,
}

impl DragWire {
    fn new(anchor: PinRef, anchor_pos: Pos2, pointer: Pos2) -> Self {
        Self {
            anchor,
            anchor_pos,
            free_end: pointer,
            snapped: None,
        }
    }

    /// Connection formed by anchoring to `other`, oriented output to input.
    fn connection_to(&self, other: PinRef) -> Connection {
        if self.anchor.is_input {
            Connection::new(other, self.anchor)
        } else {
            Connection::new(self.anchor, other)
        }
    }

    /// Curve from the output end to the input end.
    pub fn curve(&self) -> WireCurve {
        if self.anchor.is_input {
            WireCurve::new(self.free_end, self.anchor_pos)
        } else {
            WireCurve::new(self.anchor_pos, self.free_end)
        }
    }
}

/// Drag state.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Pressed on a wire; becomes a relocation once the pointer travels far
    /// enough. Releasing before that changes nothing.
    PendingRelocate {
        /// The wire that was pressed.
        connection: Connection,
        /// Where the press happened.
        press: Pos2,
    },
    /// Dragging a new wire out of an output pin.
    DraggingNewFromOutput(DragWire),
    /// Dragging a new wire out of an input pin.
    DraggingNewFromInput(DragWire),
    /// Dragging one end of a connection that has already been removed.
    RelocatingExisting {
        /// The removed connection.
        original: Connection,
        /// The wire, anchored at the end that stayed put.
        wire: DragWire,
    },
}

/// Result of releasing the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// No drag was in progress, or a wire was pressed and released in place.
    Nothing,
    /// A connection was added.
    Connected(Connection),
    /// A new wire was dropped without connecting.
    Abandoned,
    /// A relocated connection was dropped without reconnecting and stays
    /// removed.
    Deleted(Connection),
}

/// State machine for drag wiring.
#[derive(Debug, Default)]
pub struct ConnectionDragController {
    state: DragState,
    threshold: f32,
}

impl ConnectionDragController {
    /// Creates an idle controller; wire presses turn into drags after
    /// `threshold` points of travel.
    pub fn new(threshold: f32) -> Self {
        Self {
            state: DragState::Idle,
            threshold,
        }
    }

    /// Current state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// True unless idle.
    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Changes the relocation threshold.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    fn wire(&self) -> Option<&DragWire> {
        match &self.state {
            DragState::DraggingNewFromOutput(w)
            | DragState::DraggingNewFromInput(w)
            | DragState::RelocatingExisting { wire: w, .. } => Some(w),
            DragState::Idle | DragState::PendingRelocate { .. } => None,
        }
    }

    fn wire_mut(&mut self) -> Option<&mut DragWire> {
        match &mut self.state {
            DragState::DraggingNewFromOutput(w)
            | DragState::DraggingNewFromInput(w)
            | DragState::RelocatingExisting { wire: w, .. } => Some(w),
            DragState::Idle | DragState::PendingRelocate { .. } => None,
        }
    }

    /// Curve to draw for the wire being dragged, with its signal kind.
    pub fn preview(&self) -> Option<(WireCurve, ChannelKind)> {
        self.wire().map(|w| (w.curve(), w.anchor.kind()))
    }

    /// Tooltip of the pin the free end is snapped to.
    pub fn tooltip(&self) -> Option<&str> {
        self.wire()
            .and_then(|w| w.snapped.as_ref())
            .map(|(_, text)| text.as_str())
    }

    /// Handles a press. Returns true if the press started a wiring gesture
    /// (on a pin or a wire); other presses are left to the caller.
    pub fn pointer_down(&mut self, locator: &EndpointLocator<'_>, pos: Pos2) -> bool {
        if self.is_active() {
            return true;
        }
        if let Some(PinHit { pin, center, .. }) = locator.find_pin_at(pos) {
            let wire = DragWire::new(pin, center, pos);
            self.state = if pin.is_input {
                DragState::DraggingNewFromInput(wire)
            } else {
                DragState::DraggingNewFromOutput(wire)
            };
            tracing::debug!(%pin, "wire drag started");
            return true;
        }
        if let Some(connection) = locator.find_connection_at(pos) {
            self.state = DragState::PendingRelocate {
                connection,
                press: pos,
            };
            return true;
        }
        false
    }

    /// Handles pointer travel while a gesture is active.
    pub fn pointer_move(
        &mut self,
        graph: &mut RoutingGraph,
        locator: &EndpointLocator<'_>,
        pos: Pos2,
    ) {
        if let DragState::PendingRelocate { connection, press } = self.state {
            if press.distance(pos) < self.threshold {
                return;
            }
            self.begin_relocate(graph, locator, connection, press);
        }

        let Some(wire) = self.wire_mut() else {
            return;
        };
        wire.free_end = pos;
        wire.snapped = None;
        if let Some(hit) = locator.find_pin_at(pos)
            && hit.pin.is_input != wire.anchor.is_input
            && graph.can_connect(&wire.connection_to(hit.pin))
        {
            wire.free_end = hit.center;
            wire.snapped = Some((hit.pin, hit.tooltip));
        }
    }

    /// Removes the pressed connection and frees the end nearer the press.
    fn begin_relocate(
        &mut self,
        graph: &mut RoutingGraph,
        locator: &EndpointLocator<'_>,
        connection: Connection,
        press: Pos2,
    ) {
        let Some((start, end)) = locator.connection_ends(&connection) else {
            self.state = DragState::Idle;
            return;
        };
        if !graph.remove_connection(&connection) {
            self.state = DragState::Idle;
            return;
        }
        // Ties free the destination end.
        let wire = if press.distance(start) < press.distance(end) {
            DragWire::new(connection.destination, end, press)
        } else {
            DragWire::new(connection.source, start, press)
        };
        tracing::debug!(%connection, anchor = %wire.anchor, "relocating connection");
        self.state = DragState::RelocatingExisting {
            original: connection,
            wire,
        };
    }

    /// Handles the release and returns what happened.
    pub fn pointer_up(
        &mut self,
        graph: &mut RoutingGraph,
        locator: &EndpointLocator<'_>,
        pos: Pos2,
    ) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let (wire, original) = match state {
            DragState::Idle | DragState::PendingRelocate { .. } => return DragOutcome::Nothing,
            DragState::DraggingNewFromOutput(w) | DragState::DraggingNewFromInput(w) => (w, None),
            DragState::RelocatingExisting { original, wire } => (wire, Some(original)),
        };

        let connected = locator
            .find_pin_at(pos)
            .filter(|hit| hit.pin.is_input != wire.anchor.is_input)
            .map(|hit| wire.connection_to(hit.pin))
            .and_then(|c| match graph.add_connection(c) {
                Ok(()) => Some(c),
                Err(err) => {
                    tracing::debug!(%err, "drop target refused");
                    None
                }
            });

        match (connected, original) {
            (Some(c), _) => DragOutcome::Connected(c),
            (None, Some(original)) => DragOutcome::Deleted(original),
            (None, None) => DragOutcome::Abandoned,
        }
    }

    /// Abandons any gesture. A relocation in progress keeps its connection
    /// removed, as if dropped on empty canvas.
    pub fn cancel(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle | DragState::PendingRelocate { .. } => DragOutcome::Nothing,
            DragState::DraggingNewFromOutput(_) | DragState::DraggingNewFromInput(_) => {
                DragOutcome::Abandoned
            }
            DragState::RelocatingExisting { original, .. } => DragOutcome::Deleted(original),
        }
    }
}
