//! Canvas views of graph entries.
//!
//! Views never own or point into the graph. Each one is keyed by a stable
//! model identifier ([`NodeId`] or [`Connection`]) and refreshed from the
//! graph by [`update`](NodeView::update) whenever the reconciler runs.

use std::collections::BTreeMap;

use egui::{Pos2, Rect, Vec2, pos2};
use meld_config::EditorSettings;
use meld_core::{ChannelKind, Connection, Node, NodeId, PinRef, Position};

use crate::geometry::WireCurve;
use crate::layout::{PinLayoutEngine, TextMeasure};

/// Read-only canvas state handed to view updates.
pub struct CanvasContext<'a> {
    /// Canvas size in points.
    pub size: Vec2,
    /// Layout engine built from the current settings.
    pub layout: PinLayoutEngine,
    /// Title text measurement.
    pub text: &'a dyn TextMeasure,
}

impl<'a> CanvasContext<'a> {
    /// Creates a context for a canvas of `size`.
    pub fn new(size: Vec2, settings: &EditorSettings, text: &'a dyn TextMeasure) -> Self {
        Self {
            size,
            layout: PinLayoutEngine::new(settings),
            text,
        }
    }

    /// Converts a relative node position to canvas coordinates.
    pub fn to_canvas(&self, position: Position) -> Pos2 {
        pos2(
            (position.x as f32) * self.size.x,
            (position.y as f32) * self.size.y,
        )
    }

    /// Converts canvas coordinates to a relative position (unclamped).
    pub fn to_relative(&self, point: Pos2) -> Position {
        let axis = |v: f32, extent: f32| if extent > 0.0 { f64::from(v / extent) } else { 0.0 };
        Position::new(axis(point.x, self.size.x), axis(point.y, self.size.y))
    }
}

/// One pin as drawn on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PinView {
    /// The pin.
    pub pin: PinRef,
    /// Bus group, used for colouring.
    pub bus: usize,
    /// Pin square in canvas coordinates.
    pub rect: Rect,
    /// Hover text.
    pub tooltip: String,
}

impl PinView {
    /// Centre of the pin square; wires attach here.
    pub fn center(&self) -> Pos2 {
        self.rect.center()
    }

    /// Audio or control.
    pub fn kind(&self) -> ChannelKind {
        self.pin.kind()
    }
}

/// One node as drawn on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    id: NodeId,
    title: String,
    rect: Rect,
    pins: Vec<PinView>,
}

impl NodeView {
    /// Creates an empty view; call [`update`](Self::update) before use.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            title: String::new(),
            rect: Rect::NOTHING,
            pins: Vec::new(),
        }
    }

    /// Recomputes title, bounds and pins from the model.
    pub fn update(&mut self, node: &Node, ctx: &CanvasContext<'_>) {
        let unit = node.unit();
        self.title = unit.display_name().to_string();
        let size = ctx.layout.node_size(node, ctx.text.text_width(&self.title));
        self.rect = Rect::from_center_size(ctx.to_canvas(node.position()), size);
        let origin = self.rect.min.to_vec2();
        self.pins = ctx
            .layout
            .place_pins(node, size)
            .into_iter()
            .map(|p| PinView {
                pin: p.slot.pin,
                bus: p.slot.bus,
                rect: p.rect.translate(origin),
                tooltip: unit.pin_description(p.slot.pin.is_input, p.slot.pin.channel),
            })
            .collect();
    }

    /// Node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Title drawn in the body.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Outer bounds in canvas coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// All pins, inputs first.
    pub fn pins(&self) -> &[PinView] {
        &self.pins
    }

    /// The view of a given pin.
    pub fn pin(&self, pin: PinRef) -> Option<&PinView> {
        self.pins.iter().find(|p| p.pin == pin)
    }

    /// The pin whose square contains `point`.
    pub fn pin_at(&self, point: Pos2) -> Option<&PinView> {
        self.pins.iter().find(|p| p.rect.contains(point))
    }

    /// Whether `point` is on the node body (pin strips excluded).
    pub fn body_contains(&self, layout: &PinLayoutEngine, point: Pos2) -> bool {
        layout.body_contains(self.rect.size(), (point - self.rect.min).to_pos2())
    }
}

/// One connection as drawn on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionView {
    connection: Connection,
    curve: WireCurve,
}

impl ConnectionView {
    /// Creates a view; call [`update`](Self::update) before use.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            curve: WireCurve::new(Pos2::ZERO, Pos2::ZERO),
        }
    }

    /// Re-attaches the curve to the current pin centres.
    ///
    /// Returns false if either endpoint has no pin view.
    pub fn update(&mut self, nodes: &BTreeMap<NodeId, NodeView>) -> bool {
        let center = |pin: PinRef| {
            nodes
                .get(&pin.node)
                .and_then(|n| n.pin(pin))
                .map(PinView::center)
        };
        match (center(self.connection.source), center(self.connection.destination)) {
            (Some(start), Some(end)) => {
                self.curve = WireCurve::new(start, end);
                true
            }
            _ => false,
        }
    }

    /// The model connection.
    pub fn connection(&self) -> Connection {
        self.connection
    }

    /// Current curve.
    pub fn curve(&self) -> &WireCurve {
        &self.curve
    }

    /// Audio or control.
    pub fn kind(&self) -> ChannelKind {
        self.connection.source.kind()
    }
}
