//! Hit testing on the canvas.
//!
//! Priority is pin, then wire mid-span, then node body (top-most node first),
//! then empty canvas. A wire never claims a point within the exclusion radius
//! of either of its ends, so presses near a pin always reach the pin.

use egui::Pos2;
use meld_config::EditorSettings;
use meld_core::{Connection, NodeId, PinRef};

use crate::layout::PinLayoutEngine;
use crate::reconcile::ViewReconciler;

/// A pin under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct PinHit {
    /// The pin.
    pub pin: PinRef,
    /// Centre of its square, where a wire would attach.
    pub center: Pos2,
    /// Hover text.
    pub tooltip: String,
}

/// What lies under a canvas point.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
    /// A pin.
    Pin(PinHit),
    /// A wire, away from its ends.
    Connection(Connection),
    /// A node body.
    Node(NodeId),
    /// Nothing.
    Empty,
}

/// Resolves canvas points against the current views.
pub struct EndpointLocator<'a> {
    views: &'a ViewReconciler,
    layout: PinLayoutEngine,
    half_width: f32,
    exclusion: f32,
}

impl<'a> EndpointLocator<'a> {
    /// Creates a locator over `views`.
    pub fn new(views: &'a ViewReconciler, settings: &EditorSettings) -> Self {
        Self {
            views,
            layout: PinLayoutEngine::new(settings),
            half_width: settings.wire_hit_width / 2.0,
            exclusion: settings.endpoint_exclusion_radius,
        }
    }

    /// The pin whose square contains `point`, checking top-most nodes first.
    pub fn find_pin_at(&self, point: Pos2) -> Option<PinHit> {
        self.views.nodes_top_down().find_map(|node| {
            node.pin_at(point).map(|p| PinHit {
                pin: p.pin,
                center: p.center(),
                tooltip: p.tooltip.clone(),
            })
        })
    }

    /// The wire closest to `point` within half the hit width, ignoring points
    /// inside the exclusion radius of either wire end.
    pub fn find_connection_at(&self, point: Pos2) -> Option<Connection> {
        self.views
            .connections()
            .filter(|v| {
                let curve = v.curve();
                point.distance(curve.start) > self.exclusion
                    && point.distance(curve.end) > self.exclusion
                    && curve.bounding_rect().expand(self.half_width).contains(point)
            })
            .map(|v| (v.connection(), v.curve().distance_to(point)))
            .filter(|(_, d)| *d <= self.half_width)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    /// Canvas positions of a connection's source and destination ends.
    pub fn connection_ends(&self, connection: &Connection) -> Option<(Pos2, Pos2)> {
        self.views
            .connection(connection)
            .map(|v| (v.curve().start, v.curve().end))
    }

    /// The top-most node whose body contains `point`.
    pub fn find_node_at(&self, point: Pos2) -> Option<NodeId> {
        self.views
            .nodes_top_down()
            .find(|n| n.body_contains(&self.layout, point))
            .map(|n| n.id())
    }

    /// Classifies `point` by hit priority.
    pub fn hit_test(&self, point: Pos2) -> Hit {
        if let Some(pin) = self.find_pin_at(point) {
            Hit::Pin(pin)
        } else if let Some(c) = self.find_connection_at(point) {
            Hit::Connection(c)
        } else if let Some(n) = self.find_node_at(point) {
            Hit::Node(n)
        } else {
            Hit::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EstimatedText;
    use crate::view::CanvasContext;
    use egui::{Vec2, pos2};
    use meld_core::{Position, RoutingGraph, UnitDescriptor};

    fn fx() -> UnitDescriptor {
        UnitDescriptor::new("t.fx", "Fx")
            .with_input_bus("Main", 2)
            .with_output_bus("Main", 2)
    }

    /// Two stacked nodes with a straight vertical wire between them.
    fn scene() -> (RoutingGraph, ViewReconciler, Connection) {
        let mut g = RoutingGraph::new();
        let a = g.add_node(fx().into_unit(), Position::new(0.5, 0.2));
        let b = g.add_node(fx().into_unit(), Position::new(0.5, 0.8));
        let c = Connection::audio(a, 0, b, 0);
        g.add_connection(c).unwrap();
        let settings = EditorSettings::default();
        let text = EstimatedText { char_width: 7.0 };
        let mut views = ViewReconciler::new();
        views.reconcile(&g, &CanvasContext::new(Vec2::new(800.0, 600.0), &settings, &text));
        (g, views, c)
    }

    #[test]
    fn wire_is_hit_mid_span() {
        let (_, views, c) = scene();
        let settings = EditorSettings::default();
        let loc = EndpointLocator::new(&views, &settings);
        let curve = *views.connection(&c).unwrap().curve();
        let mid = curve.midpoint();
        assert_eq!(loc.find_connection_at(mid), Some(c));
        assert_eq!(loc.find_connection_at(mid + Vec2::new(3.5, 0.0)), Some(c));
        assert_eq!(loc.find_connection_at(mid + Vec2::new(6.0, 0.0)), None);
        assert_eq!(loc.hit_test(mid), Hit::Connection(c));
    }

    #[test]
    fn wire_ends_resolve_to_pins() {
        let (_, views, c) = scene();
        let settings = EditorSettings::default();
        let loc = EndpointLocator::new(&views, &settings);
        let curve = *views.connection(&c).unwrap().curve();
        for (end, pin) in [(curve.start, c.source), (curve.end, c.destination)] {
            let near = end + Vec2::new(0.0, 2.0);
            assert_eq!(loc.find_connection_at(near), None);
            assert!(matches!(loc.hit_test(end), Hit::Pin(ref h) if h.pin == pin));
        }
    }

    #[test]
    fn node_body_and_empty_canvas() {
        let (g, views, _) = scene();
        let settings = EditorSettings::default();
        let loc = EndpointLocator::new(&views, &settings);
        let a = g.nodes().next().unwrap().id();
        let center = views.node(a).unwrap().rect().center();
        assert_eq!(loc.hit_test(center), Hit::Node(a));
        assert_eq!(loc.hit_test(pos2(5.0, 5.0)), Hit::Empty);
    }

    #[test]
    fn top_most_node_wins() {
        let mut g = RoutingGraph::new();
        let a = g.add_node(fx().into_unit(), Position::new(0.5, 0.5));
        let b = g.add_node(fx().into_unit(), Position::new(0.5, 0.5));
        let settings = EditorSettings::default();
        let text = EstimatedText { char_width: 7.0 };
        let mut views = ViewReconciler::new();
        views.reconcile(&g, &CanvasContext::new(Vec2::new(800.0, 600.0), &settings, &text));

        let p = pos2(400.0, 300.0);
        assert_eq!(EndpointLocator::new(&views, &settings).find_node_at(p), Some(b));
        views.bring_to_front(a);
        assert_eq!(EndpointLocator::new(&views, &settings).find_node_at(p), Some(a));
    }
}
