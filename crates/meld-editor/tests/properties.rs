//! Property-based tests for layout, hit testing and view reconciliation.

use egui::{Vec2, vec2};
use meld_config::EditorSettings;
use meld_core::{Connection, NodeId, PinRef, Position, RoutingGraph, UnitDescriptor};
use meld_editor::{CanvasContext, EndpointLocator, EstimatedText, ViewReconciler};
use proptest::prelude::*;

fn unit(inputs: u32, outputs: u32, sidechain: bool, control: bool) -> UnitDescriptor {
    let mut d = UnitDescriptor::new("p.unit", "Property Unit With A Name");
    if inputs > 0 {
        d = d.with_input_bus("Main", inputs);
    }
    if sidechain {
        d = d.with_input_bus("Side", 1);
    }
    if outputs > 0 {
        d = d.with_output_bus("Main", outputs);
    }
    if control {
        d = d.accepting_control().producing_control();
    }
    d
}

fn unit_strategy() -> impl Strategy<Value = UnitDescriptor> {
    (0u32..9, 0u32..9, any::<bool>(), any::<bool>())
        .prop_map(|(i, o, side, ctl)| unit(i, o, side, ctl))
}

fn reconcile(graph: &RoutingGraph, views: &mut ViewReconciler, size: Vec2) {
    let settings = EditorSettings::default();
    let text = EstimatedText {
        char_width: settings.char_width,
    };
    let ctx = CanvasContext::new(size, &settings, &text);
    views.reconcile(graph, &ctx);
}

proptest! {
    #[test]
    fn pins_stay_on_their_edge_and_never_overlap(
        descriptor in unit_strategy(),
        x in 0.0f64..1.0,
        y in 0.0f64..1.0,
    ) {
        let mut graph = RoutingGraph::new();
        let id = graph.add_node(descriptor.into_unit(), Position::new(x, y));
        let mut views = ViewReconciler::new();
        reconcile(&graph, &mut views, vec2(1200.0, 900.0));

        let view = views.node(id).unwrap();
        let rect = view.rect();
        let node = graph.node(id).unwrap();
        prop_assert_eq!(view.pins().len() as u32, node.num_inputs() + node.num_outputs());

        for is_input in [true, false] {
            let side: Vec<_> = view.pins().iter().filter(|p| p.pin.is_input == is_input).collect();
            for pair in side.windows(2) {
                prop_assert!(pair[0].rect.max.x <= pair[1].rect.min.x + 1e-3);
            }
            for pin in side {
                prop_assert!(pin.rect.min.x >= rect.min.x - 1e-3);
                prop_assert!(pin.rect.max.x <= rect.max.x + 1e-3);
                let edge = if is_input { rect.min.y } else { rect.max.y - pin.rect.height() };
                prop_assert!((pin.rect.min.y - edge).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn reconcile_is_idempotent(
        units in prop::collection::vec(unit_strategy(), 1..6),
        links in prop::collection::vec((0usize..6, 0u32..9, 0usize..6, 0u32..9), 0..12),
        removals in prop::collection::vec(0usize..6, 0..3),
    ) {
        let mut graph = RoutingGraph::new();
        let ids: Vec<NodeId> = units
            .into_iter()
            .enumerate()
            .map(|(i, u)| graph.add_node(u.into_unit(), Position::new(0.1 * i as f64, 0.5)))
            .collect();
        for (a, ca, b, cb) in links {
            let c = Connection::audio(ids[a % ids.len()], ca, ids[b % ids.len()], cb);
            let _ = graph.add_connection(c);
        }

        let mut views = ViewReconciler::new();
        reconcile(&graph, &mut views, vec2(800.0, 600.0));
        for r in removals {
            graph.remove_node(ids[r % ids.len()]);
        }
        reconcile(&graph, &mut views, vec2(800.0, 600.0));

        prop_assert_eq!(views.node_count(), graph.node_count());
        prop_assert_eq!(views.connection_count(), graph.connection_count());
        for c in graph.connections() {
            prop_assert!(views.connection(c).is_some());
        }

        let settings = EditorSettings::default();
        let text = EstimatedText { char_width: settings.char_width };
        let ctx = CanvasContext::new(vec2(800.0, 600.0), &settings, &text);
        prop_assert!(views.reconcile(&graph, &ctx).is_unchanged());
    }

    #[test]
    fn wire_ends_resolve_to_pins_not_the_wire(
        dx in -0.4f64..0.4,
        dy in 0.2f64..0.6,
        angle in 0.0f32..std::f32::consts::TAU,
        radius in 0.0f32..1.0,
    ) {
        let stereo = || {
            UnitDescriptor::new("p.fx", "Fx")
                .with_input_bus("Main", 2)
                .with_output_bus("Main", 2)
                .into_unit()
        };
        let mut graph = RoutingGraph::new();
        let a = graph.add_node(stereo(), Position::new(0.5, 0.1));
        let b = graph.add_node(stereo(), Position::new(0.5 + dx, 0.1 + dy));
        let c = Connection::new(PinRef::output(a, 0), PinRef::input(b, 1));
        graph.add_connection(c).unwrap();

        let settings = EditorSettings::default();
        let mut views = ViewReconciler::new();
        reconcile(&graph, &mut views, vec2(1000.0, 1000.0));
        let locator = EndpointLocator::new(&views, &settings);
        let (start, end) = locator.connection_ends(&c).unwrap();

        let offset = Vec2::angled(angle) * radius * settings.endpoint_exclusion_radius;
        prop_assert_eq!(locator.find_connection_at(start + offset), None);
        prop_assert_eq!(locator.find_connection_at(end + offset), None);
        prop_assert!(locator.find_pin_at(start + offset).is_some());
        prop_assert!(locator.find_pin_at(end + offset).is_some());
    }
}
