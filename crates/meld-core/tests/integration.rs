//! Integration tests for meld-core.
//!
//! Exercises the graph, change notifications and execution plans together,
//! the way an editing session drives them.

use std::sync::Arc;

use meld_core::{
    ChangeKind, Connection, ExecutionPlan, GraphError, NodeId, PinRef, PlanPublisher, Position,
    ProcessingUnit, RoutingGraph, UnitDescriptor,
};

fn audio_in() -> Arc<dyn ProcessingUnit> {
    UnitDescriptor::new("builtin.audio-in", "Audio Input")
        .with_output_bus("Input", 2)
        .into_unit()
}

fn audio_out() -> Arc<dyn ProcessingUnit> {
    UnitDescriptor::new("builtin.audio-out", "Audio Output")
        .with_input_bus("Output", 2)
        .into_unit()
}

fn delay() -> Arc<dyn ProcessingUnit> {
    UnitDescriptor::new("builtin.delay", "Delay")
        .with_input_bus("Main", 2)
        .with_output_bus("Main", 2)
        .into_unit()
}

fn keys() -> Arc<dyn ProcessingUnit> {
    UnitDescriptor::new("builtin.control-in", "Control Input")
        .producing_control()
        .into_unit()
}

fn synth() -> Arc<dyn ProcessingUnit> {
    UnitDescriptor::new("builtin.synth", "Synth")
        .with_output_bus("Main", 2)
        .accepting_control()
        .into_unit()
}

/// Input -> Delay -> Output, both channels.
fn stereo_chain() -> (RoutingGraph, NodeId, NodeId, NodeId) {
    let mut graph = RoutingGraph::new();
    let input = graph.add_node(audio_in(), Position::new(0.5, 0.1));
    let fx = graph.add_node(delay(), Position::new(0.5, 0.5));
    let output = graph.add_node(audio_out(), Position::new(0.5, 0.9));
    for ch in 0..2 {
        graph
            .add_connection(Connection::audio(input, ch, fx, ch))
            .unwrap();
        graph
            .add_connection(Connection::audio(fx, ch, output, ch))
            .unwrap();
    }
    (graph, input, fx, output)
}

#[test]
fn stereo_chain_plans_in_signal_order() {
    let (graph, input, fx, output) = stereo_chain();
    let plan = ExecutionPlan::build(&graph);
    let order: Vec<NodeId> = plan.order().collect();
    assert_eq!(order, vec![input, fx, output]);
    assert_eq!(plan.entries()[2].inputs.len(), 2);
}

#[test]
fn control_and_audio_wiring_coexist() {
    let mut graph = RoutingGraph::new();
    let k = graph.add_node(keys(), Position::new(0.25, 0.1));
    let s = graph.add_node(synth(), Position::new(0.25, 0.5));
    let out = graph.add_node(audio_out(), Position::new(0.5, 0.9));

    graph.add_connection(Connection::control(k, s)).unwrap();
    graph.add_connection(Connection::audio(s, 0, out, 0)).unwrap();

    // Control output into an audio input is refused.
    let wrong = Connection::new(PinRef::control_output(k), PinRef::input(out, 1));
    assert!(matches!(
        graph.add_connection(wrong),
        Err(GraphError::InvalidConnection { .. })
    ));

    let plan = ExecutionPlan::build(&graph);
    assert_eq!(plan.order().collect::<Vec<_>>(), vec![k, s, out]);
}

#[test]
fn removing_the_middle_node_breaks_the_chain_cleanly() {
    let (mut graph, input, fx, output) = stereo_chain();
    let rx = graph.subscribe();
    graph.remove_node(fx);

    assert_eq!(graph.connection_count(), 0);
    assert_eq!(
        rx.try_recv().unwrap().kind,
        ChangeKind::NodeRemoved {
            node: fx,
            connections_removed: 4
        }
    );
    assert!(graph.can_connect(&Connection::audio(input, 0, output, 0)));
}

#[test]
fn publisher_follows_mutations_and_skips_moves_only_by_revision() {
    let (mut graph, input, fx, output) = stereo_chain();
    let publisher = PlanPublisher::new();
    publisher.publish(&graph);
    let first = publisher.load();

    graph.set_node_position(fx, Position::new(0.3, 0.3));
    assert!(publisher.publish(&graph), "a new revision always republishes");
    assert_eq!(publisher.load().order().collect::<Vec<_>>(), vec![input, fx, output]);

    graph.disconnect_node(fx);
    publisher.publish(&graph);
    let plan = publisher.load();
    assert!(plan.entries().iter().all(|e| e.inputs.is_empty()));
    assert_eq!(first.entries()[1].inputs.len(), 2, "older plan is untouched");
}

#[test]
fn restoring_ids_then_allocating_continues_above() {
    let mut graph = RoutingGraph::new();
    graph
        .add_node_with_id(NodeId::from_raw(7), delay(), Position::default())
        .unwrap();
    graph
        .add_node_with_id(NodeId::from_raw(3), delay(), Position::default())
        .unwrap();
    let fresh = graph.add_node(delay(), Position::default());
    assert_eq!(fresh, NodeId::from_raw(8));
}
