//! Execution plans for the real-time path.
//!
//! An [`ExecutionPlan`] is an immutable snapshot derived from a
//! [`RoutingGraph`]: nodes in processing order, each with the connections that
//! feed it. The audio thread reads plans through a [`PlanPublisher`]
//! (`ArcSwap`, wait-free loads) and never sees a graph mid-mutation.
//!
//! # Ordering
//!
//! Nodes are ordered topologically. Ties are broken by ascending [`NodeId`] so
//! equal graphs always yield equal plans. Feedback loops are legal in the
//! routing graph; each strongly connected component is emitted as a block in
//! id order, and connections running backwards inside such a block are listed
//! in [`ExecutionPlan::feedback`]. The engine reads those with one block of
//! delay.

use std::collections::{BTreeMap, BTreeSet, btree_set};
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::connection::Connection;
use super::node::NodeId;
use super::routing::RoutingGraph;

/// One node's step in the plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    /// Node to process.
    pub node: NodeId,
    /// Connections arriving at this node, sorted.
    pub inputs: Vec<Connection>,
}

/// Immutable processing order built from a graph snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    revision: u64,
    entries: Vec<PlanEntry>,
    feedback: Vec<Connection>,
}

impl ExecutionPlan {
    /// A plan with nothing to process.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a plan from the current state of `graph`.
    pub fn build(graph: &RoutingGraph) -> Self {
        let ids: Vec<NodeId> = graph.nodes().map(|n| n.id()).collect();
        let mut successors: BTreeMap<NodeId, BTreeSet<NodeId>> =
            ids.iter().map(|&id| (id, BTreeSet::new())).collect();
        let mut incoming: BTreeMap<NodeId, Vec<Connection>> =
            ids.iter().map(|&id| (id, Vec::new())).collect();
        for c in graph.connections() {
            if let Some(next) = successors.get_mut(&c.source.node) {
                next.insert(c.destination.node);
            }
            if let Some(list) = incoming.get_mut(&c.destination.node) {
                list.push(*c);
            }
        }

        let components = strongly_connected(&ids, &successors);
        let component_of: BTreeMap<NodeId, usize> = components
            .iter()
            .enumerate()
            .flat_map(|(ci, members)| members.iter().map(move |&id| (id, ci)))
            .collect();

        // Kahn over the condensation; ready components ordered by smallest member.
        let mut indegree = vec![0usize; components.len()];
        let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); components.len()];
        for (&from, next) in &successors {
            let cf = component_of[&from];
            for to in next {
                let ct = component_of[to];
                if cf != ct && edges[cf].insert(ct) {
                    indegree[ct] += 1;
                }
            }
        }
        let mut ready: BTreeSet<(NodeId, usize)> = components
            .iter()
            .enumerate()
            .filter(|(ci, _)| indegree[*ci] == 0)
            .map(|(ci, members)| (members[0], ci))
            .collect();

        let mut entries = Vec::with_capacity(ids.len());
        let mut feedback = Vec::new();
        while let Some((_, ci)) = ready.pop_first() {
            let members = &components[ci];
            let rank: BTreeMap<NodeId, usize> =
                members.iter().enumerate().map(|(i, &id)| (id, i)).collect();
            for &id in members {
                let mut inputs = incoming.remove(&id).unwrap_or_default();
                inputs.sort();
                for c in &inputs {
                    if let Some(&src_rank) = rank.get(&c.source.node)
                        && src_rank >= rank[&id]
                    {
                        feedback.push(*c);
                    }
                }
                entries.push(PlanEntry { node: id, inputs });
            }
            for &next in &edges[ci] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.insert((components[next][0], next));
                }
            }
        }
        feedback.sort();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            revision = graph.revision(),
            steps = entries.len(),
            feedback = feedback.len(),
            "plan_build"
        );

        Self {
            revision: graph.revision(),
            entries,
            feedback,
        }
    }

    /// Graph revision this plan was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Steps in processing order.
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Connections that close a feedback loop.
    pub fn feedback(&self) -> &[Connection] {
        &self.feedback
    }

    /// Node ids in processing order.
    pub fn order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.node)
    }

    /// Index of `node` in the processing order.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.entries.iter().position(|e| e.node == node)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there is nothing to process.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tarjan's algorithm with an explicit work stack. Members of each component
/// are sorted by id.
fn strongly_connected(
    ids: &[NodeId],
    successors: &BTreeMap<NodeId, BTreeSet<NodeId>>,
) -> Vec<Vec<NodeId>> {
    static NO_EDGES: BTreeSet<NodeId> = BTreeSet::new();

    fn edges(
        successors: &BTreeMap<NodeId, BTreeSet<NodeId>>,
        v: NodeId,
    ) -> btree_set::Iter<'_, NodeId> {
        successors.get(&v).unwrap_or(&NO_EDGES).iter()
    }

    let mut index: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut low: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut stack = Vec::new();
    let mut on_stack = BTreeSet::new();
    let mut out = Vec::new();
    let mut work: Vec<(NodeId, btree_set::Iter<'_, NodeId>)> = Vec::new();

    for &root in ids {
        if index.contains_key(&root) {
            continue;
        }
        let root_index = index.len();
        index.insert(root, root_index);
        low.insert(root, root_index);
        stack.push(root);
        on_stack.insert(root);
        work.push((root, edges(successors, root)));

        while let Some(top) = work.last_mut() {
            let v = top.0;
            if let Some(&w) = top.1.next() {
                match index.get(&w) {
                    Some(&w_index) => {
                        if on_stack.contains(&w) {
                            let l = low[&v].min(w_index);
                            low.insert(v, l);
                        }
                    }
                    None => {
                        let w_index = index.len();
                        index.insert(w, w_index);
                        low.insert(w, w_index);
                        stack.push(w);
                        on_stack.insert(w);
                        work.push((w, edges(successors, w)));
                    }
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                let l = low[&parent].min(low[&v]);
                low.insert(parent, l);
            }
            if low[&v] == index[&v] {
                let mut members = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack.remove(&w);
                    members.push(w);
                    if w == v {
                        break;
                    }
                }
                members.sort();
                out.push(members);
            }
        }
    }
    out
}

/// Publishes execution plans to the audio thread.
///
/// The interaction thread calls [`publish`](Self::publish) after each completed
/// mutation; the audio thread calls [`load`](Self::load) once per block.
pub struct PlanPublisher {
    current: ArcSwap<ExecutionPlan>,
}

impl Default for PlanPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanPublisher {
    /// Starts with an empty plan.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(ExecutionPlan::empty()),
        }
    }

    /// Rebuilds and swaps in a plan if `graph` moved past the published
    /// revision. Returns true if a new plan was stored.
    pub fn publish(&self, graph: &RoutingGraph) -> bool {
        if self.current.load().revision() == graph.revision() {
            return false;
        }
        self.republish(graph);
        true
    }

    /// Unconditionally rebuilds and swaps in a plan, e.g. after the session's
    /// graph was replaced by a freshly loaded one.
    pub fn republish(&self, graph: &RoutingGraph) {
        self.current.store(Arc::new(ExecutionPlan::build(graph)));
    }

    /// Returns the current plan.
    pub fn load(&self) -> Arc<ExecutionPlan> {
        self.current.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;
    use crate::graph::unit::UnitDescriptor;

    fn stereo_graph(n: usize) -> (RoutingGraph, Vec<NodeId>) {
        let mut graph = RoutingGraph::new();
        let ids = (0..n)
            .map(|i| {
                let unit = UnitDescriptor::new("test.fx", format!("Fx{i}"))
                    .with_input_bus("Main", 2)
                    .with_output_bus("Main", 2)
                    .into_unit();
                graph.add_node(unit, Position::default())
            })
            .collect();
        (graph, ids)
    }

    #[test]
    fn empty_graph_yields_empty_plan() {
        let graph = RoutingGraph::new();
        let plan = ExecutionPlan::build(&graph);
        assert!(plan.is_empty());
        assert!(plan.feedback().is_empty());
    }

    #[test]
    fn chain_is_ordered_source_first() {
        let (mut graph, ids) = stereo_graph(3);
        // Wire in reverse id order: 3 -> 2 -> 1.
        graph
            .add_connection(Connection::audio(ids[2], 0, ids[1], 0))
            .unwrap();
        graph
            .add_connection(Connection::audio(ids[1], 0, ids[0], 0))
            .unwrap();
        let plan = ExecutionPlan::build(&graph);
        let order: Vec<NodeId> = plan.order().collect();
        assert_eq!(order, vec![ids[2], ids[1], ids[0]]);
        assert!(plan.feedback().is_empty());
    }

    #[test]
    fn diamond_respects_dependencies_and_ties_by_id() {
        let (mut graph, ids) = stereo_graph(4);
        let (src, left, right, sink) = (ids[0], ids[1], ids[2], ids[3]);
        for c in [
            Connection::audio(src, 0, right, 0),
            Connection::audio(src, 1, left, 0),
            Connection::audio(left, 0, sink, 0),
            Connection::audio(right, 0, sink, 0),
        ] {
            graph.add_connection(c).unwrap();
        }
        let plan = ExecutionPlan::build(&graph);
        let order: Vec<NodeId> = plan.order().collect();
        assert_eq!(order, vec![src, left, right, sink]);
        assert_eq!(plan.entries()[3].inputs.len(), 2);
    }

    #[test]
    fn feedback_loop_is_flagged_not_dropped() {
        let (mut graph, ids) = stereo_graph(3);
        let forward = Connection::audio(ids[1], 0, ids[2], 0);
        let back = Connection::audio(ids[2], 0, ids[1], 0);
        let feed = Connection::audio(ids[0], 0, ids[1], 1);
        for c in [forward, back, feed] {
            graph.add_connection(c).unwrap();
        }
        let plan = ExecutionPlan::build(&graph);
        let order: Vec<NodeId> = plan.order().collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[2]]);
        assert_eq!(plan.feedback(), &[back]);
    }

    fn mono_chain(n: usize) -> (RoutingGraph, Vec<NodeId>) {
        let mut graph = RoutingGraph::new();
        let ids: Vec<NodeId> = (0..n)
            .map(|_| {
                let unit = UnitDescriptor::new("test.mono", "Mono")
                    .with_input_bus("Main", 1)
                    .with_output_bus("Main", 1)
                    .into_unit();
                graph.add_node(unit, Position::default())
            })
            .collect();
        for pair in ids.windows(2) {
            graph
                .add_connection(Connection::audio(pair[0], 0, pair[1], 0))
                .unwrap();
        }
        (graph, ids)
    }

    #[test]
    fn long_chain_builds_without_recursion() {
        let (graph, ids) = mono_chain(100_000);
        let plan = ExecutionPlan::build(&graph);
        assert_eq!(plan.len(), ids.len());
        assert!(plan.order().eq(ids.iter().copied()));
        assert!(plan.feedback().is_empty());
    }

    #[test]
    fn long_ring_is_one_loop_with_one_feedback_edge() {
        let (mut graph, ids) = mono_chain(50_000);
        let back = Connection::audio(ids[ids.len() - 1], 0, ids[0], 0);
        graph.add_connection(back).unwrap();
        let plan = ExecutionPlan::build(&graph);
        assert!(plan.order().eq(ids.iter().copied()));
        assert_eq!(plan.feedback(), &[back]);
    }

    #[test]
    fn disconnected_nodes_are_all_planned() {
        let (graph, ids) = stereo_graph(5);
        let plan = ExecutionPlan::build(&graph);
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.position_of(ids[4]), Some(4));
    }

    #[test]
    fn publisher_skips_unchanged_revisions() {
        let (mut graph, ids) = stereo_graph(2);
        let publisher = PlanPublisher::new();
        assert!(publisher.publish(&graph));
        assert!(!publisher.publish(&graph));
        graph
            .add_connection(Connection::audio(ids[0], 0, ids[1], 0))
            .unwrap();
        assert!(publisher.publish(&graph));
        let plan = publisher.load();
        assert_eq!(plan.revision(), graph.revision());
        assert_eq!(plan.entries()[1].inputs.len(), 1);
    }

    #[test]
    fn held_plan_survives_later_publish() {
        let (mut graph, ids) = stereo_graph(2);
        let publisher = PlanPublisher::new();
        publisher.publish(&graph);
        let held = publisher.load();
        graph.remove_node(ids[0]);
        publisher.publish(&graph);
        assert_eq!(held.len(), 2);
        assert_eq!(publisher.load().len(), 1);
    }
}
