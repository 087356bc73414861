use std::slice;

use crate::graph::{collect_stage_nodes_from, FlowGraph};
use crate::status::{node_to_ci, CiResult};

/// Reduces the statuses of a stage and its nodes to the worst CI result.
///
/// Running nodes count as successful; nodes without a result only matter when
/// nothing else has one. Returns `None` when no node carries a result.
/// `current` is the node of the step asking, walked along with the graph heads.
pub fn aggregate_stage_status<G: FlowGraph>(
    graph: &G,
    stage: &G::Node,
    current: &G::Node,
) -> Option<CiResult> {
    let initial = node_to_ci(graph.status(stage));

    collect_stage_nodes_from(graph, stage, slice::from_ref(current))
        .iter()
        .map(|node| node_to_ci(graph.status(node)))
        .fold(initial, |current, other| match (current, other) {
            (None, other) => other,
            (Some(current), Some(other)) if other.is_worse_than(current) => Some(other),
            (current, _) => current,
        })
}
