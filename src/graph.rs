use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::status::NodeStatus;

/// Read-only view over a pipeline execution graph owned by the CI host.
///
/// Edges only point from a node to its parents. [`FlowGraph::heads`] gives the
/// current tips of the execution, from which every other node is reachable.
/// A host reporting no heads only exposes what is reachable from explicit
/// seeds, see [`collect_stage_nodes_from`].
pub trait FlowGraph {
    type Node: Clone + Eq + Hash;

    fn parents(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn status(&self, node: &Self::Node) -> Option<NodeStatus>;

    /// Whether the node opens a stage (a start node of the canonical stage step).
    fn is_stage_start(&self, node: &Self::Node) -> bool;

    /// Start time of the node in milliseconds since the epoch, when recorded.
    fn start_millis(&self, node: &Self::Node) -> Option<i64>;

    fn heads(&self) -> Vec<Self::Node>;
}

/// Finds the stage enclosing `start`, `start` included.
///
/// Walks ancestors depth-first, parents left to right; the first stage start
/// reached wins.
pub fn find_enclosing_stage<G: FlowGraph>(graph: &G, start: &G::Node) -> Option<G::Node> {
    let mut visited = HashSet::new();
    let mut stack = vec![start.clone()];

    while let Some(node) = stack.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        if graph.is_stage_start(&node) {
            return Some(node);
        }
        stack.extend(graph.parents(&node).into_iter().rev());
    }

    None
}

/// Collects the nodes belonging to `stage`, excluding the stage node itself.
///
/// A node belongs to the stage when the stage is the closest stage start above
/// it. Nested stages and their contents are left out. The result follows the
/// discovery order of a walk from the graph heads, so it is stable for a given
/// snapshot.
pub fn collect_stage_nodes<G: FlowGraph>(graph: &G, stage: &G::Node) -> Vec<G::Node> {
    collect_stage_nodes_from(graph, stage, &[])
}

/// Like [`collect_stage_nodes`], walking from `seeds` after the graph heads.
///
/// Seeding with the node of the running step keeps its ancestry in the stage
/// when the host reports no heads.
pub fn collect_stage_nodes_from<G: FlowGraph>(
    graph: &G,
    stage: &G::Node,
    seeds: &[G::Node],
) -> Vec<G::Node> {
    let walk = reachable_nodes(graph, seeds);
    let enclosing = enclosing_stages(graph, &walk);

    walk.order
        .iter()
        .filter(|node| *node != stage && !graph.is_stage_start(node))
        .filter(|node| enclosing.get(*node).and_then(Option::as_ref) == Some(stage))
        .cloned()
        .collect()
}

/// Nodes in discovery order, with the parents fetched while walking.
struct Walk<N> {
    order: Vec<N>,
    parents: HashMap<N, Vec<N>>,
}

fn reachable_nodes<G: FlowGraph>(graph: &G, seeds: &[G::Node]) -> Walk<G::Node> {
    let mut parents = HashMap::new();
    let mut order = Vec::new();
    let mut stack: Vec<G::Node> = graph
        .heads()
        .into_iter()
        .chain(seeds.iter().cloned())
        .rev()
        .collect();

    while let Some(node) = stack.pop() {
        if parents.contains_key(&node) {
            continue;
        }
        let node_parents = graph.parents(&node);
        stack.extend(node_parents.iter().rev().cloned());
        parents.insert(node.clone(), node_parents);
        order.push(node);
    }

    Walk { order, parents }
}

/// Closest stage start strictly above each node.
///
/// Nodes are resolved parents first. Nodes caught in a cycle never become
/// ready and are left unresolved.
fn enclosing_stages<'w, G: FlowGraph>(
    graph: &G,
    walk: &'w Walk<G::Node>,
) -> HashMap<&'w G::Node, Option<G::Node>> {
    let parents = &walk.parents;

    let mut children: HashMap<&G::Node, Vec<&G::Node>> = HashMap::new();
    let mut pending: HashMap<&G::Node, usize> = HashMap::new();
    for (node, node_parents) in parents {
        let known: Vec<&G::Node> = node_parents
            .iter()
            .filter(|parent| parents.contains_key(*parent))
            .collect();
        pending.insert(node, known.len());
        for parent in known {
            children.entry(parent).or_default().push(node);
        }
    }

    let mut ready: Vec<&G::Node> = walk
        .order
        .iter()
        .filter(|node| pending.get(node) == Some(&0))
        .collect();
    let mut resolved: HashMap<&G::Node, Option<G::Node>> = HashMap::new();

    while let Some(node) = ready.pop() {
        let stage = parents[node].iter().find_map(|parent| {
            if graph.is_stage_start(parent) {
                Some(parent.clone())
            } else {
                resolved.get(parent).cloned().flatten()
            }
        });
        resolved.insert(node, stage);

        for child in children.get(node).into_iter().flatten() {
            if let Some(count) = pending.get_mut(*child) {
                *count -= 1;
                if *count == 0 {
                    ready.push(*child);
                }
            }
        }
    }

    resolved
}
