//! Matching the start and end nodes of a zone.
//!
//! Pairing is derived from the topology every time it is needed and never stored on the nodes.

use crate::document::NodeId;
use crate::error::GraphError;
use crate::execution_queue::calculate_execution_queue;
use crate::graph_view::GraphSource;
use crate::node::{PairKind, PairRole};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Finds the node closing (for a start) or opening (for an end) the zone of `node`.
///
/// Starting from a start node, the walk follows connections downstream. Every other start of the same zone it
/// passes opens a nested zone and every end closes one; the partner is the first end reached outside of any nested
/// zone. Starting from an end node, the walk is mirrored upstream. Each worklist entry carries its own nesting depth,
/// so diverging branches never disturb each other's count.
///
/// Returns `None` for nodes that are not part of a pair and for pairs with no partner.
pub fn find_partner(graph: &impl GraphSource, node: NodeId) -> Option<NodeId> {
	let role = graph.node(node)?.pair_role()?;
	let forward = role.kind == PairKind::Start;
	let neighbors = |id: NodeId| if forward { graph.downstream_nodes(id) } else { graph.upstream_nodes(id) };

	let mut visited = FxHashSet::default();
	let mut worklist: VecDeque<(NodeId, u32)> = neighbors(node).into_iter().map(|id| (id, 0)).collect();

	while let Some((id, depth)) = worklist.pop_front() {
		if id == node || !visited.insert((id, depth)) {
			continue;
		}

		let next_depth = match graph.node(id).and_then(|candidate| candidate.pair_role()) {
			Some(PairRole { zone, kind }) if zone == role.zone => {
				if kind == role.kind {
					depth + 1
				} else if depth == 0 {
					return Some(id);
				} else {
					depth - 1
				}
			}
			_ => depth,
		};
		worklist.extend(neighbors(id).into_iter().map(|next| (next, next_depth)));
	}

	log::trace!("No partner found for {} node {node}", role.zone);
	None
}

fn reachable(start: NodeId, stop: NodeId, neighbors: impl Fn(NodeId) -> Vec<NodeId>) -> FxHashSet<NodeId> {
	let mut reached = FxHashSet::default();
	let mut stack = neighbors(start);
	while let Some(id) = stack.pop() {
		if id == start || id == stop || !reached.insert(id) {
			continue;
		}
		stack.extend(neighbors(id));
	}
	reached
}

/// The nodes strictly between a start and its end: reachable downstream from the start without passing the end,
/// and upstream from the end without passing the start. Returned in execution order.
pub fn loop_body(graph: &impl GraphSource, start: NodeId, end: NodeId) -> Result<Vec<NodeId>, GraphError> {
	let after_start = reachable(start, end, |id| graph.downstream_nodes(id));
	let before_end = reachable(end, start, |id| graph.upstream_nodes(id));

	let queue = calculate_execution_queue(graph, end, |_, output| output.node_id != start)?;
	Ok(queue.into_iter().filter(|id| after_start.contains(id) && before_end.contains(id)).collect())
}
