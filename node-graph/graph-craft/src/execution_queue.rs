use crate::document::{InputConnector, NodeId, OutputConnector};
use crate::error::GraphError;
use crate::graph_view::GraphSource;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
	Unvisited,
	Visiting,
	Visited,
}

/// Computes the order in which the nodes the `sink` depends on have to run, the sink itself last.
///
/// Connections are walked backward from the sink, depth first, visiting inputs in index order. A node is appended
/// once every node it depends on has been appended, so for every connection the producing node precedes the
/// consuming one. `branch_filter` is asked about every connection and the walk does not follow the ones it rejects.
/// Nodes that the sink does not depend on are left out.
// Based on https://en.wikipedia.org/wiki/Topological_sorting#Depth-first_search
pub fn calculate_execution_queue(
	graph: &impl GraphSource,
	sink: NodeId,
	mut branch_filter: impl FnMut(InputConnector, OutputConnector) -> bool,
) -> Result<Vec<NodeId>, GraphError> {
	if graph.node(sink).is_none() {
		return Err(GraphError::NodeNotFound(sink));
	}

	let mut sorted = Vec::new();
	let mut state: FxHashMap<NodeId, NodeState> = FxHashMap::default();
	let mut stack = vec![sink];

	while let Some(&node_id) = stack.last() {
		match state.get(&node_id).copied().unwrap_or(NodeState::Unvisited) {
			NodeState::Unvisited => {
				state.insert(node_id, NodeState::Visiting);
				let node = graph.node(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
				let dependencies: Vec<NodeId> = (0..node.inputs.len())
					.map(|index| InputConnector::node(node_id, index))
					.filter_map(|input| graph.upstream(input).filter(|&output| branch_filter(input, output)))
					.map(|output| output.node_id)
					.collect();

				for &dependency in dependencies.iter().rev() {
					match state.get(&dependency).copied().unwrap_or(NodeState::Unvisited) {
						NodeState::Visiting => return Err(GraphError::CycleDetected(dependency)),
						NodeState::Unvisited => stack.push(dependency),
						NodeState::Visited => {}
					}
				}
			}
			NodeState::Visiting => {
				stack.pop();
				state.insert(node_id, NodeState::Visited);
				sorted.push(node_id);
			}
			NodeState::Visited => {
				stack.pop();
			}
		}
	}

	Ok(sorted)
}

/// Whether every connection between two queued nodes points forward in the queue.
pub fn is_topologically_sorted(graph: &impl GraphSource, queue: &[NodeId]) -> bool {
	let position: FxHashMap<NodeId, usize> = queue.iter().enumerate().map(|(index, &id)| (id, index)).collect();
	queue.iter().enumerate().all(|(index, &id)| {
		graph
			.upstream_nodes(id)
			.iter()
			.all(|dependency| position.get(dependency).is_none_or(|&dependency_index| dependency_index < index))
	})
}
