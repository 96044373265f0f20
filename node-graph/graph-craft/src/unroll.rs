//! Static unrolling of loop zones.
//!
//! A loop zone runs its body once through the persistent connections. Every further iteration runs a copy of the
//! body, wired to the previous iteration through virtual connections, which turns the loop into a linear chain the
//! execution queue can order like any other graph.

use crate::document::value::TaggedValue;
use crate::document::{DocumentNode, InputConnector, NodeId, OutputConnector};
use crate::error::GraphError;
use crate::graph_view::GraphSource;
use rustc_hash::FxHashMap;

/// Input of a loop start holding the iteration count.
pub const START_ITERATIONS: usize = 0;
/// Input of a loop start holding the value carried into the first iteration.
pub const START_INPUT: usize = 1;
/// Output of a loop start exposing the one based index of the running iteration.
pub const START_CURRENT_ITERATION: usize = 0;
/// Output of a loop start exposing the value carried into the running iteration.
pub const START_OUTPUT: usize = 1;
/// Input of a loop end receiving the value produced by the last iteration.
pub const END_INPUT: usize = 0;
pub const END_OUTPUT: usize = 0;

/// Everything that has to be added on top of the persistent graph to run the extra iterations of a loop.
#[derive(Debug, Default)]
pub struct UnrolledLoop {
	/// Copies of the body, one set per extra iteration, each set in execution order.
	pub clones: Vec<DocumentNode>,
	pub connections: Vec<(OutputConnector, InputConnector)>,
	/// Iteration counters forced onto the inputs that read the current iteration of the start node.
	pub constants: Vec<(InputConnector, TaggedValue)>,
}

impl UnrolledLoop {
	pub fn clone_ids(&self) -> Vec<NodeId> {
		self.clones.iter().map(|node| node.id).collect()
	}
}

/// Copies the `body` of the loop between `start` and `end` for iterations `2..=iterations`.
///
/// Inside each copy, connections between body nodes are mirrored onto the copies, connections from outside of the
/// body are kept, inputs reading the carried value are connected to the tail of the previous iteration and inputs
/// reading the iteration counter receive the iteration number as a constant. The tail of the last copy is connected
/// to the input of the end node, or when the end reads the counter directly, the end receives the iteration count.
pub fn unroll(graph: &impl GraphSource, start: NodeId, end: NodeId, body: &[NodeId], iterations: u32) -> Result<UnrolledLoop, GraphError> {
	let mut unrolled = UnrolledLoop::default();
	if iterations < 2 {
		return Ok(unrolled);
	}

	let end_input = InputConnector::node(end, END_INPUT);
	let carried = OutputConnector::node(start, START_OUTPUT);
	let counter = OutputConnector::node(start, START_CURRENT_ITERATION);
	let first_tail = graph.upstream(end_input).unwrap_or(carried);
	let mut previous_tail = first_tail;

	for iteration in 2..=iterations {
		let mut mapping: FxHashMap<NodeId, NodeId> = FxHashMap::default();
		let mut copies = Vec::with_capacity(body.len());
		for &id in body {
			let node = graph.node(id).ok_or(GraphError::NodeNotFound(id))?;
			let copy = node.create_copy();
			mapping.insert(id, copy.id);
			copies.push(copy);
		}

		for (&original, copy) in body.iter().zip(&copies) {
			for index in 0..copy.inputs.len() {
				let input = InputConnector::node(original, index);
				let copied_input = InputConnector::node(copy.id, index);

				if let Some(value) = graph.constant(input) {
					unrolled.constants.push((copied_input, value.clone()));
				}

				let Some(output) = graph.upstream(input) else { continue };
				if output == counter {
					unrolled.constants.push((copied_input, TaggedValue::Int(iteration as i32)));
				} else if output == carried {
					unrolled.connections.push((previous_tail, copied_input));
				} else if let Some(&mapped) = mapping.get(&output.node_id) {
					unrolled.connections.push((OutputConnector::node(mapped, output.output_index), copied_input));
				} else {
					unrolled.connections.push((output, copied_input));
				}
			}
		}

		previous_tail = match mapping.get(&first_tail.node_id) {
			Some(&mapped) => OutputConnector::node(mapped, first_tail.output_index),
			None => previous_tail,
		};
		unrolled.clones.extend(copies);
	}

	if previous_tail == counter {
		// The counter itself is the tail, the last iteration reads as the iteration count
		unrolled.constants.push((end_input, TaggedValue::Int(iterations as i32)));
	} else {
		unrolled.connections.push((previous_tail, end_input));
	}
	log::debug!("Unrolled loop {start} into {} iterations with {} cloned nodes", iterations, unrolled.clones.len());
	Ok(unrolled)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::document::NodeNetwork;
	use crate::pairing::loop_body;
	use crate::test_nodes::{AddNode, ConstantNode, PairNode};
	use pretty_assertions::assert_eq;

	/// `start.output -> add.0`, `start.current_iteration -> add.1`, `add -> end`, `offset -> add`
	#[test]
	fn copies_are_chained() {
		let _ = env_logger::builder().is_test(true).try_init();
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(PairNode::start()));
		let add = network.add_node(DocumentNode::new(AddNode));
		let scale = network.add_node(DocumentNode::new(AddNode));
		let offset = network.add_node(DocumentNode::new(ConstantNode::new(10)));
		let end = network.add_node(DocumentNode::new(PairNode::end()));
		network.connect(OutputConnector::node(start, START_OUTPUT), InputConnector::node(add, 0)).unwrap();
		network.connect(OutputConnector::node(start, START_CURRENT_ITERATION), InputConnector::node(add, 1)).unwrap();
		network.connect(OutputConnector::node(add, 0), InputConnector::node(scale, 0)).unwrap();
		network.connect(OutputConnector::node(offset, 0), InputConnector::node(scale, 1)).unwrap();
		network.connect(OutputConnector::node(scale, 0), InputConnector::node(end, END_INPUT)).unwrap();

		let body = loop_body(&network, start, end).unwrap();
		assert_eq!(body, vec![add, scale]);

		let unrolled = unroll(&network, start, end, &body, 3).unwrap();
		assert_eq!(unrolled.clones.len(), 4);
		let ids = unrolled.clone_ids();
		let [add_2, scale_2, add_3, scale_3] = ids[..] else { panic!("expected two copies of two nodes") };
		assert_eq!(unrolled.clones[0].origin, Some(add));
		assert_eq!(unrolled.clones[3].origin, Some(scale));

		let mut connections = unrolled.connections.clone();
		connections.sort_unstable_by_key(|(_, input)| *input);
		let mut expected = vec![
			(OutputConnector::node(scale, 0), InputConnector::node(add_2, 0)),
			(OutputConnector::node(add_2, 0), InputConnector::node(scale_2, 0)),
			(OutputConnector::node(offset, 0), InputConnector::node(scale_2, 1)),
			(OutputConnector::node(scale_2, 0), InputConnector::node(add_3, 0)),
			(OutputConnector::node(add_3, 0), InputConnector::node(scale_3, 0)),
			(OutputConnector::node(offset, 0), InputConnector::node(scale_3, 1)),
			(OutputConnector::node(scale_3, 0), InputConnector::node(end, END_INPUT)),
		];
		expected.sort_unstable_by_key(|(_, input)| *input);
		assert_eq!(connections, expected);
		assert_eq!(
			unrolled.constants,
			vec![(InputConnector::node(add_2, 1), TaggedValue::Int(2)), (InputConnector::node(add_3, 1), TaggedValue::Int(3))]
		);
		assert_eq!(network.connections().count(), 5);
	}

	#[test]
	fn counter_feeding_the_end_reads_the_last_iteration() {
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(PairNode::start()));
		let end = network.add_node(DocumentNode::new(PairNode::end()));
		network.connect(OutputConnector::node(start, START_CURRENT_ITERATION), InputConnector::node(end, END_INPUT)).unwrap();

		let body = loop_body(&network, start, end).unwrap();
		assert!(body.is_empty());
		let unrolled = unroll(&network, start, end, &body, 3).unwrap();
		assert!(unrolled.clones.is_empty());
		assert!(unrolled.connections.is_empty());
		assert_eq!(unrolled.constants, vec![(InputConnector::node(end, END_INPUT), TaggedValue::Int(3))]);
	}

	#[test]
	fn single_iterations_need_no_copies() {
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(PairNode::start()));
		let end = network.add_node(DocumentNode::new(PairNode::end()));
		network.connect(OutputConnector::node(start, START_OUTPUT), InputConnector::node(end, END_INPUT)).unwrap();
		for iterations in [0, 1] {
			let unrolled = unroll(&network, start, end, &[], iterations).unwrap();
			assert!(unrolled.clones.is_empty());
			assert!(unrolled.connections.is_empty());
		}
	}
}
