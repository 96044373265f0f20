//! The two halves of a repeat loop.
//!
//! Everything between a [`RepeatStartNode`] and its [`RepeatEndNode`] runs once per iteration. The nodes themselves
//! only pass values through; the executor recognizes the pair, unrolls the body and wires the iterations together.

use core_types::RenderContext;
use graph_craft::unroll::{END_INPUT, START_INPUT, START_ITERATIONS};
use graph_craft::{Node, NodeError, NodeInputs, PairRole, PropertyDescriptor, TaggedValue, ValidationIssue};

/// Zone name shared by both halves of a repeat loop.
pub const REPEAT_ZONE: &str = "repeat";

/// Opens a repeat loop.
///
/// `Current Iteration` counts from 1. `Output` carries `Input` into the first iteration and the result of the
/// previous iteration into every later one.
#[derive(Debug, Clone, Default)]
pub struct RepeatStartNode;

impl Node for RepeatStartNode {
	fn identifier(&self) -> &'static str {
		"repeat_nodes::RepeatStartNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Iterations", 1), PropertyDescriptor::value("Input", TaggedValue::None)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Current Iteration", 1), PropertyDescriptor::value("Output", TaggedValue::None)]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(vec![TaggedValue::Int(1), inputs.value(START_INPUT)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(RepeatStartNode)
	}

	fn pair_role(&self) -> Option<PairRole> {
		Some(PairRole::start(REPEAT_ZONE))
	}

	fn validate(&self, inputs: &NodeInputs) -> Vec<ValidationIssue> {
		match inputs.int(START_ITERATIONS) {
			Ok(iterations) if iterations >= 0 => Vec::new(),
			_ => vec![ValidationIssue::OutOfRange {
				input: inputs.name(START_ITERATIONS),
				value: inputs.value(START_ITERATIONS),
			}],
		}
	}
}

/// Closes a repeat loop, passing on the result of the last iteration.
#[derive(Debug, Clone, Default)]
pub struct RepeatEndNode;

impl Node for RepeatEndNode {
	fn identifier(&self) -> &'static str {
		"repeat_nodes::RepeatEndNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Input", TaggedValue::None)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Output", TaggedValue::None)]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(vec![inputs.value(END_INPUT)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(RepeatEndNode)
	}

	fn pair_role(&self) -> Option<PairRole> {
		Some(PairRole::end(REPEAT_ZONE))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use graph_craft::document::{DocumentNode, InputConnector, NodeId, NodeNetwork, OutputConnector};
	use graph_craft::unroll::{END_OUTPUT, START_CURRENT_ITERATION, START_OUTPUT};
	use graph_craft::{GraphError, find_partner};
	use interpreted_executor::GraphExecutor;
	use pretty_assertions::assert_eq;
	use std::sync::{Arc, Mutex};

	/// Adds the iteration counter to the carried value and records every counter it sees.
	#[derive(Debug, Clone, Default)]
	struct RecordNode {
		seen: Arc<Mutex<Vec<i32>>>,
		fail_at: Option<i32>,
	}

	impl RecordNode {
		fn seen(&self) -> Vec<i32> {
			self.seen.lock().unwrap().clone()
		}
	}

	impl Node for RecordNode {
		fn identifier(&self) -> &'static str {
			"test::Record"
		}

		fn inputs(&self) -> Vec<PropertyDescriptor> {
			vec![PropertyDescriptor::value("Value", 0), PropertyDescriptor::value("Iteration", 0)]
		}

		fn outputs(&self) -> Vec<PropertyDescriptor> {
			vec![PropertyDescriptor::value("Value", 0)]
		}

		fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
			let iteration = inputs.int(1)?;
			if self.fail_at == Some(iteration) {
				return Err(NodeError::Evaluation(format!("failed at iteration {iteration}")));
			}
			self.seen.lock().unwrap().push(iteration);
			Ok(vec![TaggedValue::Int(inputs.int(0)? + iteration)])
		}

		fn create_copy(&self) -> Box<dyn Node> {
			Box::new(self.clone())
		}
	}

	struct Loop {
		network: NodeNetwork,
		start: NodeId,
		body: NodeId,
		end: NodeId,
	}

	fn connect(network: &mut NodeNetwork, from: NodeId, output: usize, to: NodeId, input: usize) {
		network.connect(OutputConnector::node(from, output), InputConnector::node(to, input)).unwrap();
	}

	/// `start -> record -> end`, the record node reading both outputs of the start.
	fn record_loop(record: &RecordNode, iterations: i32) -> Loop {
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(RepeatStartNode).with_input(START_ITERATIONS, iterations).with_input(START_INPUT, 0));
		let body = network.add_node(DocumentNode::new(record.clone()));
		let end = network.add_node(DocumentNode::new(RepeatEndNode));
		connect(&mut network, start, START_OUTPUT, body, 0);
		connect(&mut network, start, START_CURRENT_ITERATION, body, 1);
		connect(&mut network, body, 0, end, END_INPUT);
		Loop { network, start, body, end }
	}

	fn set_iterations(network: &mut NodeNetwork, start: NodeId, iterations: i32) {
		network.node_mut(start).unwrap().set_input_value(START_ITERATIONS, iterations);
	}

	#[test]
	fn three_iterations_count_one_two_three() {
		let _ = env_logger::builder().is_test(true).try_init();
		let record = RecordNode::default();
		let Loop { network, start, end, .. } = record_loop(&record, 3);

		let mut executor = GraphExecutor::default();
		let result = executor.execute(&network, end, &RenderContext::default()).unwrap();
		assert_eq!(record.seen(), vec![1, 2, 3]);
		assert_eq!(result, TaggedValue::Int(1 + 2 + 3));
		assert_eq!(executor.cloned_node_count(start), 2);
		assert!(executor.cloned_nodes(start).all(|node| node.implementation.identifier() == "test::Record"));

		assert_eq!(executor.active_sessions(), 0);
		assert!(!executor.is_unrolling(start));
		// The persistent network is never rewired
		assert_eq!(network.connections().count(), 3);
		assert_eq!(network.len(), 3);
	}

	#[test]
	fn one_iteration_clones_nothing() {
		let record = RecordNode::default();
		let Loop { network, start, end, .. } = record_loop(&record, 1);

		let mut executor = GraphExecutor::default();
		assert_eq!(executor.execute(&network, end, &RenderContext::default()).unwrap(), TaggedValue::Int(1));
		assert_eq!(record.seen(), vec![1]);
		assert_eq!(executor.cloned_node_count(start), 0);
	}

	#[test]
	fn counter_wired_to_the_end_reports_the_last_iteration() {
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(RepeatStartNode).with_input(START_ITERATIONS, 1));
		let end = network.add_node(DocumentNode::new(RepeatEndNode));
		connect(&mut network, start, START_CURRENT_ITERATION, end, END_INPUT);

		let mut executor = GraphExecutor::default();
		let context = RenderContext::default();
		assert_eq!(executor.execute(&network, end, &context).unwrap(), TaggedValue::Int(1));
		for iterations in [2, 3, 7] {
			set_iterations(&mut network, start, iterations);
			assert_eq!(executor.execute(&network, end, &context).unwrap(), TaggedValue::Int(iterations));
			assert_eq!(executor.cloned_node_count(start), 0);
		}
	}

	#[test]
	fn zero_iterations_skip_the_body() {
		let record = RecordNode::default();
		let Loop { network, start, end, .. } = record_loop(&record, 0);

		let mut executor = GraphExecutor::default();
		assert_eq!(executor.execute(&network, end, &RenderContext::default()).unwrap(), TaggedValue::None);
		assert!(record.seen().is_empty());
		assert_eq!(executor.cloned_node_count(start), 0);
		assert_eq!(executor.output_value(OutputConnector::node(start, START_CURRENT_ITERATION)), Some(&TaggedValue::Int(0)));
		assert_eq!(executor.output_value(OutputConnector::node(end, END_OUTPUT)), Some(&TaggedValue::None));
	}

	#[test]
	fn negative_iterations_behave_like_zero() {
		let record = RecordNode::default();
		let Loop { network, start, end, .. } = record_loop(&record, -4);

		assert_eq!(network.validate_node(start).unwrap().len(), 1);
		let mut executor = GraphExecutor::default();
		assert_eq!(executor.execute(&network, end, &RenderContext::default()).unwrap(), TaggedValue::None);
		assert!(record.seen().is_empty());
	}

	#[test]
	fn clones_are_released_before_the_next_unrolling() {
		let record = RecordNode::default();
		let Loop { mut network, start, end, .. } = record_loop(&record, 4);
		let mut executor = GraphExecutor::default();
		let context = RenderContext::default();

		executor.execute(&network, end, &context).unwrap();
		assert_eq!(executor.cloned_node_count(start), 3);
		let first: Vec<_> = executor.cloned_nodes(start).map(|node| node.id).collect();

		executor.execute(&network, end, &context).unwrap();
		assert_eq!(executor.total_cloned_nodes(), 3);
		assert!(executor.cloned_nodes(start).all(|node| !first.contains(&node.id)));

		set_iterations(&mut network, start, 2);
		assert_eq!(executor.execute(&network, end, &context).unwrap(), TaggedValue::Int(3));
		assert_eq!(executor.total_cloned_nodes(), 1);

		set_iterations(&mut network, start, 0);
		executor.execute(&network, end, &context).unwrap();
		assert_eq!(executor.total_cloned_nodes(), 0);
	}

	#[test]
	fn failures_inside_the_loop_do_not_wedge_it() {
		let _ = env_logger::builder().is_test(true).try_init();
		let failing = RecordNode { fail_at: Some(2), ..Default::default() };
		let Loop { mut network, start, body, end } = record_loop(&failing, 3);
		let mut executor = GraphExecutor::default();
		let context = RenderContext::default();

		let error = executor.execute(&network, end, &context).unwrap_err();
		assert!(matches!(error, GraphError::Execution { source: NodeError::Evaluation(_), .. }));
		assert!(!executor.is_unrolling(start));
		assert_eq!(executor.active_sessions(), 0);
		assert_eq!(failing.seen(), vec![1]);

		// Replacing the failing body makes the same loop run again
		let record = RecordNode::default();
		network.remove_node(body);
		let body = network.add_node(DocumentNode::new(record.clone()));
		connect(&mut network, start, START_OUTPUT, body, 0);
		connect(&mut network, start, START_CURRENT_ITERATION, body, 1);
		connect(&mut network, body, 0, end, END_INPUT);
		assert_eq!(executor.execute(&network, end, &context).unwrap(), TaggedValue::Int(6));
		assert_eq!(record.seen(), vec![1, 2, 3]);
	}

	#[test]
	fn nested_loops() {
		let _ = env_logger::builder().is_test(true).try_init();
		let record = RecordNode::default();
		let mut network = NodeNetwork::new();
		let outer_start = network.add_node(DocumentNode::new(RepeatStartNode).with_input(START_ITERATIONS, 2).with_input(START_INPUT, 0));
		let inner_start = network.add_node(DocumentNode::new(RepeatStartNode).with_input(START_ITERATIONS, 3));
		let body = network.add_node(DocumentNode::new(record.clone()));
		let inner_end = network.add_node(DocumentNode::new(RepeatEndNode));
		let outer_end = network.add_node(DocumentNode::new(RepeatEndNode));
		connect(&mut network, outer_start, START_OUTPUT, inner_start, START_INPUT);
		connect(&mut network, inner_start, START_OUTPUT, body, 0);
		connect(&mut network, inner_start, START_CURRENT_ITERATION, body, 1);
		connect(&mut network, body, 0, inner_end, END_INPUT);
		connect(&mut network, inner_end, END_OUTPUT, outer_end, END_INPUT);

		assert_eq!(find_partner(&network, outer_start), Some(outer_end));
		assert_eq!(find_partner(&network, inner_start), Some(inner_end));

		let mut executor = GraphExecutor::default();
		let result = executor.execute(&network, outer_end, &RenderContext::default()).unwrap();
		assert_eq!(result, TaggedValue::Int(12));
		assert_eq!(record.seen(), vec![1, 2, 3, 1, 2, 3]);
		assert_eq!(executor.cloned_node_count(outer_start), 3);
		assert_eq!(executor.cloned_node_count(inner_start), 2);
		assert_eq!(executor.total_cloned_nodes(), 3 + 2 + 2);
		assert_eq!(executor.active_sessions(), 0);

		executor.execute(&network, outer_end, &RenderContext::default()).unwrap();
		assert_eq!(executor.total_cloned_nodes(), 3 + 2 + 2);
	}

	#[test]
	fn unpaired_start_is_a_no_op() {
		let _ = env_logger::builder().is_test(true).try_init();
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(RepeatStartNode).with_input(START_ITERATIONS, 5).with_input(START_INPUT, 9));
		let value = network.add_node(DocumentNode::new(graphene_core::ValueNode::new(0)));
		connect(&mut network, start, START_OUTPUT, value, 0);

		let mut executor = GraphExecutor::default();
		assert_eq!(executor.execute(&network, value, &RenderContext::default()).unwrap(), TaggedValue::None);
		assert_eq!(executor.total_cloned_nodes(), 0);
		assert_eq!(network.validate_node(start).unwrap(), vec![ValidationIssue::Unpaired]);
	}

	#[test]
	fn iteration_counts_are_clamped() {
		let record = RecordNode::default();
		let Loop { network, start, end, .. } = record_loop(&record, 50);
		let mut executor = GraphExecutor::new(interpreted_executor::ExecutorSettings { max_iterations: 4 });
		assert_eq!(executor.execute(&network, end, &RenderContext::default()).unwrap(), TaggedValue::Int(10));
		assert_eq!(executor.cloned_node_count(start), 3);
	}
}
