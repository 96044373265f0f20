pub mod dynamic_executor;

pub use dynamic_executor::{ExecutorSettings, GraphExecutor};

#[cfg(test)]
mod tests {
	use super::*;
	use core_types::RenderContext;
	use graph_craft::document::value::TaggedValue;
	use graph_craft::document::*;
	use graphene_core::{EqualsNode, SwitchNode, ValueNode};
	use math_nodes::{CombineVectorNode, SeparateVectorNode, VectorSize};
	use pretty_assertions::assert_eq;

	fn connect(network: &mut NodeNetwork, from: NodeId, output: usize, to: NodeId, input: usize) {
		network.connect(OutputConnector::node(from, output), InputConnector::node(to, input)).unwrap();
	}

	#[test]
	fn execute_vector_roundtrip() {
		let _ = env_logger::builder().is_test(true).try_init();

		let mut network = NodeNetwork::new();
		let x = network.add_node(DocumentNode::new(ValueNode::new(0.)).with_input(0, 3.));
		let y = network.add_node(DocumentNode::new(ValueNode::new(0.)).with_input(0, 4.));
		let combine = network.add_node(DocumentNode::new(CombineVectorNode::new(VectorSize::Two)));
		let separate = network.add_node(DocumentNode::new(SeparateVectorNode::new(VectorSize::Two)));
		connect(&mut network, x, 0, combine, 0);
		connect(&mut network, y, 0, combine, 1);
		connect(&mut network, combine, 0, separate, 0);

		let mut executor = GraphExecutor::default();
		let result = executor.execute(&network, combine, &RenderContext::default()).unwrap();
		assert_eq!(result, TaggedValue::Vec2(glam::DVec2::new(3., 4.)));

		executor.execute(&network, separate, &RenderContext::default()).unwrap();
		assert_eq!(executor.output_value(OutputConnector::node(separate, 1)), Some(&TaggedValue::Float(4.)));
	}

	#[test]
	fn unconnected_inputs_read_their_local_value() {
		let mut network = NodeNetwork::new();
		let a = network.add_node(DocumentNode::new(ValueNode::new(5)));
		let equals = network.add_node(DocumentNode::new(EqualsNode).with_input(1, 5));
		let switch = network.add_node(DocumentNode::new(SwitchNode).with_input(SwitchNode::IF_TRUE, "same").with_input(SwitchNode::IF_FALSE, "different"));
		connect(&mut network, a, 0, equals, 0);
		connect(&mut network, equals, 0, switch, SwitchNode::CONDITION);

		let mut executor = GraphExecutor::default();
		let context = RenderContext::default();
		assert_eq!(executor.execute(&network, switch, &context).unwrap(), TaggedValue::from("same"));

		network.node_mut(a).unwrap().set_input_value(0, 6);
		assert_eq!(executor.execute(&network, switch, &context).unwrap(), TaggedValue::from("different"));
	}

	#[test]
	fn only_dependencies_of_the_sink_run() {
		let mut network = NodeNetwork::new();
		let a = network.add_node(DocumentNode::new(ValueNode::new(1)));
		let b = network.add_node(DocumentNode::new(ValueNode::new(2)));
		let mut executor = GraphExecutor::default();
		executor.execute(&network, a, &RenderContext::default()).unwrap();
		assert!(executor.output_value(OutputConnector::node(a, 0)).is_some());
		assert!(executor.output_value(OutputConnector::node(b, 0)).is_none());
	}
}
