use crate::error::GraphError;
use crate::node::{Node, PairRole, PropertyDescriptor, ValidationIssue};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Debug;

pub mod value;

pub use core_types::uuid::{NodeId, generate_uuid};
use value::TaggedValue;

/// An input socket of a specific node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputConnector {
	pub node_id: NodeId,
	pub input_index: usize,
}

impl InputConnector {
	pub const fn node(node_id: NodeId, input_index: usize) -> Self {
		Self { node_id, input_index }
	}
}

/// An output socket of a specific node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputConnector {
	pub node_id: NodeId,
	pub output_index: usize,
}

impl OutputConnector {
	pub const fn node(node_id: NodeId, output_index: usize) -> Self {
		Self { node_id, output_index }
	}
}

/// A node placed in a network, together with the values its unconnected inputs fall back to.
pub struct DocumentNode {
	pub id: NodeId,
	pub implementation: Box<dyn Node>,
	/// Locally stored value of every input, read when the input is not connected.
	pub inputs: Vec<TaggedValue>,
	input_descriptors: Vec<PropertyDescriptor>,
	output_descriptors: Vec<PropertyDescriptor>,
	/// For clones made while unrolling a loop, the node this one was copied from.
	pub origin: Option<NodeId>,
}

impl Debug for DocumentNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DocumentNode")
			.field("id", &self.id)
			.field("implementation", &self.implementation.identifier())
			.field("inputs", &self.inputs)
			.field("origin", &self.origin)
			.finish()
	}
}

/// Keeps the id. Use [`DocumentNode::create_copy`] for a clone that can live next to the original.
impl Clone for DocumentNode {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			implementation: self.implementation.create_copy(),
			inputs: self.inputs.clone(),
			input_descriptors: self.input_descriptors.clone(),
			output_descriptors: self.output_descriptors.clone(),
			origin: self.origin,
		}
	}
}

impl DocumentNode {
	pub fn new(implementation: impl Node + 'static) -> Self {
		Self::from_boxed(Box::new(implementation))
	}

	pub fn from_boxed(implementation: Box<dyn Node>) -> Self {
		let input_descriptors = implementation.inputs();
		let output_descriptors = implementation.outputs();
		Self {
			id: NodeId::new(),
			inputs: input_descriptors.iter().map(|descriptor| descriptor.default.clone()).collect(),
			implementation,
			input_descriptors,
			output_descriptors,
			origin: None,
		}
	}

	#[must_use]
	pub fn with_id(mut self, id: NodeId) -> Self {
		self.id = id;
		self
	}

	/// Sets the locally stored value of an input. Indices past the last input are ignored with a warning.
	#[must_use]
	pub fn with_input(mut self, index: usize, value: impl Into<TaggedValue>) -> Self {
		self.set_input_value(index, value);
		self
	}

	pub fn set_input_value(&mut self, index: usize, value: impl Into<TaggedValue>) {
		match self.inputs.get_mut(index) {
			Some(input) => *input = value.into(),
			None => log::warn!("Node {} ({}) has no input {index}", self.id, self.implementation.identifier()),
		}
	}

	pub fn input_descriptors(&self) -> &[PropertyDescriptor] {
		&self.input_descriptors
	}

	pub fn output_descriptors(&self) -> &[PropertyDescriptor] {
		&self.output_descriptors
	}

	pub fn input_index(&self, name: &str) -> Option<usize> {
		self.input_descriptors.iter().position(|descriptor| descriptor.name == name)
	}

	pub fn output_index(&self, name: &str) -> Option<usize> {
		self.output_descriptors.iter().position(|descriptor| descriptor.name == name)
	}

	pub fn pair_role(&self) -> Option<PairRole> {
		self.implementation.pair_role()
	}

	/// A copy with a fresh id, independent internal state and the same local input values.
	/// Connections are not part of a node and have to be mirrored by the caller.
	pub fn create_copy(&self) -> Self {
		Self {
			id: NodeId::new(),
			origin: Some(self.origin.unwrap_or(self.id)),
			..self.clone()
		}
	}
}

/// The persistent graph: nodes keyed by id and the connection of every connected input.
///
/// An input holds at most one connection, an output may fan out to any number of inputs.
#[derive(Debug, Clone, Default)]
pub struct NodeNetwork {
	nodes: FxHashMap<NodeId, DocumentNode>,
	connections: FxHashMap<InputConnector, OutputConnector>,
	/// Reverse of `connections`.
	consumers: FxHashMap<OutputConnector, FxHashSet<InputConnector>>,
}

impl NodeNetwork {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_node(&mut self, node: DocumentNode) -> NodeId {
		let id = node.id;
		if self.nodes.insert(id, node).is_some() {
			log::warn!("Replaced node {id} which was already in the network");
		}
		id
	}

	/// Removes a node together with every connection into or out of it.
	pub fn remove_node(&mut self, id: NodeId) -> Option<DocumentNode> {
		let node = self.nodes.remove(&id)?;
		for index in 0..node.inputs.len() {
			self.disconnect(InputConnector::node(id, index));
		}
		for index in 0..node.output_descriptors.len() {
			for input in self.consumers.remove(&OutputConnector::node(id, index)).into_iter().flatten() {
				self.connections.remove(&input);
			}
		}
		Some(node)
	}

	pub fn node(&self, id: NodeId) -> Option<&DocumentNode> {
		self.nodes.get(&id)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DocumentNode> {
		self.nodes.get_mut(&id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &DocumentNode> {
		self.nodes.values()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	fn check_connectors(&self, output: OutputConnector, input: InputConnector) -> Result<(), GraphError> {
		let producer = self.nodes.get(&output.node_id).ok_or(GraphError::NodeNotFound(output.node_id))?;
		let consumer = self.nodes.get(&input.node_id).ok_or(GraphError::NodeNotFound(input.node_id))?;
		let len = producer.output_descriptors.len();
		if output.output_index >= len {
			return Err(GraphError::OutputOutOfRange { output, len });
		}
		let len = consumer.input_descriptors.len();
		if input.input_index >= len {
			return Err(GraphError::InputOutOfRange { input, len });
		}
		Ok(())
	}

	/// Whether connecting `output` to `input` would make the producing node depend on itself.
	pub fn is_loop(&self, output: OutputConnector, input: InputConnector) -> bool {
		if output.node_id == input.node_id {
			return true;
		}
		let mut visited = FxHashSet::default();
		let mut stack = vec![output.node_id];
		while let Some(node_id) = stack.pop() {
			if node_id == input.node_id {
				return true;
			}
			if !visited.insert(node_id) {
				continue;
			}
			let Some(node) = self.nodes.get(&node_id) else { continue };
			stack.extend((0..node.inputs.len()).filter_map(|index| self.connections.get(&InputConnector::node(node_id, index))).map(|producer| producer.node_id));
		}
		false
	}

	/// Connects an output to an input, replacing whatever the input was connected to before.
	pub fn connect(&mut self, output: OutputConnector, input: InputConnector) -> Result<(), GraphError> {
		self.check_connectors(output, input)?;
		if self.is_loop(output, input) {
			return Err(GraphError::ConnectionWouldCreateLoop { output, input });
		}
		if let Some(previous) = self.connections.insert(input, output) {
			self.forget_consumer(previous, input);
			log::debug!("Input {} of node {} was connected to node {}, replaced", input.input_index, input.node_id, previous.node_id);
		}
		self.consumers.entry(output).or_default().insert(input);
		Ok(())
	}

	pub fn disconnect(&mut self, input: InputConnector) -> Option<OutputConnector> {
		let output = self.connections.remove(&input)?;
		self.forget_consumer(output, input);
		Some(output)
	}

	fn forget_consumer(&mut self, output: OutputConnector, input: InputConnector) {
		if let Some(inputs) = self.consumers.get_mut(&output) {
			inputs.remove(&input);
			if inputs.is_empty() {
				self.consumers.remove(&output);
			}
		}
	}

	pub fn upstream(&self, input: InputConnector) -> Option<OutputConnector> {
		self.connections.get(&input).copied()
	}

	/// Every input the output fans out to, in a stable order.
	pub fn downstream(&self, output: OutputConnector) -> Vec<InputConnector> {
		let mut inputs: Vec<_> = self.consumers.get(&output).into_iter().flatten().copied().collect();
		inputs.sort_unstable();
		inputs
	}

	pub fn connections(&self) -> impl Iterator<Item = (InputConnector, OutputConnector)> + '_ {
		self.connections.iter().map(|(input, output)| (*input, *output))
	}

	/// Runs the advisory validation hook of a node against its current inputs. Execution does not call this.
	pub fn validate_node(&self, id: NodeId) -> Result<Vec<ValidationIssue>, GraphError> {
		let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
		let connected = (0..node.inputs.len()).map(|index| self.connections.contains_key(&InputConnector::node(id, index))).collect();
		let inputs = crate::node::NodeInputs::new(node.input_descriptors.iter().map(|descriptor| descriptor.name).collect(), node.inputs.clone(), connected);
		let mut issues = node.implementation.validate(&inputs);
		if node.pair_role().is_some() && crate::pairing::find_partner(self, id).is_none() {
			issues.push(ValidationIssue::Unpaired);
		}
		Ok(issues)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test_nodes::{AddNode, ConstantNode};

	fn chain() -> (NodeNetwork, NodeId, NodeId, NodeId) {
		let mut network = NodeNetwork::new();
		let a = network.add_node(DocumentNode::new(ConstantNode::new(1)));
		let b = network.add_node(DocumentNode::new(AddNode));
		let c = network.add_node(DocumentNode::new(AddNode));
		network.connect(OutputConnector::node(a, 0), InputConnector::node(b, 0)).unwrap();
		network.connect(OutputConnector::node(b, 0), InputConnector::node(c, 0)).unwrap();
		(network, a, b, c)
	}

	#[test]
	fn connecting_replaces_the_previous_connection() {
		let (mut network, a, b, c) = chain();
		network.connect(OutputConnector::node(a, 0), InputConnector::node(c, 0)).unwrap();
		assert_eq!(network.upstream(InputConnector::node(c, 0)), Some(OutputConnector::node(a, 0)));
		assert_eq!(network.downstream(OutputConnector::node(b, 0)), vec![]);

		let mut expected = vec![InputConnector::node(b, 0), InputConnector::node(c, 0)];
		expected.sort_unstable();
		assert_eq!(network.downstream(OutputConnector::node(a, 0)), expected);
	}

	#[test]
	fn loops_are_rejected() {
		let (mut network, a, b, c) = chain();
		let output = OutputConnector::node(c, 0);
		for input in [InputConnector::node(a, 0), InputConnector::node(b, 1), InputConnector::node(c, 1)] {
			assert_eq!(network.connect(output, input), Err(GraphError::ConnectionWouldCreateLoop { output, input }));
		}
		assert_eq!(network.connections().count(), 2);

		let input = InputConnector::node(c, 2);
		assert_eq!(network.connect(output, input), Err(GraphError::InputOutOfRange { input, len: 2 }));
	}

	#[test]
	fn removing_a_node_drops_its_connections() {
		let (mut network, a, b, c) = chain();
		assert!(network.remove_node(b).is_some());
		assert_eq!(network.connections().count(), 0);
		assert_eq!(network.downstream(OutputConnector::node(a, 0)), vec![]);
		assert_eq!(network.upstream(InputConnector::node(c, 0)), None);
	}

	#[test]
	fn fan_out_survives_reconnection_and_removal() {
		let (mut network, a, b, c) = chain();
		let d = network.add_node(DocumentNode::new(AddNode));
		let output = OutputConnector::node(a, 0);
		network.connect(output, InputConnector::node(c, 1)).unwrap();
		network.connect(output, InputConnector::node(d, 0)).unwrap();
		// Reconnecting the same pair keeps a single entry
		network.connect(output, InputConnector::node(d, 0)).unwrap();
		assert_eq!(network.downstream(output).len(), 3);

		assert_eq!(network.disconnect(InputConnector::node(c, 1)), Some(output));
		assert_eq!(network.downstream(output).len(), 2);

		network.remove_node(d);
		assert_eq!(network.downstream(output), vec![InputConnector::node(b, 0)]);
		assert!(network.is_loop(OutputConnector::node(c, 0), InputConnector::node(a, 0)));
		assert!(!network.is_loop(OutputConnector::node(a, 0), InputConnector::node(c, 1)));
	}

	#[test]
	fn copies_get_fresh_ids_and_remember_their_origin() {
		let node = DocumentNode::new(ConstantNode::new(3)).with_input(0, 5);
		let copy = node.create_copy();
		assert_ne!(copy.id, node.id);
		assert_eq!(copy.origin, Some(node.id));
		assert_eq!(copy.inputs, node.inputs);
		assert_eq!(copy.create_copy().origin, Some(node.id));
	}

	#[test]
	fn validation_reports_missing_connections() {
		let (network, _, b, c) = chain();
		assert_eq!(network.validate_node(b).unwrap(), vec![ValidationIssue::MissingConnection("B")]);
		assert_eq!(network.validate_node(c).unwrap(), vec![ValidationIssue::MissingConnection("B")]);
		assert_eq!(network.validate_node(NodeId(0)), Err(GraphError::NodeNotFound(NodeId(0))));
	}

	#[test]
	fn unpaired_zone_nodes_are_reported() {
		use crate::test_nodes::PairNode;
		let mut network = NodeNetwork::new();
		let start = network.add_node(DocumentNode::new(PairNode::start()));
		let end = network.add_node(DocumentNode::new(PairNode::end()));
		assert_eq!(network.validate_node(start).unwrap(), vec![ValidationIssue::Unpaired]);

		network.connect(OutputConnector::node(start, 1), InputConnector::node(end, 0)).unwrap();
		assert!(network.validate_node(start).unwrap().is_empty());
		assert!(network.validate_node(end).unwrap().is_empty());
	}
}
