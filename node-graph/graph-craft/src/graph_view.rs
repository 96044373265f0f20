use crate::document::value::TaggedValue;
use crate::document::{DocumentNode, InputConnector, NodeId, NodeNetwork, OutputConnector};
use crate::virtual_connection::VirtualConnections;
use core_types::SessionId;
use rustc_hash::FxHashMap;

/// Read access to a graph topology, as needed by the traversals.
pub trait GraphSource {
	fn node(&self, id: NodeId) -> Option<&DocumentNode>;

	/// The output an input is connected to.
	fn upstream(&self, input: InputConnector) -> Option<OutputConnector>;

	/// Every input an output is connected to, in a stable order.
	fn consumers(&self, output: OutputConnector) -> Vec<InputConnector>;

	/// A value forced onto an input, overriding its connection.
	fn constant(&self, _input: InputConnector) -> Option<&TaggedValue> {
		None
	}

	/// Ids of every node consuming any output of `id`.
	fn downstream_nodes(&self, id: NodeId) -> Vec<NodeId> {
		let Some(node) = self.node(id) else { return Vec::new() };
		let mut nodes: Vec<_> = (0..node.output_descriptors().len())
			.flat_map(|index| self.consumers(OutputConnector::node(id, index)))
			.map(|input| input.node_id)
			.collect();
		nodes.sort_unstable();
		nodes.dedup();
		nodes
	}

	/// Ids of every node feeding any input of `id`.
	fn upstream_nodes(&self, id: NodeId) -> Vec<NodeId> {
		let Some(node) = self.node(id) else { return Vec::new() };
		(0..node.inputs.len()).filter_map(|index| self.upstream(InputConnector::node(id, index))).map(|output| output.node_id).collect()
	}
}

impl GraphSource for NodeNetwork {
	fn node(&self, id: NodeId) -> Option<&DocumentNode> {
		NodeNetwork::node(self, id)
	}

	fn upstream(&self, input: InputConnector) -> Option<OutputConnector> {
		NodeNetwork::upstream(self, input)
	}

	fn consumers(&self, output: OutputConnector) -> Vec<InputConnector> {
		self.downstream(output)
	}
}

/// The persistent network seen through a virtual session, with the nodes cloned by unrolling added to it.
///
/// Connections recorded in the session shadow the persistent connection of the same input.
#[derive(Clone, Copy)]
pub struct GraphView<'a> {
	pub network: &'a NodeNetwork,
	pub clones: &'a FxHashMap<NodeId, DocumentNode>,
	pub overlay: &'a VirtualConnections,
	pub session: SessionId,
}

impl<'a> GraphView<'a> {
	pub fn new(network: &'a NodeNetwork, clones: &'a FxHashMap<NodeId, DocumentNode>, overlay: &'a VirtualConnections, session: SessionId) -> Self {
		Self { network, clones, overlay, session }
	}
}

impl GraphSource for GraphView<'_> {
	fn node(&self, id: NodeId) -> Option<&DocumentNode> {
		self.network.node(id).or_else(|| self.clones.get(&id))
	}

	fn upstream(&self, input: InputConnector) -> Option<OutputConnector> {
		self.overlay.connection(self.session, input).or_else(|| self.network.upstream(input))
	}

	fn consumers(&self, output: OutputConnector) -> Vec<InputConnector> {
		let mut inputs: Vec<_> = self.network.downstream(output).into_iter().filter(|input| !self.overlay.is_shadowed(self.session, *input)).collect();
		inputs.extend(self.overlay.consumers(self.session, output));
		inputs.sort_unstable();
		inputs.dedup();
		inputs
	}

	fn constant(&self, input: InputConnector) -> Option<&TaggedValue> {
		self.overlay.constant(self.session, input)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test_nodes::{AddNode, ConstantNode};

	#[test]
	fn overlay_shadows_persistent_connections() {
		let mut network = NodeNetwork::new();
		let a = network.add_node(DocumentNode::new(ConstantNode::new(1)));
		let b = network.add_node(DocumentNode::new(ConstantNode::new(2)));
		let sum = network.add_node(DocumentNode::new(AddNode));
		network.connect(OutputConnector::node(a, 0), InputConnector::node(sum, 0)).unwrap();

		let session = SessionId::new();
		let mut overlay = VirtualConnections::new();
		overlay.begin(session, None);
		overlay.connect(session, OutputConnector::node(b, 0), InputConnector::node(sum, 0));

		let clones = FxHashMap::default();
		let view = GraphView::new(&network, &clones, &overlay, session);
		assert_eq!(view.upstream(InputConnector::node(sum, 0)), Some(OutputConnector::node(b, 0)));
		assert_eq!(view.consumers(OutputConnector::node(a, 0)), vec![]);
		assert_eq!(view.downstream_nodes(b), vec![sum]);
		assert_eq!(network.upstream(InputConnector::node(sum, 0)), Some(OutputConnector::node(a, 0)));
	}
}
