use core_types::{RenderContext, SessionId};
use graph_craft::document::value::TaggedValue;
use graph_craft::document::{DocumentNode, InputConnector, NodeId, NodeNetwork, OutputConnector};
use graph_craft::unroll::{END_OUTPUT, START_CURRENT_ITERATION, START_ITERATIONS};
use graph_craft::{GraphError, GraphSource, GraphView, NodeInputs, PairKind, PairRole, VirtualConnections, VirtualScope, calculate_execution_queue, find_partner, loop_body, unroll};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
	/// Iteration counts above this are clamped.
	pub max_iterations: u32,
}

impl Default for ExecutorSettings {
	fn default() -> Self {
		Self { max_iterations: 1024 }
	}
}

/// Marks a loop start as being unrolled for as long as it lives, so a reentrant pass over the same start is refused.
/// The mark is removed when the guard drops, including when the loop body failed.
struct InProgressGuard {
	in_progress: Rc<RefCell<FxHashSet<NodeId>>>,
	start: NodeId,
}

impl InProgressGuard {
	fn enter(in_progress: &Rc<RefCell<FxHashSet<NodeId>>>, start: NodeId) -> Option<Self> {
		in_progress.borrow_mut().insert(start).then(|| Self {
			in_progress: in_progress.clone(),
			start,
		})
	}
}

impl Drop for InProgressGuard {
	fn drop(&mut self) {
		self.in_progress.borrow_mut().remove(&self.start);
	}
}

fn lookup<'a>(network: &'a NodeNetwork, clones: &'a FxHashMap<NodeId, DocumentNode>, id: NodeId) -> Result<&'a DocumentNode, GraphError> {
	network.node(id).or_else(|| clones.get(&id)).ok_or(GraphError::NodeNotFound(id))
}

/// Runs render passes over a node network.
///
/// Nodes run one after another in the order computed by the execution queue, each reading the values its upstream
/// nodes produced earlier in the same pass. Loop zones are unrolled when their start node is reached; the copies made
/// for the extra iterations are kept until the same loop is unrolled again.
#[derive(Default)]
pub struct GraphExecutor {
	settings: ExecutorSettings,
	values: FxHashMap<OutputConnector, TaggedValue>,
	executed: FxHashSet<NodeId>,
	cloned_nodes: FxHashMap<NodeId, DocumentNode>,
	/// Ids of the copies made by the last unrolling of each loop start.
	clone_sets: FxHashMap<NodeId, Vec<NodeId>>,
	virtual_connections: Rc<RefCell<VirtualConnections>>,
	in_progress: Rc<RefCell<FxHashSet<NodeId>>>,
}

impl GraphExecutor {
	pub fn new(settings: ExecutorSettings) -> Self {
		Self { settings, ..Default::default() }
	}

	pub fn settings(&self) -> &ExecutorSettings {
		&self.settings
	}

	/// Runs one pass computing the first output of `sink` and returns it.
	///
	/// The session of the context keys every virtual connection made during the pass. It is closed when the pass
	/// ends, so passes running with distinct sessions never see each other's rewiring.
	pub fn execute(&mut self, network: &NodeNetwork, sink: NodeId, context: &RenderContext) -> Result<TaggedValue, GraphError> {
		self.values.clear();
		self.executed.clear();
		let _scope = VirtualScope::begin(&self.virtual_connections, context.session, None);

		let queue = {
			let overlay = self.virtual_connections.borrow();
			let view = GraphView::new(network, &self.cloned_nodes, &overlay, context.session);
			calculate_execution_queue(&view, sink, |_, _| true)?
		};
		log::trace!("Executing {} nodes for sink {sink}", queue.len());
		self.run_queue(network, &queue, context)?;

		Ok(self.values.get(&OutputConnector::node(sink, 0)).cloned().unwrap_or_default())
	}

	/// A value computed by the last pass.
	pub fn output_value(&self, output: OutputConnector) -> Option<&TaggedValue> {
		self.values.get(&output)
	}

	/// Number of nodes currently cloned for the loop started by `start`.
	pub fn cloned_node_count(&self, start: NodeId) -> usize {
		self.clone_sets.get(&start).map_or(0, Vec::len)
	}

	/// The nodes currently cloned for the loop started by `start`.
	pub fn cloned_nodes(&self, start: NodeId) -> impl Iterator<Item = &DocumentNode> {
		self.clone_sets.get(&start).into_iter().flatten().filter_map(|id| self.cloned_nodes.get(id))
	}

	pub fn total_cloned_nodes(&self) -> usize {
		self.cloned_nodes.len()
	}

	/// Whether a loop start is currently being unrolled.
	pub fn is_unrolling(&self, start: NodeId) -> bool {
		self.in_progress.borrow().contains(&start)
	}

	/// Number of virtual sessions still open. Zero between passes.
	pub fn active_sessions(&self) -> usize {
		self.virtual_connections.borrow().session_count()
	}

	/// Drops every cloned node.
	pub fn release_clones(&mut self) {
		log::trace!("Released {} cloned nodes", self.cloned_nodes.len());
		self.cloned_nodes.clear();
		self.clone_sets.clear();
	}

	fn release_clone_set(&mut self, start: NodeId) {
		let Some(ids) = self.clone_sets.remove(&start) else { return };
		log::trace!("Released {} cloned nodes of loop {start}", ids.len());
		for id in ids {
			self.cloned_nodes.remove(&id);
			// Copies of nested loops own clone sets of their own
			self.release_clone_set(id);
		}
	}

	fn run_queue(&mut self, network: &NodeNetwork, queue: &[NodeId], context: &RenderContext) -> Result<(), GraphError> {
		for &node_id in queue {
			if self.executed.contains(&node_id) {
				continue;
			}
			match lookup(network, &self.cloned_nodes, node_id)?.pair_role() {
				Some(PairRole { kind: PairKind::Start, .. }) => self.run_loop(network, node_id, context)?,
				_ => self.execute_node(network, node_id, context)?,
			}
		}
		Ok(())
	}

	/// Resolves every input of a node: a virtual constant first, then the value of the connected output, then the
	/// default of that output if its node did not run, then the value stored on the node itself.
	fn resolve_inputs(&self, network: &NodeNetwork, node_id: NodeId, session: SessionId) -> Result<NodeInputs, GraphError> {
		let overlay = self.virtual_connections.borrow();
		let view = GraphView::new(network, &self.cloned_nodes, &overlay, session);
		let node = lookup(network, &self.cloned_nodes, node_id)?;

		let count = node.input_descriptors().len();
		let mut names = Vec::with_capacity(count);
		let mut values = Vec::with_capacity(count);
		let mut connected = Vec::with_capacity(count);
		for (index, descriptor) in node.input_descriptors().iter().enumerate() {
			let input = InputConnector::node(node_id, index);
			let local = || node.inputs.get(index).cloned().unwrap_or_default();
			names.push(descriptor.name);

			if let Some(constant) = view.constant(input) {
				values.push(constant.clone());
				connected.push(true);
				continue;
			}
			match view.upstream(input) {
				Some(output) => {
					let value = self.values.get(&output).cloned().or_else(|| {
						let producer = view.node(output.node_id)?;
						producer.output_descriptors().get(output.output_index).map(|descriptor| descriptor.default.clone())
					});
					values.push(value.unwrap_or_else(local));
					connected.push(true);
				}
				None => {
					values.push(local());
					connected.push(false);
				}
			}
		}

		Ok(NodeInputs::new(names, values, connected))
	}

	fn store_outputs(&mut self, node_id: NodeId, outputs: impl IntoIterator<Item = TaggedValue>) {
		for (index, value) in outputs.into_iter().enumerate() {
			self.values.insert(OutputConnector::node(node_id, index), value);
		}
		self.executed.insert(node_id);
	}

	fn execute_node(&mut self, network: &NodeNetwork, node_id: NodeId, context: &RenderContext) -> Result<(), GraphError> {
		let inputs = self.resolve_inputs(network, node_id, context.session)?;
		let node = lookup(network, &self.cloned_nodes, node_id)?;
		let outputs = node.implementation.execute(&inputs, context).map_err(|source| GraphError::Execution { node: node_id, source })?;

		let expected = node.output_descriptors().len();
		if outputs.len() != expected {
			return Err(GraphError::OutputCountMismatch {
				node: node_id,
				expected,
				found: outputs.len(),
			});
		}
		self.store_outputs(node_id, outputs);
		Ok(())
	}

	/// Gives every output of a node its default value without running it.
	fn skip_node(&mut self, network: &NodeNetwork, node_id: NodeId) -> Result<(), GraphError> {
		let defaults: Vec<_> = lookup(network, &self.cloned_nodes, node_id)?.output_descriptors().iter().map(|descriptor| descriptor.default.clone()).collect();
		self.store_outputs(node_id, defaults);
		Ok(())
	}

	/// Runs the loop zone opened by `start`.
	fn run_loop(&mut self, network: &NodeNetwork, start: NodeId, context: &RenderContext) -> Result<(), GraphError> {
		let end = {
			let overlay = self.virtual_connections.borrow();
			find_partner(&GraphView::new(network, &self.cloned_nodes, &overlay, context.session), start)
		};
		let Some(end) = end else {
			log::warn!("Loop start {start} has no matching end, the loop does nothing");
			return self.skip_node(network, start);
		};
		let Some(_guard) = InProgressGuard::enter(&self.in_progress, start) else {
			log::warn!("Loop start {start} is already being unrolled, refused reentrant execution");
			return self.skip_node(network, start);
		};

		let inputs = self.resolve_inputs(network, start, context.session)?;
		let requested = inputs.int(START_ITERATIONS).map_err(|source| GraphError::Execution { node: start, source })?;
		let iterations = match u32::try_from(requested) {
			Ok(iterations) if iterations > self.settings.max_iterations => {
				log::warn!("Loop {start} requested {iterations} iterations, clamped to {}", self.settings.max_iterations);
				self.settings.max_iterations
			}
			Ok(iterations) => iterations,
			Err(_) => 0,
		};

		self.release_clone_set(start);

		if iterations == 0 {
			let body = {
				let overlay = self.virtual_connections.borrow();
				loop_body(&GraphView::new(network, &self.cloned_nodes, &overlay, context.session), start, end)?
			};
			let mut start_outputs = vec![TaggedValue::None; lookup(network, &self.cloned_nodes, start)?.output_descriptors().len()];
			if let Some(counter) = start_outputs.get_mut(START_CURRENT_ITERATION) {
				*counter = TaggedValue::Int(0);
			}
			self.store_outputs(start, start_outputs);
			self.executed.extend(body);
			self.values.insert(OutputConnector::node(end, END_OUTPUT), TaggedValue::None);
			self.executed.insert(end);
			return Ok(());
		}

		self.execute_node(network, start, context)?;

		if iterations == 1 {
			let queue = {
				let overlay = self.virtual_connections.borrow();
				let view = GraphView::new(network, &self.cloned_nodes, &overlay, context.session);
				calculate_execution_queue(&view, end, |_, output| output.node_id != start)?
			};
			return self.run_queue(network, &queue, context);
		}

		let session = SessionId::new();
		let _scope = VirtualScope::begin(&self.virtual_connections, session, Some(context.session));
		let loop_context = context.with_session(session);

		let unrolled = {
			let overlay = self.virtual_connections.borrow();
			let view = GraphView::new(network, &self.cloned_nodes, &overlay, session);
			let body = loop_body(&view, start, end)?;
			unroll(&view, start, end, &body, iterations)?
		};
		{
			let mut overlay = self.virtual_connections.borrow_mut();
			for &(output, input) in &unrolled.connections {
				overlay.connect(session, output, input);
			}
			for (input, value) in &unrolled.constants {
				overlay.set_constant(session, *input, value.clone());
			}
		}
		self.clone_sets.insert(start, unrolled.clone_ids());
		self.cloned_nodes.extend(unrolled.clones.into_iter().map(|node| (node.id, node)));

		let queue = {
			let overlay = self.virtual_connections.borrow();
			let view = GraphView::new(network, &self.cloned_nodes, &overlay, session);
			calculate_execution_queue(&view, end, |_, output| output.node_id != start)?
		};
		self.run_queue(network, &queue, &loop_context)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use graph_craft::{Node, NodeError, PropertyDescriptor};

	#[derive(Clone)]
	struct Broken;

	impl Node for Broken {
		fn identifier(&self) -> &'static str {
			"test::Broken"
		}

		fn inputs(&self) -> Vec<PropertyDescriptor> {
			vec![PropertyDescriptor::value("Fail", false)]
		}

		fn outputs(&self) -> Vec<PropertyDescriptor> {
			vec![PropertyDescriptor::value("A", 0), PropertyDescriptor::value("B", 0)]
		}

		fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
			if inputs.bool(0)? {
				return Err(NodeError::Evaluation("asked to fail".into()));
			}
			Ok(vec![TaggedValue::Int(1)])
		}

		fn create_copy(&self) -> Box<dyn Node> {
			Box::new(Broken)
		}
	}

	#[test]
	fn node_errors_are_reported_with_the_node() {
		let _ = env_logger::builder().is_test(true).try_init();
		let mut network = NodeNetwork::new();
		let node = network.add_node(DocumentNode::new(Broken).with_input(0, true));
		let mut executor = GraphExecutor::default();
		let context = RenderContext::default();
		assert_eq!(
			executor.execute(&network, node, &context),
			Err(GraphError::Execution {
				node,
				source: NodeError::Evaluation("asked to fail".into())
			})
		);

		network.node_mut(node).unwrap().set_input_value(0, false);
		assert_eq!(
			executor.execute(&network, node, &context),
			Err(GraphError::OutputCountMismatch { node, expected: 2, found: 1 })
		);
	}

	#[test]
	fn sessions_close_with_the_pass() {
		let mut network = NodeNetwork::new();
		let node = network.add_node(DocumentNode::new(Broken).with_input(0, true));
		let mut executor = GraphExecutor::default();
		let context = RenderContext::default();
		assert!(executor.execute(&network, node, &context).is_err());
		assert_eq!(executor.active_sessions(), 0);
		assert!(executor.in_progress.borrow().is_empty());
	}
}
