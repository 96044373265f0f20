use crate::document::{InputConnector, NodeId, OutputConnector};

/// Raised by a node while it executes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NodeError {
	#[error("Input `{0}` is required")]
	MissingInput(&'static str),
	#[error("Input `{input}` expected {expected}, found {found}")]
	TypeMismatch { input: &'static str, expected: &'static str, found: &'static str },
	#[error("{0}")]
	Evaluation(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
	#[error("Node {0} is not present in the network")]
	NodeNotFound(NodeId),
	#[error("Node {} has no input {} ({len} inputs)", .input.node_id, .input.input_index)]
	InputOutOfRange { input: InputConnector, len: usize },
	#[error("Node {} has no output {} ({len} outputs)", .output.node_id, .output.output_index)]
	OutputOutOfRange { output: OutputConnector, len: usize },
	#[error("Cycle detected involving node {0}")]
	CycleDetected(NodeId),
	#[error("Connecting node {} to node {} would create a loop", .output.node_id, .input.node_id)]
	ConnectionWouldCreateLoop { output: OutputConnector, input: InputConnector },
	#[error("Node {node} returned {found} outputs, expected {expected}")]
	OutputCountMismatch { node: NodeId, expected: usize, found: usize },
	#[error("Node {node} failed: {source}")]
	Execution {
		node: NodeId,
		#[source]
		source: NodeError,
	},
}
