use crate::document::value::TaggedValue;
use crate::error::NodeError;
use crate::expression::FuncValue;
use crate::painter::Painter;
use core_types::RenderContext;

/// How a socket carries its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
	/// A concrete value, read when the node executes.
	Value,
	/// A symbolic per-pixel function, see [`FuncValue`].
	Func,
	/// A lazily evaluated paint chain, see [`Painter`].
	Paint,
}

/// Name, flavor and default value of a socket.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
	pub name: &'static str,
	pub kind: PropertyKind,
	pub default: TaggedValue,
}

impl PropertyDescriptor {
	pub fn value(name: &'static str, default: impl Into<TaggedValue>) -> Self {
		Self {
			name,
			kind: PropertyKind::Value,
			default: default.into(),
		}
	}

	pub fn func(name: &'static str, default: impl Into<TaggedValue>) -> Self {
		Self {
			name,
			kind: PropertyKind::Func,
			default: default.into(),
		}
	}

	pub fn paint(name: &'static str) -> Self {
		Self {
			name,
			kind: PropertyKind::Paint,
			default: TaggedValue::None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
	Start,
	End,
}

/// Marks a node as one half of a start/end pair delimiting a zone, such as a repeat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairRole {
	/// Starts only pair with ends of the same zone.
	pub zone: &'static str,
	pub kind: PairKind,
}

impl PairRole {
	pub const fn start(zone: &'static str) -> Self {
		Self { zone, kind: PairKind::Start }
	}

	pub const fn end(zone: &'static str) -> Self {
		Self { zone, kind: PairKind::End }
	}
}

/// Returned by the advisory validation hooks. Execution never checks these.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
	MissingConnection(&'static str),
	OutOfRange { input: &'static str, value: TaggedValue },
	Unpaired,
}

/// The unit of computation.
///
/// Nodes are stateless transforms: everything they read arrives through [`NodeInputs`] and everything they produce
/// is returned from [`Node::execute`], one value per output.
pub trait Node: Send + Sync {
	fn identifier(&self) -> &'static str;

	fn inputs(&self) -> Vec<PropertyDescriptor>;

	fn outputs(&self) -> Vec<PropertyDescriptor>;

	fn execute(&self, inputs: &NodeInputs, context: &RenderContext) -> Result<Vec<TaggedValue>, NodeError>;

	/// A fresh instance with independent internal state, used when a subgraph is duplicated.
	fn create_copy(&self) -> Box<dyn Node>;

	fn pair_role(&self) -> Option<PairRole> {
		None
	}

	fn validate(&self, _inputs: &NodeInputs) -> Vec<ValidationIssue> {
		Vec::new()
	}
}

static NONE: TaggedValue = TaggedValue::None;

/// The resolved inputs of a node for one execution.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
	names: Vec<&'static str>,
	values: Vec<TaggedValue>,
	connected: Vec<bool>,
}

impl NodeInputs {
	pub fn new(names: Vec<&'static str>, values: Vec<TaggedValue>, connected: Vec<bool>) -> Self {
		Self { names, values, connected }
	}

	/// Builds the inputs of a node with nothing connected.
	pub fn unconnected(node: &dyn Node, values: Vec<TaggedValue>) -> Self {
		let names: Vec<_> = node.inputs().iter().map(|descriptor| descriptor.name).collect();
		let connected = vec![false; names.len()];
		Self { names, values, connected }
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn name(&self, index: usize) -> &'static str {
		self.names.get(index).copied().unwrap_or("?")
	}

	/// [`TaggedValue::None`] for indices past the last input.
	pub fn get(&self, index: usize) -> &TaggedValue {
		self.values.get(index).unwrap_or(&NONE)
	}

	pub fn is_connected(&self, index: usize) -> bool {
		self.connected.get(index).copied().unwrap_or(false)
	}

	fn mismatch(&self, index: usize, expected: &'static str) -> NodeError {
		NodeError::TypeMismatch {
			input: self.name(index),
			expected,
			found: self.get(index).ty(),
		}
	}

	pub fn bool(&self, index: usize) -> Result<bool, NodeError> {
		self.get(index).as_bool().ok_or_else(|| self.mismatch(index, "bool"))
	}

	pub fn int(&self, index: usize) -> Result<i32, NodeError> {
		self.get(index).as_int().ok_or_else(|| self.mismatch(index, "int"))
	}

	pub fn float(&self, index: usize) -> Result<f64, NodeError> {
		self.get(index).as_float().ok_or_else(|| self.mismatch(index, "float"))
	}

	/// `None` when nothing is connected and there is nothing to paint.
	pub fn painter(&self, index: usize) -> Result<Option<&Painter>, NodeError> {
		match self.get(index) {
			TaggedValue::None => Ok(None),
			TaggedValue::Painter(painter) => Ok(Some(painter)),
			_ => Err(self.mismatch(index, "painter")),
		}
	}

	/// Reads a function input. Plain values are lifted to constant functions.
	pub fn func(&self, index: usize) -> Result<FuncValue, NodeError> {
		match self.get(index) {
			TaggedValue::Func(func) => Ok(func.clone()),
			TaggedValue::None => Err(NodeError::MissingInput(self.name(index))),
			value => value.to_shader_value().map(FuncValue::constant).ok_or_else(|| self.mismatch(index, "function")),
		}
	}

	pub fn value(&self, index: usize) -> TaggedValue {
		self.get(index).clone()
	}
}
