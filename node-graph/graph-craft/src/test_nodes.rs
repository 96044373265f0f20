//! Minimal nodes for exercising the graph machinery.

use crate::document::value::TaggedValue;
use crate::error::NodeError;
use crate::node::{Node, NodeInputs, PairKind, PairRole, PropertyDescriptor, ValidationIssue};
use core_types::RenderContext;

#[derive(Debug, Clone)]
pub struct ConstantNode {
	value: i32,
}

impl ConstantNode {
	pub fn new(value: i32) -> Self {
		Self { value }
	}
}

impl Node for ConstantNode {
	fn identifier(&self) -> &'static str {
		"test::Constant"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Value", self.value)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Value", 0)]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(vec![TaggedValue::Int(inputs.int(0)?)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}
}

#[derive(Debug, Clone)]
pub struct AddNode;

impl Node for AddNode {
	fn identifier(&self) -> &'static str {
		"test::Add"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("A", 0), PropertyDescriptor::value("B", 0)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Sum", 0)]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(vec![TaggedValue::Int(inputs.int(0)? + inputs.int(1)?)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(AddNode)
	}

	fn validate(&self, inputs: &NodeInputs) -> Vec<ValidationIssue> {
		(0..inputs.len()).filter(|&index| !inputs.is_connected(index)).map(|index| ValidationIssue::MissingConnection(inputs.name(index))).collect()
	}
}

/// One half of a zone with the port layout of a loop: `(Iterations, Input) -> (CurrentIteration, Output)` for the
/// start and `Input -> Output` for the end.
#[derive(Debug, Clone)]
pub struct PairNode {
	kind: PairKind,
}

impl PairNode {
	pub fn start() -> Self {
		Self { kind: PairKind::Start }
	}

	pub fn end() -> Self {
		Self { kind: PairKind::End }
	}
}

impl Node for PairNode {
	fn identifier(&self) -> &'static str {
		match self.kind {
			PairKind::Start => "test::PairStart",
			PairKind::End => "test::PairEnd",
		}
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		match self.kind {
			PairKind::Start => vec![PropertyDescriptor::value("Iterations", 1), PropertyDescriptor::value("Input", TaggedValue::None)],
			PairKind::End => vec![PropertyDescriptor::value("Input", TaggedValue::None)],
		}
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		match self.kind {
			PairKind::Start => vec![PropertyDescriptor::value("CurrentIteration", 1), PropertyDescriptor::value("Output", TaggedValue::None)],
			PairKind::End => vec![PropertyDescriptor::value("Output", TaggedValue::None)],
		}
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(match self.kind {
			PairKind::Start => vec![TaggedValue::Int(1), inputs.value(1)],
			PairKind::End => vec![inputs.value(0)],
		})
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}

	fn pair_role(&self) -> Option<PairRole> {
		Some(PairRole { zone: "test", kind: self.kind })
	}
}
