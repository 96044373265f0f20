use core_types::RenderContext;
use graph_craft::{Node, NodeError, NodeInputs, Painter, PropertyDescriptor, TaggedValue};
use raster_types::Surface;

/// Passes its input through unchanged.
/// This is useful for holding a value that several nodes read, or for rerouting wires.
#[derive(Debug, Clone, Default)]
pub struct ValueNode {
	default: TaggedValue,
}

impl ValueNode {
	pub fn new(default: impl Into<TaggedValue>) -> Self {
		Self { default: default.into() }
	}
}

impl Node for ValueNode {
	fn identifier(&self) -> &'static str {
		"graphene_core::value::ValueNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Value", self.default.clone())]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Value", self.default.clone())]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(vec![inputs.value(0)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}
}

/// Paints a fixed image.
#[derive(Debug, Clone)]
pub struct ImageNode {
	painter: Painter,
}

impl ImageNode {
	pub fn new(image: Surface) -> Self {
		Self { painter: Painter::from_surface(image) }
	}
}

impl Node for ImageNode {
	fn identifier(&self) -> &'static str {
		"graphene_core::value::ImageNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		Vec::new()
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::paint("Image")]
	}

	fn execute(&self, _: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		Ok(vec![self.painter.clone().into()])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}
}
