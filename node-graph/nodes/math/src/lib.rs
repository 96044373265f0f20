use core_types::RenderContext;
use glam::{DVec2, DVec3, DVec4};
use graph_craft::{Expression, FuncValue, Node, NodeError, NodeInputs, PropertyDescriptor, TaggedValue};

const COMPONENT_NAMES: [&str; 4] = ["X", "Y", "Z", "W"];

/// Number of components of the vectors a node packs or unpacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorSize {
	#[default]
	Two,
	Three,
	Four,
}

impl VectorSize {
	pub fn components(&self) -> usize {
		match self {
			VectorSize::Two => 2,
			VectorSize::Three => 3,
			VectorSize::Four => 4,
		}
	}

	fn zero(&self) -> TaggedValue {
		self.pack(&[0.; 4])
	}

	fn pack(&self, components: &[f64]) -> TaggedValue {
		let component = |index: usize| components.get(index).copied().unwrap_or_default();
		match self {
			VectorSize::Two => DVec2::new(component(0), component(1)).into(),
			VectorSize::Three => DVec3::new(component(0), component(1), component(2)).into(),
			VectorSize::Four => DVec4::new(component(0), component(1), component(2), component(3)).into(),
		}
	}

	fn names(&self) -> &'static [&'static str] {
		&COMPONENT_NAMES[..self.components()]
	}
}

/// Packs scalar inputs into a vector.
///
/// If any component is a function the output is a function building the vector per pixel.
#[derive(Debug, Clone, Default)]
pub struct CombineVectorNode {
	size: VectorSize,
}

impl CombineVectorNode {
	pub fn new(size: VectorSize) -> Self {
		Self { size }
	}
}

impl Node for CombineVectorNode {
	fn identifier(&self) -> &'static str {
		match self.size {
			VectorSize::Two => "math_nodes::CombineVec2Node",
			VectorSize::Three => "math_nodes::CombineVec3Node",
			VectorSize::Four => "math_nodes::CombineVec4Node",
		}
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		self.size.names().iter().map(|&name| PropertyDescriptor::func(name, 0.)).collect()
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::func("Vector", self.size.zero())]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let count = self.size.components();
		if (0..count).any(|index| inputs.get(index).as_func().is_some()) {
			let components = (0..count).map(|index| inputs.func(index)).collect::<Result<Vec<_>, _>>()?;
			let vector = FuncValue::new(move |context| Expression::Vector(components.iter().map(|component| component.build(context)).collect()));
			return Ok(vec![vector.into()]);
		}

		let components = (0..count).map(|index| inputs.float(index)).collect::<Result<Vec<_>, _>>()?;
		Ok(vec![self.size.pack(&components)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}
}

/// Unpacks a vector into its components.
///
/// A function input produces one function per component.
#[derive(Debug, Clone, Default)]
pub struct SeparateVectorNode {
	size: VectorSize,
}

impl SeparateVectorNode {
	pub fn new(size: VectorSize) -> Self {
		Self { size }
	}
}

impl Node for SeparateVectorNode {
	fn identifier(&self) -> &'static str {
		match self.size {
			VectorSize::Two => "math_nodes::SeparateVec2Node",
			VectorSize::Three => "math_nodes::SeparateVec3Node",
			VectorSize::Four => "math_nodes::SeparateVec4Node",
		}
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::func("Vector", self.size.zero())]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		self.size.names().iter().map(|&name| PropertyDescriptor::func(name, 0.)).collect()
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let count = self.size.components();
		if let Some(vector) = inputs.get(0).as_func() {
			return Ok((0..count).map(|index| vector.map(move |value| value.component(index)).into()).collect());
		}

		let vector = inputs.get(0).to_shader_value().ok_or_else(|| NodeError::TypeMismatch {
			input: inputs.name(0),
			expected: "vector",
			found: inputs.get(0).ty(),
		})?;
		Ok((0..count).map(|index| TaggedValue::Float(vector.component(index) as f64)).collect())
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}
}
