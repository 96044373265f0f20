use core_types::RenderContext;
use graph_craft::{Expression, FuncContext, FuncValue, Node, NodeError, NodeInputs, PropertyDescriptor, TaggedValue};

/// Picks the function matching a condition that is already known, or builds a per-pixel select otherwise.
fn conditional(condition: FuncValue, if_true: FuncValue, if_false: FuncValue) -> FuncValue {
	FuncValue::new(move |context: &FuncContext| {
		if !context.has_context {
			if let Some(value) = condition.constant_value() {
				return if value.as_bool() { if_true.build(context) } else { if_false.build(context) };
			}
		}
		Expression::select(condition.build(context), if_true.build(context), if_false.build(context))
	})
}

/// Passes on one of two inputs depending on a condition.
///
/// When either branch is a function the output is a function too, choosing its branch per pixel. Otherwise the
/// condition must fold to a constant and the chosen value is passed on as is.
#[derive(Debug, Clone, Default)]
pub struct SwitchNode;

impl SwitchNode {
	pub const CONDITION: usize = 0;
	pub const IF_TRUE: usize = 1;
	pub const IF_FALSE: usize = 2;
}

impl Node for SwitchNode {
	fn identifier(&self) -> &'static str {
		"graphene_core::logic::SwitchNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![
			PropertyDescriptor::func("Condition", false),
			PropertyDescriptor::value("If True", TaggedValue::None),
			PropertyDescriptor::value("If False", TaggedValue::None),
		]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Output", TaggedValue::None)]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let condition = inputs.func(Self::CONDITION)?;
		let if_true = inputs.get(Self::IF_TRUE);
		let if_false = inputs.get(Self::IF_FALSE);

		if if_true.as_func().is_some() || if_false.as_func().is_some() {
			let function = conditional(condition, inputs.func(Self::IF_TRUE)?, inputs.func(Self::IF_FALSE)?);
			return Ok(vec![TaggedValue::Func(function)]);
		}

		let condition = match condition.constant_value() {
			Some(value) => value.as_bool(),
			None => {
				log::warn!("Switch condition varies per pixel but its branches are plain values, using the false branch");
				false
			}
		};
		Ok(vec![if condition { if_true.clone() } else { if_false.clone() }])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(SwitchNode)
	}
}

/// Whether two inputs hold the same value.
///
/// Values are compared structurally. Functions compare per pixel and produce a boolean function.
#[derive(Debug, Clone, Default)]
pub struct EqualsNode;

impl Node for EqualsNode {
	fn identifier(&self) -> &'static str {
		"graphene_core::logic::EqualsNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("A", TaggedValue::None), PropertyDescriptor::value("B", TaggedValue::None)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Result", false)]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let (a, b) = (inputs.get(0), inputs.get(1));
		if a.as_func().is_none() && b.as_func().is_none() {
			return Ok(vec![TaggedValue::Bool(a == b)]);
		}

		let (a, b) = (inputs.func(0)?, inputs.func(1)?);
		let equal = FuncValue::new(move |context| Expression::Equal(Box::new(a.build(context)), Box::new(b.build(context))));
		Ok(vec![TaggedValue::Func(equal)])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(EqualsNode)
	}
}
