use crate::expression::{ColorModel, FuncValue, ShaderValue};
use crate::painter::Painter;
use core_types::Color;
pub use glam::{DVec2, DVec3, DVec4};

/// A value carried by a socket, tagged with its type.
#[derive(Clone, Debug, Default)]
pub enum TaggedValue {
	#[default]
	None,
	Bool(bool),
	Int(i32),
	Float(f64),
	Vec2(DVec2),
	Vec3(DVec3),
	Vec4(DVec4),
	Color(Color),
	String(String),
	ColorModel(ColorModel),
	/// A paint chain, resolved only when pixels are requested.
	Painter(Painter),
	/// A per-pixel function.
	Func(FuncValue),
}

/// Painters and functions are equal only when they are the same allocation.
impl PartialEq for TaggedValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(TaggedValue::None, TaggedValue::None) => true,
			(TaggedValue::Bool(a), TaggedValue::Bool(b)) => a == b,
			(TaggedValue::Int(a), TaggedValue::Int(b)) => a == b,
			(TaggedValue::Float(a), TaggedValue::Float(b)) => a == b,
			(TaggedValue::Vec2(a), TaggedValue::Vec2(b)) => a == b,
			(TaggedValue::Vec3(a), TaggedValue::Vec3(b)) => a == b,
			(TaggedValue::Vec4(a), TaggedValue::Vec4(b)) => a == b,
			(TaggedValue::Color(a), TaggedValue::Color(b)) => a == b,
			(TaggedValue::String(a), TaggedValue::String(b)) => a == b,
			(TaggedValue::ColorModel(a), TaggedValue::ColorModel(b)) => a == b,
			(TaggedValue::Painter(a), TaggedValue::Painter(b)) => a.ptr_eq(b),
			(TaggedValue::Func(a), TaggedValue::Func(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl TaggedValue {
	/// Name of the carried type, used in error messages.
	pub fn ty(&self) -> &'static str {
		match self {
			TaggedValue::None => "none",
			TaggedValue::Bool(_) => "bool",
			TaggedValue::Int(_) => "int",
			TaggedValue::Float(_) => "float",
			TaggedValue::Vec2(_) => "vec2",
			TaggedValue::Vec3(_) => "vec3",
			TaggedValue::Vec4(_) => "vec4",
			TaggedValue::Color(_) => "color",
			TaggedValue::String(_) => "string",
			TaggedValue::ColorModel(_) => "color model",
			TaggedValue::Painter(_) => "painter",
			TaggedValue::Func(_) => "function",
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, TaggedValue::None)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			TaggedValue::Bool(value) => Some(*value),
			TaggedValue::Int(value) => Some(*value != 0),
			TaggedValue::Func(func) => func.constant_value().map(|value| value.as_bool()),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i32> {
		match self {
			TaggedValue::Int(value) => Some(*value),
			TaggedValue::Bool(value) => Some(*value as i32),
			TaggedValue::Float(value) => Some(*value as i32),
			TaggedValue::Func(func) => match func.constant_value()? {
				ShaderValue::Int(value) => Some(value),
				other => Some(other.as_float() as i32),
			},
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			TaggedValue::Float(value) => Some(*value),
			TaggedValue::Int(value) => Some(*value as f64),
			TaggedValue::Func(func) => func.constant_value().map(|value| value.as_float() as f64),
			_ => None,
		}
	}

	pub fn as_painter(&self) -> Option<&Painter> {
		match self {
			TaggedValue::Painter(painter) => Some(painter),
			_ => None,
		}
	}

	pub fn as_func(&self) -> Option<&FuncValue> {
		match self {
			TaggedValue::Func(func) => Some(func),
			_ => None,
		}
	}

	/// The value as seen from inside an expression, for values that have a per-pixel representation.
	pub fn to_shader_value(&self) -> Option<ShaderValue> {
		match *self {
			TaggedValue::Bool(value) => Some(ShaderValue::Bool(value)),
			TaggedValue::Int(value) => Some(ShaderValue::Int(value)),
			TaggedValue::Float(value) => Some(ShaderValue::Float(value as f32)),
			TaggedValue::Vec2(value) => Some(ShaderValue::Float2(value.as_vec2())),
			TaggedValue::Vec3(value) => Some(ShaderValue::Float3(value.as_vec3())),
			TaggedValue::Vec4(value) => Some(ShaderValue::Float4(value.as_vec4())),
			TaggedValue::Color(color) => Some(ShaderValue::from_color(color)),
			_ => None,
		}
	}

	pub fn from_shader_value(value: ShaderValue) -> Self {
		match value {
			ShaderValue::Bool(value) => TaggedValue::Bool(value),
			ShaderValue::Int(value) => TaggedValue::Int(value),
			ShaderValue::Float(value) => TaggedValue::Float(value as f64),
			ShaderValue::Float2(value) => TaggedValue::Vec2(value.as_dvec2()),
			ShaderValue::Float3(value) => TaggedValue::Vec3(value.as_dvec3()),
			ShaderValue::Float4(value) => TaggedValue::Vec4(value.as_dvec4()),
		}
	}
}

macro_rules! tagged_value_from {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$ty> for TaggedValue {
				fn from(value: $ty) -> Self {
					TaggedValue::$variant(value)
				}
			}
		)*
	};
}

tagged_value_from! {
	bool => Bool,
	i32 => Int,
	f64 => Float,
	DVec2 => Vec2,
	DVec3 => Vec3,
	DVec4 => Vec4,
	Color => Color,
	String => String,
	ColorModel => ColorModel,
	Painter => Painter,
	FuncValue => Func,
}

impl From<&str> for TaggedValue {
	fn from(value: &str) -> Self {
		TaggedValue::String(value.to_string())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn functions_compare_by_identity() {
		let func = FuncValue::constant(ShaderValue::Int(1));
		assert_eq!(TaggedValue::Func(func.clone()), TaggedValue::Func(func));
		assert_ne!(TaggedValue::Func(FuncValue::constant(ShaderValue::Int(1))), TaggedValue::Func(FuncValue::constant(ShaderValue::Int(1))));
		assert_ne!(TaggedValue::Int(1), TaggedValue::Float(1.));
	}

	#[test]
	fn constant_functions_read_as_values() {
		let func = TaggedValue::Func(FuncValue::constant(ShaderValue::Bool(true)));
		assert_eq!(func.as_bool(), Some(true));
		assert_eq!(TaggedValue::Func(FuncValue::constant(ShaderValue::Int(4))).as_int(), Some(4));
		assert_eq!(TaggedValue::String("4".into()).as_int(), None);
	}
}
