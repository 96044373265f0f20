//! Function sockets.
//!
//! Instead of a value, a function output hands out a [`FuncValue`], a closure building an [`Expression`].
//! Chains of function nodes compose their closures into a single expression tree which the consuming node
//! evaluates once per destination pixel, so no intermediate surface is ever allocated.

use core_types::Color;
use glam::{Vec2, Vec3, Vec4};
use raster_types::{Bitmap, Surface};
use std::fmt::Debug;
use std::sync::Arc;

/// A value produced while evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
	Bool(bool),
	Int(i32),
	Float(f32),
	Float2(Vec2),
	Float3(Vec3),
	/// Also used for colors, in `(r, g, b, a)` order.
	Float4(Vec4),
}

impl Default for ShaderValue {
	fn default() -> Self {
		ShaderValue::Float(0.)
	}
}

impl ShaderValue {
	pub fn from_color(color: Color) -> Self {
		ShaderValue::Float4(Vec4::from_array(color.to_array()))
	}

	pub fn as_float(&self) -> f32 {
		match *self {
			ShaderValue::Bool(value) => value as u8 as f32,
			ShaderValue::Int(value) => value as f32,
			ShaderValue::Float(value) => value,
			ShaderValue::Float2(value) => value.x,
			ShaderValue::Float3(value) => value.x,
			ShaderValue::Float4(value) => value.x,
		}
	}

	pub fn as_bool(&self) -> bool {
		match *self {
			ShaderValue::Bool(value) => value,
			other => other.as_float() != 0.,
		}
	}

	/// Component `index` of a vector. Scalars repeat themselves for every component.
	pub fn component(&self, index: usize) -> f32 {
		match *self {
			ShaderValue::Float2(value) => value.to_array().get(index).copied().unwrap_or(0.),
			ShaderValue::Float3(value) => value.to_array().get(index).copied().unwrap_or(0.),
			ShaderValue::Float4(value) => value.to_array().get(index).copied().unwrap_or(0.),
			scalar => scalar.as_float(),
		}
	}

	/// Widens the value to four components. Scalars become opaque gray.
	pub fn as_vec4(&self) -> Vec4 {
		match *self {
			ShaderValue::Float4(value) => value,
			ShaderValue::Float3(value) => value.extend(1.),
			ShaderValue::Float2(value) => Vec4::new(value.x, value.y, 0., 1.),
			scalar => {
				let value = scalar.as_float();
				Vec4::new(value, value, value, 1.)
			}
		}
	}

	pub fn as_color(&self) -> Color {
		Color::from_array(self.as_vec4().to_array())
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			ShaderValue::Bool(_) => "bool",
			ShaderValue::Int(_) => "int",
			ShaderValue::Float(_) => "float",
			ShaderValue::Float2(_) => "float2",
			ShaderValue::Float3(_) => "float3",
			ShaderValue::Float4(_) => "float4",
		}
	}
}

/// The color spaces the color combine and separate nodes convert between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorModel {
	#[default]
	Rgb,
	Hsv,
	Hsl,
}

impl ColorModel {
	/// Converts a color into the four components of this model, alpha last.
	pub fn from_color(&self, color: Color) -> [f32; 4] {
		match self {
			ColorModel::Rgb => color.to_array(),
			ColorModel::Hsv => color.to_hsva(),
			ColorModel::Hsl => color.to_hsla(),
		}
	}

	pub fn to_color(&self, [a, b, c, alpha]: [f32; 4]) -> Color {
		match self {
			ColorModel::Rgb => Color::from_rgbaf32_clamped(a, b, c, alpha),
			ColorModel::Hsv => Color::from_hsva(a, b, c, alpha),
			ColorModel::Hsl => Color::from_hsla(a, b, c, alpha),
		}
	}

	/// Names of the three color channels.
	pub fn channel_names(&self) -> [&'static str; 3] {
		match self {
			ColorModel::Rgb => ["R", "G", "B"],
			ColorModel::Hsv => ["H", "S", "V"],
			ColorModel::Hsl => ["H", "S", "L"],
		}
	}
}

/// Where an expression is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelContext {
	/// Pixel center in document space.
	pub position: Vec2,
	/// Position normalized to the evaluated region.
	pub uv: Vec2,
}

/// A symbolic per-pixel expression.
#[derive(Clone)]
pub enum Expression {
	Constant(ShaderValue),
	Position,
	Uv,
	/// The color of the surface at the evaluated position.
	Sample(Arc<Surface>),
	Component {
		value: Box<Expression>,
		index: usize,
	},
	/// Builds a vector from two to four scalar expressions.
	Vector(Vec<Expression>),
	/// Converts an RGBA color into the components of `model`.
	ToColorModel {
		model: ColorModel,
		color: Box<Expression>,
	},
	/// Converts the four components of `model` into an RGBA color.
	FromColorModel {
		model: ColorModel,
		channels: Box<Expression>,
	},
	Select {
		condition: Box<Expression>,
		if_true: Box<Expression>,
		if_false: Box<Expression>,
	},
	Equal(Box<Expression>, Box<Expression>),
}

impl Debug for Expression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Expression::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
			Expression::Position => write!(f, "Position"),
			Expression::Uv => write!(f, "Uv"),
			Expression::Sample(surface) => f.debug_tuple("Sample").field(&surface.bounds()).finish(),
			Expression::Component { value, index } => f.debug_struct("Component").field("value", value).field("index", index).finish(),
			Expression::Vector(components) => f.debug_tuple("Vector").field(components).finish(),
			Expression::ToColorModel { model, color } => f.debug_struct("ToColorModel").field("model", model).field("color", color).finish(),
			Expression::FromColorModel { model, channels } => f.debug_struct("FromColorModel").field("model", model).field("channels", channels).finish(),
			Expression::Select { condition, if_true, if_false } => f
				.debug_struct("Select")
				.field("condition", condition)
				.field("if_true", if_true)
				.field("if_false", if_false)
				.finish(),
			Expression::Equal(a, b) => f.debug_tuple("Equal").field(a).field(b).finish(),
		}
	}
}

impl Expression {
	pub fn component(self, index: usize) -> Expression {
		Expression::Component { value: Box::new(self), index }
	}

	pub fn select(condition: Expression, if_true: Expression, if_false: Expression) -> Expression {
		Expression::Select {
			condition: Box::new(condition),
			if_true: Box::new(if_true),
			if_false: Box::new(if_false),
		}
	}

	pub fn evaluate(&self, pixel: &PixelContext) -> ShaderValue {
		match self {
			Expression::Constant(value) => *value,
			Expression::Position => ShaderValue::Float2(pixel.position),
			Expression::Uv => ShaderValue::Float2(pixel.uv),
			Expression::Sample(surface) => ShaderValue::from_color(surface.get_pixel(pixel.position.floor().as_ivec2())),
			Expression::Component { value, index } => ShaderValue::Float(value.evaluate(pixel).component(*index)),
			Expression::Vector(components) => {
				let values: Vec<f32> = components.iter().map(|component| component.evaluate(pixel).as_float()).collect();
				match values.as_slice() {
					[] => ShaderValue::Float(0.),
					[x] => ShaderValue::Float(*x),
					[x, y] => ShaderValue::Float2(Vec2::new(*x, *y)),
					[x, y, z] => ShaderValue::Float3(Vec3::new(*x, *y, *z)),
					[x, y, z, w, ..] => ShaderValue::Float4(Vec4::new(*x, *y, *z, *w)),
				}
			}
			Expression::ToColorModel { model, color } => {
				let color = color.evaluate(pixel).as_color();
				ShaderValue::Float4(Vec4::from_array(model.from_color(color)))
			}
			Expression::FromColorModel { model, channels } => {
				let channels = channels.evaluate(pixel).as_vec4();
				ShaderValue::from_color(model.to_color(channels.to_array()))
			}
			Expression::Select { condition, if_true, if_false } => {
				if condition.evaluate(pixel).as_bool() {
					if_true.evaluate(pixel)
				} else {
					if_false.evaluate(pixel)
				}
			}
			Expression::Equal(a, b) => ShaderValue::Bool(a.evaluate(pixel) == b.evaluate(pixel)),
		}
	}

	/// Whether the result changes from pixel to pixel.
	pub fn depends_on_pixel(&self) -> bool {
		match self {
			Expression::Constant(_) => false,
			Expression::Position | Expression::Uv | Expression::Sample(_) => true,
			Expression::Component { value, .. } => value.depends_on_pixel(),
			Expression::Vector(components) => components.iter().any(Expression::depends_on_pixel),
			Expression::ToColorModel { color, .. } => color.depends_on_pixel(),
			Expression::FromColorModel { channels, .. } => channels.depends_on_pixel(),
			Expression::Select { condition, if_true, if_false } => condition.depends_on_pixel() || if_true.depends_on_pixel() || if_false.depends_on_pixel(),
			Expression::Equal(a, b) => a.depends_on_pixel() || b.depends_on_pixel(),
		}
	}

	/// Folds the expression into a single value if it does not depend on the pixel.
	pub fn try_constant(&self) -> Option<ShaderValue> {
		(!self.depends_on_pixel()).then(|| self.evaluate(&PixelContext::default()))
	}
}

/// What a function socket is asked to build its expression for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncContext {
	/// `false` when the expression is built to be folded into a constant outside of any pixel loop.
	pub has_context: bool,
}

impl FuncContext {
	pub const NO_CONTEXT: FuncContext = FuncContext { has_context: false };
	pub const PER_PIXEL: FuncContext = FuncContext { has_context: true };
}

type BuildFn = dyn Fn(&FuncContext) -> Expression + Send + Sync;

/// The value carried by a function socket.
#[derive(Clone)]
pub struct FuncValue(Arc<BuildFn>);

impl Debug for FuncValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("FuncValue").field(&self.build(&FuncContext::NO_CONTEXT)).finish()
	}
}

impl FuncValue {
	pub fn new(build: impl Fn(&FuncContext) -> Expression + Send + Sync + 'static) -> Self {
		Self(Arc::new(build))
	}

	pub fn constant(value: ShaderValue) -> Self {
		Self::new(move |_| Expression::Constant(value))
	}

	pub fn build(&self, context: &FuncContext) -> Expression {
		(self.0)(context)
	}

	/// The value of the function if it is the same for every pixel.
	pub fn constant_value(&self) -> Option<ShaderValue> {
		self.build(&FuncContext::NO_CONTEXT).try_constant()
	}

	/// Composes a new function from this one.
	pub fn map(&self, f: impl Fn(Expression) -> Expression + Send + Sync + 'static) -> Self {
		let upstream = self.clone();
		Self::new(move |context| f(upstream.build(context)))
	}

	pub fn ptr_eq(&self, other: &FuncValue) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use core_types::IRect;
	use glam::IVec2;

	#[test]
	fn composed_functions_fold_to_constants() {
		let red = FuncValue::constant(ShaderValue::Float(1.));
		let zero = FuncValue::constant(ShaderValue::Float(0.));
		let (r, z) = (red.clone(), zero.clone());
		let color = FuncValue::new(move |context| Expression::FromColorModel {
			model: ColorModel::Rgb,
			channels: Box::new(Expression::Vector(vec![r.build(context), z.build(context), z.build(context), r.build(context)])),
		});
		let hue = color.map(|color| Expression::ToColorModel { model: ColorModel::Hsv, color: Box::new(color) }.component(0));
		assert_eq!(color.constant_value().map(|value| value.as_color()), Some(Color::RED));
		assert_eq!(hue.constant_value(), Some(ShaderValue::Float(0.)));
	}

	#[test]
	fn sampling_depends_on_pixel() {
		let mut surface = Surface::new(IRect::from_size(2, 1));
		surface.set_pixel(IVec2::new(1, 0), Color::BLUE);
		let expression = Expression::Sample(Arc::new(surface));
		assert_eq!(expression.try_constant(), None);

		let pixel = PixelContext {
			position: Vec2::new(1.5, 0.5),
			uv: Vec2::ZERO,
		};
		assert_eq!(expression.evaluate(&pixel).as_color(), Color::BLUE);
	}

	#[test]
	fn select_and_equal() {
		let expression = Expression::select(
			Expression::Equal(Box::new(Expression::Constant(ShaderValue::Int(2))), Box::new(Expression::Constant(ShaderValue::Int(2)))),
			Expression::Constant(ShaderValue::Float(1.)),
			Expression::Position,
		);
		assert!(expression.depends_on_pixel());
		assert_eq!(expression.evaluate(&PixelContext::default()), ShaderValue::Float(1.));
	}
}
