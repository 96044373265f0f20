use core_types::{BlendMode, Color, IRect, RenderContext};
use glam::DVec2;
use graph_craft::{Expression, FuncContext, FuncValue, Node, NodeError, NodeInputs, Painter, PixelContext, PropertyDescriptor, ShaderValue, TaggedValue};
use raster_types::{Bitmap, Surface};
use std::sync::Arc;

/// Turns an image into a color function reading the pixel under the evaluated position.
///
/// The image is rasterized once, over its bounds clipped to the viewport of the pass. Positions outside of it read as
/// transparent.
#[derive(Debug, Clone, Default)]
pub struct SampleImageNode;

impl Node for SampleImageNode {
	fn identifier(&self) -> &'static str {
		"raster_nodes::sample::SampleImageNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::paint("Image")]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::func("Color", Color::TRANSPARENT)]
	}

	fn execute(&self, inputs: &NodeInputs, context: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let surface = inputs.painter(0)?.and_then(|painter| painter.rasterize(context));
		let color = match surface {
			Some(surface) => {
				let surface = Arc::new(surface);
				FuncValue::new(move |_| Expression::Sample(surface.clone()))
			}
			None => {
				log::trace!("Nothing to sample, reading transparent");
				FuncValue::constant(ShaderValue::from_color(Color::TRANSPARENT))
			}
		};
		Ok(vec![color.into()])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(SampleImageNode)
	}
}

/// Paints a region with a color function, evaluated once per pixel center.
#[derive(Debug, Clone, Default)]
pub struct FillNode;

impl FillNode {
	pub const COLOR: usize = 0;
	pub const ORIGIN: usize = 1;
	pub const SIZE: usize = 2;
}

fn vec2(inputs: &NodeInputs, index: usize) -> Result<DVec2, NodeError> {
	match inputs.get(index) {
		TaggedValue::Vec2(value) => Ok(*value),
		other => Err(NodeError::TypeMismatch {
			input: inputs.name(index),
			expected: "vec2",
			found: other.ty(),
		}),
	}
}

fn fill_region(color: &FuncValue, region: IRect, area: IRect) -> Surface {
	let mut layer = Surface::new(area);
	let expression = color.build(&FuncContext::PER_PIXEL);
	if let Some(constant) = expression.try_constant() {
		layer.fill(area, constant.as_color());
		return layer;
	}

	let origin = region.start.as_vec2();
	let size = region.size().as_vec2();
	for position in area.pixels() {
		let center = position.as_vec2() + 0.5;
		let pixel = PixelContext { position: center, uv: (center - origin) / size };
		layer.set_pixel(position, expression.evaluate(&pixel).as_color());
	}
	layer
}

impl Node for FillNode {
	fn identifier(&self) -> &'static str {
		"raster_nodes::sample::FillNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![
			PropertyDescriptor::func("Color", Color::BLACK),
			PropertyDescriptor::value("Origin", DVec2::ZERO),
			PropertyDescriptor::value("Size", DVec2::splat(64.)),
		]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::paint("Image")]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let color = inputs.func(Self::COLOR)?;
		let origin = vec2(inputs, Self::ORIGIN)?.round().as_ivec2();
		let size = vec2(inputs, Self::SIZE)?.round().as_ivec2();
		let region = IRect::from_origin_size(origin, size);

		let painter = Painter::new(Some(region), move |_, target| {
			let Some(area) = region.intersect(&target.bounds()) else { return };
			target.blend_from(&fill_region(&color, region, area), BlendMode::Normal, 1.);
		});
		Ok(vec![painter.into()])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(FillNode)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use glam::IVec2;
	use pretty_assertions::assert_eq;

	fn fill(color: TaggedValue, origin: DVec2, size: DVec2) -> Painter {
		let outputs = FillNode.execute(&NodeInputs::unconnected(&FillNode, vec![color, origin.into(), size.into()]), &RenderContext::default()).unwrap();
		outputs[0].as_painter().unwrap().clone()
	}

	#[test]
	fn constant_fill() {
		let painter = fill(Color::RED.into(), DVec2::new(1., 1.), DVec2::new(2., 3.));
		let surface = painter.rasterize(&RenderContext::default()).unwrap();
		assert_eq!(surface.bounds(), IRect::from_origin_size(IVec2::ONE, IVec2::new(2, 3)));
		assert!(surface.data().iter().all(|&color| color == Color::RED));
	}

	#[test]
	fn oversized_regions_are_clamped() {
		let painter = fill(Color::RED.into(), DVec2::new(10., 0.), DVec2::new(1e10, 1.));
		let bounds = painter.bounds().unwrap();
		assert_eq!(bounds.start, IVec2::new(10, 0));
		assert_eq!(bounds.end, IVec2::new(i32::MAX, 1));

		let viewport = IRect::from_origin_size(IVec2::ZERO, IVec2::new(16, 1));
		let surface = painter.rasterize(&RenderContext::default().with_viewport(viewport)).unwrap();
		assert_eq!(surface.bounds(), IRect::from_origin_size(IVec2::new(10, 0), IVec2::new(6, 1)));
		assert!(surface.data().iter().all(|&color| color == Color::RED));
	}

	#[test]
	fn sampling_reproduces_the_image() {
		let bounds = IRect::from_size(2, 1);
		let image = Surface::from_data(bounds, vec![Color::RED, Color::BLUE]).unwrap();
		let inputs = NodeInputs::unconnected(&SampleImageNode, vec![Painter::from_surface(image).into()]);
		let sampled = SampleImageNode.execute(&inputs, &RenderContext::default()).unwrap().remove(0);

		let surface = fill(sampled, DVec2::ZERO, DVec2::new(3., 1.)).rasterize(&RenderContext::default()).unwrap();
		assert_eq!(surface.get_pixel(IVec2::new(0, 0)), Color::RED);
		assert_eq!(surface.get_pixel(IVec2::new(1, 0)), Color::BLUE);
		assert_eq!(surface.get_pixel(IVec2::new(2, 0)), Color::TRANSPARENT);
	}

	#[test]
	fn sampling_nothing_reads_transparent() {
		let inputs = NodeInputs::unconnected(&SampleImageNode, vec![TaggedValue::None]);
		let sampled = SampleImageNode.execute(&inputs, &RenderContext::default()).unwrap().remove(0);
		assert_eq!(sampled.as_func().and_then(FuncValue::constant_value), Some(ShaderValue::from_color(Color::TRANSPARENT)));
	}

	#[test]
	fn uv_spans_the_region() {
		let gradient = FuncValue::new(|_| Expression::Vector(vec![Expression::Uv.component(0), Expression::Uv.component(0), Expression::Uv.component(0), Expression::Constant(ShaderValue::Float(1.))]));
		let surface = fill(gradient.into(), DVec2::new(10., 0.), DVec2::new(4., 1.)).rasterize(&RenderContext::default()).unwrap();
		assert_eq!(surface.get_pixel(IVec2::new(10, 0)).r(), 0.125);
		assert_eq!(surface.get_pixel(IVec2::new(13, 0)).r(), 0.875);
	}
}
