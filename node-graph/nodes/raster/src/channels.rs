use core_types::{ColorMatrix, IRect, RenderContext};
use graph_craft::{Node, NodeError, NodeInputs, Painter, PropertyDescriptor, TaggedValue};
use raster_types::Bitmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
	Red,
	Green,
	Blue,
	Alpha,
}

impl Channel {
	pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

	pub fn name(&self) -> &'static str {
		match self {
			Channel::Red => "Red",
			Channel::Green => "Green",
			Channel::Blue => "Blue",
			Channel::Alpha => "Alpha",
		}
	}

	/// Keeps only this channel, as an opaque color image or as an opaque gray image.
	pub fn separate_filter(&self, grayscale: bool) -> ColorMatrix {
		match (self, grayscale) {
			(Channel::Red, false) => ColorMatrix::USE_RED + ColorMatrix::OPAQUE_ALPHA_OFFSET,
			(Channel::Green, false) => ColorMatrix::USE_GREEN + ColorMatrix::OPAQUE_ALPHA_OFFSET,
			(Channel::Blue, false) => ColorMatrix::USE_BLUE + ColorMatrix::OPAQUE_ALPHA_OFFSET,
			(Channel::Alpha, false) => ColorMatrix::USE_ALPHA,
			(Channel::Red, true) => ColorMatrix::USE_RED + ColorMatrix::MAP_RED_TO_GREEN_BLUE + ColorMatrix::OPAQUE_ALPHA_OFFSET,
			(Channel::Green, true) => ColorMatrix::USE_GREEN + ColorMatrix::MAP_GREEN_TO_RED_BLUE + ColorMatrix::OPAQUE_ALPHA_OFFSET,
			(Channel::Blue, true) => ColorMatrix::USE_BLUE + ColorMatrix::MAP_BLUE_TO_RED_GREEN + ColorMatrix::OPAQUE_ALPHA_OFFSET,
			(Channel::Alpha, true) => ColorMatrix::MAP_ALPHA_TO_RED_GREEN_BLUE + ColorMatrix::OPAQUE_ALPHA_OFFSET,
		}
	}

	/// Moves the value of a channel input into this channel, zeroing every other one.
	/// Gray inputs carry their value in the red channel.
	pub fn combine_filter(&self, grayscale: bool) -> ColorMatrix {
		match (self, grayscale) {
			(Channel::Red, _) => ColorMatrix::USE_RED,
			(Channel::Green, false) => ColorMatrix::USE_GREEN,
			(Channel::Blue, false) => ColorMatrix::USE_BLUE,
			(Channel::Alpha, false) => ColorMatrix::USE_ALPHA,
			(Channel::Green, true) => ColorMatrix::new([[0.; 5], [1., 0., 0., 0., 0.], [0.; 5], [0.; 5]]),
			(Channel::Blue, true) => ColorMatrix::new([[0.; 5], [0.; 5], [1., 0., 0., 0., 0.], [0.; 5]]),
			(Channel::Alpha, true) => ColorMatrix::MAP_RED_TO_ALPHA,
		}
	}
}

/// Splits an image into one image per channel.
#[derive(Debug, Clone, Default)]
pub struct SeparateChannelsNode;

impl SeparateChannelsNode {
	pub const IMAGE: usize = 0;
	pub const GRAYSCALE: usize = 1;
}

impl Node for SeparateChannelsNode {
	fn identifier(&self) -> &'static str {
		"raster_nodes::channels::SeparateChannelsNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::paint("Image"), PropertyDescriptor::value("Grayscale", false)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		Channel::ALL.iter().map(|channel| PropertyDescriptor::paint(channel.name())).collect()
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let grayscale = inputs.bool(Self::GRAYSCALE)?;
		let Some(image) = inputs.painter(Self::IMAGE)? else {
			return Ok(vec![TaggedValue::None; Channel::ALL.len()]);
		};
		Ok(Channel::ALL.iter().map(|channel| image.with_filter(channel.separate_filter(grayscale)).into()).collect())
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(SeparateChannelsNode)
	}
}

/// Builds an image from one image per channel.
///
/// Every connected input is reduced to its own channel and screened onto the result, so channels without an input
/// stay zero. The result covers the union of the bounds of the connected inputs.
#[derive(Debug, Clone, Default)]
pub struct CombineChannelsNode;

impl CombineChannelsNode {
	pub const GRAYSCALE: usize = 4;
}

impl Node for CombineChannelsNode {
	fn identifier(&self) -> &'static str {
		"raster_nodes::channels::CombineChannelsNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		let mut inputs: Vec<_> = Channel::ALL.iter().map(|channel| PropertyDescriptor::paint(channel.name())).collect();
		inputs.push(PropertyDescriptor::value("Grayscale", false));
		inputs
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::paint("Image")]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let grayscale = inputs.bool(Self::GRAYSCALE)?;
		let mut layers = Vec::new();
		for (index, channel) in Channel::ALL.iter().enumerate() {
			if let Some(painter) = inputs.painter(index)? {
				layers.push((painter.clone(), channel.combine_filter(grayscale)));
			}
		}
		if layers.is_empty() {
			return Ok(vec![TaggedValue::None]);
		}

		let bounds = if layers.iter().any(|(painter, _)| painter.bounds().is_none()) {
			None
		} else {
			IRect::union_all(layers.iter().map(|(painter, _)| painter.bounds()))
		};

		let combined = Painter::new(bounds, move |context, target| {
			for (painter, filter) in &layers {
				let region = match painter.bounds() {
					Some(bounds) => bounds.intersect(&target.bounds()),
					None => Some(target.bounds()),
				};
				let Some(region) = region else { continue };

				let mut layer = painter.paint_layer(context, region);
				layer.apply_color_matrix(filter, region);
				target.screen_from(&layer);
			}
		});
		Ok(vec![combined.into()])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(CombineChannelsNode)
	}
}
