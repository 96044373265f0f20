use core_types::{BlendMode, RenderContext};
use graph_craft::{Node, NodeError, NodeInputs, Painter, PropertyDescriptor, TaggedValue};
use pixel_document::SharedDocument;
use raster_types::Bitmap;

/// Paints the flattened content of another document.
///
/// The document is opened once when the node runs, to learn its canvas, and again every time the painter draws.
/// Once the owner has released it, running the node fails and painters created earlier draw nothing.
#[derive(Debug, Clone)]
pub struct DocumentReferenceNode {
	document: SharedDocument,
}

impl DocumentReferenceNode {
	pub fn new(document: SharedDocument) -> Self {
		Self { document }
	}
}

impl Node for DocumentReferenceNode {
	fn identifier(&self) -> &'static str {
		"raster_nodes::document_reference::DocumentReferenceNode"
	}

	fn inputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::value("Opacity", 1.)]
	}

	fn outputs(&self) -> Vec<PropertyDescriptor> {
		vec![PropertyDescriptor::paint("Image")]
	}

	fn execute(&self, inputs: &NodeInputs, _: &RenderContext) -> Result<Vec<TaggedValue>, NodeError> {
		let opacity = inputs.float(0)?.clamp(0., 1.) as f32;
		let canvas = self.document.open().map_err(|error| NodeError::Evaluation(error.to_string()))?.canvas_bounds();

		let document = self.document.clone();
		let painter = Painter::new(Some(canvas), move |_, target| {
			let access = match document.open() {
				Ok(access) => access,
				Err(error) => {
					log::warn!("Skipped painting a referenced document: {error}");
					return;
				}
			};
			let Some(region) = canvas.intersect(&target.bounds()) else { return };
			target.blend_from(&access.render(region), BlendMode::Normal, opacity);
		});
		Ok(vec![painter.into()])
	}

	fn create_copy(&self) -> Box<dyn Node> {
		Box::new(self.clone())
	}
}
