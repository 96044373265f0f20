use core_types::{BlendMode, ColorMatrix, IRect, RenderContext};
use raster_types::{Bitmap, Surface};
use std::fmt::Debug;
use std::sync::Arc;

type PaintFn = dyn Fn(&RenderContext, &mut Surface) + Send + Sync;

/// The value carried by a paint socket: a deferred operation drawing a node's contribution onto a target surface.
///
/// Nothing is computed until [`Painter::paint`] is called, and only the bounds of the target are drawn.
/// Painters chain by capturing their upstream painter, so a consumer pays for exactly the region it requests.
#[derive(Clone)]
pub struct Painter {
	bounds: Option<IRect>,
	paint: Arc<PaintFn>,
}

impl Debug for Painter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Painter").field("bounds", &self.bounds).finish_non_exhaustive()
	}
}

impl Painter {
	/// `bounds` is the area the painter may touch, `None` if it is unbounded.
	pub fn new(bounds: Option<IRect>, paint: impl Fn(&RenderContext, &mut Surface) + Send + Sync + 'static) -> Self {
		Self { bounds, paint: Arc::new(paint) }
	}

	/// Draws an existing surface with normal blending.
	pub fn from_surface(surface: Surface) -> Self {
		let surface = Arc::new(surface);
		let bounds = Some(surface.bounds());
		Self::new(bounds, move |_, target| target.blend_from(&surface, BlendMode::Normal, 1.))
	}

	pub fn bounds(&self) -> Option<IRect> {
		self.bounds
	}

	pub fn paint(&self, context: &RenderContext, target: &mut Surface) {
		(self.paint)(context, target)
	}

	/// Paints into a fresh transparent layer covering `region`.
	pub fn paint_layer(&self, context: &RenderContext, region: IRect) -> Surface {
		let mut layer = Surface::new(region);
		self.paint(context, &mut layer);
		layer
	}

	/// Chains this painter through a color matrix.
	///
	/// The upstream painter draws into a separate layer limited to its bounds, the matrix is applied to the whole layer
	/// and the layer is then composited onto the target.
	#[must_use]
	pub fn with_filter(&self, matrix: ColorMatrix) -> Painter {
		let upstream = self.clone();
		Painter::new(self.bounds, move |context, target| {
			let region = match upstream.bounds {
				Some(bounds) => bounds.intersect(&target.bounds()),
				None => Some(target.bounds()),
			};
			let Some(region) = region else { return };

			let mut layer = upstream.paint_layer(context, region);
			layer.apply_color_matrix(&matrix, region);
			target.blend_from(&layer, BlendMode::Normal, 1.);
		})
	}

	/// Materializes the painter over its bounds, restricted to the viewport of the context.
	/// Returns `None` when there is no finite non-empty region to draw.
	pub fn rasterize(&self, context: &RenderContext) -> Option<Surface> {
		let region = match self.bounds {
			Some(bounds) => context.clip(bounds)?,
			None => context.viewport?,
		};
		Some(self.paint_layer(context, region))
	}

	pub fn ptr_eq(&self, other: &Painter) -> bool {
		Arc::ptr_eq(&self.paint, &other.paint)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use core_types::Color;
	use glam::IVec2;
	use pretty_assertions::assert_eq;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn only_the_requested_region_is_painted() {
		let painted = Arc::new(AtomicUsize::new(0));
		let counter = painted.clone();
		let painter = Painter::new(Some(IRect::from_size(100, 100)), move |_, target| {
			counter.fetch_add(target.bounds().area(), Ordering::Relaxed);
			target.fill(target.bounds(), Color::WHITE);
		});

		let context = RenderContext::default().with_viewport(IRect::from_origin_size(IVec2::new(90, 90), IVec2::new(20, 20)));
		let surface = painter.rasterize(&context).unwrap();
		assert_eq!(surface.bounds(), IRect::from_origin_size(IVec2::new(90, 90), IVec2::new(10, 10)));
		assert_eq!(painted.load(Ordering::Relaxed), 100);
	}

	#[test]
	fn filters_chain() {
		let painter = Painter::from_surface(Surface::filled(IRect::from_size(2, 2), Color::from_rgbaf32_unchecked(0.2, 0.4, 0.6, 1.)));
		let red = painter.with_filter(ColorMatrix::USE_RED + ColorMatrix::OPAQUE_ALPHA_OFFSET);
		let surface = red.rasterize(&RenderContext::default()).unwrap();
		assert_eq!(surface.bounds(), IRect::from_size(2, 2));
		assert_eq!(surface.get_pixel(IVec2::ZERO), Color::from_rgbaf32_unchecked(0.2, 0., 0., 1.));

		let unbounded = Painter::new(None, |_, _| {});
		assert!(unbounded.rasterize(&RenderContext::default()).is_none());
	}
}
