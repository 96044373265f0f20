use core_types::blending::screen;
use core_types::{BlendMode, Color, ColorMatrix, IRect};
use glam::IVec2;
use std::fmt::Debug;

/// Read access to pixels addressed in document space.
pub trait Bitmap {
	fn bounds(&self) -> IRect;

	/// Pixels outside of the bounds are transparent.
	fn get_pixel(&self, position: IVec2) -> Color;
}

/// An owned grid of straight alpha pixels placed at an integer origin. This is the target every painter draws onto.
#[derive(Clone, PartialEq, Default)]
pub struct Surface {
	bounds: IRect,
	data: Vec<Color>,
}

impl Debug for Surface {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let length = self.data.len();
		f.debug_struct("Surface")
			.field("bounds", &self.bounds)
			.field("data", if length < 100 { &self.data } else { &length })
			.finish()
	}
}

impl Bitmap for Surface {
	fn bounds(&self) -> IRect {
		self.bounds
	}

	fn get_pixel(&self, position: IVec2) -> Color {
		self.index(position).map_or(Color::TRANSPARENT, |index| self.data[index])
	}
}

impl Surface {
	/// A fully transparent surface covering `bounds`.
	pub fn new(bounds: IRect) -> Self {
		Self::filled(bounds, Color::TRANSPARENT)
	}

	pub fn filled(bounds: IRect, color: Color) -> Self {
		Self { bounds, data: vec![color; bounds.area()] }
	}

	/// Returns `None` when the data does not match the size of the bounds.
	pub fn from_data(bounds: IRect, data: Vec<Color>) -> Option<Self> {
		(data.len() == bounds.area()).then_some(Self { bounds, data })
	}

	pub fn width(&self) -> u32 {
		self.bounds.width()
	}

	pub fn height(&self) -> u32 {
		self.bounds.height()
	}

	pub fn data(&self) -> &[Color] {
		&self.data
	}

	fn index(&self, position: IVec2) -> Option<usize> {
		if !self.bounds.contains(position) {
			return None;
		}
		let local = position - self.bounds.start;
		Some(local.y as usize * self.width() as usize + local.x as usize)
	}

	/// Writes are ignored outside of the bounds.
	pub fn set_pixel(&mut self, position: IVec2, color: Color) {
		if let Some(index) = self.index(position) {
			self.data[index] = color;
		}
	}

	pub fn map_pixel(&mut self, position: IVec2, f: impl FnOnce(Color) -> Color) {
		if let Some(index) = self.index(position) {
			self.data[index] = f(self.data[index]);
		}
	}

	pub fn pixels(&self) -> impl Iterator<Item = (IVec2, Color)> + '_ {
		self.bounds.pixels().zip(self.data.iter().copied())
	}

	pub fn fill(&mut self, region: IRect, color: Color) {
		let Some(region) = self.bounds.intersect(&region) else { return };
		for position in region.pixels() {
			self.set_pixel(position, color);
		}
	}

	/// Runs every pixel inside `region` through the color matrix.
	pub fn apply_color_matrix(&mut self, matrix: &ColorMatrix, region: IRect) {
		let Some(region) = self.bounds.intersect(&region) else { return };
		for position in region.pixels() {
			self.map_pixel(position, |color| matrix.apply(color));
		}
	}

	/// Composites `other` onto this surface where both overlap.
	pub fn blend_from(&mut self, other: &Surface, blend_mode: BlendMode, opacity: f32) {
		let Some(overlap) = self.bounds.intersect(&other.bounds) else { return };
		for position in overlap.pixels() {
			let source = other.get_pixel(position);
			self.map_pixel(position, |backdrop| blend_mode.composite(backdrop, source, opacity));
		}
	}

	/// Channel wise screen of all four channels, alpha included: `1 - (1 - a) * (1 - b)`.
	pub fn screen_from(&mut self, other: &Surface) {
		let Some(overlap) = self.bounds.intersect(&other.bounds) else { return };
		for position in overlap.pixels() {
			let source = other.get_pixel(position);
			self.map_pixel(position, |backdrop| backdrop.zip_rgba(source, screen));
		}
	}

	/// Multiplies the alpha of every pixel with the alpha of `mask`. Pixels outside of the mask become transparent.
	pub fn mask_alpha_from(&mut self, mask: &impl Bitmap) {
		let bounds = self.bounds;
		for position in bounds.pixels() {
			let mask_alpha = mask.get_pixel(position).a();
			self.map_pixel(position, |color| color.with_alpha(color.a() * mask_alpha));
		}
	}

	/// A copy of the pixels inside `region`. Parts of the region outside of the bounds are transparent.
	pub fn crop(&self, region: IRect) -> Surface {
		let mut surface = Surface::new(region);
		if let Some(overlap) = self.bounds.intersect(&region) {
			for position in overlap.pixels() {
				surface.set_pixel(position, self.get_pixel(position));
			}
		}
		surface
	}

	/// The smallest rectangle containing every pixel with a non zero alpha.
	pub fn tight_bounds(&self) -> Option<IRect> {
		self.pixels()
			.filter(|(_, color)| color.a() > 0.)
			.map(|(position, _)| IRect::from_origin_size(position, IVec2::ONE))
			.reduce(|a, b| a.union(&b))
	}
}
