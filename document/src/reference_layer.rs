use crate::error::DocumentError;
use core_types::Color;
use glam::{DVec2, UVec2};
use std::sync::Arc;

/// Where the reference image is placed on the canvas.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeCorners {
	pub top_left: DVec2,
	pub top_right: DVec2,
	pub bottom_left: DVec2,
	pub bottom_right: DVec2,
}

impl ShapeCorners {
	pub fn from_size(size: DVec2) -> Self {
		Self {
			top_left: DVec2::ZERO,
			top_right: DVec2::new(size.x, 0.),
			bottom_left: DVec2::new(0., size.y),
			bottom_right: size,
		}
	}
}

/// An immutable image shown next to the structure tree. The pixel bytes are shared between snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLayer {
	image_bgra8888: Arc<[u8]>,
	size: UVec2,
	pub shape: ShapeCorners,
}

impl ReferenceLayer {
	/// Fails if the byte count does not match four bytes per pixel.
	pub fn new(image_bgra8888: Arc<[u8]>, size: UVec2, shape: ShapeCorners) -> Result<Self, DocumentError> {
		let expected = size.x as usize * size.y as usize * 4;
		if image_bgra8888.len() != expected {
			return Err(DocumentError::InvalidReferenceImage { expected, found: image_bgra8888.len() });
		}
		Ok(Self { image_bgra8888, size, shape })
	}

	pub fn size(&self) -> UVec2 {
		self.size
	}

	pub fn bytes(&self) -> &[u8] {
		&self.image_bgra8888
	}

	pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
		if x >= self.size.x || y >= self.size.y {
			return None;
		}
		let index = (y as usize * self.size.x as usize + x as usize) * 4;
		let [blue, green, red, alpha]: [u8; 4] = self.image_bgra8888.get(index..index + 4)?.try_into().ok()?;
		Some(Color::from_rgba8(red, green, blue, alpha))
	}
}
