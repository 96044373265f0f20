use core_types::{Color, IRect};
use glam::IVec2;
use kurbo::{BezPath, Shape};
use raster_types::RasterBuffer;

/// The active selection: a mask of selected pixels plus the outline drawn around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
	pub mask: RasterBuffer,
	pub outline: BezPath,
	pub is_empty: bool,
}

impl Default for Selection {
	fn default() -> Self {
		Self {
			mask: RasterBuffer::new(),
			outline: BezPath::new(),
			is_empty: true,
		}
	}
}

impl Selection {
	pub fn from_rect(rect: IRect) -> Self {
		let mut mask = RasterBuffer::new();
		mask.fill_region(rect, Color::WHITE);
		mask.commit();
		let outline = kurbo::Rect::new(rect.start.x as f64, rect.start.y as f64, rect.end.x as f64, rect.end.y as f64).to_path(0.1);
		Self {
			mask,
			outline,
			is_empty: rect.is_empty(),
		}
	}

	pub fn contains(&self, position: IVec2) -> bool {
		!self.is_empty && self.mask.get_pixel(position).a() > 0.
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}
}
