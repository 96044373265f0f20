use crate::member::{MemberId, MemberProperties};
use core_types::IRect;
use raster_types::RasterBuffer;

#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
	pub properties: MemberProperties,
	pub buffer: RasterBuffer,
	/// When set, painting only changes the color of pixels that are already visible.
	pub lock_transparency: bool,
}

impl RasterLayer {
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_properties(MemberProperties::new(name))
	}

	pub fn with_properties(properties: MemberProperties) -> Self {
		Self {
			properties,
			buffer: RasterBuffer::new(),
			lock_transparency: false,
		}
	}

	#[must_use]
	pub fn with_buffer(mut self, buffer: RasterBuffer) -> Self {
		self.buffer = buffer;
		self
	}

	pub fn id(&self) -> MemberId {
		self.properties.id
	}

	pub fn tight_bounds(&self) -> Option<IRect> {
		self.buffer.tight_bounds()
	}

	pub fn deep_clone(&self) -> Self {
		Self {
			properties: self.properties.deep_clone(),
			buffer: self.buffer.deep_clone(),
			lock_transparency: self.lock_transparency,
		}
	}
}
