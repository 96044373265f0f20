use glam::IVec2;

/// An axis aligned pixel rectangle. `start` is inclusive and `end` is exclusive.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IRect {
	pub start: IVec2,
	pub end: IVec2,
}

impl IRect {
	pub const ZERO: IRect = IRect { start: IVec2::ZERO, end: IVec2::ZERO };

	/// Create a rect from two corners given in any order.
	#[must_use]
	pub fn from_box(a: IVec2, b: IVec2) -> Self {
		Self { start: a.min(b), end: a.max(b) }
	}

	/// Negative sizes are treated as zero. The far corner saturates at the edge of the `i32` range.
	#[must_use]
	pub fn from_origin_size(origin: IVec2, size: IVec2) -> Self {
		Self::from_box(origin, origin.saturating_add(size.max(IVec2::ZERO)))
	}

	#[must_use]
	pub fn from_size(width: u32, height: u32) -> Self {
		Self::from_origin_size(IVec2::ZERO, IVec2::new(width as i32, height as i32))
	}

	#[must_use]
	pub fn size(&self) -> IVec2 {
		self.end.saturating_sub(self.start).max(IVec2::ZERO)
	}

	pub fn width(&self) -> u32 {
		self.size().x as u32
	}

	pub fn height(&self) -> u32 {
		self.size().y as u32
	}

	pub fn area(&self) -> usize {
		self.width() as usize * self.height() as usize
	}

	pub fn is_empty(&self) -> bool {
		self.end.x <= self.start.x || self.end.y <= self.start.y
	}

	pub fn contains(&self, point: IVec2) -> bool {
		point.x >= self.start.x && point.y >= self.start.y && point.x < self.end.x && point.y < self.end.y
	}

	/// Take the outside bounds of two rectangles. Empty rectangles do not contribute.
	#[must_use]
	pub fn union(&self, other: &Self) -> Self {
		match (self.is_empty(), other.is_empty()) {
			(true, _) => *other,
			(_, true) => *self,
			_ => Self {
				start: self.start.min(other.start),
				end: self.end.max(other.end),
			},
		}
	}

	/// The overlapping area, or `None` if the rectangles do not overlap.
	#[must_use]
	pub fn intersect(&self, other: &Self) -> Option<Self> {
		let rect = Self {
			start: self.start.max(other.start),
			end: self.end.min(other.end),
		};
		(!rect.is_empty()).then_some(rect)
	}

	#[must_use]
	pub fn translate(&self, offset: IVec2) -> Self {
		Self {
			start: self.start + offset,
			end: self.end + offset,
		}
	}

	/// Union over an iterator of optional bounds, `None` when nothing contributes.
	pub fn union_all(rects: impl IntoIterator<Item = Option<IRect>>) -> Option<IRect> {
		rects.into_iter().flatten().filter(|rect| !rect.is_empty()).reduce(|a, b| a.union(&b))
	}

	/// Iterates the pixel coordinates row by row.
	pub fn pixels(&self) -> impl Iterator<Item = IVec2> + use<> {
		let IRect { start, end } = *self;
		(start.y..end.y).flat_map(move |y| (start.x..end.x).map(move |x| IVec2::new(x, y)))
	}
}
