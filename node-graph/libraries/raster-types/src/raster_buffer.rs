use crate::surface::{Bitmap, Surface};
use core_types::{BlendMode, Color, IRect};
use glam::IVec2;
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub const TILE_SIZE: i32 = 32;
const TILE_AREA: usize = (TILE_SIZE * TILE_SIZE) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
	pub x: i32,
	pub y: i32,
}

impl TileCoord {
	pub fn containing(position: IVec2) -> Self {
		Self {
			x: position.x.div_euclid(TILE_SIZE),
			y: position.y.div_euclid(TILE_SIZE),
		}
	}

	pub fn bounds(&self) -> IRect {
		IRect::from_origin_size(IVec2::new(self.x, self.y) * TILE_SIZE, IVec2::splat(TILE_SIZE))
	}

	fn local_index(position: IVec2) -> usize {
		let local = IVec2::new(position.x.rem_euclid(TILE_SIZE), position.y.rem_euclid(TILE_SIZE));
		(local.y * TILE_SIZE + local.x) as usize
	}

	fn covering(region: IRect) -> impl Iterator<Item = TileCoord> {
		let start = TileCoord::containing(region.start);
		let end = TileCoord::containing(region.end - IVec2::ONE);
		let empty = region.is_empty();
		(start.y..=end.y).flat_map(move |y| (start.x..=end.x).map(move |x| TileCoord { x, y })).filter(move |_| !empty)
	}
}

type Tile = Arc<Vec<Color>>;

/// Tile addressed pixel storage with a committed state and a layer of pending changes on top.
///
/// Tiles are reference counted, so cloning a buffer is cheap and writes copy a tile only when it is shared.
/// A clone therefore never observes writes made to the buffer it was cloned from, and the other way around.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterBuffer {
	committed: FxHashMap<TileCoord, Tile>,
	pending: FxHashMap<TileCoord, Tile>,
}

impl RasterBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// A new buffer holding only the committed state of this one.
	pub fn clone_from_committed(&self) -> Self {
		Self {
			committed: self.committed.clone(),
			pending: FxHashMap::default(),
		}
	}

	pub fn has_uncommitted_changes(&self) -> bool {
		!self.pending.is_empty()
	}

	/// Moves the pending changes into the committed state. Fully transparent tiles are dropped.
	pub fn commit(&mut self) {
		let pending = std::mem::take(&mut self.pending);
		log::trace!("Committing {} tiles", pending.len());
		for (coord, tile) in pending {
			if tile.iter().all(|color| color.a() == 0.) {
				self.committed.remove(&coord);
			} else {
				self.committed.insert(coord, tile);
			}
		}
	}

	pub fn cancel_changes(&mut self) {
		self.pending.clear();
	}

	fn tile(&self, coord: &TileCoord) -> Option<&Tile> {
		self.pending.get(coord).or_else(|| self.committed.get(coord))
	}

	fn tile_mut(&mut self, coord: TileCoord) -> &mut Vec<Color> {
		let committed = &self.committed;
		let tile = self.pending.entry(coord).or_insert_with(|| committed.get(&coord).cloned().unwrap_or_else(|| Arc::new(vec![Color::TRANSPARENT; TILE_AREA])));
		Arc::make_mut(tile)
	}

	/// Pending changes are visible to reads before they are committed.
	pub fn get_pixel(&self, position: IVec2) -> Color {
		self.tile(&TileCoord::containing(position))
			.map_or(Color::TRANSPARENT, |tile| tile[TileCoord::local_index(position)])
	}

	pub fn set_pixel(&mut self, position: IVec2, color: Color) {
		self.tile_mut(TileCoord::containing(position))[TileCoord::local_index(position)] = color;
	}

	pub fn fill_region(&mut self, region: IRect, color: Color) {
		for position in region.pixels() {
			self.set_pixel(position, color);
		}
	}

	/// Composites a surface into the pending changes.
	pub fn draw_surface(&mut self, surface: &Surface, blend_mode: BlendMode, opacity: f32) {
		for (position, source) in surface.pixels() {
			if source.a() <= 0. {
				continue;
			}
			let backdrop = self.get_pixel(position);
			self.set_pixel(position, blend_mode.composite(backdrop, source, opacity));
		}
	}

	pub fn read_region(&self, region: IRect) -> Surface {
		let mut surface = Surface::new(region);
		for coord in TileCoord::covering(region) {
			let Some(tile) = self.tile(&coord) else { continue };
			let Some(overlap) = coord.bounds().intersect(&region) else { continue };
			for position in overlap.pixels() {
				surface.set_pixel(position, tile[TileCoord::local_index(position)]);
			}
		}
		surface
	}

	/// The smallest rectangle containing every visible pixel, pending changes included.
	pub fn tight_bounds(&self) -> Option<IRect> {
		let mut coords: Vec<TileCoord> = self.committed.keys().chain(self.pending.keys()).copied().collect();
		coords.sort_unstable();
		coords.dedup();
		IRect::union_all(coords.into_iter().map(|coord| self.read_region(coord.bounds()).tight_bounds()))
	}

	pub fn is_empty(&self) -> bool {
		self.tight_bounds().is_none()
	}

	/// Whether both buffers still point at the same committed allocation for the tile.
	pub fn shares_tile_with(&self, other: &RasterBuffer, coord: TileCoord) -> bool {
		match (self.committed.get(&coord), other.committed.get(&coord)) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// Clones every tile into a fresh allocation.
	pub fn deep_clone(&self) -> Self {
		let copy = |tiles: &FxHashMap<TileCoord, Tile>| tiles.iter().map(|(coord, tile)| (*coord, Arc::new(tile.as_ref().clone()))).collect();
		Self {
			committed: copy(&self.committed),
			pending: copy(&self.pending),
		}
	}
}

impl Bitmap for RasterBuffer {
	fn bounds(&self) -> IRect {
		self.tight_bounds().unwrap_or_default()
	}

	fn get_pixel(&self, position: IVec2) -> Color {
		RasterBuffer::get_pixel(self, position)
	}
}
