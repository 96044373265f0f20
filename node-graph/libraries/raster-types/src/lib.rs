pub mod raster_buffer;
pub mod surface;

pub use raster_buffer::{RasterBuffer, TILE_SIZE, TileCoord};
pub use surface::{Bitmap, Surface};
