pub mod document;
pub mod error;
pub mod folder;
pub mod member;
pub mod raster_layer;
pub mod reference_layer;
pub mod selection;
pub mod shared;

pub use document::{Document, SymmetryAxes};
pub use error::DocumentError;
pub use folder::Folder;
pub use member::{MemberId, MemberKind, MemberProperties, MemberRef, StructureMember};
pub use raster_layer::RasterLayer;
pub use reference_layer::{ReferenceLayer, ShapeCorners};
pub use selection::Selection;
pub use shared::{DocumentAccess, SharedDocument};
