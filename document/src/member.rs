use crate::folder::Folder;
use crate::raster_layer::RasterLayer;
use core_types::uuid::generate_uuid;
use core_types::{BlendMode, IRect};
use raster_types::RasterBuffer;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u64);

impl MemberId {
	pub fn new() -> Self {
		Self(generate_uuid())
	}
}

impl Default for MemberId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for MemberId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Properties shared by every folder and layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberProperties {
	pub id: MemberId,
	pub name: String,
	/// Between `0.0` and `1.0`.
	pub opacity: f32,
	pub visible: bool,
	pub clip_to_member_below: bool,
	pub blend_mode: BlendMode,
	pub mask: Option<RasterBuffer>,
	pub mask_visible: bool,
}

impl MemberProperties {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			id: MemberId::new(),
			name: name.into(),
			opacity: 1.,
			visible: true,
			clip_to_member_below: false,
			blend_mode: BlendMode::Normal,
			mask: None,
			mask_visible: true,
		}
	}

	#[must_use]
	pub fn with_id(mut self, id: MemberId) -> Self {
		self.id = id;
		self
	}

	pub(crate) fn deep_clone(&self) -> Self {
		Self {
			mask: self.mask.as_ref().map(RasterBuffer::deep_clone),
			name: self.name.clone(),
			..*self
		}
	}
}

/// A folder or layer in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureMember {
	Folder(Folder),
	RasterLayer(RasterLayer),
}

impl StructureMember {
	pub fn properties(&self) -> &MemberProperties {
		match self {
			StructureMember::Folder(folder) => &folder.properties,
			StructureMember::RasterLayer(layer) => &layer.properties,
		}
	}

	pub fn properties_mut(&mut self) -> &mut MemberProperties {
		match self {
			StructureMember::Folder(folder) => &mut folder.properties,
			StructureMember::RasterLayer(layer) => &mut layer.properties,
		}
	}

	pub fn id(&self) -> MemberId {
		self.properties().id
	}

	pub fn as_member_ref(&self) -> MemberRef<'_> {
		match self {
			StructureMember::Folder(folder) => MemberRef::Folder(folder),
			StructureMember::RasterLayer(layer) => MemberRef::RasterLayer(layer),
		}
	}

	pub fn as_folder_mut(&mut self) -> Option<&mut Folder> {
		match self {
			StructureMember::Folder(folder) => Some(folder),
			StructureMember::RasterLayer(_) => None,
		}
	}

	pub fn as_raster_layer_mut(&mut self) -> Option<&mut RasterLayer> {
		match self {
			StructureMember::RasterLayer(layer) => Some(layer),
			StructureMember::Folder(_) => None,
		}
	}

	pub fn tight_bounds(&self) -> Option<IRect> {
		self.as_member_ref().tight_bounds()
	}

	/// Recursively clones every child and mask into fresh allocations.
	pub fn deep_clone(&self) -> Self {
		match self {
			StructureMember::Folder(folder) => StructureMember::Folder(folder.deep_clone()),
			StructureMember::RasterLayer(layer) => StructureMember::RasterLayer(layer.deep_clone()),
		}
	}

	/// Gives this member and all of its descendants fresh ids.
	pub(crate) fn regenerate_ids(&mut self) {
		self.properties_mut().id = MemberId::new();
		if let StructureMember::Folder(folder) = self {
			folder.regenerate_child_ids();
		}
	}
}

impl From<Folder> for StructureMember {
	fn from(folder: Folder) -> Self {
		StructureMember::Folder(folder)
	}
}

impl From<RasterLayer> for StructureMember {
	fn from(layer: RasterLayer) -> Self {
		StructureMember::RasterLayer(layer)
	}
}

/// A borrowed view of any member of the tree, the root folder included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberRef<'a> {
	Folder(&'a Folder),
	RasterLayer(&'a RasterLayer),
}

impl<'a> MemberRef<'a> {
	pub fn properties(&self) -> &'a MemberProperties {
		match self {
			MemberRef::Folder(folder) => &folder.properties,
			MemberRef::RasterLayer(layer) => &layer.properties,
		}
	}

	pub fn id(&self) -> MemberId {
		self.properties().id
	}

	pub fn as_folder(&self) -> Option<&'a Folder> {
		match self {
			MemberRef::Folder(folder) => Some(folder),
			MemberRef::RasterLayer(_) => None,
		}
	}

	/// Downcasts to a concrete member kind.
	pub fn kind<T: MemberKind>(&self) -> Option<&'a T> {
		T::from_ref(*self)
	}

	pub fn tight_bounds(&self) -> Option<IRect> {
		match self {
			MemberRef::Folder(folder) => folder.tight_bounds(),
			MemberRef::RasterLayer(layer) => layer.tight_bounds(),
		}
	}
}

/// Implemented by the concrete member types so lookups can check what kind of member they found.
pub trait MemberKind: Sized {
	fn from_ref(member: MemberRef<'_>) -> Option<&Self>;
}

impl MemberKind for Folder {
	fn from_ref(member: MemberRef<'_>) -> Option<&Self> {
		member.as_folder()
	}
}

impl MemberKind for RasterLayer {
	fn from_ref(member: MemberRef<'_>) -> Option<&Self> {
		match member {
			MemberRef::RasterLayer(layer) => Some(layer),
			MemberRef::Folder(_) => None,
		}
	}
}
