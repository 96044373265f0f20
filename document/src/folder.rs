use crate::error::DocumentError;
use crate::member::{MemberId, MemberProperties, MemberRef, StructureMember};
use core_types::IRect;
use raster_types::Surface;
use std::sync::Arc;

/// An ordered list of child members, bottom first.
///
/// Children are reference counted. Cloning a folder shares every child with the original, and a child
/// is only copied once it is mutated through [`Folder::child_mut`], so untouched subtrees stay shared between snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
	pub properties: MemberProperties,
	children: Vec<Arc<StructureMember>>,
}

impl Folder {
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_properties(MemberProperties::new(name))
	}

	pub fn with_properties(properties: MemberProperties) -> Self {
		Self { properties, children: Vec::new() }
	}

	pub fn id(&self) -> MemberId {
		self.properties.id
	}

	pub fn len(&self) -> usize {
		self.children.len()
	}

	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	pub fn children(&self) -> impl DoubleEndedIterator<Item = &StructureMember> + ExactSizeIterator {
		self.children.iter().map(Arc::as_ref)
	}

	pub fn child(&self, index: usize) -> Option<&StructureMember> {
		self.children.get(index).map(Arc::as_ref)
	}

	/// Mutable access to a child, copying it first if it is shared with another snapshot.
	pub fn child_mut(&mut self, index: usize) -> Option<&mut StructureMember> {
		self.children.get_mut(index).map(Arc::make_mut)
	}

	/// Whether the child at `index` is the same allocation in both folders.
	pub fn shares_child_with(&self, other: &Folder, index: usize) -> bool {
		match (self.children.get(index), other.children.get(index)) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	pub fn position_of(&self, id: MemberId) -> Option<usize> {
		self.children.iter().position(|child| child.id() == id)
	}

	/// Inserts a member at `index`, `len()` appends it on top.
	pub fn insert(&mut self, index: usize, member: StructureMember) -> Result<(), DocumentError> {
		let len = self.children.len();
		if index > len {
			return Err(DocumentError::IndexOutOfBounds { index, len });
		}
		self.children.insert(index, Arc::new(member));
		Ok(())
	}

	pub fn push(&mut self, member: impl Into<StructureMember>) {
		self.children.push(Arc::new(member.into()));
	}

	/// Removes a direct child, returning it.
	pub fn remove(&mut self, id: MemberId) -> Result<StructureMember, DocumentError> {
		let index = self.position_of(id).ok_or(DocumentError::MemberNotFound(id))?;
		Ok(Arc::unwrap_or_clone(self.children.remove(index)))
	}

	/// Union of the tight bounds of every child.
	pub fn tight_bounds(&self) -> Option<IRect> {
		IRect::union_all(self.children().map(StructureMember::tight_bounds))
	}

	/// Recursively clones every child and mask into fresh allocations.
	pub fn deep_clone(&self) -> Self {
		Self {
			properties: self.properties.deep_clone(),
			children: self.children.iter().map(|child| Arc::new(child.deep_clone())).collect(),
		}
	}

	pub(crate) fn regenerate_child_ids(&mut self) {
		for child in &mut self.children {
			Arc::make_mut(child).regenerate_ids();
		}
	}

	/// Composites the visible children bottom to top into a surface covering `region`.
	///
	/// A member clipped to the one below is masked by the nearest unclipped member beneath it, and is not drawn when
	/// that member is hidden or absent.
	pub fn render(&self, region: IRect) -> Surface {
		let mut target = Surface::new(region);
		let mut clip_base: Option<Surface> = None;

		for child in self.children() {
			let properties = child.properties();
			if !properties.visible {
				// A hidden base hides the members clipped to it
				if !properties.clip_to_member_below {
					clip_base = None;
				}
				continue;
			}
			if properties.clip_to_member_below && clip_base.is_none() {
				continue;
			}

			let mut layer = match child.as_member_ref() {
				MemberRef::Folder(folder) => folder.render(region),
				MemberRef::RasterLayer(layer) => layer.buffer.read_region(region),
			};
			if let Some(mask) = properties.mask.as_ref().filter(|_| properties.mask_visible) {
				layer.mask_alpha_from(mask);
			}

			match (&clip_base, properties.clip_to_member_below) {
				(Some(base), true) => layer.mask_alpha_from(base),
				_ => clip_base = Some(layer.clone()),
			}

			target.blend_from(&layer, properties.blend_mode, properties.opacity);
		}

		target
	}
}
