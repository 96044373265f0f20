use crate::error::DocumentError;
use crate::folder::Folder;
use crate::member::{MemberId, MemberKind, MemberRef, StructureMember};
use crate::reference_layer::ReferenceLayer;
use crate::selection::Selection;
use core_types::IRect;
use glam::UVec2;
use raster_types::Surface;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymmetryAxes {
	pub horizontal_enabled: bool,
	pub vertical_enabled: bool,
	/// Y position of the horizontal axis.
	pub horizontal_y: f64,
	/// X position of the vertical axis.
	pub vertical_x: f64,
}

/// An editable image: the structure tree plus the canvas level state around it.
///
/// `Clone` produces a cheap snapshot that shares unchanged subtrees with the original.
/// Use [`Document::deep_clone`] to get a copy that shares no allocations at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	pub size: UVec2,
	pub symmetry: SymmetryAxes,
	root: Folder,
	pub selection: Selection,
	pub reference_layer: Option<ReferenceLayer>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new(UVec2::new(64, 64))
	}
}

impl Document {
	pub fn new(size: UVec2) -> Self {
		Self {
			size,
			symmetry: SymmetryAxes {
				horizontal_y: size.y as f64 / 2.,
				vertical_x: size.x as f64 / 2.,
				..Default::default()
			},
			root: Folder::new("Root"),
			selection: Selection::default(),
			reference_layer: None,
		}
	}

	pub fn root(&self) -> &Folder {
		&self.root
	}

	pub fn root_mut(&mut self) -> &mut Folder {
		&mut self.root
	}

	pub fn root_id(&self) -> MemberId {
		self.root.id()
	}

	/// Child indices leading from the root to the member. Empty for the root itself.
	fn index_path(&self, id: MemberId) -> Option<Vec<usize>> {
		if id == self.root.id() {
			return Some(Vec::new());
		}
		let mut stack = vec![(&self.root, Vec::new())];
		while let Some((folder, path)) = stack.pop() {
			for (index, child) in folder.children().enumerate() {
				let mut child_path = path.clone();
				child_path.push(index);
				if child.id() == id {
					return Some(child_path);
				}
				if let StructureMember::Folder(child_folder) = child {
					stack.push((child_folder, child_path));
				}
			}
		}
		None
	}

	/// The member followed by each of its ancestors, ending with the root. Empty if the member does not exist.
	pub fn find_member_path(&self, id: MemberId) -> Vec<MemberRef<'_>> {
		let Some(indices) = self.index_path(id) else { return Vec::new() };

		let mut path = vec![MemberRef::Folder(&self.root)];
		let mut folder = &self.root;
		for index in indices {
			let Some(child) = folder.child(index) else { return Vec::new() };
			path.push(child.as_member_ref());
			if let StructureMember::Folder(child_folder) = child {
				folder = child_folder;
			}
		}
		path.reverse();
		path
	}

	pub fn find_member(&self, id: MemberId) -> Option<MemberRef<'_>> {
		self.find_member_path(id).first().copied()
	}

	pub fn find_member_or_err(&self, id: MemberId) -> Result<MemberRef<'_>, DocumentError> {
		self.find_member(id).ok_or(DocumentError::MemberNotFound(id))
	}

	/// The member and the folder directly containing it.
	pub fn find_child_and_parent_or_err(&self, id: MemberId) -> Result<(MemberRef<'_>, &Folder), DocumentError> {
		match self.find_member_path(id).as_slice() {
			[] => Err(DocumentError::MemberNotFound(id)),
			[child, parent, ..] => parent.as_folder().map(|parent| (*child, parent)).ok_or(DocumentError::InvalidTopology(id)),
			[_] => Err(DocumentError::InvalidTopology(id)),
		}
	}

	/// Whether a member with this id exists and is of kind `T`.
	pub fn has_member<T: MemberKind>(&self, id: MemberId) -> bool {
		self.find_member(id).and_then(|member| member.kind::<T>()).is_some()
	}

	/// Mutable access to a member below the root. Shared ancestors are copied on the way down.
	pub fn find_member_mut(&mut self, id: MemberId) -> Option<&mut StructureMember> {
		let indices = self.index_path(id)?;
		let (last, parents) = indices.split_last()?;
		let mut folder = &mut self.root;
		for &index in parents {
			folder = folder.child_mut(index)?.as_folder_mut()?;
		}
		folder.child_mut(*last)
	}

	pub fn folder_mut(&mut self, id: MemberId) -> Result<&mut Folder, DocumentError> {
		if id == self.root.id() {
			return Ok(&mut self.root);
		}
		self.find_member_mut(id)
			.ok_or(DocumentError::MemberNotFound(id))?
			.as_folder_mut()
			.ok_or(DocumentError::NotAFolder(id))
	}

	/// Visits every member below the root exactly once, parents before their children.
	pub fn for_every_member(&self, mut action: impl FnMut(&StructureMember)) {
		for member in self.members() {
			action(member);
		}
	}

	/// Pre-order iterator over every member below the root.
	pub fn members(&self) -> MemberIter<'_> {
		MemberIter {
			stack: self.root.children().rev().collect(),
		}
	}

	pub fn insert_member(&mut self, parent: MemberId, index: usize, member: impl Into<StructureMember>) -> Result<MemberId, DocumentError> {
		let member = member.into();
		let id = member.id();
		self.folder_mut(parent)?.insert(index, member)?;
		log::debug!("Inserted member {id} into {parent} at {index}");
		Ok(id)
	}

	/// Detaches a member and its subtree from the document.
	pub fn remove_member(&mut self, id: MemberId) -> Result<StructureMember, DocumentError> {
		if id == self.root.id() {
			return Err(DocumentError::CannotRemoveRoot);
		}
		let parent = self.find_child_and_parent_or_err(id)?.1.id();
		let member = self.folder_mut(parent)?.remove(id)?;
		log::debug!("Removed member {id} from {parent}");
		Ok(member)
	}

	pub fn move_member(&mut self, id: MemberId, new_parent: MemberId, index: usize) -> Result<(), DocumentError> {
		if id == self.root.id() {
			return Err(DocumentError::CannotRemoveRoot);
		}
		let target_path = self.find_member_path(new_parent);
		let Some(target) = target_path.first() else {
			return Err(DocumentError::MemberNotFound(new_parent));
		};
		let target = target.as_folder().ok_or(DocumentError::NotAFolder(new_parent))?;
		if target_path.iter().any(|ancestor| ancestor.id() == id) {
			return Err(DocumentError::MoveIntoDescendant(id));
		}

		let (_, old_parent) = self.find_child_and_parent_or_err(id)?;
		let len = target.len() - usize::from(old_parent.id() == new_parent);
		if index > len {
			return Err(DocumentError::IndexOutOfBounds { index, len });
		}

		let member = self.remove_member(id)?;
		self.insert_member(new_parent, index, member)?;
		Ok(())
	}

	/// Copies a member with fresh ids for it and all of its descendants, placing the copy directly above the original.
	pub fn duplicate_member(&mut self, id: MemberId) -> Result<MemberId, DocumentError> {
		let (child, parent) = self.find_child_and_parent_or_err(id)?;
		let mut copy = match child {
			MemberRef::Folder(folder) => StructureMember::Folder(folder.clone()),
			MemberRef::RasterLayer(layer) => StructureMember::RasterLayer(layer.clone()),
		};
		copy.regenerate_ids();
		let parent_id = parent.id();
		let index = parent.position_of(id).ok_or(DocumentError::InvalidTopology(id))?;
		self.insert_member(parent_id, index + 1, copy)
	}

	pub fn tight_bounds(&self) -> Option<IRect> {
		self.root.tight_bounds()
	}

	/// Recursively clones every member, mask and buffer into fresh allocations.
	pub fn deep_clone(&self) -> Self {
		Self {
			root: self.root.deep_clone(),
			selection: Selection {
				mask: self.selection.mask.deep_clone(),
				..self.selection.clone()
			},
			..self.clone()
		}
	}

	/// Composites every visible member into a surface covering `region`.
	pub fn render(&self, region: IRect) -> Surface {
		self.root.render(region)
	}

	pub fn canvas_bounds(&self) -> IRect {
		IRect::from_size(self.size.x, self.size.y)
	}
}

pub struct MemberIter<'a> {
	stack: Vec<&'a StructureMember>,
}

impl<'a> Iterator for MemberIter<'a> {
	type Item = &'a StructureMember;

	fn next(&mut self) -> Option<Self::Item> {
		let member = self.stack.pop()?;
		if let StructureMember::Folder(folder) = member {
			self.stack.extend(folder.children().rev());
		}
		Some(member)
	}
}
