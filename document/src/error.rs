use crate::member::MemberId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
	#[error("Structure member {0} was not found")]
	MemberNotFound(MemberId),
	#[error("Structure member {0} does not have a parent folder")]
	InvalidTopology(MemberId),
	#[error("Structure member {0} is not a folder")]
	NotAFolder(MemberId),
	#[error("Index {index} is out of bounds for a folder with {len} children")]
	IndexOutOfBounds { index: usize, len: usize },
	#[error("The root folder cannot be removed or moved")]
	CannotRemoveRoot,
	#[error("Structure member {0} cannot be moved into itself or one of its descendants")]
	MoveIntoDescendant(MemberId),
	#[error("Reference image has {found} bytes, expected {expected}")]
	InvalidReferenceImage { expected: usize, found: usize },
	#[error("The document has been released")]
	Released,
}
