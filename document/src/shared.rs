use crate::document::Document;
use crate::error::DocumentError;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

/// A handle through which other documents (and the nodes rendering them) read a document they do not own.
///
/// Readers must [`open`](SharedDocument::open) the document for every access. Once the owner calls
/// [`close`](SharedDocument::close), the document is released and every later `open` fails with
/// [`DocumentError::Released`].
#[derive(Debug, Clone)]
pub struct SharedDocument {
	inner: Arc<RwLock<Option<Arc<Document>>>>,
}

/// Read access to a shared document, valid for as long as it is held.
#[derive(Debug, Clone)]
pub struct DocumentAccess {
	document: Arc<Document>,
}

impl Deref for DocumentAccess {
	type Target = Document;

	fn deref(&self) -> &Self::Target {
		&self.document
	}
}

impl SharedDocument {
	pub fn new(document: Document) -> Self {
		Self {
			inner: Arc::new(RwLock::new(Some(Arc::new(document)))),
		}
	}

	pub fn open(&self) -> Result<DocumentAccess, DocumentError> {
		let lock = self.inner.read().unwrap_or_else(PoisonError::into_inner);
		let document = lock.as_ref().ok_or(DocumentError::Released)?;
		Ok(DocumentAccess { document: document.clone() })
	}

	/// Applies an edit. Readers holding a [`DocumentAccess`] keep seeing the state from before the edit.
	pub fn modify<R>(&self, edit: impl FnOnce(&mut Document) -> R) -> Result<R, DocumentError> {
		let mut lock = self.inner.write().unwrap_or_else(PoisonError::into_inner);
		let document = lock.as_mut().ok_or(DocumentError::Released)?;
		Ok(edit(Arc::make_mut(document)))
	}

	/// Releases the document. Returns it if this was the first call.
	pub fn close(&self) -> Option<Arc<Document>> {
		let mut lock = self.inner.write().unwrap_or_else(PoisonError::into_inner);
		let document = lock.take();
		if document.is_some() {
			log::debug!("Released shared document");
		}
		document
	}

	pub fn is_released(&self) -> bool {
		self.inner.read().unwrap_or_else(PoisonError::into_inner).is_none()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use glam::UVec2;

	#[test]
	fn access_is_refused_after_close() {
		let shared = SharedDocument::new(Document::new(UVec2::new(8, 8)));
		let reader = shared.clone();
		assert_eq!(reader.open().unwrap().size, UVec2::new(8, 8));

		assert!(shared.close().is_some());
		assert!(reader.is_released());
		assert_eq!(reader.open().unwrap_err(), DocumentError::Released);
		assert_eq!(reader.modify(|_| ()).unwrap_err(), DocumentError::Released);
		assert!(shared.close().is_none());
	}

	#[test]
	fn open_access_keeps_its_snapshot() {
		let shared = SharedDocument::new(Document::new(UVec2::new(8, 8)));
		let access = shared.open().unwrap();
		shared.modify(|document| document.size = UVec2::new(4, 4)).unwrap();
		assert_eq!(access.size, UVec2::new(8, 8));
		assert_eq!(shared.open().unwrap().size, UVec2::new(4, 4));
	}
}
