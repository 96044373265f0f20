pub mod channels;
pub mod color;
pub mod document_reference;
pub mod sample;

// Re-export all nodes
pub use channels::*;
pub use color::*;
pub use document_reference::*;
pub use sample::*;
