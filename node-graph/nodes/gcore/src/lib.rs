pub mod logic;
pub mod value;

// Re-export all nodes
pub use logic::*;
pub use value::*;
