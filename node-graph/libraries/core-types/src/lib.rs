pub mod blending;
pub mod color;
pub mod color_matrix;
pub mod context;
pub mod math;
pub mod uuid;

pub use blending::BlendMode;
pub use color::Color;
pub use color_matrix::ColorMatrix;
pub use context::{RenderContext, SessionId};
pub use math::rect::IRect;
pub use uuid::NodeId;
