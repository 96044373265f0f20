use crate::math::rect::IRect;
use crate::uuid::generate_uuid;

/// Identifies one execution pass. Temporary rewiring made during a pass is keyed by this id,
/// so passes running with distinct sessions never observe each other's overlays.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl SessionId {
	pub fn new() -> Self {
		Self(generate_uuid())
	}
}

impl Default for SessionId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "session {}", self.0)
	}
}

/// Supplied by the caller for every render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
	pub frame: u32,
	/// Seconds since the start of the animation.
	pub time: f64,
	/// The region the caller is interested in. `None` means the full extent of whatever is painted.
	pub viewport: Option<IRect>,
	pub session: SessionId,
}

impl RenderContext {
	pub fn new(session: SessionId) -> Self {
		Self {
			frame: 0,
			time: 0.,
			viewport: None,
			session,
		}
	}

	#[must_use]
	pub fn with_frame(mut self, frame: u32, time: f64) -> Self {
		self.frame = frame;
		self.time = time;
		self
	}

	#[must_use]
	pub fn with_viewport(mut self, viewport: IRect) -> Self {
		self.viewport = Some(viewport);
		self
	}

	#[must_use]
	pub fn with_session(&self, session: SessionId) -> Self {
		Self { session, ..self.clone() }
	}

	/// Restricts `bounds` to the viewport, if one is set.
	pub fn clip(&self, bounds: IRect) -> Option<IRect> {
		match self.viewport {
			Some(viewport) => viewport.intersect(&bounds),
			None => (!bounds.is_empty()).then_some(bounds),
		}
	}
}

impl Default for RenderContext {
	fn default() -> Self {
		Self::new(SessionId::new())
	}
}
