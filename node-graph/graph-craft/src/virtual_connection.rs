//! Temporary rewiring of a network.
//!
//! Loop unrolling has to connect cloned nodes to each other and to the persistent graph without touching it.
//! Those connections live in an overlay keyed by [`SessionId`]; a session shadows the persistent connections for
//! one execution pass and is discarded at the end of it. Sessions may have a parent, whose connections they see
//! underneath their own, which is how nested loops layer their rewiring.

use crate::document::value::TaggedValue;
use crate::document::{InputConnector, OutputConnector};
use core_types::SessionId;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
struct VirtualSession {
	parent: Option<SessionId>,
	connections: FxHashMap<InputConnector, OutputConnector>,
	consumers: FxHashMap<OutputConnector, Vec<InputConnector>>,
	/// Values forced onto inputs, taking precedence over any connection.
	constants: FxHashMap<InputConnector, TaggedValue>,
}

#[derive(Debug, Clone, Default)]
pub struct VirtualConnections {
	sessions: FxHashMap<SessionId, VirtualSession>,
}

impl VirtualConnections {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a session. Opening a session that already exists clears it.
	pub fn begin(&mut self, session: SessionId, parent: Option<SessionId>) {
		let previous = self.sessions.insert(
			session,
			VirtualSession {
				parent,
				..Default::default()
			},
		);
		if previous.is_some() {
			log::warn!("Virtual {session} was opened twice, its previous overlay was discarded");
		}
	}

	/// Discards a session and everything recorded in it.
	pub fn end(&mut self, session: SessionId) {
		if let Some(ended) = self.sessions.remove(&session) {
			log::trace!("Closed virtual {session} with {} connections and {} constants", ended.connections.len(), ended.constants.len());
		}
	}

	pub fn is_active(&self, session: SessionId) -> bool {
		self.sessions.contains_key(&session)
	}

	pub fn session_count(&self) -> usize {
		self.sessions.len()
	}

	pub fn connect(&mut self, session: SessionId, output: OutputConnector, input: InputConnector) {
		match self.sessions.get_mut(&session) {
			Some(overlay) => {
				if let Some(previous) = overlay.connections.insert(input, output) {
					if let Some(inputs) = overlay.consumers.get_mut(&previous) {
						inputs.retain(|consumer| *consumer != input);
					}
				}
				overlay.consumers.entry(output).or_default().push(input);
			}
			None => log::warn!("Ignored virtual connection into node {}, {session} is not open", input.node_id),
		}
	}

	pub fn set_constant(&mut self, session: SessionId, input: InputConnector, value: TaggedValue) {
		match self.sessions.get_mut(&session) {
			Some(overlay) => {
				overlay.constants.insert(input, value);
			}
			None => log::warn!("Ignored virtual constant for node {}, {session} is not open", input.node_id),
		}
	}

	/// Walks from `session` up through its parents.
	fn chain(&self, session: SessionId) -> impl Iterator<Item = &VirtualSession> {
		std::iter::successors(self.sessions.get(&session), |overlay| overlay.parent.and_then(|parent| self.sessions.get(&parent)))
	}

	pub fn connection(&self, session: SessionId, input: InputConnector) -> Option<OutputConnector> {
		self.chain(session).find_map(|overlay| overlay.connections.get(&input).copied())
	}

	pub fn constant(&self, session: SessionId, input: InputConnector) -> Option<&TaggedValue> {
		self.chain(session).find_map(|overlay| overlay.constants.get(&input))
	}

	/// Every input connected to `output` within the session and its parents. The innermost session wins for each input.
	pub fn consumers(&self, session: SessionId, output: OutputConnector) -> Vec<InputConnector> {
		let mut inputs: Vec<_> = self
			.chain(session)
			.flat_map(|overlay| overlay.consumers.get(&output).into_iter().flatten().copied())
			.filter(|input| self.connection(session, *input) == Some(output))
			.collect();
		inputs.sort_unstable();
		inputs.dedup();
		inputs
	}

	/// Whether the session or one of its parents rewires `input`.
	pub fn is_shadowed(&self, session: SessionId, input: InputConnector) -> bool {
		self.connection(session, input).is_some()
	}
}

/// Keeps a virtual session open for as long as it lives.
///
/// Dropping the scope ends the session, whether the pass that opened it completed or returned early with an error.
pub struct VirtualScope {
	overlay: Rc<RefCell<VirtualConnections>>,
	session: SessionId,
}

impl VirtualScope {
	pub fn begin(overlay: &Rc<RefCell<VirtualConnections>>, session: SessionId, parent: Option<SessionId>) -> Self {
		overlay.borrow_mut().begin(session, parent);
		Self { overlay: overlay.clone(), session }
	}

	pub fn session(&self) -> SessionId {
		self.session
	}
}

impl Drop for VirtualScope {
	fn drop(&mut self) {
		match self.overlay.try_borrow_mut() {
			Ok(mut overlay) => overlay.end(self.session),
			Err(_) => log::error!("Could not close virtual {}, the overlay is borrowed", self.session),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::document::NodeId;

	#[test]
	fn child_sessions_see_their_parents() {
		let (outer, inner) = (SessionId::new(), SessionId::new());
		let (a, b) = (OutputConnector::node(NodeId(1), 0), OutputConnector::node(NodeId(2), 0));
		let input = InputConnector::node(NodeId(3), 0);

		let mut overlay = VirtualConnections::new();
		overlay.begin(outer, None);
		overlay.connect(outer, a, input);
		overlay.begin(inner, Some(outer));
		assert_eq!(overlay.connection(inner, input), Some(a));

		overlay.connect(inner, b, input);
		assert_eq!(overlay.connection(inner, input), Some(b));
		assert_eq!(overlay.connection(outer, input), Some(a));
		assert_eq!(overlay.consumers(inner, a), vec![]);
		assert_eq!(overlay.consumers(inner, b), vec![input]);

		overlay.end(inner);
		assert_eq!(overlay.connection(inner, input), None);
	}

	#[test]
	fn rewiring_an_input_moves_its_consumer() {
		let session = SessionId::new();
		let (a, b) = (OutputConnector::node(NodeId(1), 0), OutputConnector::node(NodeId(2), 0));
		let input = InputConnector::node(NodeId(3), 0);

		let mut overlay = VirtualConnections::new();
		overlay.begin(session, None);
		overlay.connect(session, a, input);
		overlay.connect(session, a, input);
		assert_eq!(overlay.consumers(session, a), vec![input]);

		overlay.connect(session, b, input);
		assert_eq!(overlay.consumers(session, a), vec![]);
		assert_eq!(overlay.consumers(session, b), vec![input]);
		assert!(overlay.is_shadowed(session, input));
		assert!(!overlay.is_shadowed(session, InputConnector::node(NodeId(3), 1)));
	}

	#[test]
	fn scopes_end_their_session_when_dropped() {
		let overlay = Rc::new(RefCell::new(VirtualConnections::new()));
		let session = SessionId::new();
		{
			let scope = VirtualScope::begin(&overlay, session, None);
			overlay.borrow_mut().set_constant(scope.session(), InputConnector::node(NodeId(1), 0), TaggedValue::Int(2));
			assert_eq!(overlay.borrow().constant(session, InputConnector::node(NodeId(1), 0)), Some(&TaggedValue::Int(2)));
		}
		assert!(!overlay.borrow().is_active(session));
		assert_eq!(overlay.borrow().session_count(), 0);
	}
}
