pub use uuid_generation::*;

mod uuid_generation {
	use rand_chacha::ChaCha20Rng;
	use rand_chacha::rand_core::{RngCore, SeedableRng};
	use std::cell::Cell;
	use std::sync::Mutex;

	static RNG: Mutex<Option<ChaCha20Rng>> = Mutex::new(None);
	thread_local! {
		pub static UUID_SEED: Cell<Option<u64>> = const { Cell::new(None) };
	}

	/// Seeds the generator used by [`generate_uuid`]. Only takes effect before the first id is generated.
	pub fn set_uuid_seed(random_seed: u64) {
		UUID_SEED.with(|seed| seed.set(Some(random_seed)))
	}

	pub fn generate_uuid() -> u64 {
		let mut lock = RNG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
		let rng = lock.get_or_insert_with(|| {
			let random_seed = UUID_SEED.with(|seed| seed.get().unwrap_or(42));
			ChaCha20Rng::seed_from_u64(random_seed)
		});
		rng.next_u64()
	}
}

/// Identifies a node in a network. Clones made while unrolling a loop get fresh ids.
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
	pub fn new() -> Self {
		Self(generate_uuid())
	}
}

impl Default for NodeId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn generated_ids_are_distinct() {
		let ids: Vec<u64> = (0..64).map(|_| generate_uuid()).collect();
		let mut deduplicated = ids.clone();
		deduplicated.sort_unstable();
		deduplicated.dedup();
		assert_eq!(ids.len(), deduplicated.len());
	}
}
