//! Shared ownership for containers used from more than one thread.
//!
//! Containers are not synchronized internally. Registration allocates an ID,
//! writes a slot and updates two indices; holding one lock around the whole
//! container keeps each of those sequences a single critical section.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::container::ManagedContainer;
use crate::family::ManagedFamily;

/// A container behind one lock.
pub type SharedContainer<F> = Arc<Mutex<ManagedContainer<F>>>;

impl<F: ManagedFamily> ManagedContainer<F> {
	/// Moves the container behind a [`SharedContainer`] lock.
	pub fn share(self) -> SharedContainer<F> {
		Arc::new(Mutex::new(self))
	}
}
