//! Numeric object identifiers and the recycling allocator behind them.

use std::collections::BTreeSet;

/// Numeric identifier assigned to a registered object.
///
/// IDs are dense, non-negative and scoped to a single container. The only
/// negative value is [`ObjectId::UNDEFINED`], carried by objects that have
/// never been registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(i32);

impl ObjectId {
	/// Sentinel for objects that have not been assigned an ID.
	pub const UNDEFINED: ObjectId = ObjectId(-1);

	/// Wraps a raw ID. Negative values collapse to [`ObjectId::UNDEFINED`].
	#[inline]
	pub const fn from_raw(raw: i32) -> Self {
		if raw < 0 { Self::UNDEFINED } else { Self(raw) }
	}

	#[inline]
	pub const fn as_i32(self) -> i32 {
		self.0
	}

	/// Returns true unless this is [`ObjectId::UNDEFINED`].
	#[inline]
	pub const fn is_defined(self) -> bool {
		self.0 >= 0
	}

	/// Slot index for a defined ID.
	#[inline]
	pub(crate) fn slot(self) -> Option<usize> {
		usize::try_from(self.0).ok()
	}
}

impl Default for ObjectId {
	fn default() -> Self {
		Self::UNDEFINED
	}
}

impl std::fmt::Display for ObjectId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.is_defined() {
			write!(f, "{}", self.0)
		} else {
			f.write_str("undefined")
		}
	}
}

/// Allocator that recycles freed IDs, lowest first.
///
/// Fresh IDs are issued as `max_used + 1` only when the free pool is empty,
/// so the live ID set stays as dense as the removal history allows.
#[derive(Debug, Default, Clone)]
pub(crate) struct IdAllocator {
	free: BTreeSet<ObjectId>,
	next: i32,
}

impl IdAllocator {
	/// Takes the lowest freed ID, or issues a fresh one.
	pub(crate) fn allocate(&mut self) -> ObjectId {
		if let Some(id) = self.free.pop_first() {
			return id;
		}
		let id = ObjectId(self.next);
		self.next += 1;
		id
	}

	/// Returns an issued ID to the pool. Unissued or undefined IDs are ignored.
	pub(crate) fn release(&mut self, id: ObjectId) {
		if id.is_defined() && id.0 < self.next {
			self.free.insert(id);
		}
	}

	/// The ID the next call to [`Self::allocate`] would return.
	pub(crate) fn peek(&self) -> ObjectId {
		self.free.first().copied().unwrap_or(ObjectId(self.next))
	}

	#[cfg(test)]
	pub(crate) fn free_count(&self) -> usize {
		self.free.len()
	}
}
