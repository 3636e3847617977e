#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Handle/ID bookkeeping shared by every container.
//!
//! # Role
//!
//! [`ContainerBase`] is the non-generic half of a container. It owns the
//! handle→ID and ID→handle indices, the recycling ID allocator, the protection
//! sets and substring queries. It never sees objects; the typed
//! [`ManagedContainer`](crate::ManagedContainer) stores those in ID slots and
//! drives the mutating methods here as part of a single insert or remove.
//!
//! # Invariants
//!
//! - `by_handle` and `by_id` are exact inverses.
//!   - Enforced in: [`ContainerBase::index`], [`ContainerBase::unindex`].
//! - A freed ID is never live.
//!   - Enforced in: [`ContainerBase::unindex`] (frees only after both entries are purged).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::id::{IdAllocator, ObjectId};

/// Why a removal was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalBlock {
	/// Required system entry; can never be removed.
	Undeletable,
	/// Locked by the user; unlock to remove.
	UserLocked,
}

impl std::fmt::Display for RemovalBlock {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Undeletable => f.write_str("required undeletable object"),
			Self::UserLocked => f.write_str("user-locked object; unlock it to delete"),
		}
	}
}

/// Handle index, ID allocator and protection sets for one container.
#[derive(Debug, Clone)]
pub struct ContainerBase {
	object_type: String,
	by_handle: FxHashMap<String, ObjectId>,
	by_id: FxHashMap<ObjectId, String>,
	ids: IdAllocator,
	undeletable: FxHashSet<String>,
	user_locked: FxHashSet<String>,
	case_sensitive: bool,
}

impl ContainerBase {
	/// Creates an empty index labelled with the managed object type.
	pub fn new(object_type: impl Into<String>) -> Self {
		Self {
			object_type: object_type.into(),
			by_handle: FxHashMap::default(),
			by_id: FxHashMap::default(),
			ids: IdAllocator::default(),
			undeletable: FxHashSet::default(),
			user_locked: FxHashSet::default(),
			case_sensitive: false,
		}
	}

	/// Label of the managed object type, used in diagnostics.
	pub fn object_type(&self) -> &str {
		&self.object_type
	}

	/// Switches substring queries between case-sensitive and case-insensitive.
	pub fn set_case_sensitive_queries(&mut self, case_sensitive: bool) {
		self.case_sensitive = case_sensitive;
	}

	pub fn len(&self) -> usize {
		self.by_handle.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_handle.is_empty()
	}

	pub fn has_handle(&self, handle: &str) -> bool {
		self.by_handle.contains_key(handle)
	}

	pub fn has_id(&self, id: ObjectId) -> bool {
		self.by_id.contains_key(&id)
	}

	/// Exact handle lookup. Never allocates.
	pub fn id_for(&self, handle: &str) -> Option<ObjectId> {
		self.by_handle.get(handle).copied()
	}

	/// Handle registered under `id`.
	pub fn handle_for(&self, id: ObjectId) -> Option<&str> {
		self.by_id.get(&id).map(String::as_str)
	}

	/// All registered handles, sorted.
	pub fn handles(&self) -> Vec<String> {
		let mut handles: Vec<String> = self.by_handle.keys().cloned().collect();
		handles.sort_unstable();
		handles
	}

	/// Returns true if `handle` is registered, logging at info level otherwise.
	pub fn check_exists(&self, handle: &str, source: &str) -> bool {
		if self.has_handle(handle) {
			return true;
		}
		tracing::info!(
			object_type = %self.object_type,
			handle,
			source,
			"no managed object with this handle exists"
		);
		false
	}

	/// Registered handles that contain (or, with `contains == false`, do not
	/// contain) `substring`, sorted.
	///
	/// An empty substring matches every handle in both modes. Matching ignores
	/// case unless the container was configured for case-sensitive queries.
	pub fn handles_matching(&self, substring: &str, contains: bool) -> Vec<String> {
		if substring.is_empty() {
			return self.handles();
		}
		let needle = self.fold_case(substring);
		let mut matches: Vec<String> = self
			.by_handle
			.keys()
			.filter(|handle| self.fold_case(handle).contains(needle.as_str()) == contains)
			.cloned()
			.collect();
		matches.sort_unstable();
		matches
	}

	fn fold_case(&self, s: &str) -> String {
		if self.case_sensitive { s.to_owned() } else { s.to_lowercase() }
	}

	/// Returns `candidate` if unused, otherwise `"{candidate} (NNNN)"` with the
	/// lowest counter not yet taken.
	pub fn unique_handle_from_candidate(&self, candidate: &str) -> String {
		if !self.has_handle(candidate) {
			return candidate.to_owned();
		}
		(0u32..)
			.map(|n| format!("{candidate} ({n:04})"))
			.find(|handle| !self.has_handle(handle))
			.unwrap_or_else(|| candidate.to_owned())
	}

	/// Marks `handle` as permanently non-removable. The handle need not be
	/// registered yet.
	pub fn mark_undeletable(&mut self, handle: impl Into<String>) {
		self.undeletable.insert(handle.into());
	}

	pub fn is_undeletable(&self, handle: &str) -> bool {
		self.undeletable.contains(handle)
	}

	/// Undeletable handles, sorted.
	pub fn undeletable_handles(&self) -> Vec<String> {
		sorted(&self.undeletable)
	}

	/// Locks or unlocks a registered handle against removal.
	///
	/// Returns false, changing nothing, if the handle is not registered.
	pub fn set_lock(&mut self, handle: &str, lock: bool) -> bool {
		if !self.check_exists(handle, "ContainerBase::set_lock") {
			return false;
		}
		if lock {
			self.user_locked.insert(handle.to_owned());
		} else {
			self.user_locked.remove(handle);
		}
		true
	}

	/// Applies [`Self::set_lock`] to each handle, returning those that changed.
	pub fn set_lock_by_handles<S: AsRef<str>>(&mut self, handles: &[S], lock: bool) -> Vec<String> {
		handles
			.iter()
			.map(AsRef::as_ref)
			.filter(|handle| self.set_lock(handle, lock))
			.map(str::to_owned)
			.collect()
	}

	/// Locks or unlocks every handle selected by [`Self::handles_matching`].
	pub fn set_lock_by_substring(&mut self, lock: bool, substring: &str, contains: bool) -> Vec<String> {
		let handles = self.handles_matching(substring, contains);
		self.set_lock_by_handles(&handles, lock)
	}

	pub fn is_user_locked(&self, handle: &str) -> bool {
		self.user_locked.contains(handle)
	}

	/// User-locked handles, sorted.
	pub fn user_locked_handles(&self) -> Vec<String> {
		sorted(&self.user_locked)
	}

	/// Reports which protection, if any, blocks removing `handle`.
	///
	/// Undeletable takes precedence over a user lock.
	pub fn removal_block(&self, handle: &str) -> Option<RemovalBlock> {
		if self.is_undeletable(handle) {
			Some(RemovalBlock::Undeletable)
		} else if self.is_user_locked(handle) {
			Some(RemovalBlock::UserLocked)
		} else {
			None
		}
	}

	/// Returns the ID of `handle`, or reserves the lowest available one.
	pub(crate) fn id_for_or_allocate(&mut self, handle: &str) -> ObjectId {
		match self.id_for(handle) {
			Some(id) => id,
			None => self.ids.allocate(),
		}
	}

	/// The ID a new handle would receive, without reserving it.
	pub fn next_id(&self) -> ObjectId {
		self.ids.peek()
	}

	/// Returns `id` to the reuse pool.
	pub(crate) fn free(&mut self, id: ObjectId) {
		self.ids.release(id);
	}

	/// Records `handle <-> id`. Re-indexing a handle under its existing ID is a no-op.
	pub(crate) fn index(&mut self, handle: &str, id: ObjectId) {
		debug_assert!(id.is_defined());
		debug_assert!(
			self.by_id.get(&id).is_none_or(|owner| owner == handle),
			"ID {id} already indexed for another handle"
		);
		self.by_handle.insert(handle.to_owned(), id);
		self.by_id.insert(id, handle.to_owned());
	}

	/// Drops both index entries for `handle` and frees its ID.
	pub(crate) fn unindex(&mut self, handle: &str) -> Option<ObjectId> {
		let id = self.by_handle.remove(handle)?;
		self.by_id.remove(&id);
		self.user_locked.remove(handle);
		self.free(id);
		Some(id)
	}

	/// Checks that the two indices are inverses of each other.
	#[cfg(test)]
	pub(crate) fn assert_consistent(&self) {
		assert_eq!(self.by_handle.len(), self.by_id.len());
		for (handle, id) in &self.by_handle {
			assert_eq!(self.by_id.get(id), Some(handle), "by_id disagrees for {handle}");
		}
	}
}

fn sorted(set: &FxHashSet<String>) -> Vec<String> {
	let mut out: Vec<String> = set.iter().cloned().collect();
	out.sort_unstable();
	out
}
