#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Typed container: create, register, fetch and remove managed objects.
//!
//! # Mental Model
//!
//! 1. **Build:** the [`ManagedFamily`] turns a handle (or a parsed document)
//!    into a fresh, unregistered object owned by the caller.
//! 2. **Register:** the family vets the object, then the container assigns an
//!    ID and stores an isolated copy. The caller keeps its instance and may
//!    keep editing it without touching the stored copy.
//! 3. **Consume:** readers borrow stored objects or take copies, by handle or
//!    by ID.
//! 4. **Remove:** unprotected entries are purged and their IDs recycled.
//!
//! # Invariants
//!
//! - Every live handle maps to one ID and one stored object, and the stored
//!   object's own handle and ID agree with the index.
//!   - Enforced in: [`ManagedContainer::store`], [`ManagedContainer::take`].
//!   - Tested by: `tests::index_stays_consistent_through_churn`
//! - Registration is all-or-nothing.
//!   - Enforced in: [`ManagedContainer::register_object`] (finalize and copy run before any index write).
//!   - Tested by: `tests::rejected_registration_leaves_no_trace`
//! - Stored objects are never aliased by callers.
//!   - Enforced in: copy on register and on every `*_copy_*` accessor.
//!   - Tested by: `tests::copies_are_isolated_from_storage`
//!
//! # Concurrency
//!
//! Not synchronized. Multi-step mutations (ID allocation, slot write, index
//! write) must not interleave with other calls on the same container; share it
//! through [`SharedContainer`](crate::SharedContainer) or another lock.

use crate::base::ContainerBase;
use crate::config::ContainerConfig;
use crate::copy::CopyCtorMap;
use crate::document::{DocumentLoader, JsonFileLoader};
use crate::error::{ObjectKey, RegisterError, RemoveError};
use crate::family::{BuildContext, LibraryView, ManagedFamily};
use crate::id::ObjectId;
use crate::object::{ManagedObject, set_file_directory_from_handle};

/// Handle- and ID-addressable store for one family of managed objects.
pub struct ManagedContainer<F: ManagedFamily> {
	base: ContainerBase,
	slots: Vec<Option<Box<F::Object>>>,
	ctors: CopyCtorMap<F::Object>,
	default_object: Option<Box<F::Object>>,
	loader: Box<dyn DocumentLoader>,
	family: F,
}

impl<F: ManagedFamily> ManagedContainer<F> {
	/// Creates an empty container and lets the family fill its copy table.
	pub fn new(object_type: impl Into<String>, family: F) -> Self {
		let base = ContainerBase::new(object_type);
		let mut ctors = CopyCtorMap::new(base.object_type());
		family.build_copy_ctors(&mut ctors);
		tracing::debug!(
			object_type = %base.object_type(),
			class_keys = ctors.len(),
			"managed container constructed"
		);
		Self {
			base,
			slots: Vec::new(),
			ctors,
			default_object: None,
			loader: Box::new(JsonFileLoader),
			family,
		}
	}

	/// Creates a container and applies `config` to it.
	pub fn with_config(object_type: impl Into<String>, family: F, config: &ContainerConfig) -> Self {
		let label = config.object_type.clone().unwrap_or_else(|| object_type.into());
		let mut container = Self::new(label, family);
		for handle in &config.undeletable {
			container.base.mark_undeletable(handle.as_str());
		}
		container.base.set_case_sensitive_queries(config.case_sensitive_queries);
		container
	}

	/// Replaces the document loader used by the document-backed create paths.
	pub fn with_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
		self.loader = Box::new(loader);
		self
	}

	pub fn object_type(&self) -> &str {
		self.base.object_type()
	}

	/// Handle index and protection sets.
	pub fn base(&self) -> &ContainerBase {
		&self.base
	}

	/// Mutable access for lock and query settings. Index mutation stays internal.
	pub fn base_mut(&mut self) -> &mut ContainerBase {
		&mut self.base
	}

	pub fn family(&self) -> &F {
		&self.family
	}

	pub fn family_mut(&mut self) -> &mut F {
		&mut self.family
	}

	pub fn len(&self) -> usize {
		self.base.len()
	}

	pub fn is_empty(&self) -> bool {
		self.base.is_empty()
	}

	/// Read-only view over the registered objects.
	pub fn library(&self) -> LibraryView<'_, F::Object> {
		LibraryView {
			base: &self.base,
			slots: &self.slots,
		}
	}

	/// Registered objects in ID order.
	pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &F::Object)> + '_ {
		self.library().iter()
	}

	// ======== Create ========

	/// Builds an object named `handle`.
	///
	/// If the document loader accepts `handle` as a path, this is
	/// [`Self::create_object_from_document`]. Otherwise the family builds the
	/// object from the name alone. With `register`, returns a copy of the
	/// registered object; without, the unregistered instance.
	pub fn create_object(&mut self, handle: &str, register: bool) -> Option<Box<F::Object>> {
		if self.loader.accepts(handle) {
			return self.create_object_from_document(handle, register);
		}
		self.create_default_object(handle, register)
	}

	/// Builds an object purely from family defaults, never reading a document.
	pub fn create_default_object(&mut self, name: &str, register: bool) -> Option<Box<F::Object>> {
		let built = {
			let (family, ctx) = self.split_for_build();
			family.init_new_object(&ctx, name, false)
		};
		let Some(object) = built else {
			tracing::error!(
				object_type = %self.base.object_type(),
				handle = name,
				"family failed to build managed object"
			);
			return None;
		};
		self.post_create_register(object, register)
	}

	/// Loads and parses the document at `path`, then builds an object from it.
	///
	/// Returns `None` if the document cannot be read or parsed, or if the family
	/// cannot build from it. Nothing is registered in that case.
	pub fn create_object_from_document(&mut self, path: &str, register: bool) -> Option<Box<F::Object>> {
		let doc = match self.loader.load(path) {
			Ok(doc) => doc,
			Err(err) => {
				tracing::error!(
					object_type = %self.base.object_type(),
					path,
					error = %err,
					"failure reading document; no object created"
				);
				return None;
			}
		};
		let built = {
			let (family, ctx) = self.split_for_build();
			family.build_from_document(&ctx, path, &doc)
		};
		let Some(mut object) = built else {
			tracing::error!(
				object_type = %self.base.object_type(),
				path,
				"family failed to build managed object from document"
			);
			return None;
		};
		if object.handle().is_empty() {
			object.set_handle(path);
		}
		set_file_directory_from_handle(object.as_mut());
		self.post_create_register(object, register)
	}

	fn split_for_build(&mut self) -> (&mut F, BuildContext<'_, F::Object>) {
		let ctx = BuildContext {
			object_type: self.base.object_type(),
			default_object: self.default_object.as_deref(),
			ctors: &self.ctors,
		};
		(&mut self.family, ctx)
	}

	fn post_create_register(&mut self, mut object: Box<F::Object>, register: bool) -> Option<Box<F::Object>> {
		if !register {
			return Some(object);
		}
		let id = self.register_object(object.as_mut(), "", false).ok()?;
		self.slot(id).map(|stored| self.ctors.copy(stored))
	}

	// ======== Register ========

	/// Registers a copy of `object`.
	///
	/// A non-empty `handle` takes priority over the object's own handle. The
	/// family's [`ManagedFamily::finalize`] may refuse the object unless
	/// `force` persuades it otherwise. On success the caller's object carries
	/// the resolved handle and assigned ID; the container holds an independent
	/// copy. Registering an existing handle keeps its ID and replaces the
	/// stored object.
	pub fn register_object(
		&mut self,
		object: &mut F::Object,
		handle: &str,
		force: bool,
	) -> Result<ObjectId, RegisterError> {
		let handle = if !handle.is_empty() {
			handle.to_owned()
		} else if !object.handle().is_empty() {
			object.handle().to_owned()
		} else {
			tracing::error!(
				object_type = %self.base.object_type(),
				"no valid handle specified for managed object to register"
			);
			return Err(RegisterError::EmptyHandle {
				object_type: self.base.object_type().to_owned(),
			});
		};

		let library = LibraryView {
			base: &self.base,
			slots: &self.slots,
		};
		if let Err(rejection) = self.family.finalize(library, object, &handle, force) {
			tracing::warn!(
				object_type = %self.base.object_type(),
				handle = %handle,
				force,
				reason = %rejection,
				"registration rejected"
			);
			return Err(RegisterError::Rejected {
				object_type: self.base.object_type().to_owned(),
				handle,
				rejection,
			});
		}

		Ok(self.add_object_to_library(object, &handle))
	}

	/// Re-registers `object` under its own handle.
	///
	/// Used after editing a template that other constructions were built from.
	/// Propagating the edit to those constructions is the owner's job.
	pub fn register_object_and_update(&mut self, object: &mut F::Object) -> Result<ObjectId, RegisterError> {
		let handle = object.handle().to_owned();
		let id = self.register_object(object, &handle, false)?;
		tracing::debug!(
			object_type = %self.base.object_type(),
			handle = %handle,
			%id,
			"managed object re-registered for update"
		);
		Ok(id)
	}

	fn add_object_to_library(&mut self, object: &mut F::Object, handle: &str) -> ObjectId {
		object.set_handle(handle);
		// Peek first so a failed copy cannot leak a reserved ID.
		let id = self.base.id_for(handle).unwrap_or_else(|| self.base.next_id());
		object.set_id(id);
		let copy = self.ctors.copy(object);
		let reserved = self.base.id_for_or_allocate(handle);
		debug_assert_eq!(reserved, id);
		self.store(handle, id, copy);
		tracing::debug!(
			object_type = %self.base.object_type(),
			handle,
			%id,
			"managed object registered"
		);
		id
	}

	/// Writes the slot and both index entries for a reserved ID.
	fn store(&mut self, handle: &str, id: ObjectId, object: Box<F::Object>) {
		let Some(slot) = id.slot() else {
			unreachable!("store called with undefined ID for {handle:?}");
		};
		if self.slots.len() <= slot {
			self.slots.resize_with(slot + 1, || None);
		}
		self.slots[slot] = Some(object);
		self.base.index(handle, id);
	}

	/// Purges the slot and both index entries for `handle` and frees its ID.
	fn take(&mut self, handle: &str) -> Option<Box<F::Object>> {
		let id = self.base.unindex(handle)?;
		self.slots.get_mut(id.slot()?)?.take()
	}

	fn slot(&self, id: ObjectId) -> Option<&F::Object> {
		self.slots.get(id.slot()?)?.as_deref()
	}

	// ======== Lookup ========

	/// Borrows the stored object for `handle`.
	pub fn get_object_by_handle(&self, handle: &str) -> Option<&F::Object> {
		if !self.base.check_exists(handle, "ManagedContainer::get_object_by_handle") {
			return None;
		}
		self.slot(self.base.id_for(handle)?)
	}

	/// Borrows the stored object registered under `id`.
	pub fn get_object_by_id(&self, id: ObjectId) -> Option<&F::Object> {
		if !self.check_id_exists(id, "ManagedContainer::get_object_by_id") {
			return None;
		}
		self.slot(id)
	}

	/// Returns an independent copy of the object for `handle`.
	pub fn get_object_copy_by_handle(&self, handle: &str) -> Option<Box<F::Object>> {
		if !self.base.check_exists(handle, "ManagedContainer::get_object_copy_by_handle") {
			return None;
		}
		let stored = self.slot(self.base.id_for(handle)?)?;
		Some(self.ctors.copy(stored))
	}

	/// Returns an independent copy of the object registered under `id`.
	pub fn get_object_copy_by_id(&self, id: ObjectId) -> Option<Box<F::Object>> {
		if !self.check_id_exists(id, "ManagedContainer::get_object_copy_by_id") {
			return None;
		}
		Some(self.ctors.copy(self.slot(id)?))
	}

	/// Like [`Self::get_object_copy_by_handle`], downcast to `U`.
	///
	/// Returns `None` if the stored object is not a `U`.
	pub fn get_object_copy_by_handle_as<U: ManagedObject>(&self, handle: &str) -> Option<Box<U>> {
		self.get_object_copy_by_handle(handle)?.into_any().downcast::<U>().ok()
	}

	/// Like [`Self::get_object_copy_by_id`], downcast to `U`.
	pub fn get_object_copy_by_id_as<U: ManagedObject>(&self, id: ObjectId) -> Option<Box<U>> {
		self.get_object_copy_by_id(id)?.into_any().downcast::<U>().ok()
	}

	/// ID of the object registered under `handle`.
	pub fn object_id_by_handle(&self, handle: &str) -> Option<ObjectId> {
		if !self.base.check_exists(handle, "ManagedContainer::object_id_by_handle") {
			return None;
		}
		self.base.id_for(handle)
	}

	fn check_id_exists(&self, id: ObjectId, source: &str) -> bool {
		if self.base.has_id(id) {
			return true;
		}
		tracing::info!(
			object_type = %self.base.object_type(),
			%id,
			source,
			"no managed object with this ID exists"
		);
		false
	}

	// ======== Remove ========

	/// Removes and returns the object for `handle` unless it is protected.
	pub fn remove_object_by_handle(&mut self, handle: &str) -> Result<Box<F::Object>, RemoveError> {
		self.remove_object_internal(handle, "ManagedContainer::remove_object_by_handle")
	}

	/// Removes and returns the object registered under `id` unless it is protected.
	pub fn remove_object_by_id(&mut self, id: ObjectId) -> Result<Box<F::Object>, RemoveError> {
		let source = "ManagedContainer::remove_object_by_id";
		if !self.check_id_exists(id, source) {
			return Err(RemoveError::NotFound {
				object_type: self.base.object_type().to_owned(),
				key: ObjectKey::Id(id),
			});
		}
		let handle = self.base.handle_for(id).map(str::to_owned).unwrap_or_default();
		self.remove_object_internal(&handle, source)
	}

	/// Removes every unprotected object whose handle contains (or, with
	/// `contains == false`, does not contain) `substring`.
	///
	/// Protected entries are skipped silently. An empty substring selects all
	/// handles.
	pub fn remove_objects_by_substring(&mut self, substring: &str, contains: bool) -> Vec<Box<F::Object>> {
		let handles = self.base.handles_matching(substring, contains);
		handles
			.iter()
			.filter_map(|handle| {
				self.remove_object_internal(handle, "ManagedContainer::remove_objects_by_substring")
					.ok()
			})
			.collect()
	}

	/// Removes every unprotected object.
	pub fn remove_all_objects(&mut self) -> Vec<Box<F::Object>> {
		self.remove_objects_by_substring("", true)
	}

	fn remove_object_internal(&mut self, handle: &str, source: &str) -> Result<Box<F::Object>, RemoveError> {
		let not_found = |object_type: &str| RemoveError::NotFound {
			object_type: object_type.to_owned(),
			key: ObjectKey::Handle(handle.to_owned()),
		};
		if !self.base.check_exists(handle, source) {
			return Err(not_found(self.base.object_type()));
		}
		if let Some(block) = self.base.removal_block(handle) {
			tracing::info!(
				object_type = %self.base.object_type(),
				handle,
				source,
				reason = %block,
				"unable to remove managed object"
			);
			return Err(RemoveError::Protected {
				object_type: self.base.object_type().to_owned(),
				handle: handle.to_owned(),
				block,
			});
		}
		match self.take(handle) {
			Some(object) => {
				tracing::debug!(
					object_type = %self.base.object_type(),
					handle,
					id = %object.id(),
					"managed object removed"
				);
				Ok(object)
			}
			None => Err(not_found(self.base.object_type())),
		}
	}

	// ======== Default object ========

	/// Sets the template used by [`Self::construct_from_default`].
	pub fn set_default_object(&mut self, object: Box<F::Object>) {
		self.default_object = Some(object);
	}

	pub fn clear_default_object(&mut self) {
		self.default_object = None;
	}

	pub fn default_object(&self) -> Option<&F::Object> {
		self.default_object.as_deref()
	}

	/// Copy of the default object renamed to `new_handle`, or `None` if no
	/// default is set.
	pub fn construct_from_default(&self, new_handle: &str) -> Option<Box<F::Object>> {
		let mut copy = self.ctors.copy(self.default_object.as_deref()?);
		copy.set_handle(new_handle);
		Some(copy)
	}
}

impl<F: ManagedFamily> std::fmt::Debug for ManagedContainer<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ManagedContainer")
			.field("object_type", &self.base.object_type())
			.field("len", &self.base.len())
			.field("has_default_object", &self.default_object.is_some())
			.field("copy_ctors", &self.ctors)
			.finish()
	}
}
