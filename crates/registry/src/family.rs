//! The seam between the generic container and a concrete object family.

use serde_json::Value;

use crate::base::ContainerBase;
use crate::copy::CopyCtorMap;
use crate::error::Rejection;
use crate::id::ObjectId;
use crate::object::ManagedObject;

/// Family-specific construction and registration policy.
///
/// A container calls into its family to build new objects and to vet them
/// before registration. Everything else (IDs, indices, copies, protection) is
/// handled by the container.
pub trait ManagedFamily {
	/// Stored object type. Usually a trait object such as `dyn Template`.
	type Object: ManagedObject + ?Sized;

	/// Registers a copy constructor for every concrete type this family can
	/// produce. Called once when the container is constructed.
	fn build_copy_ctors(&self, ctors: &mut CopyCtorMap<Self::Object>);

	/// Builds an object holding only default values.
	///
	/// `built_from_config` is true when `handle` names a document about to be
	/// applied on top of the defaults.
	fn init_new_object(
		&mut self,
		ctx: &BuildContext<'_, Self::Object>,
		handle: &str,
		built_from_config: bool,
	) -> Option<Box<Self::Object>>;

	/// Builds an object from a parsed document.
	fn build_from_document(
		&mut self,
		ctx: &BuildContext<'_, Self::Object>,
		path: &str,
		doc: &Value,
	) -> Option<Box<Self::Object>>;

	/// Vets `object` before it is stored under `handle`.
	///
	/// This is the only place family policy applies. `force` asks the family to
	/// accept despite conditional checks. The default accepts everything.
	fn finalize(
		&mut self,
		library: LibraryView<'_, Self::Object>,
		object: &mut Self::Object,
		handle: &str,
		force: bool,
	) -> Result<(), Rejection> {
		let _ = (library, object, handle, force);
		Ok(())
	}
}

/// Container state visible to a family while it builds objects.
pub struct BuildContext<'a, T: ManagedObject + ?Sized> {
	pub(crate) object_type: &'a str,
	pub(crate) default_object: Option<&'a T>,
	pub(crate) ctors: &'a CopyCtorMap<T>,
}

impl<T: ManagedObject + ?Sized> BuildContext<'_, T> {
	pub fn object_type(&self) -> &str {
		self.object_type
	}

	pub fn has_default_object(&self) -> bool {
		self.default_object.is_some()
	}

	/// Copy of the container's default object renamed to `new_handle`, if one is set.
	pub fn construct_from_default(&self, new_handle: &str) -> Option<Box<T>> {
		let mut copy = self.ctors.copy(self.default_object?);
		copy.set_handle(new_handle);
		Some(copy)
	}
}

/// Read-only view of registered objects, handed to [`ManagedFamily::finalize`].
pub struct LibraryView<'a, T: ManagedObject + ?Sized> {
	pub(crate) base: &'a ContainerBase,
	pub(crate) slots: &'a [Option<Box<T>>],
}

impl<T: ManagedObject + ?Sized> Clone for LibraryView<'_, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T: ManagedObject + ?Sized> Copy for LibraryView<'_, T> {}

impl<'a, T: ManagedObject + ?Sized> LibraryView<'a, T> {
	pub fn base(&self) -> &'a ContainerBase {
		self.base
	}

	pub fn len(&self) -> usize {
		self.base.len()
	}

	pub fn is_empty(&self) -> bool {
		self.base.is_empty()
	}

	pub fn get_by_handle(&self, handle: &str) -> Option<&'a T> {
		self.get_by_id(self.base.id_for(handle)?)
	}

	pub fn get_by_id(&self, id: ObjectId) -> Option<&'a T> {
		self.slots.get(id.slot()?)?.as_deref()
	}

	/// Registered objects in ID order.
	pub fn iter(self) -> impl Iterator<Item = (ObjectId, &'a T)> + 'a {
		self.slots.iter().filter_map(|slot| {
			let object = slot.as_deref()?;
			Some((object.id(), object))
		})
	}
}
