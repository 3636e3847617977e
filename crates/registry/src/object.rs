//! The capability set every managed object family exposes.

use std::any::Any;

use crate::id::ObjectId;

/// Registry-owned bookkeeping embedded in every managed object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedMeta {
	/// Primary external key.
	pub handle: String,
	/// Assigned on registration; [`ObjectId::UNDEFINED`] before that.
	pub id: ObjectId,
	/// Directory component of the handle, set when built from a document.
	pub file_directory: String,
}

impl ManagedMeta {
	/// Creates metadata for an unregistered object.
	pub fn new(handle: impl Into<String>) -> Self {
		Self {
			handle: handle.into(),
			id: ObjectId::UNDEFINED,
			file_directory: String::new(),
		}
	}
}

/// Trait for objects a [`ManagedContainer`](crate::ManagedContainer) can hold.
///
/// `class_key` names the concrete runtime type and selects the copy
/// constructor used whenever the container clones the object. The `Any`
/// accessors back checked downcasts of copies. Use [`impl_managed_object!`]
/// for types carrying a `meta: ManagedMeta` field.
///
/// [`impl_managed_object!`]: crate::impl_managed_object
pub trait ManagedObject: Any {
	/// Returns the registry metadata.
	fn meta(&self) -> &ManagedMeta;

	/// Returns the registry metadata mutably.
	fn meta_mut(&mut self) -> &mut ManagedMeta;

	/// Returns the key of the concrete type for copy dispatch.
	fn class_key(&self) -> &'static str;

	fn as_any(&self) -> &dyn Any;

	fn into_any(self: Box<Self>) -> Box<dyn Any>;

	fn handle(&self) -> &str {
		&self.meta().handle
	}

	fn set_handle(&mut self, handle: &str) {
		let meta = self.meta_mut();
		meta.handle.clear();
		meta.handle.push_str(handle);
	}

	fn id(&self) -> ObjectId {
		self.meta().id
	}

	fn set_id(&mut self, id: ObjectId) {
		self.meta_mut().id = id;
	}

	fn file_directory(&self) -> &str {
		&self.meta().file_directory
	}

	fn set_file_directory(&mut self, dir: &str) {
		let meta = self.meta_mut();
		meta.file_directory.clear();
		meta.file_directory.push_str(dir);
	}
}

/// Sets the object's file directory to everything before the last `/` of its
/// handle. Handles without a directory component leave the object untouched.
pub fn set_file_directory_from_handle<T: ManagedObject + ?Sized>(object: &mut T) {
	let dir = object.handle().rsplit_once('/').map(|(dir, _)| dir.to_owned());
	if let Some(dir) = dir {
		object.set_file_directory(&dir);
	}
}

/// Implements [`ManagedObject`] for a type with a `meta: ManagedMeta` field.
///
/// ```ignore
/// #[derive(Clone)]
/// struct LightSetup { meta: ManagedMeta, intensity: f32 }
/// impl_managed_object!(LightSetup, "LightSetup");
/// ```
#[macro_export]
macro_rules! impl_managed_object {
	($type:ty, $class_key:expr) => {
		impl $crate::ManagedObject for $type {
			fn meta(&self) -> &$crate::ManagedMeta {
				&self.meta
			}

			fn meta_mut(&mut self) -> &mut $crate::ManagedMeta {
				&mut self.meta
			}

			fn class_key(&self) -> &'static str {
				$class_key
			}

			fn as_any(&self) -> &dyn ::std::any::Any {
				self
			}

			fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
				self
			}
		}
	};
}
