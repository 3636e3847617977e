//! Class-key dispatch for polymorphic copies.
//!
//! A container stores `Box<T>` where `T` is often a trait object. Cloning such a
//! box must reproduce the concrete runtime type, so each container keeps a
//! table from [`ManagedObject::class_key`] to a copy constructor for that
//! concrete type. The family fills the table once, when the container is built.

use rustc_hash::FxHashMap;

use crate::object::ManagedObject;

/// Copy constructor for one concrete type stored behind `T`.
///
/// Returns `None` when `orig` is not the concrete type the constructor was
/// generated for.
pub type CopyCtor<T> = fn(&T) -> Option<Box<T>>;

/// Copy constructors keyed by class key.
pub struct CopyCtorMap<T: ManagedObject + ?Sized> {
	label: String,
	ctors: FxHashMap<&'static str, CopyCtor<T>>,
}

impl<T: ManagedObject + ?Sized> CopyCtorMap<T> {
	pub(crate) fn new(label: &str) -> Self {
		Self {
			label: label.to_owned(),
			ctors: FxHashMap::default(),
		}
	}

	/// Registers the copy constructor for `class_key`, replacing any previous one.
	pub fn insert(&mut self, class_key: &'static str, ctor: CopyCtor<T>) {
		if self.ctors.insert(class_key, ctor).is_some() {
			tracing::warn!(
				object_type = %self.label,
				class_key,
				"copy constructor registered twice; keeping the latest"
			);
		}
	}

	/// Returns true if a copy constructor exists for `class_key`.
	pub fn contains(&self, class_key: &str) -> bool {
		self.ctors.contains_key(class_key)
	}

	pub fn len(&self) -> usize {
		self.ctors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ctors.is_empty()
	}

	/// Builds a full copy of `orig` preserving its concrete type.
	///
	/// # Panics
	///
	/// Panics if no constructor is registered for the object's class key, or if
	/// the registered constructor was generated for a different type. Either case
	/// means the family producing these objects failed to populate the table.
	pub fn copy(&self, orig: &T) -> Box<T> {
		let class_key = orig.class_key();
		let Some(ctor) = self.ctors.get(class_key) else {
			panic!(
				"{} container has no copy constructor for class key {class_key:?}",
				self.label
			);
		};
		match ctor(orig) {
			Some(copy) => copy,
			None => panic!(
				"{} container copy constructor for class key {class_key:?} does not match the object's type",
				self.label
			),
		}
	}
}

impl<T: ManagedObject + ?Sized> std::fmt::Debug for CopyCtorMap<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut keys: Vec<_> = self.ctors.keys().copied().collect();
		keys.sort_unstable();
		f.debug_struct("CopyCtorMap")
			.field("label", &self.label)
			.field("class_keys", &keys)
			.finish()
	}
}

/// Generates a [`CopyCtor`] that clones `$concrete` and boxes it as `$stored`.
///
/// `$concrete` must implement `Clone` and [`ManagedObject`]; `$stored` is the
/// container's object type, either a trait object the concrete type coerces to
/// or the concrete type itself.
///
/// ```ignore
/// ctors.insert("StageTemplate", copy_ctor!(StageTemplate => dyn Template));
/// ```
#[macro_export]
macro_rules! copy_ctor {
	($concrete:ty => $stored:ty) => {{
		fn copy_one(orig: &$stored) -> ::std::option::Option<::std::boxed::Box<$stored>> {
			<$stored as $crate::ManagedObject>::as_any(orig)
				.downcast_ref::<$concrete>()
				.map(|obj| ::std::boxed::Box::new(::std::clone::Clone::clone(obj)) as ::std::boxed::Box<$stored>)
		}
		copy_one as $crate::CopyCtor<$stored>
	}};
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_fixtures::{PropTemplate, StageTemplate, Template};
	use crate::{ObjectId, copy_ctor};

	fn template_ctors() -> CopyCtorMap<dyn Template> {
		let mut ctors = CopyCtorMap::new("template");
		ctors.insert("PropTemplate", copy_ctor!(PropTemplate => dyn Template));
		ctors.insert("StageTemplate", copy_ctor!(StageTemplate => dyn Template));
		ctors
	}

	#[test]
	fn copy_preserves_concrete_type() {
		let ctors = template_ctors();
		let mut stage = StageTemplate::new("stages/apartment");
		stage.gravity = [0.0, -3.7, 0.0];
		stage.set_id(ObjectId::from_raw(2));
		let stored: Box<dyn Template> = Box::new(stage.clone());

		let copy = ctors.copy(stored.as_ref());
		let copy = copy.into_any().downcast::<StageTemplate>().expect("copy keeps StageTemplate");
		assert_eq!(*copy, stage);
	}

	#[test]
	fn copies_are_independent() {
		let ctors = template_ctors();
		let stored: Box<dyn Template> = Box::new(PropTemplate::new("chair"));
		let mut copy = ctors.copy(stored.as_ref());
		copy.set_handle("stool");
		assert_eq!(stored.handle(), "chair");
		assert_eq!(copy.handle(), "stool");
	}

	#[test]
	#[should_panic(expected = "no copy constructor for class key \"StageTemplate\"")]
	fn missing_class_key_panics() {
		let mut ctors: CopyCtorMap<dyn Template> = CopyCtorMap::new("template");
		ctors.insert("PropTemplate", copy_ctor!(PropTemplate => dyn Template));
		let stage: Box<dyn Template> = Box::new(StageTemplate::new("stage"));
		let _ = ctors.copy(stage.as_ref());
	}

	#[test]
	#[should_panic(expected = "does not match the object's type")]
	fn mismatched_constructor_panics() {
		let mut ctors: CopyCtorMap<dyn Template> = CopyCtorMap::new("template");
		ctors.insert("StageTemplate", copy_ctor!(PropTemplate => dyn Template));
		let stage: Box<dyn Template> = Box::new(StageTemplate::new("stage"));
		let _ = ctors.copy(stage.as_ref());
	}

	#[test]
	fn sized_object_types_are_supported() {
		let mut ctors: CopyCtorMap<PropTemplate> = CopyCtorMap::new("prop");
		ctors.insert("PropTemplate", copy_ctor!(PropTemplate => PropTemplate));
		let prop = PropTemplate::new("lamp");
		assert_eq!(*ctors.copy(&prop), prop);
		assert_eq!(ctors.len(), 1);
		assert!(ctors.contains("PropTemplate"));
	}
}
