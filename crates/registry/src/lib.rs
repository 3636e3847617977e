//! Handle-addressable registry for families of managed template objects.
//!
//! A [`ManagedContainer`] stores objects of one polymorphic family under
//! human-readable handles and dense numeric IDs. It builds objects through a
//! [`ManagedFamily`], stores isolated copies on registration, hands out either
//! borrows or copies on lookup, recycles IDs on removal, and refuses to remove
//! entries marked undeletable or user-locked.
//!
//! # Layers
//!
//! - [`ContainerBase`] - handle/ID indices, ID allocator, protection sets and
//!   substring queries. Knows nothing about objects.
//! - [`ManagedContainer`] - object slots keyed by ID, the copy-dispatch table,
//!   the default template and the document loader.
//!
//! # Implementing a family
//!
//! 1. Give each concrete type a `meta: ManagedMeta` field, derive `Clone`, and
//!    call [`impl_managed_object!`].
//! 2. Implement [`ManagedFamily`], registering one [`copy_ctor!`] per concrete
//!    type in [`ManagedFamily::build_copy_ctors`].
//! 3. Construct a container with [`ManagedContainer::new`] or
//!    [`ManagedContainer::with_config`].

pub mod base;
pub mod config;
pub mod container;
pub mod copy;
pub mod document;
pub mod error;
pub mod family;
pub mod id;
pub mod object;
mod shared;

pub use base::{ContainerBase, RemovalBlock};
pub use config::ContainerConfig;
pub use container::ManagedContainer;
pub use copy::{CopyCtor, CopyCtorMap};
pub use document::{DocumentLoader, JsonFileLoader};
pub use error::{ConfigError, LoadError, ObjectKey, RegisterError, Rejection, RemoveError};
pub use family::{BuildContext, LibraryView, ManagedFamily};
pub use id::ObjectId;
pub use object::{ManagedMeta, ManagedObject, set_file_directory_from_handle};
pub use shared::SharedContainer;

#[cfg(test)]
pub(crate) mod test_fixtures;
