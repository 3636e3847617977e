use std::path::PathBuf;

use crate::base::RemovalBlock;
use crate::id::ObjectId;

/// Family-side refusal to register an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Rejection {
	pub reason: String,
}

impl Rejection {
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}

/// Registration failures. No state is changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
	/// Neither the explicit handle nor the object's own handle was set.
	#[error("no valid handle specified for {object_type} managed object")]
	EmptyHandle { object_type: String },
	/// The family's finalize step refused the object.
	#[error("{object_type} managed object {handle:?} rejected: {rejection}")]
	Rejected {
		object_type: String,
		handle: String,
		#[source]
		rejection: Rejection,
	},
}

/// Which key a lookup or removal was addressed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
	Handle(String),
	Id(ObjectId),
}

impl std::fmt::Display for ObjectKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Handle(handle) => write!(f, "handle {handle:?}"),
			Self::Id(id) => write!(f, "ID {id}"),
		}
	}
}

/// Removal failures. No state is changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoveError {
	#[error("unable to remove {object_type} managed object with {key}: does not exist")]
	NotFound { object_type: String, key: ObjectKey },
	#[error("unable to remove {object_type} managed object {handle:?}: {block}")]
	Protected {
		object_type: String,
		handle: String,
		block: RemovalBlock,
	},
}

impl RemoveError {
	/// The protection that refused the removal, if that was the cause.
	pub fn block(&self) -> Option<RemovalBlock> {
		match self {
			Self::Protected { block, .. } => Some(*block),
			Self::NotFound { .. } => None,
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}

/// Document loading failures.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse {} as JSON: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("{} does not contain a JSON object at its root", path.display())]
	NotAnObject { path: PathBuf },
}

/// Container configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid container config: {0}")]
	Parse(#[from] toml::de::Error),
}
