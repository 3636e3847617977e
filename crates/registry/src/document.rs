//! Document loading used to materialize objects from config files.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;

/// Source of parsed build input for document-backed objects.
pub trait DocumentLoader: Send + Sync {
	/// Returns true if `path` names a document this loader understands.
	fn accepts(&self, path: &str) -> bool;

	/// Reads and parses the document at `path`.
	fn load(&self, path: &str) -> Result<Value, LoadError>;
}

/// Loads `*.json` files from disk. The root value must be a JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileLoader;

impl DocumentLoader for JsonFileLoader {
	fn accepts(&self, path: &str) -> bool {
		Path::new(path)
			.extension()
			.is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
	}

	fn load(&self, path: &str) -> Result<Value, LoadError> {
		let path = Path::new(path);
		let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		parse_json_object(path, &content)
	}
}

/// Parses `content` and checks that its root is an object.
pub fn parse_json_object(path: &Path, content: &str) -> Result<Value, LoadError> {
	let value: Value = serde_json::from_str(content).map_err(|source| LoadError::Parse {
		path: path.to_path_buf(),
		source,
	})?;
	if !value.is_object() {
		return Err(LoadError::NotAnObject {
			path: path.to_path_buf(),
		});
	}
	Ok(value)
}
