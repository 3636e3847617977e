//! Declarative container settings loaded from TOML.
//!
//! ```toml
//! object-type = "stage template"
//! undeletable = ["default_stage", "NONE"]
//! case-sensitive-queries = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings applied when a container is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ContainerConfig {
	/// Overrides the object type label used in diagnostics.
	pub object_type: Option<String>,
	/// Handles that can never be removed.
	pub undeletable: Vec<String>,
	/// Whether substring queries match case exactly.
	pub case_sensitive_queries: bool,
}

impl ContainerConfig {
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn parses_all_keys() {
		let config = ContainerConfig::from_toml_str(
			r#"
			object-type = "stage template"
			undeletable = ["default_stage", "NONE"]
			case-sensitive-queries = true
			"#,
		)
		.expect("valid config");
		assert_eq!(
			config,
			ContainerConfig {
				object_type: Some("stage template".into()),
				undeletable: vec!["default_stage".into(), "NONE".into()],
				case_sensitive_queries: true,
			}
		);
	}

	#[test]
	fn empty_document_uses_defaults() {
		let config = ContainerConfig::from_toml_str("").expect("empty config");
		assert_eq!(config, ContainerConfig::default());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = ContainerConfig::from_toml_str("locked = [\"a\"]").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)), "{err}");
	}

	#[test]
	fn reads_from_disk() {
		let dir = tempfile::tempdir().expect("temp dir");
		let path = dir.path().join("container.toml");
		std::fs::write(&path, "undeletable = [\"default\"]").expect("write config");

		let config = ContainerConfig::from_path(&path).expect("config on disk");
		assert_eq!(config.undeletable, vec!["default".to_string()]);

		let missing = ContainerConfig::from_path(&dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(missing, ConfigError::Io { .. }));
	}
}
