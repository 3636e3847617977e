#![allow(dead_code)]

use serde_json::Value;

use crate::{
	BuildContext, CopyCtorMap, LibraryView, ManagedFamily, ManagedMeta, ManagedObject, Rejection,
	copy_ctor, impl_managed_object,
};

pub(crate) trait Template: ManagedObject + std::fmt::Debug {
	fn render_asset(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropTemplate {
	pub meta: ManagedMeta,
	pub mass: f64,
	pub render_asset: String,
}

impl PropTemplate {
	pub fn new(handle: &str) -> Self {
		Self {
			meta: ManagedMeta::new(handle),
			mass: 1.0,
			render_asset: String::new(),
		}
	}
}

impl_managed_object!(PropTemplate, "PropTemplate");

impl Template for PropTemplate {
	fn render_asset(&self) -> &str {
		&self.render_asset
	}
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StageTemplate {
	pub meta: ManagedMeta,
	pub gravity: [f64; 3],
	pub lighting: String,
}

impl StageTemplate {
	pub fn new(handle: &str) -> Self {
		Self {
			meta: ManagedMeta::new(handle),
			gravity: [0.0, -9.8, 0.0],
			lighting: String::new(),
		}
	}
}

impl_managed_object!(StageTemplate, "StageTemplate");

impl Template for StageTemplate {
	fn render_asset(&self) -> &str {
		&self.lighting
	}
}

/// Two-type family: handles mentioning "stage" build stages, everything else
/// builds props. Handles starting with "invalid" fail to build.
///
/// Finalize refuses negative masses and props reusing another handle's render
/// asset, unless forced.
#[derive(Debug, Default)]
pub(crate) struct TemplateFamily {
	pub finalized: Vec<String>,
	pub omit_stage_ctor: bool,
}

impl ManagedFamily for TemplateFamily {
	type Object = dyn Template;

	fn build_copy_ctors(&self, ctors: &mut CopyCtorMap<dyn Template>) {
		ctors.insert("PropTemplate", copy_ctor!(PropTemplate => dyn Template));
		if !self.omit_stage_ctor {
			ctors.insert("StageTemplate", copy_ctor!(StageTemplate => dyn Template));
		}
	}

	fn init_new_object(
		&mut self,
		ctx: &BuildContext<'_, dyn Template>,
		handle: &str,
		_built_from_config: bool,
	) -> Option<Box<dyn Template>> {
		if handle.starts_with("invalid") {
			return None;
		}
		if let Some(object) = ctx.construct_from_default(handle) {
			return Some(object);
		}
		if handle.contains("stage") {
			Some(Box::new(StageTemplate::new(handle)))
		} else {
			Some(Box::new(PropTemplate::new(handle)))
		}
	}

	fn build_from_document(
		&mut self,
		_ctx: &BuildContext<'_, dyn Template>,
		path: &str,
		doc: &Value,
	) -> Option<Box<dyn Template>> {
		match doc.get("kind").and_then(Value::as_str).unwrap_or("prop") {
			"stage" => {
				let mut stage = StageTemplate::new(path);
				if let Some(gravity) = doc.get("gravity").and_then(Value::as_array) {
					for (axis, value) in stage.gravity.iter_mut().zip(gravity) {
						*axis = value.as_f64()?;
					}
				}
				if let Some(lighting) = doc.get("lighting").and_then(Value::as_str) {
					stage.lighting = lighting.to_owned();
				}
				Some(Box::new(stage))
			}
			"prop" => {
				let mut prop = PropTemplate::new(path);
				if let Some(mass) = doc.get("mass").and_then(Value::as_f64) {
					prop.mass = mass;
				}
				if let Some(asset) = doc.get("render_asset").and_then(Value::as_str) {
					prop.render_asset = asset.to_owned();
				}
				Some(Box::new(prop))
			}
			_ => None,
		}
	}

	fn finalize(
		&mut self,
		library: LibraryView<'_, dyn Template>,
		object: &mut dyn Template,
		handle: &str,
		force: bool,
	) -> Result<(), Rejection> {
		if let Some(prop) = object.as_any().downcast_ref::<PropTemplate>() {
			if prop.mass < 0.0 && !force {
				return Err(Rejection::new("mass must be non-negative"));
			}
			let asset = prop.render_asset.as_str();
			let duplicate = !asset.is_empty()
				&& library
					.iter()
					.any(|(_, other)| other.handle() != handle && other.render_asset() == asset);
			if duplicate && !force {
				return Err(Rejection::new(format!("render asset {asset:?} already registered")));
			}
		}
		self.finalized.push(handle.to_owned());
		Ok(())
	}
}
