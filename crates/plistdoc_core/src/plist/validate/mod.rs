use std::fmt;

use tracing::debug;

use crate::plist::{PlistError, Result, Value, ValueKind};

/// Caller-registered post-parse check.
pub type ValidationHook = Box<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// Required root-dict keys and the exact kind each must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
	required: Vec<(String, ValueKind)>,
}

impl Schema {
	/// Schema with no requirements.
	pub fn new() -> Self {
		Self::default()
	}

	/// Require `key` to be present with a value of `kind`; replaces an earlier rule for `key`.
	pub fn require(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
		let key = key.into();
		match self.required.iter_mut().find(|(existing, _)| *existing == key) {
			Some(rule) => rule.1 = kind,
			None => self.required.push((key, kind)),
		}
		self
	}

	/// Munki manifest: `catalogs` array.
	pub fn munki_manifest() -> Self {
		Self::new().require("catalogs", ValueKind::Array)
	}

	/// Munki pkginfo: `catalogs` array and `installer_item_location` string.
	pub fn munki_package_info() -> Self {
		Self::new()
			.require("catalogs", ValueKind::Array)
			.require("installer_item_location", ValueKind::String)
	}

	/// True when nothing is required.
	pub fn is_empty(&self) -> bool {
		self.required.is_empty()
	}

	/// Iterate rules in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, ValueKind)> {
		self.required.iter().map(|(key, kind)| (key.as_str(), *kind))
	}

	/// Check presence and exact kind of every required key in `root`.
	pub fn check(&self, root: &Value) -> Result<()> {
		for (key, expected) in self.iter() {
			let value = root.get(key).ok_or_else(|| PlistError::MissingKey { key: key.to_owned() })?;
			let actual = value.kind();
			if actual != expected {
				return Err(PlistError::TypeMismatch {
					key: key.to_owned(),
					expected,
					actual,
				});
			}
		}
		Ok(())
	}
}

/// Schema check followed by hooks in registration order.
#[derive(Default)]
pub struct Validator {
	schema: Schema,
	hooks: Vec<ValidationHook>,
}

impl fmt::Debug for Validator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Validator")
			.field("schema", &self.schema)
			.field("hooks", &self.hooks.len())
			.finish()
	}
}

impl Validator {
	/// Validator for `schema` with no hooks.
	pub fn new(schema: Schema) -> Self {
		Self {
			schema,
			hooks: Vec::new(),
		}
	}

	/// Active schema.
	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	/// Replace the schema, keeping hooks.
	pub fn set_schema(&mut self, schema: Schema) {
		self.schema = schema;
	}

	/// Register a hook to run after the schema check.
	pub fn add_hook<F>(&mut self, hook: F)
	where
		F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
	{
		self.hooks.push(Box::new(hook));
	}

	/// Number of registered hooks.
	pub fn hook_count(&self) -> usize {
		self.hooks.len()
	}

	/// Validate a parsed root; `None` means nothing has been parsed.
	pub fn validate(&self, root: Option<&Value>) -> Result<()> {
		let root = root.ok_or(PlistError::NotParsed)?;
		if root.is_empty() {
			return Err(PlistError::Empty);
		}

		self.schema.check(root)?;
		for hook in &self.hooks {
			hook(root)?;
		}
		debug!(rules = self.schema.required.len(), hooks = self.hooks.len(), "plist validated");
		Ok(())
	}
}
