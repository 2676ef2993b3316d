use std::fs;
use std::path::Path;

use tracing::debug;

use crate::plist::{
	DecodeOptions, PlistError, Result, Schema, SourceFormat, Validator, Value, decode_binary, decode_xml, sniff, to_xml,
	to_xml_fragment,
};

/// Loaded plist buffer plus the state of its last parse.
///
/// `load` only buffers input and picks a decoder; `parse` decodes and
/// validates. Contents are available only after a successful parse.
#[derive(Debug, Default)]
pub struct PlistDocument {
	source: Vec<u8>,
	format: Option<SourceFormat>,
	options: DecodeOptions,
	validator: Validator,
	root: Option<Value>,
	encoding: Option<String>,
	version: Option<String>,
	text: Option<String>,
}

impl PlistDocument {
	/// Empty document with default options and no schema.
	pub fn new() -> Self {
		Self::default()
	}

	/// Document with `bytes` loaded but not parsed.
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		let mut doc = Self::new();
		doc.load(bytes);
		doc
	}

	/// Read a file from disk and load it without parsing.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Ok(Self::from_bytes(raw))
	}

	/// Replace the static schema.
	pub fn with_schema(mut self, schema: Schema) -> Self {
		self.validator.set_schema(schema);
		self
	}

	/// Replace decoder limits.
	pub fn with_options(mut self, options: DecodeOptions) -> Self {
		self.options = options;
		self
	}

	/// Buffer new input and select its decoder.
	///
	/// Clears the previous parse; hooks, schema, and options are kept.
	pub fn load(&mut self, bytes: impl Into<Vec<u8>>) {
		self.source = bytes.into();
		self.format = Some(sniff(&self.source));
		self.reset();
	}

	fn reset(&mut self) {
		self.root = None;
		self.encoding = None;
		self.version = None;
		self.text = None;
	}

	/// Decoder chosen by the last `load`.
	pub fn format(&self) -> Option<SourceFormat> {
		self.format
	}

	/// Raw bytes of the last `load`.
	pub fn source(&self) -> &[u8] {
		&self.source
	}

	/// Active schema.
	pub fn schema(&self) -> &Schema {
		self.validator.schema()
	}

	/// Register a hook that runs after the schema check on every parse.
	pub fn add_validation_hook<F>(&mut self, hook: F)
	where
		F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
	{
		self.validator.add_hook(hook);
	}

	/// Decode the loaded buffer, validate it, and keep the result.
	pub fn parse(&mut self) -> Result<&Value> {
		self.reset();
		let format = *self.format.get_or_insert_with(|| sniff(&self.source));

		let (root, encoding, version, text) = match format {
			SourceFormat::Binary { .. } => (decode_binary(&self.source, &self.options)?, None, None, None),
			SourceFormat::Xml => {
				let doc = decode_xml(&self.source, &self.options)?;
				(doc.root, doc.encoding, doc.version, Some(doc.text))
			}
		};

		self.validator.validate(Some(&root))?;
		debug!(format = format.as_str(), root = %root.kind(), bytes = self.source.len(), "parsed plist document");

		self.encoding = encoding;
		self.version = version;
		self.text = text;
		Ok(self.root.insert(root))
	}

	/// Parsed root value.
	pub fn contents(&self) -> Result<&Value> {
		self.root.as_ref().ok_or(PlistError::NotParsed)
	}

	/// Replace contents with an array or dict, re-serializing and re-parsing it.
	pub fn set_contents(&mut self, value: Value) -> Result<()> {
		if !matches!(value, Value::Array(_) | Value::Dict(_)) {
			return Err(PlistError::UnsupportedRoot { kind: value.kind() });
		}

		let xml = to_xml(&value)?;
		self.load(xml);
		self.parse()?;
		Ok(())
	}

	/// Look up `key` in a dict root.
	pub fn get(&self, key: &str) -> Result<Option<&Value>> {
		Ok(self.contents()?.get(key))
	}

	/// `name` of a pkginfo document.
	pub fn package_name(&self) -> Result<&str> {
		self.contents()?
			.get("name")
			.and_then(Value::as_str)
			.ok_or_else(|| PlistError::invalid("package name not found in pkginfo plist"))
	}

	/// Declared XML encoding, lowercased; `None` for binary or undeclared input.
	pub fn encoding(&self) -> Result<Option<&str>> {
		self.contents()?;
		Ok(self.encoding.as_deref())
	}

	/// `version` attribute of the XML `<plist>` element.
	pub fn plist_version(&self) -> Option<&str> {
		self.version.as_deref()
	}

	/// XML source decoded with its declared charset; `None` for binary input.
	pub fn source_text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	/// Contents as a complete XML document.
	pub fn to_xml(&self) -> Result<String> {
		to_xml(self.contents()?)
	}

	/// Contents as the nodes inside `<plist>`.
	pub fn to_xml_fragment(&self) -> Result<String> {
		to_xml_fragment(self.contents()?)
	}
}
