use std::mem;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, trace};

use crate::plist::{DATE_FORMAT, DecodeOptions, Dict, PlistError, Result, Value};

/// Result of decoding an XML plist.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
	/// Root value, an empty dict for `<plist/>`.
	pub root: Value,
	/// Declared encoding label, lowercased.
	pub encoding: Option<String>,
	/// `version` attribute of `<plist>`.
	pub version: Option<String>,
	/// Source text after charset decoding.
	pub text: String,
}

/// Decode XML plist bytes, honoring a byte-order mark or declared encoding.
pub fn decode_xml(bytes: &[u8], opt: &DecodeOptions) -> Result<XmlDocument> {
	let (text, encoding) = decode_source(bytes)?;
	let (root, version) = {
		let mut decoder = XmlDecoder::new(&text, opt);
		let root = decoder.decode()?;
		(root, decoder.version.take())
	};
	Ok(XmlDocument {
		root,
		encoding,
		version,
		text,
	})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
	Plist,
	Array,
	Dict,
	Key,
	String,
	Integer,
	Real,
	Date,
	True,
	False,
	Data,
}

impl Element {
	const ALL: [Self; 11] = [
		Self::Plist,
		Self::Array,
		Self::Dict,
		Self::Key,
		Self::String,
		Self::Integer,
		Self::Real,
		Self::Date,
		Self::True,
		Self::False,
		Self::Data,
	];

	fn from_name(name: &[u8]) -> Option<Self> {
		Self::ALL.into_iter().find(|element| element.as_str().as_bytes() == name)
	}

	fn as_str(self) -> &'static str {
		match self {
			Self::Plist => "plist",
			Self::Array => "array",
			Self::Dict => "dict",
			Self::Key => "key",
			Self::String => "string",
			Self::Integer => "integer",
			Self::Real => "real",
			Self::Date => "date",
			Self::True => "true",
			Self::False => "false",
			Self::Data => "data",
		}
	}
}

/// Open element on the mode stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
	Plist,
	Dict,
	Array,
	Key,
	/// Text-carrying leaf awaiting its end tag.
	Leaf(Element),
	/// Leaf whose value is already on the value stack.
	Value,
}

/// Streaming XML plist decoder.
///
/// Keeps a mode stack of open elements, a value stack of containers under
/// construction, and a key stack of pending dict keys tagged with the mode
/// stack height of the dict that owns them.
pub struct XmlDecoder<'a> {
	reader: Reader<&'a [u8]>,
	frames: Vec<Frame>,
	values: Vec<Value>,
	keys: Vec<(usize, String)>,
	text: String,
	root: Option<Value>,
	version: Option<String>,
	closed: bool,
	max_depth: u32,
}

impl<'a> XmlDecoder<'a> {
	/// Create a decoder over already charset-decoded text.
	pub fn new(text: &'a str, opt: &DecodeOptions) -> Self {
		let mut reader = Reader::from_str(text);
		let config = reader.config_mut();
		config.expand_empty_elements = true;
		config.check_end_names = true;

		Self {
			reader,
			frames: Vec::new(),
			values: Vec::new(),
			keys: Vec::new(),
			text: String::new(),
			root: None,
			version: None,
			closed: false,
			max_depth: opt.max_depth,
		}
	}

	/// `version` attribute of `<plist>`, once seen.
	pub fn plist_version(&self) -> Option<&str> {
		self.version.as_deref()
	}

	/// Consume the whole document and return its root value.
	pub fn decode(&mut self) -> Result<Value> {
		loop {
			let event = match self.reader.read_event() {
				Ok(event) => event,
				Err(err) => {
					return Err(PlistError::MalformedXml {
						position: self.reader.error_position(),
						reason: err.to_string(),
					});
				}
			};
			trace!(position = self.reader.buffer_position(), ?event, "xml event");

			match event {
				Event::Start(start) => self.start(&start)?,
				Event::Empty(start) => {
					self.start(&start)?;
					self.end()?;
				}
				Event::End(_) => self.end()?,
				Event::Text(text) => {
					let text = text.unescape().map_err(|err| self.malformed(err.to_string()))?;
					self.text(&text)?;
				}
				Event::CData(data) => {
					let raw = data.into_inner();
					let text = std::str::from_utf8(&raw).map_err(|err| self.malformed(err.to_string()))?;
					self.text(text)?;
				}
				Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
				Event::Eof => return self.finish(),
			}
		}
	}

	fn start(&mut self, start: &BytesStart<'_>) -> Result<()> {
		let name = start.name();
		let element = Element::from_name(name.as_ref()).ok_or_else(|| PlistError::UnknownElement {
			name: String::from_utf8_lossy(name.as_ref()).into_owned(),
		})?;
		if self.closed {
			return Err(unexpected(element, "content after </plist>"));
		}

		let Some(parent) = self.frames.last().copied() else {
			if element != Element::Plist {
				return Err(unexpected(element, "document must start with <plist>"));
			}
			self.version = self.version_attribute(start)?;
			self.frames.push(Frame::Plist);
			return Ok(());
		};

		self.check_child(parent, element)?;
		if self.frames.len() - 1 > self.max_depth as usize {
			return Err(PlistError::DepthExceeded { max_depth: self.max_depth });
		}

		self.text.clear();
		match element {
			Element::Plist => return Err(unexpected(element, "nested <plist>")),
			Element::Dict => {
				self.values.push(Value::Dict(Dict::new()));
				self.frames.push(Frame::Dict);
			}
			Element::Array => {
				self.values.push(Value::Array(Vec::new()));
				self.frames.push(Frame::Array);
			}
			Element::Key => self.frames.push(Frame::Key),
			Element::True | Element::False => {
				self.values.push(Value::Boolean(element == Element::True));
				self.frames.push(Frame::Value);
			}
			Element::String | Element::Integer | Element::Real | Element::Date | Element::Data => {
				self.frames.push(Frame::Leaf(element));
			}
		}
		Ok(())
	}

	fn check_child(&self, parent: Frame, element: Element) -> Result<()> {
		let reason = match parent {
			Frame::Key | Frame::Leaf(_) | Frame::Value => Some("child element inside a leaf"),
			_ if element == Element::Plist => Some("nested <plist>"),
			Frame::Plist | Frame::Array if element == Element::Key => Some("<key> outside a dict"),
			Frame::Plist if self.root.is_some() => Some("second root value"),
			Frame::Dict => match (element == Element::Key, self.pending_key()) {
				(true, true) => Some("two keys in a row"),
				(false, false) => Some("dict value without a key"),
				_ => None,
			},
			Frame::Plist | Frame::Array => None,
		};

		match reason {
			Some(reason) => Err(unexpected(element, reason)),
			None => Ok(()),
		}
	}

	/// True when the dict on top of the mode stack already holds a key.
	fn pending_key(&self) -> bool {
		self.keys.last().is_some_and(|(owner, _)| *owner == self.frames.len())
	}

	fn text(&mut self, text: &str) -> Result<()> {
		match self.frames.last() {
			Some(Frame::Key | Frame::Leaf(_)) => {
				self.text.push_str(text);
				Ok(())
			}
			Some(Frame::Plist | Frame::Dict | Frame::Array) => Ok(()),
			_ if text.trim().is_empty() => Ok(()),
			Some(Frame::Value) => Err(self.malformed("text inside a boolean")),
			None if self.closed => Err(self.malformed("content after </plist>")),
			None => Err(self.malformed("content before <plist>")),
		}
	}

	fn end(&mut self) -> Result<()> {
		let frame = self.frames.pop().ok_or_else(|| self.malformed("unmatched end tag"))?;
		let value = match frame {
			Frame::Plist => {
				self.closed = true;
				return Ok(());
			}
			Frame::Key => {
				let key = mem::take(&mut self.text);
				self.keys.push((self.frames.len(), key));
				return Ok(());
			}
			Frame::Leaf(element) => leaf_value(element, &mem::take(&mut self.text))?,
			Frame::Value => self.pop_value()?,
			Frame::Dict | Frame::Array => {
				if frame == Frame::Dict && self.keys.last().is_some_and(|(owner, _)| *owner == self.frames.len() + 1) {
					return Err(unexpected(Element::Key, "key without a value"));
				}
				self.pop_value()?
			}
		};
		self.attach(value)
	}

	fn attach(&mut self, value: Value) -> Result<()> {
		let position = self.reader.buffer_position();
		match (self.frames.last(), self.values.last_mut()) {
			(Some(Frame::Plist), _) => {
				self.root = Some(value);
				Ok(())
			}
			(Some(Frame::Dict), Some(Value::Dict(dict))) => match self.keys.pop() {
				Some((_, key)) => {
					dict.insert(key, value);
					Ok(())
				}
				None => Err(unexpected(Element::Dict, "dict value without a key")),
			},
			(Some(Frame::Array), Some(Value::Array(items))) => {
				items.push(value);
				Ok(())
			}
			_ => Err(PlistError::MalformedXml {
				position,
				reason: "value outside a container".to_owned(),
			}),
		}
	}

	fn pop_value(&mut self) -> Result<Value> {
		self.values.pop().ok_or_else(|| self.malformed("value stack underflow"))
	}

	fn finish(&mut self) -> Result<Value> {
		if !self.closed {
			let reason = if self.frames.is_empty() {
				"no <plist> root element"
			} else {
				"document ended before </plist>"
			};
			return Err(self.malformed(reason));
		}

		let root = self.root.take().unwrap_or_else(|| Value::Dict(Dict::new()));
		debug!(root = %root.kind(), version = ?self.version, "decoded xml plist");
		Ok(root)
	}

	fn version_attribute(&self, start: &BytesStart<'_>) -> Result<Option<String>> {
		for attr in start.attributes() {
			let attr = attr.map_err(|err| self.malformed(err.to_string()))?;
			if attr.key.as_ref() == b"version" {
				let value = attr.unescape_value().map_err(|err| self.malformed(err.to_string()))?;
				return Ok(Some(value.into_owned()));
			}
		}
		Ok(None)
	}

	fn malformed(&self, reason: impl Into<String>) -> PlistError {
		PlistError::MalformedXml {
			position: self.reader.buffer_position(),
			reason: reason.into(),
		}
	}
}

fn unexpected(element: Element, reason: &'static str) -> PlistError {
	PlistError::UnexpectedElement {
		name: element.as_str(),
		reason,
	}
}

fn leaf_value(element: Element, text: &str) -> Result<Value> {
	let invalid = |reason: String| PlistError::InvalidXmlValue {
		element: element.as_str(),
		text: text.to_owned(),
		reason,
	};

	// Leaves without character data close with no value.
	if text.chars().all(|c| c == '\n' || c == '\r') {
		return Ok(Value::Null);
	}

	match element {
		Element::String => Ok(Value::String(text.to_owned())),
		Element::Data => {
			let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
			STANDARD.decode(compact).map(Value::Data).map_err(|err| invalid(err.to_string()))
		}
		Element::Integer | Element::Real | Element::Date if text.trim().is_empty() => Err(invalid("empty value".to_owned())),
		Element::Integer => text.trim().parse::<i64>().map(Value::Integer).map_err(|err| invalid(err.to_string())),
		Element::Real => text.trim().parse::<f64>().map(Value::Real).map_err(|err| invalid(err.to_string())),
		Element::Date => NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
			.map(|date| Value::Date(date.and_utc()))
			.map_err(|err| invalid(err.to_string())),
		_ => Err(invalid("not a text leaf".to_owned())),
	}
}

/// Charset-decode `bytes`, returning the text and the declared label.
fn decode_source(bytes: &[u8]) -> Result<(String, Option<String>)> {
	if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
		let text = decode_with(encoding, &bytes[bom_len..])?;
		let label = declared_encoding(text.as_bytes());
		return Ok((text, label));
	}

	let label = declared_encoding(bytes);
	let encoding = match &label {
		Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| PlistError::UnsupportedEncoding { label: label.clone() })?,
		None => UTF_8,
	};
	trace!(encoding = encoding.name(), "decoding xml source");
	Ok((decode_with(encoding, bytes)?, label))
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String> {
	let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
	if had_errors {
		return Err(PlistError::MalformedXml {
			position: 0,
			reason: format!("source is not valid {}", encoding.name()),
		});
	}
	Ok(text.into_owned())
}

/// Encoding label of a leading XML declaration, lowercased.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
	let mut reader = Reader::from_reader(bytes);
	match reader.read_event() {
		Ok(Event::Decl(decl)) => decl
			.encoding()
			.and_then(|label| label.ok())
			.map(|label| String::from_utf8_lossy(&label).trim().to_ascii_lowercase()),
		_ => None,
	}
}

#[cfg(test)]
mod tests;
