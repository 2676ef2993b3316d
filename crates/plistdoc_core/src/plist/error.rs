use thiserror::Error;

use crate::plist::ValueKind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PlistError>;

/// Broad failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Input could not be tokenized or its fixed layout does not fit.
	Malformed,
	/// Binary magic matched but the version token is unsupported.
	UnsupportedVersion,
	/// Structurally sound document that fails validation.
	Invalid,
	/// Contents were accessed before a successful parse.
	NotParsed,
	/// Value has no XML mapping.
	Unsupported,
	/// Filesystem or stream failure.
	Io,
}

/// Errors produced while sniffing, decoding, validating, and encoding plists.
#[derive(Debug, Error)]
pub enum PlistError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Buffer too short for the 8-byte binary header.
	#[error("invalid binary header")]
	InvalidHeader,
	/// Binary magic matched but the version token is not supported.
	#[error("unsupported binary plist version {version:?} (expected \"00\")")]
	UnsupportedVersion {
		/// Raw two-byte version token, lossily decoded.
		version: String,
	},
	/// Buffer too short for the header plus the 32-byte trailer.
	#[error("invalid binary trailer: buffer is {len} bytes")]
	InvalidTrailer {
		/// Total buffer length.
		len: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Trailer declared an integer width the format does not define.
	#[error("invalid {field} width {width} (expected 1, 2, 4, or 8)")]
	InvalidIntWidth {
		/// Trailer field being validated.
		field: &'static str,
		/// Declared width in bytes.
		width: u8,
	},
	/// Offset table does not fit between its start and the trailer.
	#[error("offset table at {offset} with {count} entries of {width} bytes exceeds buffer of {len} bytes")]
	OffsetTableOutOfRange {
		/// Declared offset table start.
		offset: u64,
		/// Declared object count.
		count: u64,
		/// Declared entry width.
		width: u8,
		/// Total buffer length.
		len: usize,
	},
	/// Object offset points outside the object area.
	#[error("object {index} offset {offset} is outside the object area (limit {limit})")]
	ObjectOffsetOutOfRange {
		/// Object number.
		index: u64,
		/// Declared byte offset.
		offset: u64,
		/// First byte past the object area.
		limit: usize,
	},
	/// Object reference (or top object) is not a valid object number.
	#[error("object reference {index} at offset {at} out of range (objects={count})")]
	ObjectRefOutOfRange {
		/// Referenced object number.
		index: u64,
		/// Byte offset of the referencing object.
		at: usize,
		/// Number of objects in the offset table.
		count: u64,
	},
	/// Declared object count exceeds the configured ceiling.
	#[error("too many objects: count={count}, max={max}")]
	TooManyObjects {
		/// Declared object count.
		count: u64,
		/// Configured ceiling.
		max: u64,
	},
	/// Decoded tree would hold more value nodes than allowed.
	#[error("value node budget exhausted (max={max_nodes})")]
	NodeLimitExceeded {
		/// Configured node ceiling.
		max_nodes: u64,
	},
	/// Marker byte carries an object-type tag with no decoder.
	#[error("unknown object type {tag:#x} at offset {at}")]
	UnknownObjectType {
		/// High nibble of the marker byte.
		tag: u8,
		/// Byte offset of the marker.
		at: usize,
	},
	/// Object payload could not be decoded.
	#[error("malformed object at offset {at}: {reason}")]
	MalformedObject {
		/// Byte offset of the object marker.
		at: usize,
		/// Short description of the problem.
		reason: String,
	},
	/// Dict key object decoded to something other than a string.
	#[error("dict key at offset {at} is {kind}, expected string")]
	NonStringKey {
		/// Byte offset of the dict object.
		at: usize,
		/// Kind of the offending key.
		kind: ValueKind,
	},
	/// An object transitively contains itself.
	#[error("cyclic object reference at offset {at}")]
	CyclicReference {
		/// Byte offset of the object reached twice.
		at: usize,
	},
	/// Nesting exceeded the configured depth.
	#[error("nesting depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// XML could not be tokenized or is not well-formed.
	#[error("malformed xml at byte {position}: {reason}")]
	MalformedXml {
		/// Tokenizer position when the problem was detected.
		position: u64,
		/// Tokenizer or state-machine message.
		reason: String,
	},
	/// Element name outside the plist allow-list.
	#[error("unknown element <{name}>")]
	UnknownElement {
		/// Element name as written.
		name: String,
	},
	/// Known element in a position the grammar does not allow.
	#[error("unexpected <{name}>: {reason}")]
	UnexpectedElement {
		/// Element name.
		name: &'static str,
		/// Why it is not allowed here.
		reason: &'static str,
	},
	/// Leaf text could not be converted to its element type.
	#[error("invalid <{element}> value {text:?}: {reason}")]
	InvalidXmlValue {
		/// Leaf element name.
		element: &'static str,
		/// Offending text.
		text: String,
		/// Conversion failure.
		reason: String,
	},
	/// XML declaration names an encoding `encoding_rs` does not know.
	#[error("encoding not valid: {label}")]
	UnsupportedEncoding {
		/// Declared encoding label.
		label: String,
	},
	/// Parsed root is null or an empty container.
	#[error("plist is empty")]
	Empty,
	/// Schema-required key is absent from the root dict.
	#[error("missing element {key}")]
	MissingKey {
		/// Required key.
		key: String,
	},
	/// Schema-required key holds a value of the wrong kind.
	#[error("invalid type for element {key}: got {actual}, expected {expected}")]
	TypeMismatch {
		/// Required key.
		key: String,
		/// Kind declared by the schema.
		expected: ValueKind,
		/// Kind found in the document.
		actual: ValueKind,
	},
	/// Caller-defined validation failure.
	#[error("invalid plist: {reason}")]
	Invalid {
		/// Hook-provided message.
		reason: String,
	},
	/// Contents requested before a successful parse.
	#[error("plist has not been parsed")]
	NotParsed,
	/// Value variant has no XML mapping.
	#[error("value type {kind} not supported in xml output")]
	UnsupportedValue {
		/// Offending value kind.
		kind: ValueKind,
	},
	/// Document root must be an array or dict.
	#[error("plist contents type is not supported: {kind}")]
	UnsupportedRoot {
		/// Offending root kind.
		kind: ValueKind,
	},
}

impl PlistError {
	/// Convenience constructor for validation hooks.
	pub fn invalid(reason: impl Into<String>) -> Self {
		Self::Invalid { reason: reason.into() }
	}

	/// Failure category of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
			Self::UnsupportedEncoding { .. }
			| Self::Empty
			| Self::MissingKey { .. }
			| Self::TypeMismatch { .. }
			| Self::Invalid { .. } => ErrorKind::Invalid,
			Self::NotParsed => ErrorKind::NotParsed,
			Self::UnsupportedValue { .. } | Self::UnsupportedRoot { .. } => ErrorKind::Unsupported,
			Self::InvalidHeader
			| Self::InvalidTrailer { .. }
			| Self::UnexpectedEof { .. }
			| Self::InvalidIntWidth { .. }
			| Self::OffsetTableOutOfRange { .. }
			| Self::ObjectOffsetOutOfRange { .. }
			| Self::ObjectRefOutOfRange { .. }
			| Self::TooManyObjects { .. }
			| Self::NodeLimitExceeded { .. }
			| Self::UnknownObjectType { .. }
			| Self::MalformedObject { .. }
			| Self::NonStringKey { .. }
			| Self::CyclicReference { .. }
			| Self::DepthExceeded { .. }
			| Self::MalformedXml { .. }
			| Self::UnknownElement { .. }
			| Self::UnexpectedElement { .. }
			| Self::InvalidXmlValue { .. } => ErrorKind::Malformed,
		}
	}
}
