mod binary;
mod bytes;
mod document;
mod encode;
mod error;
mod header;
mod options;
mod validate;
mod value;
mod xml;

/// Binary plist decoder and its memo arena.
pub use binary::{BinaryDecoder, decode_binary};
/// Stateful load/parse/encode façade.
pub use document::PlistDocument;
/// XML encoder entry points and the fixed document framing.
pub use encode::{DATE_FORMAT, PLIST_FOOT, PLIST_HEAD, to_xml, to_xml_fragment};
/// Error, error category, and result aliases.
pub use error::{ErrorKind, PlistError, Result};
/// Format sniffing and fixed binary layout records.
pub use header::{BinaryHeader, SourceFormat, Trailer, sniff};
/// Decoder limits.
pub use options::DecodeOptions;
/// Schema checks and validation hooks.
pub use validate::{Schema, ValidationHook, Validator};
/// Decoded value tree types.
pub use value::{Dict, Value, ValueKind};
/// XML decoder entry points.
pub use xml::{XmlDecoder, XmlDocument, decode_xml};
