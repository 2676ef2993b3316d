use crate::plist::bytes::Cursor;
use crate::plist::{PlistError, Result};

/// Input representation chosen by [`sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
	/// Anything without the `bplist` magic.
	Xml,
	/// `bplist` magic followed by a two-byte version token.
	Binary {
		/// Raw version token, `*b"00"` for supported input.
		version: [u8; 2],
	},
}

impl SourceFormat {
	/// False only for binary input with an unknown version token.
	pub fn is_supported(self) -> bool {
		match self {
			Self::Xml => true,
			Self::Binary { version } => BinaryHeader::SUPPORTED_VERSIONS.contains(&version),
		}
	}

	/// Short label for diagnostics.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Xml => "xml",
			Self::Binary { .. } => "binary",
		}
	}
}

/// Choose a decoder for `bytes` without parsing anything.
///
/// Unsupported binary versions still report [`SourceFormat::Binary`] so the
/// version error surfaces when decoding is attempted.
pub fn sniff(bytes: &[u8]) -> SourceFormat {
	match BinaryHeader::parse(bytes) {
		Ok(header) => SourceFormat::Binary { version: header.version },
		Err(_) => SourceFormat::Xml,
	}
}

/// Fixed 8-byte binary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryHeader {
	/// Two-byte version token following the magic.
	pub version: [u8; 2],
}

impl BinaryHeader {
	/// Header size in bytes.
	pub const SIZE: usize = 8;
	/// Leading magic token.
	pub const MAGIC: &'static [u8; 6] = b"bplist";
	/// Version tokens the decoder understands.
	pub const SUPPORTED_VERSIONS: &'static [[u8; 2]] = &[*b"00"];

	/// Parse the magic and version token from the start of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..Self::SIZE).ok_or(PlistError::InvalidHeader)?;
		if &header[0..6] != Self::MAGIC {
			return Err(PlistError::InvalidHeader);
		}

		Ok(Self {
			version: [header[6], header[7]],
		})
	}

	/// Fail with `UnsupportedVersion` unless the token is known.
	pub fn ensure_supported(&self) -> Result<()> {
		if Self::SUPPORTED_VERSIONS.contains(&self.version) {
			return Ok(());
		}
		Err(PlistError::UnsupportedVersion {
			version: String::from_utf8_lossy(&self.version).into_owned(),
		})
	}
}

/// Fixed 32-byte binary trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
	/// Sort version byte; unused by the decoder.
	pub sort_version: u8,
	/// Width of each offset table entry.
	pub offset_int_size: u8,
	/// Width of each object reference inside containers.
	pub object_ref_size: u8,
	/// Number of objects in the offset table.
	pub num_objects: u64,
	/// Object number of the root value.
	pub top_object: u64,
	/// Byte offset of the offset table.
	pub offset_table_offset: u64,
}

impl Trailer {
	/// Trailer size in bytes.
	pub const SIZE: usize = 32;

	/// Parse the trailer from the last 32 bytes of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < BinaryHeader::SIZE + Self::SIZE {
			return Err(PlistError::InvalidTrailer { len: bytes.len() });
		}

		let mut cursor = Cursor::at(bytes, bytes.len() - Self::SIZE);
		cursor.read_exact(5)?;
		let trailer = Self {
			sort_version: cursor.read_u8()?,
			offset_int_size: cursor.read_u8()?,
			object_ref_size: cursor.read_u8()?,
			num_objects: cursor.read_u64_be()?,
			top_object: cursor.read_u64_be()?,
			offset_table_offset: cursor.read_u64_be()?,
		};

		check_int_width("offsetIntSize", trailer.offset_int_size)?;
		check_int_width("objectRefSize", trailer.object_ref_size)?;
		Ok(trailer)
	}

	/// First byte past the object area; object offsets must fall below it.
	pub fn object_area_end(&self, len: usize) -> usize {
		usize::try_from(self.offset_table_offset).map_or(len, |offset| offset.min(len))
	}
}

fn check_int_width(field: &'static str, width: u8) -> Result<()> {
	match width {
		1 | 2 | 4 | 8 => Ok(()),
		_ => Err(PlistError::InvalidIntWidth { field, width }),
	}
}
