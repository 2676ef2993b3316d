//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Size of the fixed binary plist trailer.
pub const TRAILER_SIZE: usize = 32;

enum Object {
	Raw(Vec<u8>),
	Refs { tag: u8, refs: Vec<u64> },
	Dict { keys: Vec<u64>, values: Vec<u64> },
}

/// Hand-assembles `bplist` buffers for decoder tests.
///
/// Every builder method returns the new object's number so containers can
/// reference it, including references to objects added later.
pub struct BplistWriter {
	version: [u8; 2],
	objects: Vec<Object>,
}

impl Default for BplistWriter {
	fn default() -> Self {
		Self::new()
	}
}

impl BplistWriter {
	/// Writer producing `bplist00`.
	pub fn new() -> Self {
		Self::with_version(*b"00")
	}

	/// Writer producing an arbitrary version token.
	pub fn with_version(version: [u8; 2]) -> Self {
		Self {
			version,
			objects: Vec::new(),
		}
	}

	/// Number of objects added so far.
	pub fn len(&self) -> usize {
		self.objects.len()
	}

	/// True when no object has been added.
	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	/// Add pre-encoded object bytes, marker included.
	pub fn raw(&mut self, bytes: impl Into<Vec<u8>>) -> u64 {
		self.push(Object::Raw(bytes.into()))
	}

	/// Add the null simple value.
	pub fn null(&mut self) -> u64 {
		self.raw(vec![0x00])
	}

	/// Add a boolean.
	pub fn boolean(&mut self, value: bool) -> u64 {
		self.raw(vec![if value { 0x09 } else { 0x08 }])
	}

	/// Add an integer using the narrowest width; negatives take 8 bytes.
	pub fn int(&mut self, value: i64) -> u64 {
		let bytes = if value < 0 {
			let mut out = vec![0x13];
			out.extend_from_slice(&value.to_be_bytes());
			out
		} else {
			uint_bytes(0x1, value as u64)
		};
		self.raw(bytes)
	}

	/// Add an 8-byte real.
	pub fn real(&mut self, value: f64) -> u64 {
		let mut out = vec![0x23];
		out.extend_from_slice(&value.to_be_bytes());
		self.raw(out)
	}

	/// Add a date as seconds since 2001-01-01T00:00:00Z.
	pub fn date(&mut self, seconds: f64) -> u64 {
		let mut out = vec![0x33];
		out.extend_from_slice(&seconds.to_be_bytes());
		self.raw(out)
	}

	/// Add a data blob.
	pub fn data(&mut self, bytes: &[u8]) -> u64 {
		let mut out = marker_with_count(0x4, bytes.len());
		out.extend_from_slice(bytes);
		self.raw(out)
	}

	/// Add a single-byte string; `text` must be ASCII.
	pub fn ascii(&mut self, text: &str) -> u64 {
		let mut out = marker_with_count(0x5, text.len());
		out.extend_from_slice(text.as_bytes());
		self.raw(out)
	}

	/// Add a UTF-16BE string.
	pub fn utf16(&mut self, text: &str) -> u64 {
		let units: Vec<u16> = text.encode_utf16().collect();
		let mut out = marker_with_count(0x6, units.len());
		for unit in units {
			out.extend_from_slice(&unit.to_be_bytes());
		}
		self.raw(out)
	}

	/// Add a UID using the narrowest of 1, 2, 4, or 8 bytes.
	pub fn uid(&mut self, value: u64) -> u64 {
		let width = uint_width(value);
		let mut out = vec![0x80 | (width as u8 - 1)];
		out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
		self.raw(out)
	}

	/// Add an array of object references.
	pub fn array(&mut self, refs: &[u64]) -> u64 {
		self.push(Object::Refs { tag: 0xa, refs: refs.to_vec() })
	}

	/// Add a set of object references.
	pub fn set(&mut self, refs: &[u64]) -> u64 {
		self.push(Object::Refs { tag: 0xc, refs: refs.to_vec() })
	}

	/// Add a dict of `(key, value)` object references.
	pub fn dict(&mut self, entries: &[(u64, u64)]) -> u64 {
		self.push(Object::Dict {
			keys: entries.iter().map(|(key, _)| *key).collect(),
			values: entries.iter().map(|(_, value)| *value).collect(),
		})
	}

	/// Serialize header, objects, offset table, and trailer with `top` as root.
	pub fn finish(&self, top: u64) -> Vec<u8> {
		let ref_size = if self.objects.len() <= 0xff { 1 } else { 2 };

		let mut out = b"bplist".to_vec();
		out.extend_from_slice(&self.version);

		let mut offsets = Vec::with_capacity(self.objects.len());
		for object in &self.objects {
			offsets.push(out.len() as u64);
			match object {
				Object::Raw(bytes) => out.extend_from_slice(bytes),
				Object::Refs { tag, refs } => {
					out.extend(marker_with_count(*tag, refs.len()));
					write_refs(&mut out, refs, ref_size);
				}
				Object::Dict { keys, values } => {
					out.extend(marker_with_count(0xd, keys.len()));
					write_refs(&mut out, keys, ref_size);
					write_refs(&mut out, values, ref_size);
				}
			}
		}

		let table_offset = out.len() as u64;
		let offset_size = uint_width(table_offset);
		for offset in offsets {
			out.extend_from_slice(&offset.to_be_bytes()[8 - offset_size..]);
		}

		out.extend_from_slice(&[0_u8; 5]);
		out.push(0);
		out.push(offset_size as u8);
		out.push(ref_size as u8);
		out.extend_from_slice(&(self.objects.len() as u64).to_be_bytes());
		out.extend_from_slice(&top.to_be_bytes());
		out.extend_from_slice(&table_offset.to_be_bytes());
		out
	}

	fn push(&mut self, object: Object) -> u64 {
		self.objects.push(object);
		(self.objects.len() - 1) as u64
	}
}

/// Encode a type marker, spilling counts of 15 and above into a trailing integer.
pub fn marker_with_count(tag: u8, count: usize) -> Vec<u8> {
	if count < 0xf {
		return vec![(tag << 4) | count as u8];
	}
	let mut out = vec![(tag << 4) | 0xf];
	out.extend(uint_bytes(0x1, count as u64));
	out
}

fn uint_bytes(tag: u8, value: u64) -> Vec<u8> {
	let width = uint_width(value);
	let mut out = vec![(tag << 4) | width.trailing_zeros() as u8];
	out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
	out
}

fn uint_width(value: u64) -> usize {
	match value {
		0..=0xff => 1,
		0x100..=0xffff => 2,
		0x1_0000..=0xffff_ffff => 4,
		_ => 8,
	}
}

fn write_refs(out: &mut Vec<u8>, refs: &[u64], width: usize) {
	for item in refs {
		out.extend_from_slice(&item.to_be_bytes()[8 - width..]);
	}
}
