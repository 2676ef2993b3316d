use chrono::{DateTime, Utc};
use encoding_rs::UTF_16BE;
use tracing::{debug, trace};

use crate::plist::bytes::Cursor;
use crate::plist::{BinaryHeader, DecodeOptions, Dict, PlistError, Result, Trailer, Value};

/// Low-nibble sentinel meaning "an integer count follows the marker".
const COUNT_FOLLOWS: u8 = 0x0f;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const APPLE_EPOCH_UNIX: i64 = 978_307_200;

/// Decode a complete `bplist00` buffer into its root value.
pub fn decode_binary(bytes: &[u8], opt: &DecodeOptions) -> Result<Value> {
	let mut decoder = BinaryDecoder::new(bytes, opt)?;
	let root = decoder.decode_root()?;
	debug!(
		objects = decoder.trailer.num_objects,
		parsed = decoder.parsed,
		nodes = decoder.nodes,
		root = %root.kind(),
		"decoded binary plist"
	);
	Ok(root)
}

/// Object-type tags of `bplist00`, from the marker's high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectType {
	Simple,
	Integer,
	Real,
	Date,
	Data,
	AsciiString,
	Utf16String,
	Uid,
	Array,
	Set,
	Dict,
}

impl ObjectType {
	fn from_marker(marker: u8) -> Option<Self> {
		match marker >> 4 {
			0x0 => Some(Self::Simple),
			0x1 => Some(Self::Integer),
			0x2 => Some(Self::Real),
			0x3 => Some(Self::Date),
			0x4 => Some(Self::Data),
			0x5 => Some(Self::AsciiString),
			0x6 => Some(Self::Utf16String),
			0x8 => Some(Self::Uid),
			0xa => Some(Self::Array),
			0xc => Some(Self::Set),
			0xd => Some(Self::Dict),
			_ => None,
		}
	}
}

enum Slot {
	Pending,
	InProgress,
	/// Cached value and the node count of its expanded subtree.
	Done(Value, u64),
}

/// Binary plist decoder with an object-number-indexed memo arena.
///
/// Each object is parsed at most once; later references clone the cached value.
/// Every node placed in the output tree, cloned or parsed, is charged against
/// the node budget.
pub struct BinaryDecoder<'a> {
	bytes: &'a [u8],
	objects: &'a [u8],
	trailer: Trailer,
	offsets: Vec<usize>,
	slots: Vec<Slot>,
	parsed: usize,
	nodes: u64,
	max_depth: u32,
	max_nodes: u64,
}

impl<'a> BinaryDecoder<'a> {
	/// Validate header, trailer, and offset table of `bytes`.
	pub fn new(bytes: &'a [u8], opt: &DecodeOptions) -> Result<Self> {
		let header = BinaryHeader::parse(bytes)?;
		header.ensure_supported()?;

		let trailer = Trailer::parse(bytes)?;
		if trailer.num_objects > opt.max_objects {
			return Err(PlistError::TooManyObjects {
				count: trailer.num_objects,
				max: opt.max_objects,
			});
		}

		let offsets = read_offset_table(bytes, &trailer)?;
		trace!(
			objects = offsets.len(),
			offset_int_size = trailer.offset_int_size,
			object_ref_size = trailer.object_ref_size,
			"loaded offset table"
		);

		let slots = offsets.iter().map(|_| Slot::Pending).collect();
		Ok(Self {
			bytes,
			objects: &bytes[..trailer.object_area_end(bytes.len())],
			trailer,
			offsets,
			slots,
			parsed: 0,
			nodes: 0,
			max_depth: opt.max_depth,
			max_nodes: opt.max_nodes,
		})
	}

	/// Parsed trailer.
	pub fn trailer(&self) -> &Trailer {
		&self.trailer
	}

	/// Number of object payloads actually parsed so far.
	pub fn objects_parsed(&self) -> usize {
		self.parsed
	}

	/// Value nodes produced so far, shared subtrees counted once per reference.
	pub fn nodes_produced(&self) -> u64 {
		self.nodes
	}

	/// Decode the trailer's top object.
	pub fn decode_root(&mut self) -> Result<Value> {
		let at = self.bytes.len() - Trailer::SIZE;
		self.object(self.trailer.top_object, at, 0)
	}

	/// Decode object number `index`, referenced from byte offset `at`.
	fn object(&mut self, index: u64, at: usize, depth: u32) -> Result<Value> {
		let slot = usize::try_from(index)
			.ok()
			.filter(|slot| *slot < self.slots.len())
			.ok_or(PlistError::ObjectRefOutOfRange {
				index,
				at,
				count: self.trailer.num_objects,
			})?;

		let offset = self.offsets[slot];
		if let Slot::Done(_, nodes) = self.slots[slot] {
			self.charge(nodes)?;
		}
		match &self.slots[slot] {
			Slot::Done(value, _) => return Ok(value.clone()),
			Slot::InProgress => return Err(PlistError::CyclicReference { at: offset }),
			Slot::Pending => {}
		}

		if depth > self.max_depth {
			return Err(PlistError::DepthExceeded { max_depth: self.max_depth });
		}

		self.slots[slot] = Slot::InProgress;
		let before = self.nodes;
		self.charge(1)?;
		let value = self.parse_object(offset, depth)?;
		self.parsed += 1;
		self.slots[slot] = Slot::Done(value.clone(), self.nodes - before);
		Ok(value)
	}

	fn charge(&mut self, nodes: u64) -> Result<()> {
		self.nodes = self.nodes.saturating_add(nodes);
		if self.nodes > self.max_nodes {
			return Err(PlistError::NodeLimitExceeded { max_nodes: self.max_nodes });
		}
		Ok(())
	}

	fn parse_object(&mut self, offset: usize, depth: u32) -> Result<Value> {
		// Payloads may not run into the offset table.
		let mut cursor = Cursor::at(self.objects, offset);
		let marker = cursor.read_u8()?;
		let arg = marker & 0x0f;
		let object_type = ObjectType::from_marker(marker).ok_or(PlistError::UnknownObjectType { tag: marker >> 4, at: offset })?;
		trace!(offset, ?object_type, arg, "parsing object");

		match object_type {
			ObjectType::Simple => simple(arg, offset),
			ObjectType::Integer => {
				let width = int_width(arg, offset)?;
				// Unsigned on the wire; the cast to i64 is the only sign handling.
				Ok(Value::Integer(cursor.read_uint_be(width)? as i64))
			}
			ObjectType::Real => match arg {
				2 => Ok(Value::Real(f64::from(cursor.read_f32_be()?))),
				3 => Ok(Value::Real(cursor.read_f64_be()?)),
				_ => Err(malformed(offset, format!("real width 2^{arg} is not 4 or 8 bytes"))),
			},
			ObjectType::Date => date_from_apple_seconds(cursor.read_f64_be()?, offset).map(Value::Date),
			ObjectType::Data => {
				let count = read_count(&mut cursor, arg, offset)?;
				Ok(Value::Data(cursor.read_exact(count)?.to_vec()))
			}
			ObjectType::AsciiString => {
				let count = read_count(&mut cursor, arg, offset)?;
				let raw = cursor.read_exact(count)?;
				let text = std::str::from_utf8(raw).map_err(|err| malformed(offset, format!("ascii string: {err}")))?;
				Ok(Value::String(text.to_owned()))
			}
			ObjectType::Utf16String => {
				let units = read_count(&mut cursor, arg, offset)?;
				let size = units.checked_mul(2).ok_or_else(|| malformed(offset, "utf-16 length overflows"))?;
				let raw = cursor.read_exact(size)?;
				let text = UTF_16BE
					.decode_without_bom_handling_and_without_replacement(raw)
					.ok_or_else(|| malformed(offset, "invalid utf-16be string"))?;
				Ok(Value::String(text.into_owned()))
			}
			ObjectType::Uid => Ok(Value::Uid(cursor.read_uint_be(usize::from(arg) + 1)?)),
			ObjectType::Array => {
				let refs = self.read_refs(&mut cursor, arg, offset, 1)?;
				let items = self.resolve_all(&refs, offset, depth)?;
				Ok(Value::Array(items))
			}
			ObjectType::Set => {
				let refs = self.read_refs(&mut cursor, arg, offset, 1)?;
				let items = self.resolve_all(&refs, offset, depth)?;
				Ok(Value::Set(items))
			}
			ObjectType::Dict => {
				let refs = self.read_refs(&mut cursor, arg, offset, 2)?;
				let (key_refs, value_refs) = refs.split_at(refs.len() / 2);

				let mut dict = Dict::new();
				for (key_ref, value_ref) in key_refs.iter().zip(value_refs) {
					let key = match self.object(*key_ref, offset, depth + 1)? {
						Value::String(key) => key,
						other => {
							return Err(PlistError::NonStringKey {
								at: offset,
								kind: other.kind(),
							});
						}
					};
					let value = self.object(*value_ref, offset, depth + 1)?;
					dict.insert(key, value);
				}
				Ok(Value::Dict(dict))
			}
		}
	}

	/// Read `count * per_entry` object references following the count.
	fn read_refs(&self, cursor: &mut Cursor<'a>, arg: u8, offset: usize, per_entry: usize) -> Result<Vec<u64>> {
		let count = read_count(cursor, arg, offset)?;
		let width = usize::from(self.trailer.object_ref_size);
		let size = count
			.checked_mul(per_entry)
			.and_then(|refs| refs.checked_mul(width))
			.ok_or_else(|| malformed(offset, "container length overflows"))?;
		let raw = cursor.read_exact(size)?;
		Ok(raw
			.chunks_exact(width)
			.map(|chunk| chunk.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte)))
			.collect())
	}

	fn resolve_all(&mut self, refs: &[u64], offset: usize, depth: u32) -> Result<Vec<Value>> {
		refs.iter().map(|item| self.object(*item, offset, depth + 1)).collect()
	}
}

fn read_offset_table(bytes: &[u8], trailer: &Trailer) -> Result<Vec<usize>> {
	let width = usize::from(trailer.offset_int_size);
	let out_of_range = || PlistError::OffsetTableOutOfRange {
		offset: trailer.offset_table_offset,
		count: trailer.num_objects,
		width: trailer.offset_int_size,
		len: bytes.len(),
	};

	let start = usize::try_from(trailer.offset_table_offset).map_err(|_| out_of_range())?;
	let count = usize::try_from(trailer.num_objects).map_err(|_| out_of_range())?;
	let end = count
		.checked_mul(width)
		.and_then(|size| size.checked_add(start))
		.ok_or_else(out_of_range)?;
	if start < BinaryHeader::SIZE || end > bytes.len() - Trailer::SIZE {
		return Err(out_of_range());
	}

	let limit = trailer.object_area_end(bytes.len());
	let mut cursor = Cursor::at(bytes, start);
	let mut offsets = Vec::with_capacity(count);
	for index in 0..trailer.num_objects {
		let offset = cursor.read_uint_be(width)?;
		match usize::try_from(offset) {
			Ok(item) if item >= BinaryHeader::SIZE && item < limit => offsets.push(item),
			_ => return Err(PlistError::ObjectOffsetOutOfRange { index, offset, limit }),
		}
	}
	Ok(offsets)
}

/// Read a payload count, following the extended encoding for the sentinel nibble.
fn read_count(cursor: &mut Cursor<'_>, arg: u8, offset: usize) -> Result<usize> {
	if arg != COUNT_FOLLOWS {
		return Ok(usize::from(arg));
	}

	let exponent = cursor.read_u8()? & 0x0f;
	if exponent > 3 {
		return Err(malformed(offset, format!("count width 2^{exponent} exceeds 8 bytes")));
	}
	let count = cursor.read_uint_be(1 << exponent)?;
	usize::try_from(count).map_err(|_| malformed(offset, format!("count {count} does not fit in memory")))
}

fn int_width(arg: u8, offset: usize) -> Result<usize> {
	if arg > 4 {
		return Err(malformed(offset, format!("integer width 2^{arg} exceeds 16 bytes")));
	}
	Ok(1 << arg)
}

fn simple(arg: u8, offset: usize) -> Result<Value> {
	match arg {
		0x0 | 0xf => Ok(Value::Null),
		0x8 => Ok(Value::Boolean(false)),
		0x9 => Ok(Value::Boolean(true)),
		_ => Err(malformed(offset, format!("unknown simple value {arg:#x}"))),
	}
}

/// Convert seconds since 2001-01-01 to a whole-second UTC timestamp.
fn date_from_apple_seconds(seconds: f64, offset: usize) -> Result<DateTime<Utc>> {
	if !seconds.is_finite() {
		return Err(malformed(offset, format!("date {seconds} is not finite")));
	}

	let unix = APPLE_EPOCH_UNIX.checked_add(seconds.floor() as i64);
	unix.and_then(|secs| DateTime::from_timestamp(secs, 0))
		.ok_or_else(|| malformed(offset, format!("date {seconds} out of range")))
}

fn malformed(at: usize, reason: impl Into<String>) -> PlistError {
	PlistError::MalformedObject { at, reason: reason.into() }
}
