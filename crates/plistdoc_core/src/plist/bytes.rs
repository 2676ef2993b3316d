use crate::plist::{PlistError, Result};

/// Bounded big-endian cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at `pos`; reads past the end fail with `UnexpectedEof`.
	pub fn at(bytes: &'a [u8], pos: usize) -> Self {
		Self { bytes, pos }
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() || self.pos > self.bytes.len() {
			return Err(PlistError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a big-endian `u64`.
	pub fn read_u64_be(&mut self) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_be_bytes(buf))
	}

	/// Read a big-endian IEEE `f32`.
	pub fn read_f32_be(&mut self) -> Result<f32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(f32::from_be_bytes(buf))
	}

	/// Read a big-endian IEEE `f64`.
	pub fn read_f64_be(&mut self) -> Result<f64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(f64::from_be_bytes(buf))
	}

	/// Read a `width`-byte big-endian unsigned integer.
	///
	/// Widths above 8 keep only the low 64 bits.
	pub fn read_uint_be(&mut self, width: usize) -> Result<u64> {
		let raw = self.read_exact(width)?;
		Ok(raw.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte)))
	}
}
