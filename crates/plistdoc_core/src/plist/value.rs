use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Decoded property-list value tree.
#[derive(Debug, Clone)]
pub enum Value {
	/// Binary `null` simple object.
	Null,
	/// `<true/>` / `<false/>`.
	Boolean(bool),
	/// Signed 64-bit integer.
	Integer(i64),
	/// IEEE float; binary `float32` payloads are widened.
	Real(f64),
	/// Text.
	String(String),
	/// UTC timestamp with whole-second precision.
	Date(DateTime<Utc>),
	/// Opaque byte blob.
	Data(Vec<u8>),
	/// Keyed-archiver object reference, written as `{"CF$UID": n}`.
	Uid(u64),
	/// Ordered sequence.
	Array(Vec<Value>),
	/// String-keyed mapping.
	Dict(Dict),
	/// Unordered collection; binary input only.
	Set(Vec<Value>),
}

/// Fieldless discriminant of [`Value`], used by schemas and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// [`Value::Null`].
	Null,
	/// [`Value::Boolean`].
	Boolean,
	/// [`Value::Integer`].
	Integer,
	/// [`Value::Real`].
	Real,
	/// [`Value::String`].
	String,
	/// [`Value::Date`].
	Date,
	/// [`Value::Data`].
	Data,
	/// [`Value::Uid`].
	Uid,
	/// [`Value::Array`].
	Array,
	/// [`Value::Dict`].
	Dict,
	/// [`Value::Set`].
	Set,
}

impl ValueKind {
	/// Every kind, in declaration order.
	pub const ALL: [ValueKind; 11] = [
		Self::Null,
		Self::Boolean,
		Self::Integer,
		Self::Real,
		Self::String,
		Self::Date,
		Self::Data,
		Self::Uid,
		Self::Array,
		Self::Dict,
		Self::Set,
	];

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Boolean => "boolean",
			Self::Integer => "integer",
			Self::Real => "real",
			Self::String => "string",
			Self::Date => "date",
			Self::Data => "data",
			Self::Uid => "uid",
			Self::Array => "array",
			Self::Dict => "dict",
			Self::Set => "set",
		}
	}

	/// Parse a lowercase label produced by [`ValueKind::as_str`].
	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == label)
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Value {
	/// Kind of this value.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Null => ValueKind::Null,
			Self::Boolean(_) => ValueKind::Boolean,
			Self::Integer(_) => ValueKind::Integer,
			Self::Real(_) => ValueKind::Real,
			Self::String(_) => ValueKind::String,
			Self::Date(_) => ValueKind::Date,
			Self::Data(_) => ValueKind::Data,
			Self::Uid(_) => ValueKind::Uid,
			Self::Array(_) => ValueKind::Array,
			Self::Dict(_) => ValueKind::Dict,
			Self::Set(_) => ValueKind::Set,
		}
	}

	/// Null or a container without elements.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Null => true,
			Self::Array(items) | Self::Set(items) => items.is_empty(),
			Self::Dict(dict) => dict.is_empty(),
			_ => false,
		}
	}

	/// Look up `key` when this value is a dict.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_dict().and_then(|dict| dict.get(key))
	}

	/// Borrow string contents.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Integer contents.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Integer(value) => Some(*value),
			_ => None,
		}
	}

	/// Real contents.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Real(value) => Some(*value),
			_ => None,
		}
	}

	/// Boolean contents.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Boolean(value) => Some(*value),
			_ => None,
		}
	}

	/// Date contents.
	pub fn as_date(&self) -> Option<DateTime<Utc>> {
		match self {
			Self::Date(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow data contents.
	pub fn as_data(&self) -> Option<&[u8]> {
		match self {
			Self::Data(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Uid contents.
	pub fn as_uid(&self) -> Option<u64> {
		match self {
			Self::Uid(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow array elements.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow dict entries.
	pub fn as_dict(&self) -> Option<&Dict> {
		match self {
			Self::Dict(dict) => Some(dict),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Boolean(left), Self::Boolean(right)) => left == right,
			(Self::Integer(left), Self::Integer(right)) => left == right,
			(Self::Real(left), Self::Real(right)) => left == right,
			(Self::String(left), Self::String(right)) => left == right,
			(Self::Date(left), Self::Date(right)) => left == right,
			(Self::Data(left), Self::Data(right)) => left == right,
			(Self::Uid(left), Self::Uid(right)) => left == right,
			(Self::Array(left), Self::Array(right)) => left == right,
			(Self::Dict(left), Self::Dict(right)) => left == right,
			(Self::Set(left), Self::Set(right)) => unordered_eq(left, right),
			_ => false,
		}
	}
}

fn unordered_eq(left: &[Value], right: &[Value]) -> bool {
	if left.len() != right.len() {
		return false;
	}

	let mut used = vec![false; right.len()];
	left.iter().all(|item| {
		let found = right
			.iter()
			.enumerate()
			.position(|(idx, candidate)| !used[idx] && candidate == item);
		match found {
			Some(idx) => {
				used[idx] = true;
				true
			}
			None => false,
		}
	})
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Integer(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Real(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Date(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Array(value)
	}
}

impl From<Dict> for Value {
	fn from(value: Dict) -> Self {
		Self::Dict(value)
	}
}

/// Insertion-ordered string-keyed map with unique keys.
///
/// Order is kept for stable output only; equality ignores it.
#[derive(Debug, Clone, Default)]
pub struct Dict {
	entries: IndexMap<String, Value>,
}

impl Dict {
	/// Create an empty dict.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the dict has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Insert or replace `key`, keeping the original position on replace.
	pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
		self.entries.insert(key.into(), value)
	}

	/// Borrow the value stored at `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.entries.get(key)
	}

	/// Mutably borrow the value stored at `key`.
	pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
		self.entries.get_mut(key)
	}

	/// Whether `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// Remove `key`, preserving the order of the remaining entries.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.entries.shift_remove(key)
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Iterate keys in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Iterate values in insertion order.
	pub fn values(&self) -> impl Iterator<Item = &Value> {
		self.entries.values()
	}
}

impl PartialEq for Dict {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
	}
}

impl FromIterator<(String, Value)> for Dict {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		let mut dict = Dict::new();
		for (key, value) in iter {
			dict.insert(key, value);
		}
		dict
	}
}

impl IntoIterator for Dict {
	type Item = (String, Value);
	type IntoIter = indexmap::map::IntoIter<String, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}
