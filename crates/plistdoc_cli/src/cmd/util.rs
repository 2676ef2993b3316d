use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use plistdoc::plist::{DATE_FORMAT, SourceFormat, Value};
use serde_json::{Map, Value as JsonValue, json};

/// Pretty-print a serializable payload on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to encode json: {err}"),
	}
}

/// Convert a plist value to JSON.
///
/// Data becomes base64, dates RFC 3339 text, UIDs `{"CF$UID": n}`, sets arrays,
/// and non-finite reals `null`.
pub(crate) fn value_to_json(value: &Value) -> JsonValue {
	match value {
		Value::Null => JsonValue::Null,
		Value::Boolean(v) => json!(v),
		Value::Integer(v) => json!(v),
		Value::Real(v) => serde_json::Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
		Value::String(v) => json!(v),
		Value::Date(v) => json!(v.format(DATE_FORMAT).to_string()),
		Value::Data(v) => json!(STANDARD.encode(v)),
		Value::Uid(v) => json!({ "CF$UID": v }),
		Value::Array(items) | Value::Set(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
		Value::Dict(dict) => {
			let fields: Map<String, JsonValue> = dict.iter().map(|(key, item)| (key.to_owned(), value_to_json(item))).collect();
			JsonValue::Object(fields)
		}
	}
}

/// Two-character binary version token, if any.
pub(crate) fn binary_version(format: SourceFormat) -> Option<String> {
	match format {
		SourceFormat::Binary { version } => Some(String::from_utf8_lossy(&version).into_owned()),
		SourceFormat::Xml => None,
	}
}

/// Element count of a container root.
pub(crate) fn entry_count(value: &Value) -> Option<usize> {
	match value {
		Value::Array(items) | Value::Set(items) => Some(items.len()),
		Value::Dict(dict) => Some(dict.len()),
		_ => None,
	}
}
