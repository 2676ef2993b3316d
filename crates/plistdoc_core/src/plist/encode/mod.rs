use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::partial_escape;
use tracing::debug;

use crate::plist::{PlistError, Result, Value, ValueKind};

/// Fixed document prefix, up to and including the `<plist>` open tag.
pub const PLIST_HEAD: &str = concat!(
	"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
	"<!DOCTYPE plist PUBLIC \"-//Apple Computer//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
	"<plist version=\"1.0\">\n",
);

/// Fixed document suffix.
pub const PLIST_FOOT: &str = "\n</plist>\n";

/// `strftime` pattern of `<date>` text, also valid RFC 3339.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const INDENT: &str = "  ";

/// Serialize `root` as a complete XML plist document.
pub fn to_xml(root: &Value) -> Result<String> {
	let body = body(root)?;
	let xml = format!("{PLIST_HEAD}{body}{PLIST_FOOT}");
	debug!(bytes = xml.len(), root = %root.kind(), "encoded xml plist");
	Ok(xml)
}

/// Serialize only the nodes inside `<plist>`, trimmed, for embedding.
pub fn to_xml_fragment(root: &Value) -> Result<String> {
	Ok(body(root)?.trim().to_owned())
}

fn body(root: &Value) -> Result<String> {
	match root {
		Value::Array(_) | Value::Dict(_) => {}
		other => return Err(PlistError::UnsupportedRoot { kind: other.kind() }),
	}

	let mut lines = Vec::new();
	write_value(&mut lines, root, 1)?;
	Ok(lines.join("\n"))
}

fn write_value(lines: &mut Vec<String>, value: &Value, level: usize) -> Result<()> {
	let indent = INDENT.repeat(level);
	match value {
		Value::Array(items) => {
			lines.push(format!("{indent}<array>"));
			for item in items {
				write_value(lines, item, level + 1)?;
			}
			lines.push(format!("{indent}</array>"));
		}
		Value::Dict(dict) => {
			lines.push(format!("{indent}<dict>"));
			for (key, item) in dict.iter() {
				lines.push(format!("{indent}{INDENT}<key>{}</key>", partial_escape(key)));
				write_value(lines, item, level + 1)?;
			}
			lines.push(format!("{indent}</dict>"));
		}
		Value::String(text) => lines.push(format!("{indent}<string>{}</string>", partial_escape(text.as_str()))),
		Value::Integer(number) => lines.push(format!("{indent}<integer>{number}</integer>")),
		Value::Real(number) => lines.push(format!("{indent}<real>{number:.6}</real>")),
		Value::Boolean(true) => lines.push(format!("{indent}<true/>")),
		Value::Boolean(false) => lines.push(format!("{indent}<false/>")),
		Value::Date(date) => lines.push(format!("{indent}<date>{}</date>", date.format(DATE_FORMAT))),
		// Null has no XML element of its own.
		Value::Null => lines.push(format!("{indent}<string></string>")),
		Value::Uid(uid) => lines.push(format!("{indent}<dict><key>CF$UID</key><integer>{uid}</integer></dict>")),
		Value::Data(bytes) => lines.push(format!("{indent}<data>{}</data>", STANDARD.encode(bytes))),
		Value::Set(_) => return Err(PlistError::UnsupportedValue { kind: ValueKind::Set }),
	}
	Ok(())
}
