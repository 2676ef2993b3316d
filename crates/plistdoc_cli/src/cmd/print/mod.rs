use plistdoc::plist::{DATE_FORMAT, Value};

/// Output truncation limits for printed value trees.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum container nesting printed before eliding.
	pub max_depth: u32,
	/// Maximum elements printed per array, set, or dict.
	pub max_items: usize,
	/// Maximum Unicode scalar values printed per string.
	pub max_string_len: usize,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_depth: 8,
			max_items: 32,
			max_string_len: 200,
		}
	}
}

/// Print one value tree on stdout.
pub fn print_value(value: &Value, options: PrintOptions) {
	for line in render_value(value, options) {
		println!("{line}");
	}
}

/// Render a value tree as indented lines.
pub fn render_value(value: &Value, options: PrintOptions) -> Vec<String> {
	let mut lines = Vec::new();
	write_value(&mut lines, value, 0, "", 0, options);
	lines
}

fn write_value(lines: &mut Vec<String>, value: &Value, indent: usize, label: &str, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Array(items) | Value::Set(items) => {
			let open = if matches!(value, Value::Set(_)) { "set [" } else { "[" };
			if depth >= options.max_depth {
				lines.push(format!("{pad}{label}{open}... {} items]", items.len()));
				return;
			}
			lines.push(format!("{pad}{label}{open}"));
			for item in items.iter().take(options.max_items) {
				write_value(lines, item, indent + 2, "", depth + 1, options);
			}
			if items.len() > options.max_items {
				lines.push(format!("{pad}  ... {} more", items.len() - options.max_items));
			}
			lines.push(format!("{pad}]"));
		}
		Value::Dict(dict) => {
			if depth >= options.max_depth {
				lines.push(format!("{pad}{label}{{ ... {} entries }}", dict.len()));
				return;
			}
			lines.push(format!("{pad}{label}{{"));
			for (key, item) in dict.iter().take(options.max_items) {
				write_value(lines, item, indent + 2, &format!("{key} = "), depth + 1, options);
			}
			if dict.len() > options.max_items {
				lines.push(format!("{pad}  ... {} more", dict.len() - options.max_items));
			}
			lines.push(format!("{pad}}}"));
		}
		scalar => lines.push(format!("{pad}{label}{}", scalar_label(scalar, options))),
	}
}

fn scalar_label(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Boolean(v) => v.to_string(),
		Value::Integer(v) => v.to_string(),
		Value::Real(v) => v.to_string(),
		Value::String(v) => format!("\"{}\"", truncate(v, options.max_string_len)),
		Value::Date(v) => v.format(DATE_FORMAT).to_string(),
		Value::Data(v) => format!("data[{}]", v.len()),
		Value::Uid(v) => format!("uid({v})"),
		Value::Array(_) | Value::Set(_) | Value::Dict(_) => value.kind().to_string(),
	}
}

fn truncate(text: &str, max: usize) -> String {
	let mut out: String = text.chars().take(max).collect();
	if text.chars().nth(max).is_some() {
		out.push_str("...");
	}
	out
}
