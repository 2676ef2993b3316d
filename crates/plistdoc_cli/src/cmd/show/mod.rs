use std::path::PathBuf;

use plistdoc::plist::{PlistDocument, Result, SourceFormat};

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::{emit_json, value_to_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
}

/// Decode a plist and print its value tree; limits apply to text output only.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		max_depth,
		max_items,
	} = args;

	let mut doc = PlistDocument::open(&path)?;
	let format = doc.format().unwrap_or(SourceFormat::Xml);
	let root = doc.parse()?;

	if json {
		let payload = ShowJson {
			path: path.display().to_string(),
			format: format.as_str(),
			root: root.kind().as_str(),
			value: value_to_json(root),
		};
		emit_json(&payload);
		return Ok(());
	}

	let mut print = PrintOptions::default();
	if let Some(depth) = max_depth {
		print.max_depth = depth;
	}
	if let Some(items) = max_items {
		print.max_items = items;
	}

	println!("path: {}", path.display());
	println!("format: {}", format.as_str());
	println!("value:");
	print_value(root, print);

	Ok(())
}

#[derive(serde::Serialize)]
struct ShowJson {
	path: String,
	format: &'static str,
	root: &'static str,
	value: serde_json::Value,
}

#[cfg(test)]
mod tests;
