use std::path::PathBuf;

use plistdoc::plist::{PlistDocument, Result, SourceFormat};
use tracing::debug;

use crate::cmd::util::{binary_version, emit_json, entry_count};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print format, encoding, and root summary.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let mut doc = PlistDocument::open(&path)?;
	let format = doc.format().unwrap_or(SourceFormat::Xml);
	debug!(path = %path.display(), format = format.as_str(), "loaded plist");

	let root = doc.parse()?;
	let root_kind = root.kind();
	let entries = entry_count(root);

	let payload = InfoJson {
		path: path.display().to_string(),
		format: format.as_str(),
		binary_version: binary_version(format),
		encoding: doc.encoding()?.map(str::to_owned),
		plist_version: doc.plist_version().map(str::to_owned),
		root: root_kind.as_str(),
		entries,
		bytes: doc.source().len(),
	};

	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", payload.path);
	println!("format: {}", payload.format);
	println!("binary_version: {}", payload.binary_version.as_deref().unwrap_or("-"));
	println!("encoding: {}", payload.encoding.as_deref().unwrap_or("-"));
	println!("plist_version: {}", payload.plist_version.as_deref().unwrap_or("-"));
	println!("root: {}", payload.root);
	match payload.entries {
		Some(count) => println!("entries: {count}"),
		None => println!("entries: -"),
	}
	println!("bytes: {}", payload.bytes);

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	format: &'static str,
	binary_version: Option<String>,
	encoding: Option<String>,
	plist_version: Option<String>,
	root: &'static str,
	entries: Option<usize>,
	bytes: usize,
}

#[cfg(test)]
mod tests;
