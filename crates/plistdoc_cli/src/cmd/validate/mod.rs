use std::path::PathBuf;

use plistdoc::plist::{PlistDocument, Result, Schema, ValueKind};
use tracing::debug;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, value_enum)]
	pub preset: Option<Preset>,
	/// Extra `key=kind` requirement; repeatable.
	#[arg(long = "require", value_parser = parse_requirement)]
	pub require: Vec<(String, ValueKind)>,
}

/// Built-in schemas for Munki documents.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Preset {
	/// `catalogs` array.
	Manifest,
	/// `catalogs` array and `installer_item_location` string.
	Pkginfo,
}

/// Parse and validate a plist, printing `ok` on success.
pub fn run(args: Args) -> Result<()> {
	let Args { path, preset, require } = args;

	let mut schema = match preset {
		Some(Preset::Manifest) => Schema::munki_manifest(),
		Some(Preset::Pkginfo) => Schema::munki_package_info(),
		None => Schema::new(),
	};
	for (key, kind) in require {
		schema = schema.require(key, kind);
	}
	debug!(path = %path.display(), rules = schema.iter().count(), "validating plist");

	let mut doc = PlistDocument::open(&path)?.with_schema(schema);
	doc.parse()?;
	println!("ok");
	Ok(())
}

fn parse_requirement(value: &str) -> std::result::Result<(String, ValueKind), String> {
	let (key, kind) = value.split_once('=').ok_or_else(|| format!("expected key=kind, got {value:?}"))?;
	if key.is_empty() {
		return Err(format!("empty key in {value:?}"));
	}

	let kind = ValueKind::from_label(kind).ok_or_else(|| {
		let labels: Vec<&str> = ValueKind::ALL.iter().map(|kind| kind.as_str()).collect();
		format!("unknown kind {kind:?} (expected one of {})", labels.join(", "))
	})?;
	Ok((key.to_owned(), kind))
}

#[cfg(test)]
mod tests;
