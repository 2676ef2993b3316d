use std::path::PathBuf;

use plistdoc::plist::{PlistDocument, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub fragment: bool,
}

/// Print contents as canonical XML, converting binary input.
pub fn run(args: Args) -> Result<()> {
	let Args { path, fragment } = args;

	let mut doc = PlistDocument::open(&path)?;
	doc.parse()?;

	if fragment {
		println!("{}", doc.to_xml_fragment()?);
	} else {
		print!("{}", doc.to_xml()?);
	}
	Ok(())
}

#[cfg(test)]
mod tests;
