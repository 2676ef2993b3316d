#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "plistdoc", about = "Apple property list inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print format, encoding, and root summary.
	Info(cmd::info::Args),
	/// Print the decoded value tree.
	Show(cmd::show::Args),
	/// Re-encode as canonical XML.
	Xml(cmd::xml::Args),
	/// Check required keys and kinds.
	Validate(cmd::validate::Args),
}

fn main() {
	init_tracing();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();
}

fn run() -> plistdoc::plist::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Show(args) => cmd::show::run(args),
		Commands::Xml(args) => cmd::xml::run(args),
		Commands::Validate(args) => cmd::validate::run(args),
	}
}
