use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use plistdoc_testkit::{fixture_path as shared_fixture_path, target_dir as workspace_target_dir};

static PLISTDOC_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn fixture_arg(name: &str) -> String {
	shared_fixture_path(name).to_string_lossy().into_owned()
}

pub(crate) fn run_plistdoc(args: &[&str]) -> Output {
	Command::new(plistdoc_bin()).args(args).output().expect("plistdoc command executes")
}

pub(crate) fn run_plistdoc_ok(args: &[&str]) -> String {
	let output = run_plistdoc(args);
	assert!(
		output.status.success(),
		"plistdoc command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout should be utf-8")
}

pub(crate) fn run_plistdoc_json(args: &[&str]) -> serde_json::Value {
	let stdout = run_plistdoc_ok(args);
	serde_json::from_str(&stdout).expect("stdout should be valid json")
}

pub(crate) fn run_plistdoc_err(args: &[&str]) -> String {
	let output = run_plistdoc(args);
	assert_eq!(output.status.code(), Some(1), "expected failure exit status");
	String::from_utf8_lossy(&output.stderr).into_owned()
}

fn plistdoc_bin() -> &'static PathBuf {
	PLISTDOC_BIN.get_or_init(resolve_plistdoc_bin)
}

fn resolve_plistdoc_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_plistdoc") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "plistdoc.exe" } else { "plistdoc" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "plistdoc"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build plistdoc binary at {}", bin.display());

	bin
}
