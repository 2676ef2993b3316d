use plistdoc::plist::ValueKind;

use super::parse_requirement;
use crate::cmd::test_support::{fixture_arg, run_plistdoc, run_plistdoc_err, run_plistdoc_ok};

#[test]
fn parses_key_kind_pairs() {
	assert_eq!(
		parse_requirement("catalogs=array").expect("valid pair"),
		("catalogs".to_owned(), ValueKind::Array)
	);
	assert!(parse_requirement("catalogs").is_err());
	assert!(parse_requirement("=array").is_err());
	assert!(parse_requirement("catalogs=list").is_err());
}

#[test]
fn manifest_preset_accepts_manifest() {
	let fixture = fixture_arg("manifest.plist");
	assert_eq!(run_plistdoc_ok(&["validate", &fixture, "--preset", "manifest"]), "ok\n");
}

#[test]
fn pkginfo_preset_accepts_pkginfo() {
	let fixture = fixture_arg("pkginfo.plist");
	assert_eq!(run_plistdoc_ok(&["validate", &fixture, "--preset", "pkginfo"]), "ok\n");
}

#[test]
fn pkginfo_preset_requires_installer_location() {
	let fixture = fixture_arg("latin1.plist");
	let stderr = run_plistdoc_err(&["validate", &fixture, "--preset", "pkginfo"]);
	assert!(stderr.contains("missing element installer_item_location"), "unexpected stderr: {stderr}");
}

#[test]
fn extra_requirements_check_kinds() {
	let fixture = fixture_arg("pkginfo.plist");
	let stderr = run_plistdoc_err(&["validate", &fixture, "--require", "name=integer"]);
	assert!(
		stderr.contains("invalid type for element name: got string, expected integer"),
		"unexpected stderr: {stderr}"
	);
}

#[test]
fn bad_requirement_is_a_usage_error() {
	let fixture = fixture_arg("pkginfo.plist");
	let output = run_plistdoc(&["validate", &fixture, "--require", "name=bogus"]);
	assert_eq!(output.status.code(), Some(2));
}
