use plistdoc::plist::{PLIST_FOOT, PLIST_HEAD};

use crate::cmd::test_support::{fixture_arg, run_plistdoc_ok};

#[test]
fn converts_binary_to_xml_document() {
	let fixture = fixture_arg("sample.bplist");
	let stdout = run_plistdoc_ok(&["xml", &fixture]);

	assert!(stdout.starts_with(PLIST_HEAD));
	assert!(stdout.ends_with(PLIST_FOOT));
	assert!(stdout.contains("    <key>icon</key>\n    <data>iVBORw0KGgo=</data>\n"));
	assert!(stdout.contains("<date>2023-07-04T10:20:30Z</date>"));
}

#[test]
fn fragment_drops_document_wrapper() {
	let fixture = fixture_arg("latin1.plist");
	let stdout = run_plistdoc_ok(&["xml", &fixture, "--fragment"]);

	assert!(stdout.starts_with("<dict>\n"));
	assert!(stdout.contains("<string>Caf\u{e9} Cr\u{e8}me</string>"));
	assert!(!stdout.contains("<plist"));
}
