use crate::cmd::test_support::{fixture_arg, run_plistdoc_err, run_plistdoc_json, run_plistdoc_ok};

#[test]
fn info_json_reports_binary_format() {
	let fixture = fixture_arg("sample.bplist");
	let json = run_plistdoc_json(&["info", &fixture, "--json"]);

	assert_eq!(json["format"], "binary");
	assert_eq!(json["binary_version"], "00");
	assert_eq!(json["root"], "dict");
	assert_eq!(json["entries"], 11);
	assert!(json["encoding"].is_null());
	assert!(json["plist_version"].is_null());
}

#[test]
fn info_json_reports_declared_encoding() {
	let fixture = fixture_arg("latin1.plist");
	let json = run_plistdoc_json(&["info", &fixture, "--json"]);

	assert_eq!(json["format"], "xml");
	assert_eq!(json["encoding"], "iso-8859-1");
	assert_eq!(json["plist_version"], "1.0");
	assert!(json["bytes"].as_u64().is_some_and(|item| item > 0));
}

#[test]
fn info_text_lists_fields() {
	let fixture = fixture_arg("manifest.plist");
	let stdout = run_plistdoc_ok(&["info", &fixture]);

	assert!(stdout.contains("format: xml"));
	assert!(stdout.contains("binary_version: -"));
	assert!(stdout.contains("entries: 3"));
}

#[test]
fn info_missing_file_fails() {
	let fixture = fixture_arg("missing.plist");
	let stderr = run_plistdoc_err(&["info", &fixture]);
	assert!(stderr.starts_with("error: io:"), "unexpected stderr: {stderr}");
}
