use crate::cmd::test_support::{fixture_arg, run_plistdoc_json, run_plistdoc_ok};

#[test]
fn show_json_converts_binary_values() {
	let fixture = fixture_arg("sample.bplist");
	let json = run_plistdoc_json(&["show", &fixture, "--json"]);

	assert_eq!(json["format"], "binary");
	assert_eq!(json["root"], "dict");
	let value = &json["value"];
	assert_eq!(value["name"], "Firefox");
	assert_eq!(value["icon"], "iVBORw0KGgo=");
	assert_eq!(value["creation_date"], "2023-07-04T10:20:30Z");
	assert_eq!(value["ratio"], 0.5);
	assert!(value["numbers"].as_array().is_some_and(|items| items.len() == 20));
}

#[test]
fn show_text_honors_item_limit() {
	let fixture = fixture_arg("manifest.plist");
	let stdout = run_plistdoc_ok(&["show", &fixture, "--max-items", "1"]);

	assert!(stdout.contains("value:"));
	assert!(stdout.contains("catalogs = ["));
	assert!(stdout.contains("... 2 more"));
	assert!(!stdout.contains("managed_installs"));
}
