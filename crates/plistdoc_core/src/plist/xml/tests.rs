use chrono::{TimeZone, Utc};

use crate::plist::{DecodeOptions, Dict, ErrorKind, PLIST_FOOT, PLIST_HEAD, PlistError, Value, decode_xml};

fn decode(text: &str) -> crate::plist::Result<Value> {
	decode_xml(text.as_bytes(), &DecodeOptions::default()).map(|doc| doc.root)
}

fn wrap(body: &str) -> String {
	format!("{PLIST_HEAD}{body}{PLIST_FOOT}")
}

#[test]
fn decodes_every_leaf_type() {
	let root = decode(&wrap(
		r#"	<dict>
		<key>name</key>
		<string>Firefox</string>
		<key>size</key>
		<integer>-42</integer>
		<key>ratio</key>
		<real>0.5</real>
		<key>when</key>
		<date>2024-03-01T12:30:00Z</date>
		<key>enabled</key>
		<true/>
		<key>hidden</key>
		<false/>
		<key>blob</key>
		<data>
		AAEC
		/w==
		</data>
		<key>catalogs</key>
		<array>
			<string>testing</string>
			<string>production</string>
		</array>
	</dict>"#,
	))
	.expect("document decodes");

	let dict = root.as_dict().expect("dict root");
	assert_eq!(dict.len(), 8);
	assert_eq!(root.get("name").and_then(Value::as_str), Some("Firefox"));
	assert_eq!(root.get("size").and_then(Value::as_i64), Some(-42));
	assert_eq!(root.get("ratio").and_then(Value::as_f64), Some(0.5));
	assert_eq!(
		root.get("when").and_then(Value::as_date),
		Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
	);
	assert_eq!(root.get("enabled").and_then(Value::as_bool), Some(true));
	assert_eq!(root.get("hidden").and_then(Value::as_bool), Some(false));
	assert_eq!(root.get("blob").and_then(Value::as_data), Some(&[0, 1, 2, 0xff][..]));
	assert_eq!(
		root.get("catalogs"),
		Some(&Value::Array(vec![Value::from("testing"), Value::from("production")]))
	);
}

#[test]
fn self_closing_forms_are_start_and_end() {
	let root = decode("<plist><array><dict/><array/><string/><data/><true/></array></plist>").expect("decodes");
	assert_eq!(
		root,
		Value::Array(vec![
			Value::Dict(Dict::new()),
			Value::Array(Vec::new()),
			Value::Null,
			Value::Null,
			Value::Boolean(true),
		])
	);
}

#[test]
fn empty_plist_is_empty_dict() {
	assert_eq!(decode("<plist version=\"1.0\"/>").expect("decodes"), Value::Dict(Dict::new()));
	assert_eq!(decode("<plist></plist>").expect("decodes"), Value::Dict(Dict::new()));
}

#[test]
fn concatenates_split_character_data() {
	let root = decode("<plist><array><string>a &amp; <![CDATA[<b>]]> c</string><string>x<!-- note -->y</string></array></plist>")
		.expect("decodes");
	assert_eq!(root, Value::Array(vec![Value::from("a & <b> c"), Value::from("xy")]));
}

#[test]
fn preserves_string_whitespace_but_not_bare_newlines() {
	let root = decode("<plist><array><string>  padded  </string><string>\n</string></array></plist>").expect("decodes");
	assert_eq!(root, Value::Array(vec![Value::from("  padded  "), Value::Null]));
}

#[test]
fn empty_text_leaves_decode_as_null() {
	let root = decode(concat!(
		"<plist><dict>",
		"<key>a</key><integer></integer>",
		"<key>b</key><string>\n</string>",
		"<key>c</key><date></date>",
		"<key>d</key><real>\r\n</real>",
		"<key>e</key><data></data>",
		"<key>f</key><integer>1</integer>",
		"</dict></plist>"
	))
	.expect("decodes");

	let dict = root.as_dict().expect("dict root");
	assert_eq!(dict.len(), 6);
	for key in ["a", "b", "c", "d", "e"] {
		assert_eq!(root.get(key), Some(&Value::Null), "{key}");
	}
	assert_eq!(root.get("f"), Some(&Value::Integer(1)));
}

#[test]
fn records_version_and_missing_encoding() {
	let doc = decode_xml(wrap("<dict/>").as_bytes(), &DecodeOptions::default()).expect("decodes");
	assert_eq!(doc.version.as_deref(), Some("1.0"));
	assert_eq!(doc.encoding.as_deref(), Some("utf-8"));

	let bare = decode_xml(b"<plist><dict/></plist>", &DecodeOptions::default()).expect("decodes");
	assert_eq!(bare.version, None);
	assert_eq!(bare.encoding, None);
}

#[test]
fn honors_declared_latin1() {
	let mut bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<plist version=\"1.0\"><dict><key>name</key><string>caf".to_vec();
	bytes.push(0xe9);
	bytes.extend_from_slice(b"</string></dict></plist>\n");

	let doc = decode_xml(&bytes, &DecodeOptions::default()).expect("latin-1 decodes");
	assert_eq!(doc.encoding.as_deref(), Some("iso-8859-1"));
	assert_eq!(doc.root.get("name").and_then(Value::as_str), Some("caf\u{e9}"));
	assert!(doc.text.contains("caf\u{e9}"));
}

#[test]
fn invalid_utf8_without_declaration_is_malformed() {
	let err = decode_xml(b"<plist><string>\xff</string></plist>", &DecodeOptions::default()).expect_err("not utf-8");
	assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn unknown_encoding_is_invalid() {
	let err = decode_xml(b"<?xml version=\"1.0\" encoding=\"klingon\"?><plist/>", &DecodeOptions::default())
		.expect_err("unknown label");
	assert!(matches!(&err, PlistError::UnsupportedEncoding { label } if label == "klingon"));
	assert_eq!(err.kind(), ErrorKind::Invalid);
}

#[test]
fn byte_order_mark_wins() {
	let mut bytes = vec![0xef, 0xbb, 0xbf];
	bytes.extend_from_slice(b"<plist><string>ok</string></plist>");
	assert_eq!(decode_xml(&bytes, &DecodeOptions::default()).expect("decodes").root, Value::from("ok"));
}

#[test]
fn rejects_unknown_elements() {
	let err = decode("<plist><dict><key>a</key><banana/></dict></plist>").expect_err("unknown element");
	assert!(matches!(&err, PlistError::UnknownElement { name } if name == "banana"));
	assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn document_must_start_with_plist() {
	let err = decode("<dict></dict>").expect_err("no plist wrapper");
	assert!(matches!(err, PlistError::UnexpectedElement { name: "dict", .. }));
}

#[test]
fn plain_text_is_malformed() {
	let err = decode("not-a-plist").expect_err("plain text");
	assert!(matches!(err, PlistError::MalformedXml { .. }));
}

#[test]
fn rejects_structural_violations() {
	let cases = [
		("<plist><key>a</key></plist>", "<key> outside a dict"),
		("<plist><array><key>a</key></array></plist>", "<key> outside a dict"),
		("<plist><dict><key>a</key><key>b</key></dict></plist>", "two keys in a row"),
		("<plist><dict><string>a</string></dict></plist>", "dict value without a key"),
		("<plist><dict><key>a</key></dict></plist>", "key without a value"),
		("<plist><string><integer>1</integer></string></plist>", "child element inside a leaf"),
		("<plist><dict/><dict/></plist>", "second root value"),
		("<plist><plist/></plist>", "nested <plist>"),
		("<plist/><plist/>", "content after </plist>"),
	];

	for (text, expected) in cases {
		let err = decode(text).expect_err(text);
		assert!(
			matches!(err, PlistError::UnexpectedElement { reason, .. } if reason == expected),
			"{text}: {err}"
		);
	}
}

#[test]
fn rejects_truncated_and_mismatched_documents() {
	for text in ["<plist><dict>", "<plist><array></dict></plist>", "", "<plist/>trailing"] {
		let err = decode(text).expect_err(text);
		assert!(matches!(err, PlistError::MalformedXml { .. }), "{text:?}: {err}");
	}
}

#[test]
fn rejects_bad_leaf_text() {
	let cases = [
		"<plist><integer> </integer></plist>",
		"<plist><integer>12abc</integer></plist>",
		"<plist><real>fast</real></plist>",
		"<plist><date>yesterday</date></plist>",
		"<plist><date>  </date></plist>",
		"<plist><data>!!!</data></plist>",
	];

	for text in cases {
		let err = decode(text).expect_err(text);
		assert!(matches!(err, PlistError::InvalidXmlValue { .. }), "{text}: {err}");
	}
}

#[test]
fn later_duplicate_key_wins() {
	let root = decode("<plist><dict><key>a</key><integer>1</integer><key>a</key><integer>2</integer></dict></plist>")
		.expect("decodes");
	assert_eq!(root.as_dict().map(Dict::len), Some(1));
	assert_eq!(root.get("a"), Some(&Value::Integer(2)));
}

#[test]
fn depth_limit_applies_to_nesting() {
	let text = "<plist><array><array><array><array/></array></array></array></plist>";
	let opt = DecodeOptions {
		max_depth: 2,
		..DecodeOptions::default()
	};
	let err = decode_xml(text.as_bytes(), &opt).expect_err("too deep");
	assert!(matches!(err, PlistError::DepthExceeded { max_depth: 2 }));
	assert!(decode(text).is_ok());
}
