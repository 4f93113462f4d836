//! End-to-end comparison tests.
//!
//! Case directories live under `tests/resources/cases/`. Each holds a
//! `control.xml`, a `test.xml` and an `expected.txt` listing the expected
//! difference messages in order, one per line (`#` starts a comment; no
//! messages means the documents must be equivalent).

use std::fs;
use std::path::{Path, PathBuf};

use xmlcmp::{
    compare_str, CompareOptions, DifferenceCategory, Error, MatchingPolicy, XmlComparer,
};

fn cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/resources/cases")
}

fn expected_messages(case_dir: &Path) -> Vec<String> {
    let content = fs::read_to_string(case_dir.join("expected.txt")).unwrap();
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_resource_cases() {
    let mut case_dirs: Vec<PathBuf> = fs::read_dir(cases_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_dir())
        .collect();
    case_dirs.sort();
    assert!(!case_dirs.is_empty(), "no test cases found");

    let mut failures = Vec::new();
    for case_dir in &case_dirs {
        let name = case_dir.file_name().unwrap().to_string_lossy().into_owned();
        let comparer =
            XmlComparer::with_options(CompareOptions::default().with_resource_root(case_dir));
        let result = comparer
            .compare_resources("control.xml", "test.xml")
            .unwrap_or_else(|e| panic!("{}: {}", name, e));

        let actual: Vec<String> = result.messages().into_iter().map(str::to_string).collect();
        let expected = expected_messages(case_dir);
        if actual != expected {
            failures.push(format!(
                "{}:\n  expected: {:#?}\n  actual:   {:#?}",
                name, expected, actual
            ));
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_reflexive_on_resources() {
    let comparer =
        XmlComparer::with_options(CompareOptions::default().with_resource_root(cases_dir()));
    for case in ["catalog_reordered", "inventory", "attribute_change"] {
        for side in ["control.xml", "test.xml"] {
            let path = format!("{}/{}", case, side);
            let result = comparer.compare_resources(&path, &path).unwrap();
            assert!(result.is_equivalent(), "{}: {}", path, result);
        }
    }
}

#[test]
fn test_reordered_siblings_are_equivalent() {
    let result = compare_str("<root><a/><b/></root>", "<root><b/><a/></root>").unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_text_difference_message() {
    let result = compare_str(
        r#"<root><item id="1">x</item></root>"#,
        r#"<root><item id="1">y</item></root>"#,
    )
    .unwrap();
    assert_eq!(
        result.messages(),
        vec![r#"Text mismatch at /root/item: expected "x" but found "y""#]
    );
    assert_eq!(result.differences()[0].category(), DifferenceCategory::Value);
}

#[test]
fn test_removed_element_is_missing() {
    let result = compare_str(r#"<root><item id="1"/></root>"#, "<root></root>").unwrap();
    assert_eq!(result.len(), 1);
    let record = &result.differences()[0];
    assert_eq!(record.category(), DifferenceCategory::StructureMissing);
    assert!(record.message().contains("/root/item"));
}

#[test]
fn test_added_element_is_extra() {
    let result = compare_str("<root><a/></root>", "<root><a/><b/></root>").unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.differences()[0].category(),
        DifferenceCategory::StructureExtra
    );
    assert!(result.messages()[0].contains("/root/b"));
}

#[test]
fn test_whitespace_only_changes_are_ignored() {
    let result = compare_str(
        "<doc><p>Hello   world</p></doc>",
        "<doc>\n\t<p>\n  Hello\n  world\n</p>\n</doc>",
    )
    .unwrap();
    assert!(result.is_equivalent(), "{}", result);
}

#[test]
fn test_single_attribute_change_is_one_record() {
    // Nested element: reported once, as an unmatched element showing both sides
    let result = compare_str(
        r#"<root><item id="1" price="10"/><item id="2" price="20"/></root>"#,
        r#"<root><item id="2" price="20"/><item id="1" price="11"/></root>"#,
    )
    .unwrap();
    assert_eq!(result.len(), 1, "{}", result);
    let message = result.messages()[0];
    assert!(message.contains(r#"price="10""#));
    assert!(message.contains(r#"price="11""#));

    // By-name matching reports the attribute itself
    let comparer =
        XmlComparer::with_options(CompareOptions::default().with_matching(MatchingPolicy::ByName));
    let result = comparer
        .compare_str(
            r#"<root><item price="10"/></root>"#,
            r#"<root><item price="11"/></root>"#,
        )
        .unwrap();
    assert_eq!(result.len(), 1, "{}", result);
    assert_eq!(
        result.differences()[0].category(),
        DifferenceCategory::AttributeValue
    );
    assert!(result.messages()[0].contains("attribute 'price' expected \"10\" but found \"11\""));
}

#[test]
fn test_missing_attribute_on_root() {
    let result = compare_str(r#"<root a="1" b="2"/>"#, r#"<root a="1"/>"#).unwrap();
    assert_eq!(
        result.messages(),
        vec![r#"Attribute mismatch at /root/@b: attribute 'b' expected "2" but found <absent>"#]
    );
}

#[test]
fn test_comments_and_processing_instructions_are_ignored() {
    let result = compare_str(
        "<?xml version=\"1.0\"?><!-- a --><root><?pi x?><a/></root>",
        "<root><!-- b --><a/></root>",
    )
    .unwrap();
    assert!(result.is_equivalent(), "{}", result);
}

#[test]
fn test_different_root_names() {
    let result = compare_str("<order/>", "<invoice/>").unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.differences()[0].category(),
        DifferenceCategory::StructureOther
    );
    assert!(result.messages()[0].contains("element name"));
}

#[test]
fn test_root_prefix_is_ignored_but_child_names_stay_qualified() {
    let result = compare_str(
        r#"<a:doc xmlns:a="urn:x"><a:item/></a:doc>"#,
        r#"<b:doc xmlns:b="urn:x"><b:item/></b:doc>"#,
    )
    .unwrap();
    assert_eq!(
        result.messages(),
        vec![
            "Missing element at /a:doc/a:item: <a:item> is not present in the test document",
            "Extra element at /b:doc/b:item: <b:item> is not present in the control document",
        ]
    );
}

#[test]
fn test_non_breaking_space_is_content() {
    let result = compare_str("<r><p>10\u{a0}EUR</p></r>", "<r><p>10 EUR</p></r>").unwrap();
    assert_eq!(result.len(), 1, "{}", result);
    assert_eq!(result.differences()[0].category(), DifferenceCategory::Value);
    assert!(result.messages()[0].starts_with("Text mismatch at /r/p"));
}

#[test]
fn test_text_replaced_by_element_names_the_text() {
    let result = compare_str("<r><a>important</a></r>", "<r><a><b/></a></r>").unwrap();
    assert_eq!(
        result.messages(),
        vec![
            "Extra element at /r/a/b: <b> is not present in the control document \
             (it replaces control text \"important\")"
        ]
    );
}

#[test]
fn test_deeply_nested_documents() {
    let depth = 10_000;
    let nested = |leaf: &str| format!("{}{}{}", "<a>".repeat(depth), leaf, "</a>".repeat(depth));

    assert!(compare_str(&nested("x"), &nested("x")).unwrap().is_equivalent());

    let result = compare_str(&nested("x"), &nested("y")).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result.messages()[0].ends_with(r#"expected "x" but found "y""#));
}

#[test]
fn test_wide_reversed_sibling_list() {
    let items = |order: Vec<usize>| {
        let body: String = order
            .iter()
            .map(|n| format!(r#"<i n="{}"/>"#, n))
            .collect();
        format!("<r>{}</r>", body)
    };
    let count = 20_000;
    let result = compare_str(&items((0..count).collect()), &items((0..count).rev().collect()))
        .unwrap();
    assert!(result.is_equivalent(), "{}", result.len());
}

#[test]
fn test_missing_resource_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("control.xml"), "<root/>").unwrap();

    let comparer =
        XmlComparer::with_options(CompareOptions::default().with_resource_root(dir.path()));
    let err = comparer
        .compare_resources("control.xml", "absent.xml")
        .unwrap_err();
    assert!(matches!(err, Error::ResourceNotFound { ref path } if path == "absent.xml"));
}

#[test]
fn test_malformed_resource_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("control.xml"), "<root/>").unwrap();
    fs::write(dir.path().join("test.xml"), "<root>\n  <open>\n</root>").unwrap();

    let comparer =
        XmlComparer::with_options(CompareOptions::default().with_resource_root(dir.path()));
    let err = comparer
        .compare_resources("control.xml", "test.xml")
        .unwrap_err();
    match err {
        Error::MalformedXml { path, line, .. } => {
            assert_eq!(path, "test.xml");
            assert!(line >= 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_invalid_utf8_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("control.xml"), b"<root>\xff</root>").unwrap();
    fs::write(dir.path().join("test.xml"), "<root/>").unwrap();

    let comparer =
        XmlComparer::with_options(CompareOptions::default().with_resource_root(dir.path()));
    let err = comparer
        .compare_resources("control.xml", "test.xml")
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.is_broken_document());
}

#[test]
fn test_assert_macro() {
    xmlcmp::assert_xml_equivalent!(
        String::from("<list><i>1</i><i>2</i></list>"),
        "<list><i>2</i><i>1</i></list>",
    );
}

#[test]
fn test_comparisons_run_on_threads() {
    let comparer = std::sync::Arc::new(XmlComparer::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let comparer = comparer.clone();
            std::thread::spawn(move || {
                let control = format!("<r><v>{}</v><w/></r>", i);
                let test = format!("<r><w/><v>{}</v></r>", i);
                comparer.compare_str(&control, &test).unwrap().is_equivalent()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
