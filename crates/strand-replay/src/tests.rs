use std::fs;
use std::path::{Path, PathBuf};

use expect_test::expect_file;
use strand_tree::{NodeKind, TextSize};

use crate::{Call, ReplayError, Script};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    script: PathBuf,
    expected: PathBuf,
    json: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "json" {
                    let expected = path.with_extension("tree");
                    let json = fs::read_to_string(&path).ok()?;
                    Some(Self { script: path, expected, json })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

#[test]
fn replay() {
    let cases = TestCase::list();
    assert!(!cases.is_empty());

    for case in cases {
        let script = Script::from_json(&case.json)
            .unwrap_or_else(|err| panic!("{}: {err}", case.script.display()));
        let text = script.text.clone().unwrap_or_default();
        let model = script
            .replay(&text)
            .unwrap_or_else(|err| panic!("{}: {err}", case.script.display()));
        model.check_invariants().unwrap();

        let diagnostics: String = model
            .diagnostics()
            .iter()
            .map(|d| format!("  {:?} {}\n", d.range(), d.message()))
            .collect();
        let actual = format!("{}Errors:\n{diagnostics}", model.debug_tree());
        expect_file![&case.expected].assert_eq(&actual);
    }
}

fn replay_error(text: &str, calls: &str) -> ReplayError {
    let script = Script::from_json(&format!(r#"{{ "calls": [{calls}] }}"#)).unwrap();
    script.replay(text).unwrap_err()
}

#[test]
fn omitted_fields_take_defaults() {
    let script = Script::from_json(
        r#"{ "calls": [
            { "op": "composite" },
            { "op": "leaf", "offset": 0, "length": 1, "parent": 1 }
        ] }"#,
    )
    .unwrap();
    assert_eq!(script.text, None);
    assert_eq!(script.calls, [
        Call::Composite { grammar: None, lookahead: 0, parent: None },
        Call::Leaf { offset: 0, length: 1, grammar: None, hidden: false, error: None, parent: 1 },
    ]);
}

#[test]
fn leaf_error_and_issue_data_are_kept() {
    let script = Script::from_json(
        r#"{ "calls": [
            { "op": "leaf", "offset": 0, "length": 1, "error": "stray", "parent": 0 },
            { "op": "error", "node": 1, "message": "bad", "issue_code": "E1",
              "issue_data": ["x", "y"] }
        ] }"#,
    )
    .unwrap();
    let model = script.replay("?").unwrap();

    let leaf = model.leaf_at_offset(TextSize::new(0)).unwrap();
    assert_eq!(leaf.kind(), NodeKind::LeafWithSyntaxError);
    let error = leaf.syntax_error().unwrap();
    assert_eq!(error.message(), "bad");
    assert_eq!(error.issue_code(), Some("E1"));
    assert_eq!(error.issue_data(), ["x", "y"]);
}

#[test]
fn handles_follow_replacements() {
    let script = Script::from_json(
        r#"{ "calls": [
            { "op": "composite", "parent": 0 },
            { "op": "leaf", "offset": 0, "length": 1, "parent": 1 },
            { "op": "error", "node": 1, "message": "first" },
            { "op": "compress", "node": 1 },
            { "op": "error", "node": 1, "message": "second" },
            { "op": "leaf", "offset": 1, "length": 1, "parent": 1 }
        ] }"#,
    )
    .unwrap();
    let model = script.replay("ab").unwrap();

    let composite = model.root().first_child().unwrap();
    assert_eq!(composite.kind(), NodeKind::CompositeWithSyntaxError);
    assert_eq!(composite.syntax_error().map(|it| it.message()), Some("second"));
    assert_eq!(composite.children().count(), 2);
    model.check_invariants().unwrap();
}

#[test]
fn malformed_json() {
    let error = Script::from_json(r#"{ "calls": [{ "op": "explode" }] }"#).unwrap_err();
    assert!(matches!(error, ReplayError::Json(_)), "{error}");
}

#[test]
fn text_mismatch() {
    let script = Script::from_json(r#"{ "text": "a", "calls": [] }"#).unwrap();
    assert!(matches!(script.replay("b"), Err(ReplayError::TextMismatch)));
    assert!(script.replay("a").is_ok());
}

#[test]
fn rejected_calls() {
    let check = |text: &str, calls: &str, expected: &str| {
        assert_eq!(replay_error(text, calls).to_string(), expected, "{calls}");
    };

    check("", r#"{ "op": "composite", "parent": 1 }"#, "call 0: unknown handle 1");
    check(
        "ab",
        r#"{ "op": "leaf", "offset": 0, "length": 1, "parent": 0 },
           { "op": "leaf", "offset": 1, "length": 1, "parent": 1 }"#,
        "call 1: handle 1 is a leaf and cannot have children",
    );
    check(
        "ab",
        r#"{ "op": "leaf", "offset": 1, "length": 2, "parent": 0 }"#,
        "call 0: leaf at 1 of length 2 exceeds the text length 2",
    );
    check(
        "é",
        r#"{ "op": "leaf", "offset": 0, "length": 1, "parent": 0 }"#,
        "call 0: leaf at 0 of length 1 splits a character",
    );
    check(
        "",
        r#"{ "op": "error", "node": 0, "message": "x" }"#,
        "call 0: the root cannot be marked as a syntax error",
    );
    check("", r#"{ "op": "wrap", "node": 0 }"#, "call 0: the root cannot be wrapped");
    check(
        "",
        r#"{ "op": "add_child", "parent": 0, "child": 0 }"#,
        "call 0: the root cannot be a child",
    );
    check(
        "",
        r#"{ "op": "composite" }, { "op": "wrap", "node": 1 }"#,
        "call 1: handle 1 has no parent",
    );
    check(
        "",
        r#"{ "op": "composite" }, { "op": "compress", "node": 1 }"#,
        "call 1: handle 1 has no parent",
    );
    check(
        "",
        r#"{ "op": "composite", "parent": 0 }, { "op": "add_child", "parent": 0, "child": 1 }"#,
        "call 1: handle 1 is already linked",
    );
    check(
        "",
        r#"{ "op": "composite" }, { "op": "composite", "parent": 1 },
           { "op": "add_child", "parent": 2, "child": 1 }"#,
        "call 2: linking 1 under 2 would create a cycle",
    );
    check(
        "",
        r#"{ "op": "composite", "parent": 0 }, { "op": "compress", "node": 1 },
           { "op": "associate", "node": 1, "element": 3 }"#,
        "call 2: handle 1 is a Composite and cannot carry a semantic element",
    );
}
