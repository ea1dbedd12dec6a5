use quickcheck::QuickCheck;
use quickcheck_macros::quickcheck;
use rstest::rstest;
use serde_json::json;

use super::{from_serde, parse_chunks, parse_one, snapshot_eq};
use crate::{ParserOptions, StepOutcome, StreamingParser};

#[rstest]
#[case(&["{\"a\":", "1}"])]
#[case(&["{", "\"a\"", ":", "1", "}"])]
#[case(&["{\"a", "\":1}"])]
#[case(&["{\"a\":1", "}"])]
fn split_object_equals_single_call(#[case] chunks: &[&str]) {
    let expected = parse_one(r#"{"a":1}"#);
    let actual = parse_chunks(chunks.iter().copied());
    assert!(snapshot_eq(&expected, &actual));
}

#[test]
fn one_character_per_call() {
    let input = "hola {\"name\":\"John\",\"age\":30}";
    let expected = parse_one(input);
    let chunks: Vec<String> = input.chars().map(String::from).collect();
    let actual = parse_chunks(chunks.iter().map(String::as_str));
    assert!(snapshot_eq(&expected, &actual));
}

#[test]
fn text_escape_split_at_backslash() {
    let snapshot = parse_chunks(["say \\", "{ now"]);
    assert_eq!(snapshot.entities.len(), 1);
    assert_eq!(snapshot.entities[0].as_text(), Some("say { now"));
}

#[test]
fn string_escape_split_at_backslash() {
    let snapshot = parse_chunks(["{\"a\":\"x\\", "ny\"}"]);
    assert_eq!(
        snapshot.entities[0].as_json().unwrap(),
        &from_serde(&json!({"a": "x\ny"}))
    );
}

#[test]
fn key_escape_split_at_backslash() {
    let snapshot = parse_chunks(["{\"k\\", "te\\", "\"y\":1}"]);
    assert_eq!(
        snapshot.entities[0].as_json().unwrap(),
        &from_serde(&json!({"k\te\"y": 1}))
    );
}

#[test]
fn suspended_escape_reports_idle_not_pending() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.append("abc \\");
    // The trailing backslash cannot be interpreted yet; the pass parks on it.
    assert_eq!(parser.run(), StepOutcome::Idle);
    assert!(parser.has_pending_input());
    parser.append("{x");
    let snapshot = parser.finish();
    assert_eq!(snapshot.entities[0].as_text(), Some("abc {x"));
}

#[test]
fn multibyte_text_across_chunks() {
    let expected = parse_one("héllo {\"a\":\"wörld 🌍\"} bye");
    let actual = parse_chunks(["héllo {\"a\":\"w", "örld 🌍\"} b", "ye"]);
    assert!(snapshot_eq(&expected, &actual));
}

/// Chunk-boundary invariance: any partition of any input must produce the
/// same final entity list as feeding the input in one call.
#[test]
fn partition_invariance_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(input: String, splits: Vec<usize>) -> bool {
        let baseline = parse_one(&input);

        let mut parser = StreamingParser::new(ParserOptions::default());
        let chars: Vec<char> = input.chars().collect();
        let mut idx = 0;
        let mut remaining = chars.len();
        for s in splits {
            if remaining == 0 {
                break;
            }
            let size = 1 + (s % remaining);
            let chunk: String = chars[idx..idx + size].iter().collect();
            parser.append(&chunk);
            while parser.run() == StepOutcome::Pending {}
            idx += size;
            remaining -= size;
        }
        if remaining > 0 {
            let chunk: String = chars[idx..].iter().collect();
            parser.append(&chunk);
        }
        let chunked = parser.finish();

        snapshot_eq(&baseline, &chunked)
    }

    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(String, Vec<usize>) -> bool);
}

/// Text with no openers and no escapes passes through untouched.
#[quickcheck]
fn plain_text_roundtrip(input: String) -> bool {
    if input.contains(['{', '[', '\\']) {
        return true;
    }
    let snapshot = parse_one(&input);
    if input.is_empty() {
        snapshot.entities.is_empty()
    } else {
        snapshot.entities.len() == 1 && snapshot.entities[0].as_text() == Some(input.as_str())
    }
}
