//! Purpose: Regression coverage for decode-failure category mapping.
//! Exports: Integration tests only.
//! Role: Verify stable category labels used by skip notices and summaries.
//! Invariants: Category mapping remains deterministic for representative errors.
//! Invariants: Tests avoid payload leakage; assertions target category/hint text only.
//! Notes: Uses source include to exercise internal helper logic without widening API surface.

#[allow(dead_code)]
#[path = "../src/json/parse.rs"]
mod parse;

use parse::ParseFailureCategory;

#[test]
fn category_mapping_handles_syntax_and_eof_errors() {
    let syntax_err = parse::decode(br#"{"a":}"#).unwrap_err();
    assert_eq!(syntax_err.category(), ParseFailureCategory::Syntax);

    let eof_err = parse::decode(br#"{"a":"#).unwrap_err();
    assert_eq!(eof_err.category(), ParseFailureCategory::Eof);

    let empty_err = parse::decode(b"").unwrap_err();
    assert_eq!(empty_err.category(), ParseFailureCategory::Eof);
}

#[test]
fn category_mapping_handles_utf8_and_depth_errors() {
    let utf8_err = parse::decode(&[0xff, b'{', b'}']).unwrap_err();
    assert_eq!(utf8_err.category(), ParseFailureCategory::Utf8);

    let deep = "[".repeat(1024);
    let depth_err = parse::decode(deep.as_bytes()).unwrap_err();
    assert_eq!(depth_err.category(), ParseFailureCategory::DepthLimit);

    assert_eq!(
        parse::categorize_message("recursion limit exceeded while parsing"),
        ParseFailureCategory::DepthLimit
    );
}

#[test]
fn trailing_content_is_syntax() {
    let err = parse::decode(b"{} {}").unwrap_err();
    assert_eq!(err.category(), ParseFailureCategory::Syntax);
    assert_eq!(err.line(), 1);
}

#[test]
fn hint_contains_category_and_context() {
    let err = parse::decode(br#"{"a":"#).unwrap_err();
    let hint = parse::hint_for_error(&err, "test.context");
    assert!(hint.contains("parse category: eof"));
    assert!(hint.contains("context: test.context"));
}

#[test]
fn unknown_category_fallback_is_stable() {
    assert_eq!(
        parse::categorize_message("opaque parser issue"),
        ParseFailureCategory::Unknown
    );
}
