use super::*;

#[test]
fn test_is_doc_comment() {
    assert!(is_doc_comment("/** @var int */"));
    assert!(is_doc_comment("/**\n * Summary\n */"));
    assert!(!is_doc_comment("/* plain */"));
    assert!(!is_doc_comment("/*** banner ***/"));
    assert!(!is_doc_comment("// line"));
    assert!(!is_doc_comment("/**/"));
}

#[test]
fn test_doc_comment_lines_strip_decoration() {
    let text = "/**\n * Summary line\n *\n * @param int $x the x\n */";
    let lines = doc_comment_lines(text);

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0].text, "");
    assert_eq!(lines[1], DocLine { line: 1, text: "Summary line" });
    assert_eq!(lines[3], DocLine { line: 3, text: "@param int $x the x" });
}

#[test]
fn test_single_line_doc_comment() {
    let lines = doc_comment_lines("/** @var non-empty-string */");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "@var non-empty-string");
}

#[test]
fn test_doc_comment_content() {
    let text = "/**\n * First\n * Second\n */";
    assert_eq!(doc_comment_content(text), "First\nSecond");
}

#[test]
fn test_lines_without_star_are_kept() {
    let text = "/**\n   no star here\n */";
    let lines = doc_comment_lines(text);
    assert_eq!(lines[1].text, "no star here");
}
