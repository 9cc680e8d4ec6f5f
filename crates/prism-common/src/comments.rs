//! Documentation comment utilities.
//!
//! Doc comments are attached to declarations by the parser as raw text
//! (`/** ... */`). The helpers here recognise them and strip the comment
//! delimiters and the leading `*` decoration of each line, keeping line
//! numbers so that tags can be reported at their source position.

/// A single line of doc comment content, with decoration removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocLine<'a> {
    /// Zero-based line number relative to the comment start.
    pub line: u32,
    /// The line text without the leading `*` and surrounding whitespace.
    pub text: &'a str,
}

/// Check if a comment is a documentation comment.
///
/// `/***` openers are banners rather than doc comments and are rejected,
/// matching the usual docblock tooling behaviour.
pub fn is_doc_comment(text: &str) -> bool {
    text.starts_with("/**") && !text.starts_with("/***") && text.ends_with("*/") && text.len() >= 5
}

/// Split a doc comment into its content lines.
///
/// The `/**` opener and `*/` terminator are removed, then each line has its
/// leading whitespace and one `*` stripped. Text that is not a doc comment is
/// returned line by line unchanged (trimmed).
pub fn doc_comment_lines(text: &str) -> Vec<DocLine<'_>> {
    let inner = if is_doc_comment(text) {
        &text[3..text.len() - 2]
    } else {
        text
    };

    inner
        .split('\n')
        .enumerate()
        .map(|(index, raw)| {
            let trimmed = raw.trim_start();
            let stripped = match trimmed.strip_prefix('*') {
                Some(rest) => rest,
                None => trimmed,
            };
            DocLine {
                line: index as u32,
                text: stripped.trim(),
            }
        })
        .collect()
}

/// Extract the content of a doc comment (without the delimiters).
pub fn doc_comment_content(text: &str) -> String {
    doc_comment_lines(text)
        .iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "../tests/comments_tests.rs"]
mod tests;
