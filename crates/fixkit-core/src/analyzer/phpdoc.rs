//! Doc comment annotation extraction

use regex::Regex;
use std::sync::LazyLock;

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[\s*{])@([A-Za-z_][\w\-\\:]*)(?:[ \t]+([^\r\n]*))?").expect("valid regex")
});

/// One `@tag value` line of a doc comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub tag: String,
    /// Rest of the line, trimmed, closing `*/` removed
    pub value: String,
    /// Byte offset of `@` in the comment
    pub offset: usize,
    /// Byte offset of `value` in the comment
    pub value_offset: usize,
}

/// Every annotation in a doc comment, in source order
pub fn annotations(doc: &str) -> Vec<Annotation> {
    ANNOTATION
        .captures_iter(doc)
        .filter_map(|caps| {
            let tag = caps.get(1)?;
            let (value, value_offset) = match caps.get(2) {
                Some(m) => {
                    let raw = m.as_str();
                    let value = raw.trim_end().trim_end_matches("*/").trim_end();
                    let leading = value.len() - value.trim_start().len();
                    (value.trim_start().to_string(), m.start() + leading)
                }
                None => (String::new(), tag.end()),
            };
            Some(Annotation {
                tag: tag.as_str().to_string(),
                value,
                offset: tag.start() - 1,
                value_offset,
            })
        })
        .collect()
}
