//! Put a space after a comment opener and before a comment closer

use fixkit_core::{Token, TokenKind, TokenStream};

use super::rewrite_comments;
use crate::error::RuleError;
use crate::rule::{Rule, RuleConfig};

/// `//foo` becomes `// foo`, `/*foo*/` becomes `/* foo */`
pub struct CommentSurroundedBySpacesRule;

impl Rule for CommentSurroundedBySpacesRule {
    fn name(&self) -> &'static str {
        "comment_surrounded_by_spaces"
    }

    fn description(&self) -> &'static str {
        "Comment text must be separated from the comment markers by whitespace"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_any_token_kind_found(&[TokenKind::Comment, TokenKind::DocComment])
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        rewrite_comments(tokens, surround_with_spaces)
    }
}

pub(crate) fn surround_with_spaces(token: &Token) -> Option<String> {
    let content = token.content();

    if let Some(rest) = content.strip_prefix("//") {
        return needs_space_after(rest, &['/']).then(|| format!("// {}", rest));
    }
    if let Some(rest) = content.strip_prefix('#') {
        return needs_space_after(rest, &[]).then(|| format!("# {}", rest));
    }
    if !content.starts_with("/*") {
        return None;
    }

    let opening_end = 1 + content[1..].bytes().take_while(|&b| b == b'*').count();
    let closing_start = content
        .strip_suffix('/')
        .filter(|_| content.len() >= 4 && content.ends_with("*/"))
        .map(|body| body.trim_end_matches('*').len())
        .filter(|&start| start > opening_end);

    let mut fixed = content.to_string();
    if let Some(start) = closing_start {
        if !fixed[..start].ends_with(char::is_whitespace) {
            fixed.insert(start, ' ');
        }
    }
    if needs_space_after(&fixed[opening_end..], &['/']) {
        fixed.insert(opening_end, ' ');
    }

    (fixed != content).then_some(fixed)
}

/// Whether the comment text right after a marker is glued to it
fn needs_space_after(rest: &str, allowed: &[char]) -> bool {
    match rest.chars().next() {
        None => false,
        Some(c) => !c.is_whitespace() && c != '*' && !allowed.contains(&c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::fix;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_comments() {
        assert_eq!(
            fix(&CommentSurroundedBySpacesRule, "<?php\n//foo\n#bar\n$a; //baz"),
            "<?php\n// foo\n# bar\n$a; // baz"
        );
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(
            fix(&CommentSurroundedBySpacesRule, "<?php /*foo*/ $a; /**bar**/"),
            "<?php /* foo */ $a; /** bar **/"
        );
    }

    #[test]
    fn test_already_spaced_and_special_forms_untouched() {
        for source in [
            "<?php // foo\n",
            "<?php /// triple\n",
            "<?php //\n",
            "<?php /* foo */",
            "<?php /**/",
            "<?php /***/",
            "<?php /*\n * foo\n */",
            "<?php #[Attr] function f() {}",
        ] {
            assert_eq!(fix(&CommentSurroundedBySpacesRule, source), source);
        }
    }

    #[test]
    fn test_only_closing_missing() {
        assert_eq!(fix(&CommentSurroundedBySpacesRule, "<?php /** foo*/"), "<?php /** foo */");
    }

    #[test]
    fn test_unterminated_comment() {
        assert_eq!(fix(&CommentSurroundedBySpacesRule, "<?php /*foo"), "<?php /* foo");
    }
}
