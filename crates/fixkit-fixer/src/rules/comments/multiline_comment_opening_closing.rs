//! Normalize `/**` openers of plain comments and `**/` closers

use std::sync::LazyLock;

use fixkit_core::{Token, TokenKind, TokenStream};
use regex::Regex;

use super::rewrite_comments;
use crate::error::RuleError;
use crate::rule::{Rule, RuleConfig};

static OPENING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/\*{2,}").expect("valid regex"));
static CLOSING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*{2,}/$").expect("valid regex"));

/// A plain block comment opens with exactly `/*`; every block comment
/// closes with exactly `*/`
pub struct MultilineCommentOpeningClosingRule;

impl Rule for MultilineCommentOpeningClosingRule {
    fn name(&self) -> &'static str {
        "multiline_comment_opening_closing"
    }

    fn description(&self) -> &'static str {
        "DocBlocks must start with two asterisks, multiline comments must start with a single asterisk"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_any_token_kind_found(&[TokenKind::Comment, TokenKind::DocComment])
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        rewrite_comments(tokens, normalize)
    }
}

fn normalize(token: &Token) -> Option<String> {
    let content = token.content();
    if !content.starts_with("/*") {
        return None;
    }

    let mut fixed = content.to_string();

    if token.is(TokenKind::Comment) {
        if let Some(opening) = OPENING.find(content) {
            // `/**/` is an empty comment, not an opener
            if !content[opening.end()..].starts_with('/') {
                fixed.replace_range(1..opening.end(), "*");
            }
        }
    }

    if let Some(closing) = CLOSING.find(&fixed) {
        let range = closing.start()..closing.end() - 1;
        if !fixed[..range.start].ends_with('/') {
            fixed.replace_range(range, "*");
        }
    }

    (fixed != content).then_some(fixed)
}
