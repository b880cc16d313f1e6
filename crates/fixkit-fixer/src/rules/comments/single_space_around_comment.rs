//! Deprecated alias of `comment_surrounded_by_spaces`

use fixkit_core::{TokenKind, TokenStream};

use super::comment_surrounded_by_spaces::surround_with_spaces;
use super::rewrite_comments;
use crate::error::RuleError;
use crate::rule::{Capabilities, Rule, RuleConfig};

pub struct SingleSpaceAroundCommentRule;

impl Rule for SingleSpaceAroundCommentRule {
    fn name(&self) -> &'static str {
        "single_space_around_comment"
    }

    fn description(&self) -> &'static str {
        "Comment text must be separated from the comment markers by whitespace"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            deprecated_by: Some(vec!["comment_surrounded_by_spaces"]),
            ..Capabilities::default()
        }
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_any_token_kind_found(&[TokenKind::Comment, TokenKind::DocComment])
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        rewrite_comments(tokens, surround_with_spaces)
    }
}
