//! Comment formatting rules

mod comment_surrounded_by_spaces;
mod multiline_comment_opening_closing;
mod single_space_around_comment;

pub use comment_surrounded_by_spaces::CommentSurroundedBySpacesRule;
pub use multiline_comment_opening_closing::MultilineCommentOpeningClosingRule;
pub use single_space_around_comment::SingleSpaceAroundCommentRule;

use fixkit_core::{Token, TokenStream};

use crate::error::RuleError;

/// Rewrite the content of every comment token with `rewrite`, keeping the
/// token kind. `rewrite` returns `None` when the content is fine.
pub(crate) fn rewrite_comments(
    tokens: &mut TokenStream,
    rewrite: impl Fn(&Token) -> Option<String>,
) -> Result<(), RuleError> {
    for index in 0..tokens.len() {
        let token = &tokens[index];
        if !token.is_comment() {
            continue;
        }
        if let Some(content) = rewrite(token) {
            let kind = token.kind();
            tokens.set_token(index, Token::new(kind, content))?;
        }
    }
    Ok(())
}
