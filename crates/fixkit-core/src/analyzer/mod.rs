//! Read-only region analyses
//!
//! Every analysis borrows the stream it was computed from, so it cannot
//! outlive the next edit. Anchors of the wrong kind are
//! [`CoreError::UnexpectedToken`](crate::CoreError::UnexpectedToken);
//! "nothing found" is an empty `Vec` or `None`.

mod arguments;
mod array;
mod constructor;
mod data_provider;
mod phpdoc;
mod switch;

pub use arguments::{function_arguments, ArgumentAnalysis};
pub use array::{array_elements, ArrayElementAnalysis};
pub use constructor::{find_non_abstract_constructor, ConstructorAnalysis, PromotableAssignment};
pub use data_provider::{data_providers, DataProviderAnalysis, DataProviderUsage};
pub use phpdoc::{annotations, Annotation};
pub use switch::{switch_analysis, CaseAnalysis, SwitchAnalysis};

use crate::error::CoreError;
use crate::navigator::BlockType;
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// Inclusive `[start, end]` token span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
}

impl TokenRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// `{` and `}` of the class-like body declared at `class_index`.
///
/// Anonymous class constructor arguments are skipped.
pub fn class_body(stream: &TokenStream, class_index: usize) -> Result<(usize, usize), CoreError> {
    let mut index = class_index;
    loop {
        index = stream.require_next_meaningful(index)?;
        match stream[index].kind() {
            TokenKind::OpenBrace => break,
            TokenKind::OpenParen => index = stream.find_block_end(BlockType::Parenthesis, index)?,
            TokenKind::Semicolon => return Err(unexpected(stream, index, "class body")),
            _ => {}
        }
    }
    let close = stream.find_block_end(BlockType::CurlyBrace, index)?;
    Ok((index, close))
}

/// One comma separated item between `open` and `close`, nested blocks
/// skipped. Items with no meaningful token (trailing comma, list holes)
/// are dropped.
fn comma_separated_items(stream: &TokenStream, open: usize, close: usize) -> Result<Vec<TokenRange>, CoreError> {
    let mut items = Vec::new();
    let mut start = open + 1;
    let mut index = open + 1;

    while index <= close {
        if index < close {
            if let Some(end) = stream.skip_block(index)? {
                index = end + 1;
                continue;
            }
        }
        if index == close || stream[index].is(TokenKind::Comma) {
            if let Some(range) = trim_to_meaningful(stream, start, index) {
                items.push(range);
            }
            start = index + 1;
        }
        index += 1;
    }

    Ok(items)
}

/// First and last meaningful tokens in `[start, before)`
fn trim_to_meaningful(stream: &TokenStream, start: usize, before: usize) -> Option<TokenRange> {
    let first = (start..before).find(|&i| stream[i].is_meaningful())?;
    let last = (first..before).rev().find(|&i| stream[i].is_meaningful())?;
    Some(TokenRange::new(first, last))
}

fn unexpected(stream: &TokenStream, index: usize, expected: &'static str) -> CoreError {
    match stream.get(index) {
        Some(token) => CoreError::UnexpectedToken {
            index,
            found: token.kind(),
            expected,
        },
        None => CoreError::IndexOutOfBounds {
            index,
            len: stream.len(),
        },
    }
}
