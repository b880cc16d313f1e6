//! Array literal element boundaries

use super::{comma_separated_items, unexpected, TokenRange};
use crate::error::CoreError;
use crate::navigator::BlockType;
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// One element of an array literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayElementAnalysis {
    /// Present when the element has a top-level `=>`
    pub key: Option<TokenRange>,
    pub value: TokenRange,
}

impl ArrayElementAnalysis {
    /// First token of the element, key included
    pub fn start(&self) -> usize {
        self.key.map_or(self.value.start, |key| key.start)
    }

    pub fn end(&self) -> usize {
        self.value.end
    }
}

/// Elements of the array opened at `index`, which is either a short array
/// `[` or the `array` keyword of a long array.
pub fn array_elements(stream: &TokenStream, index: usize) -> Result<Vec<ArrayElementAnalysis>, CoreError> {
    let token = stream.token(index)?;
    let (open, close) = if token.is(TokenKind::ArrayOpen) {
        (index, stream.find_block_end(BlockType::ArraySquareBrace, index)?)
    } else if token.is(TokenKind::Array) {
        let open = stream.require_next_meaningful(index)?;
        if !stream[open].is(TokenKind::OpenParen) {
            return Err(unexpected(stream, open, "`(` after `array`"));
        }
        (open, stream.find_block_end(BlockType::Parenthesis, open)?)
    } else {
        return Err(unexpected(stream, index, "array opener"));
    };

    let mut elements = Vec::new();
    for range in comma_separated_items(stream, open, close)? {
        elements.push(split_element(stream, range)?);
    }
    Ok(elements)
}

fn split_element(stream: &TokenStream, range: TokenRange) -> Result<ArrayElementAnalysis, CoreError> {
    let mut index = range.start;
    while index <= range.end {
        let token = &stream[index];
        // the `=>` of an arrow function body belongs to the value
        if token.is(TokenKind::Fn) {
            break;
        }
        if token.is(TokenKind::DoubleArrow) {
            let key_end = stream.require_prev_meaningful(index)?;
            let value_start = stream.require_next_meaningful(index)?;
            return Ok(ArrayElementAnalysis {
                key: Some(TokenRange::new(range.start, key_end)),
                value: TokenRange::new(value_start, range.end),
            });
        }
        index = match stream.skip_block(index)? {
            Some(end) => end + 1,
            None => index + 1,
        };
    }

    Ok(ArrayElementAnalysis {
        key: None,
        value: range,
    })
}
