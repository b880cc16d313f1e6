//! Structural errors raised by navigation, analysis and editing

use thiserror::Error;

use crate::navigator::BlockType;
use crate::token::TokenKind;

/// A structural assumption about the token stream did not hold.
///
/// These indicate a bug in the calling rule (or malformed input that the
/// lexer could not balance) and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Token at index {index} ({found:?}) does not open a {block:?} block")]
    NotBlockStart {
        index: usize,
        block: BlockType,
        found: TokenKind,
    },

    #[error("Token at index {index} ({found:?}) does not close a {block:?} block")]
    NotBlockEnd {
        index: usize,
        block: BlockType,
        found: TokenKind,
    },

    #[error("No matching counterpart for {block:?} block edge at index {index}")]
    UnbalancedBlock { index: usize, block: BlockType },

    #[error("Unexpected {found:?} at index {index}, expected {expected}")]
    UnexpectedToken {
        index: usize,
        found: TokenKind,
        expected: &'static str,
    },

    #[error("Index {index} out of bounds for stream of {len} tokens")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("No meaningful token found next to index {index}")]
    MissingMeaningfulToken { index: usize },
}
