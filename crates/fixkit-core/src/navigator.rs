//! Structural navigation over a [`TokenStream`]
//!
//! All lookups are read-only. Walking off either end of the stream yields
//! `None`, which callers treat as a normal outcome (end of file). Asking for
//! the counterpart of something that is not a block edge, or a block that
//! never closes, is an error.

use crate::error::CoreError;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

/// Search direction for sibling lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Paired delimiters that can nest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Parenthesis,
    CurlyBrace,
    IndexSquareBrace,
    ArraySquareBrace,
    DynamicPropBrace,
    DynamicVarBrace,
    Attribute,
}

const ALL_BLOCK_TYPES: &[BlockType] = &[
    BlockType::Parenthesis,
    BlockType::CurlyBrace,
    BlockType::IndexSquareBrace,
    BlockType::ArraySquareBrace,
    BlockType::DynamicPropBrace,
    BlockType::DynamicVarBrace,
    BlockType::Attribute,
];

impl BlockType {
    /// Opening and closing token kinds
    pub fn edges(self) -> (TokenKind, TokenKind) {
        match self {
            BlockType::Parenthesis => (TokenKind::OpenParen, TokenKind::CloseParen),
            BlockType::CurlyBrace => (TokenKind::OpenBrace, TokenKind::CloseBrace),
            BlockType::IndexSquareBrace => (TokenKind::OpenBracket, TokenKind::CloseBracket),
            BlockType::ArraySquareBrace => (TokenKind::ArrayOpen, TokenKind::ArrayClose),
            BlockType::DynamicPropBrace => (TokenKind::DynamicPropOpen, TokenKind::DynamicPropClose),
            BlockType::DynamicVarBrace => (TokenKind::DynamicVarOpen, TokenKind::DynamicVarClose),
            BlockType::Attribute => (TokenKind::AttributeOpen, TokenKind::AttributeClose),
        }
    }
}

/// Which edge of which block a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEdge {
    pub block: BlockType,
    pub is_start: bool,
}

/// Classify a token as a block opener, a block closer, or neither
pub fn detect_block_type(token: &Token) -> Option<BlockEdge> {
    ALL_BLOCK_TYPES.iter().find_map(|&block| {
        let (open, close) = block.edges();
        if token.is(open) {
            Some(BlockEdge {
                block,
                is_start: true,
            })
        } else if token.is(close) {
            Some(BlockEdge {
                block,
                is_start: false,
            })
        } else {
            None
        }
    })
}

impl TokenStream {
    /// Walk from `index` (exclusive) in `direction` to the first token
    /// accepted by `accept`
    fn walk(&self, index: usize, direction: Direction, accept: impl Fn(&Token) -> bool) -> Option<usize> {
        match direction {
            Direction::Forward => (index.checked_add(1)?..self.tokens.len()).find(|&i| accept(&self.tokens[i])),
            Direction::Backward => (0..index.min(self.tokens.len())).rev().find(|&i| accept(&self.tokens[i])),
        }
    }

    /// Nearest non-whitespace, non-comment token after `index`
    pub fn next_meaningful(&self, index: usize) -> Option<usize> {
        self.walk(index, Direction::Forward, Token::is_meaningful)
    }

    /// Nearest non-whitespace, non-comment token before `index`
    pub fn prev_meaningful(&self, index: usize) -> Option<usize> {
        self.walk(index, Direction::Backward, Token::is_meaningful)
    }

    /// Like [`next_meaningful`](Self::next_meaningful) but for places where
    /// the caller knows a token must follow
    pub fn require_next_meaningful(&self, index: usize) -> Result<usize, CoreError> {
        self.next_meaningful(index)
            .ok_or(CoreError::MissingMeaningfulToken { index })
    }

    pub fn require_prev_meaningful(&self, index: usize) -> Result<usize, CoreError> {
        self.prev_meaningful(index)
            .ok_or(CoreError::MissingMeaningfulToken { index })
    }

    /// Nearest token after `index` that is neither whitespace nor cleared
    pub fn next_non_whitespace(&self, index: usize) -> Option<usize> {
        self.walk(index, Direction::Forward, |t| !t.is_whitespace() && !t.is_empty())
    }

    pub fn prev_non_whitespace(&self, index: usize) -> Option<usize> {
        self.walk(index, Direction::Backward, |t| !t.is_whitespace() && !t.is_empty())
    }

    /// Nearest token with content, skipping cleared placeholders only
    pub fn non_empty_sibling(&self, index: usize, direction: Direction) -> Option<usize> {
        self.walk(index, direction, |t| !t.is_empty())
    }

    pub fn next_token_of_kind(&self, index: usize, kinds: &[TokenKind]) -> Option<usize> {
        self.walk(index, Direction::Forward, |t| t.is_any(kinds))
    }

    pub fn prev_token_of_kind(&self, index: usize, kinds: &[TokenKind]) -> Option<usize> {
        self.walk(index, Direction::Backward, |t| t.is_any(kinds))
    }

    /// Nearest meaningful token after `index`, if its content is one of
    /// `contents`
    pub fn next_token_equals(&self, index: usize, contents: &[&str]) -> Option<usize> {
        self.next_meaningful(index)
            .filter(|&i| self.tokens[i].equals_any(contents))
    }

    /// Nearest token in `direction` whose kind is not excluded.
    ///
    /// Cleared placeholders are always skipped. Used to hop over modifiers,
    /// whitespace and comments to reach the element they belong to.
    pub fn sibling_not_of_kind(&self, index: usize, direction: Direction, excluded: &[TokenKind]) -> Option<usize> {
        self.walk(index, direction, |t| !t.is_empty() && !t.is_any(excluded))
    }

    pub fn detect_block_type_at(&self, index: usize) -> Option<BlockEdge> {
        self.tokens.get(index).and_then(detect_block_type)
    }

    /// Index of the token closing the `block` opened at `index`
    pub fn find_block_end(&self, block: BlockType, index: usize) -> Result<usize, CoreError> {
        let (open, close) = block.edges();
        let token = self.token(index)?;
        if !token.is(open) {
            return Err(CoreError::NotBlockStart {
                index,
                block,
                found: token.kind(),
            });
        }

        let mut depth = 0usize;
        for i in index..self.tokens.len() {
            let kind = self.tokens[i].kind();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }

        Err(CoreError::UnbalancedBlock { index, block })
    }

    /// Index of the token opening the `block` closed at `index`
    pub fn find_block_start(&self, block: BlockType, index: usize) -> Result<usize, CoreError> {
        let (open, close) = block.edges();
        let token = self.token(index)?;
        if !token.is(close) {
            return Err(CoreError::NotBlockEnd {
                index,
                block,
                found: token.kind(),
            });
        }

        let mut depth = 0usize;
        for i in (0..=index).rev() {
            let kind = self.tokens[i].kind();
            if kind == close {
                depth += 1;
            } else if kind == open {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }

        Err(CoreError::UnbalancedBlock { index, block })
    }

    /// If `index` opens any block, the index of its matching end
    pub fn skip_block(&self, index: usize) -> Result<Option<usize>, CoreError> {
        match self.detect_block_type_at(index) {
            Some(BlockEdge {
                block,
                is_start: true,
            }) => self.find_block_end(block, index).map(Some),
            _ => Ok(None),
        }
    }
}
