//! The mutable, indexed token sequence for one source unit

use std::ops::Index;

use crate::error::CoreError;
use crate::lexer;
use crate::token::{Token, TokenKind};

/// Ordered, 0-indexed sequence of tokens for one file.
///
/// Indices stay valid across [`clear_at`](TokenStream::clear_at) because a
/// cleared token leaves a [`TokenKind::Void`] placeholder behind; inserts
/// and overrides shift everything after the edit point. Compaction only
/// happens in [`clear_empty_tokens`](TokenStream::clear_empty_tokens).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub(crate) tokens: Vec<Token>,
    pub(crate) edits: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            edits: 0,
        }
    }

    /// Lex `source` into a stream
    pub fn from_source(source: &str) -> Self {
        lexer::lex(source)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Checked access for indices that come from outside the stream
    pub fn token(&self, index: usize) -> Result<&Token, CoreError> {
        self.tokens.get(index).ok_or(CoreError::IndexOutOfBounds {
            index,
            len: self.tokens.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether any edit modified the stream since it was built
    pub fn is_changed(&self) -> bool {
        self.edits > 0
    }

    /// Number of edits that modified the stream; compare two readings to
    /// tell whether anything happened in between
    pub fn edit_count(&self) -> usize {
        self.edits
    }

    /// Cheap pre-check for rule applicability
    pub fn is_token_kind_found(&self, kind: TokenKind) -> bool {
        self.tokens.iter().any(|t| t.is(kind))
    }

    pub fn is_any_token_kind_found(&self, kinds: &[TokenKind]) -> bool {
        self.tokens.iter().any(|t| t.is_any(kinds))
    }

    pub fn is_all_token_kinds_found(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().all(|kind| self.is_token_kind_found(*kind))
    }

    /// Indices of every token of `kind`, ascending
    pub fn find_kind(&self, kind: TokenKind) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is(kind))
            .map(|(i, _)| i)
            .collect()
    }

    /// Serialize back to source text
    pub fn generate_code(&self) -> String {
        self.tokens.iter().map(Token::content).collect()
    }

    /// Concatenated content of `[start, end]`, clamped to the stream.
    /// Empty when the range is empty or starts past the end.
    pub fn content_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len().saturating_sub(1));
        if start > end || start >= self.tokens.len() {
            return String::new();
        }
        self.tokens[start..=end].iter().map(Token::content).collect()
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), CoreError> {
        if index < self.tokens.len() {
            Ok(())
        } else {
            Err(CoreError::IndexOutOfBounds {
                index,
                len: self.tokens.len(),
            })
        }
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_round_trip() {
        let source = "<?php\n$a = [1, 2];\n";
        let stream = TokenStream::from_source(source);
        assert_eq!(stream.generate_code(), source);
        assert!(!stream.is_changed());
        assert_eq!(stream.edit_count(), 0);
    }

    #[test]
    fn test_kind_lookups() {
        let stream = TokenStream::from_source("<?php switch ($a) {}");
        assert!(stream.is_token_kind_found(TokenKind::Switch));
        assert!(!stream.is_token_kind_found(TokenKind::Class));
        assert!(stream.is_any_token_kind_found(&[TokenKind::Class, TokenKind::Variable]));
        assert!(!stream.is_all_token_kinds_found(&[TokenKind::Class, TokenKind::Variable]));
        assert_eq!(stream.find_kind(TokenKind::Switch), vec![1]);
    }

    #[test]
    fn test_checked_access() {
        let stream = TokenStream::from_source("<?php");
        assert!(stream.token(0).is_ok());
        assert_eq!(
            stream.token(5),
            Err(CoreError::IndexOutOfBounds { index: 5, len: 1 })
        );
    }

    #[test]
    fn test_content_between_clamps() {
        let stream = TokenStream::from_source("<?php $a;");
        let last = stream.len() - 1;
        assert_eq!(stream.content_between(1, 2), "$a;");
        assert_eq!(stream.content_between(1, 100), "$a;");
        assert_eq!(stream.content_between(2, 1), "");
        assert_eq!(stream.content_between(last + 1, last + 5), "");
        assert_eq!(TokenStream::from_source("").content_between(0, 0), "");
    }
}
