//! Edit primitives on a [`TokenStream`]
//!
//! The stream never re-adjusts indices a caller is holding. Rules that
//! compute several targets up front must apply edits back to front, or
//! re-resolve their indices from a stable anchor after each edit.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::CoreError;
use crate::navigator::Direction;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

static TRAILING_HORIZONTAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+$").expect("valid regex"));
static TRAILING_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\r\n|\n|\r)$").expect("valid regex"));
static LEADING_HORIZONTAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]+").expect("valid regex"));
static LEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*(\r\n|\n|\r)").expect("valid regex"));

impl TokenStream {
    /// Replace the token at `index`
    pub fn set_token(&mut self, index: usize, token: Token) -> Result<(), CoreError> {
        self.check_index(index)?;
        if self.tokens[index] != token {
            self.tokens[index] = token;
            self.edits += 1;
        }
        Ok(())
    }

    /// Replace the token at `index` with a cleared placeholder
    pub fn clear_at(&mut self, index: usize) -> Result<(), CoreError> {
        self.set_token(index, Token::void())
    }

    /// Clear every token in `[start, end]`
    pub fn clear_range(&mut self, start: usize, end: usize) -> Result<(), CoreError> {
        if start > end {
            return Ok(());
        }
        self.check_index(end)?;
        for index in start..=end {
            self.clear_at(index)?;
        }
        Ok(())
    }

    /// Clear the token at `index`; whitespace on both sides is merged into
    /// a single run so the neighbours do not fuse or double up.
    pub fn clear_token_and_merge_surrounding_whitespace(&mut self, index: usize) -> Result<(), CoreError> {
        self.clear_at(index)?;

        let Some(next) = self.non_empty_sibling(index, Direction::Forward) else {
            return Ok(());
        };
        if !self.tokens[next].is_whitespace() {
            return Ok(());
        }

        let prev = self.non_empty_sibling(index, Direction::Backward);
        match prev {
            Some(prev) if self.tokens[prev].is_whitespace() => {
                let merged = format!("{}{}", self.tokens[prev].content(), self.tokens[next].content());
                self.set_token(prev, Token::whitespace(merged))?;
            }
            _ => {
                let slot = prev.map_or(0, |p| p + 1);
                if !self.tokens[slot].is_empty() {
                    return Ok(());
                }
                let content = self.tokens[next].content().to_string();
                self.set_token(slot, Token::whitespace(content))?;
            }
        }
        self.clear_at(next)
    }

    /// Splice `tokens` in before `index`, shifting later indices.
    ///
    /// Returns the number of inserted tokens.
    pub fn insert_at(&mut self, index: usize, tokens: impl IntoIterator<Item = Token>) -> Result<usize, CoreError> {
        if index > self.tokens.len() {
            return Err(CoreError::IndexOutOfBounds {
                index,
                len: self.tokens.len(),
            });
        }
        let before = self.tokens.len();
        self.tokens.splice(index..index, tokens);
        let inserted = self.tokens.len() - before;
        if inserted > 0 {
            self.edits += 1;
        }
        Ok(inserted)
    }

    /// Replace `[start, end]` with `tokens`; the stream may grow or shrink
    pub fn override_range(&mut self, start: usize, end: usize, tokens: impl IntoIterator<Item = Token>) -> Result<(), CoreError> {
        self.check_index(end)?;
        if start > end {
            return Err(CoreError::IndexOutOfBounds {
                index: start,
                len: self.tokens.len(),
            });
        }
        let replacement: Vec<Token> = tokens.into_iter().collect();
        if self.tokens[start..=end] != replacement[..] {
            self.tokens.splice(start..=end, replacement);
            self.edits += 1;
        }
        Ok(())
    }

    /// Make sure whitespace `whitespace` sits at `index + offset`.
    ///
    /// `offset` is 0 (at/before `index`) or 1 (after `index`). An existing
    /// whitespace token at `index` is rewritten in place; otherwise a new
    /// token is inserted. Returns `true` when a token was inserted, in which
    /// case every later index moved by one.
    pub fn ensure_whitespace_at_index(&mut self, index: usize, offset: usize, whitespace: &str) -> Result<bool, CoreError> {
        self.check_index(index)?;

        if self.tokens[index].is_whitespace() {
            let whitespace = match index.checked_sub(1) {
                Some(prev) => self.move_newline_into_open_tag(prev, offset, whitespace)?,
                None => whitespace.to_string(),
            };
            if whitespace.is_empty() {
                self.clear_at(index)?;
            } else {
                self.set_token(index, Token::whitespace(whitespace))?;
            }
            return Ok(false);
        }

        let whitespace = self.move_newline_into_open_tag(index, offset, whitespace)?;
        if whitespace.is_empty() {
            return Ok(false);
        }
        self.insert_at(index + offset, [Token::whitespace(whitespace)])?;
        Ok(true)
    }

    /// An open tag owns the first line break after it; keep it there
    fn move_newline_into_open_tag(&mut self, index: usize, offset: usize, whitespace: &str) -> Result<String, CoreError> {
        let token = &self.tokens[index];
        if offset != 1 || !token.is(TokenKind::OpenTag) || whitespace.is_empty() {
            return Ok(whitespace.to_string());
        }

        let tag = token.content().trim_end().to_string();
        let split = if whitespace.starts_with("\r\n") { 2 } else { 1 };
        let split = whitespace
            .char_indices()
            .nth(split)
            .map_or(whitespace.len(), |(i, _)| i);
        self.set_token(index, Token::new(TokenKind::OpenTag, format!("{}{}", tag, &whitespace[..split])))?;
        Ok(whitespace[split..].to_string())
    }

    /// Physically drop cleared placeholders; indices are re-packed
    pub fn clear_empty_tokens(&mut self) {
        self.tokens.retain(|t| !t.is_empty());
    }

    /// Remove the token at `index` and, when nothing else meaningful shares
    /// its line, the line itself.
    pub fn remove_with_lines_if_possible(&mut self, index: usize) -> Result<(), CoreError> {
        self.check_index(index)?;

        if self.is_token_only_meaningful_in_line(index) {
            let mut newline_removed = false;
            if let Some(prev) = self.non_empty_sibling(index, Direction::Backward) {
                newline_removed = self.trim_whitespace_before(prev)?;
            }
            if let Some(next) = self.non_empty_sibling(index, Direction::Forward) {
                self.trim_whitespace_after(next, newline_removed)?;
            }
        }

        self.clear_token_and_merge_surrounding_whitespace(index)
    }

    fn is_token_only_meaningful_in_line(&self, index: usize) -> bool {
        !self.has_meaningful_token_in_line_before(index) && !self.has_meaningful_token_in_line_after(index)
    }

    fn has_meaningful_token_in_line_before(&self, index: usize) -> bool {
        let Some(prev) = self.non_empty_sibling(index, Direction::Backward) else {
            return false;
        };
        let token = &self.tokens[prev];
        if token.is(TokenKind::OpenTag) {
            return !token.contains_newline();
        }
        if !token.is_whitespace() {
            return true;
        }
        if token.contains_newline() {
            return false;
        }
        match self.non_empty_sibling(prev, Direction::Backward) {
            Some(before) => {
                let before = &self.tokens[before];
                !(before.is(TokenKind::OpenTag) && before.contains_newline())
                    && !(before.is(TokenKind::Comment) && before.contains_newline())
            }
            None => false,
        }
    }

    fn has_meaningful_token_in_line_after(&self, index: usize) -> bool {
        let Some(next) = self.non_empty_sibling(index, Direction::Forward) else {
            return false;
        };
        let token = &self.tokens[next];
        if !token.is_whitespace() {
            return true;
        }
        !token.contains_newline()
    }

    /// Drop trailing blanks and one line break from the whitespace at
    /// `index`; reports whether a line break was removed
    fn trim_whitespace_before(&mut self, index: usize) -> Result<bool, CoreError> {
        if !self.tokens[index].is_whitespace() {
            return Ok(false);
        }
        let content = self.tokens[index].content();
        let without_trailing = TRAILING_HORIZONTAL.replace(content, "").into_owned();
        let without_newline = TRAILING_NEWLINE.replace(&without_trailing, "").into_owned();
        let removed = without_trailing != without_newline;
        self.ensure_whitespace_at_index(index, 0, &without_newline)?;
        Ok(removed)
    }

    fn trim_whitespace_after(&mut self, index: usize, newline_removed: bool) -> Result<(), CoreError> {
        if !self.tokens[index].is_whitespace() {
            return Ok(());
        }
        let content = self.tokens[index].content();
        let pattern = if newline_removed {
            &*LEADING_HORIZONTAL
        } else {
            &*LEADING_LINE
        };
        let new_content = pattern.replace(content, "").into_owned();
        self.ensure_whitespace_at_index(index, 0, &new_content)?;
        Ok(())
    }
}
