//! Remove duplicated keys from array literals, keeping the last one

use std::collections::HashSet;

use fixkit_core::analyzer::{array_elements, ArrayElementAnalysis};
use fixkit_core::{TokenKind, TokenStream};

use crate::error::RuleError;
use crate::rule::{Rule, RuleConfig};

/// Drops earlier entries whose key is repeated later in the same array.
///
/// Only keys built from literals and constants are compared; a key holding
/// a variable or a call may evaluate differently each time.
pub struct NoDuplicatedArrayKeyRule;

impl Rule for NoDuplicatedArrayKeyRule {
    fn name(&self) -> &'static str {
        "no_duplicated_array_key"
    }

    fn description(&self) -> &'static str {
        "Duplicate array keys must be removed, the last one wins"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_token_kind_found(TokenKind::DoubleArrow)
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        for index in (0..tokens.len()).rev() {
            if !is_array_opener(tokens, index) {
                continue;
            }

            let mut seen = HashSet::new();
            for element in array_elements(tokens, index)?.iter().rev() {
                let Some(key) = key_content(tokens, element) else {
                    continue;
                };
                if !seen.insert(key) {
                    remove_element(tokens, element)?;
                }
            }
        }
        Ok(())
    }
}

fn is_array_opener(tokens: &TokenStream, index: usize) -> bool {
    let token = &tokens[index];
    if token.is(TokenKind::ArrayOpen) {
        return true;
    }
    token.is(TokenKind::Array)
        && tokens
            .next_meaningful(index)
            .is_some_and(|next| tokens[next].is(TokenKind::OpenParen))
}

fn key_content(tokens: &TokenStream, element: &ArrayElementAnalysis) -> Option<String> {
    let key = element.key?;
    let mut content = String::new();
    for token in &tokens.tokens()[key.start..=key.end] {
        if token.is_gibberish() {
            continue;
        }
        if token.is_any(&[TokenKind::Variable, TokenKind::OpenParen]) || token.is_interpolated() {
            return None;
        }
        content.push_str(token.content());
    }
    Some(content)
}

/// Clear the element with its trailing comma; same-line spacing after the
/// comma goes too, a line break is left for line removal to handle
fn remove_element(tokens: &mut TokenStream, element: &ArrayElementAnalysis) -> Result<(), RuleError> {
    let start = element.start();
    let mut end = element.end();

    if let Some(comma) = tokens.next_meaningful(end).filter(|&i| tokens[i].is(TokenKind::Comma)) {
        end = comma;
        if let Some(after) = tokens.get(comma + 1) {
            if after.is_whitespace() && !after.contains_newline() {
                end = comma + 1;
            }
        }
    }

    tokens.clear_range(start + 1, end)?;
    tokens.remove_with_lines_if_possible(start)?;
    Ok(())
}
