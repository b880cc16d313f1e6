//! `switch` bodies and the colon that ends each `case`/`default` label

use super::unexpected;
use crate::error::CoreError;
use crate::navigator::BlockType;
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// One `case` or `default` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseAnalysis {
    /// The `case`/`default` keyword
    pub index: usize,
    /// The `:` (or `;`) ending the label
    pub colon_index: usize,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchAnalysis {
    /// `{` or the `:` of alternative syntax
    pub cases_start: usize,
    /// `}`, or `endswitch` (its `;` when present)
    pub cases_end: usize,
    pub cases: Vec<CaseAnalysis>,
}

impl SwitchAnalysis {
    pub fn default_case(&self) -> Option<&CaseAnalysis> {
        self.cases.iter().find(|c| c.is_default)
    }
}

/// Analyze the `switch` at `switch_index`.
///
/// Nested switches and blocks are skipped whole, so their labels never
/// show up in the outer analysis.
pub fn switch_analysis(stream: &TokenStream, switch_index: usize) -> Result<SwitchAnalysis, CoreError> {
    if !stream.token(switch_index)?.is(TokenKind::Switch) {
        return Err(unexpected(stream, switch_index, "`switch`"));
    }

    let cases_start = cases_start(stream, switch_index)?;
    let cases_end = cases_end(stream, cases_start)?;

    let mut cases = Vec::new();
    let mut index = cases_start;
    while index < cases_end {
        index = next_same_level_token(stream, index)?;
        let token = &stream[index];
        if !token.is_any(&[TokenKind::Case, TokenKind::Default]) {
            continue;
        }
        let colon_index = case_colon(stream, index)?;
        cases.push(CaseAnalysis {
            index,
            colon_index,
            is_default: token.is(TokenKind::Default),
        });
        index = colon_index;
    }

    Ok(SwitchAnalysis {
        cases_start,
        cases_end,
        cases,
    })
}

fn cases_start(stream: &TokenStream, switch_index: usize) -> Result<usize, CoreError> {
    let open = stream.require_next_meaningful(switch_index)?;
    if !stream[open].is(TokenKind::OpenParen) {
        return Err(unexpected(stream, open, "`(` after `switch`"));
    }
    let close = stream.find_block_end(BlockType::Parenthesis, open)?;
    let start = stream.require_next_meaningful(close)?;
    if !stream[start].is_any(&[TokenKind::OpenBrace, TokenKind::Colon]) {
        return Err(unexpected(stream, start, "`{` or `:` opening switch body"));
    }
    Ok(start)
}

fn cases_end(stream: &TokenStream, cases_start: usize) -> Result<usize, CoreError> {
    if stream[cases_start].is(TokenKind::OpenBrace) {
        return stream.find_block_end(BlockType::CurlyBrace, cases_start);
    }

    let mut index = cases_start;
    loop {
        index = next_same_level_token(stream, index)?;
        if stream[index].is(TokenKind::EndSwitch) {
            break;
        }
    }

    Ok(match stream.next_meaningful(index) {
        Some(after) if stream[after].is(TokenKind::Semicolon) => after,
        _ => index,
    })
}

/// The token ending the label started at `index`; `?` ... `:` pairs of
/// ternaries inside the label are skipped
fn case_colon(stream: &TokenStream, mut index: usize) -> Result<usize, CoreError> {
    let mut ternary_depth = 0usize;
    loop {
        index = next_same_level_token(stream, index)?;
        let token = &stream[index];
        if token.is(TokenKind::Question) {
            ternary_depth += 1;
            continue;
        }
        if token.is(TokenKind::Colon) && ternary_depth > 0 {
            ternary_depth -= 1;
            continue;
        }
        if token.is_any(&[TokenKind::Colon, TokenKind::Semicolon]) {
            return Ok(index);
        }
    }
}

/// Next meaningful token, hopping over whole blocks and nested switches
fn next_same_level_token(stream: &TokenStream, index: usize) -> Result<usize, CoreError> {
    let index = stream.require_next_meaningful(index)?;
    if stream[index].is(TokenKind::Switch) {
        return Ok(switch_analysis(stream, index)?.cases_end);
    }
    Ok(stream.skip_block(index)?.unwrap_or(index))
}
