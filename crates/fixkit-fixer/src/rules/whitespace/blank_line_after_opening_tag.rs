//! Ensure one blank line after the opening tag

use fixkit_core::{Direction, TokenKind, TokenStream};

use crate::error::RuleError;
use crate::rule::{Capabilities, Rule, RuleConfig};

/// `<?php $a;` over several lines becomes `<?php` + blank line + `$a;`.
///
/// Only applies to files that are PHP from the first byte to the last and
/// span more than one line.
pub struct BlankLineAfterOpeningTagRule;

impl Rule for BlankLineAfterOpeningTagRule {
    fn name(&self) -> &'static str {
        "blank_line_after_opening_tag"
    }

    fn description(&self) -> &'static str {
        "Ensure there is no code on the same line as the PHP open tag and it is followed by a blank line"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            whitespace_aware: true,
            ..Capabilities::default()
        }
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        is_monolithic_php(tokens)
    }

    fn fix(&self, tokens: &mut TokenStream, config: &RuleConfig) -> Result<(), RuleError> {
        if !is_monolithic_php(tokens) || tokens.non_empty_sibling(0, Direction::Forward).is_none() {
            return Ok(());
        }
        let spans_lines = tokens
            .iter()
            .any(|t| (t.is_whitespace() || t.is(TokenKind::OpenTag)) && t.contains_newline());
        if !spans_lines {
            return Ok(());
        }

        let tag = tokens[0].content();
        let mut existing = tag[tag.trim_end().len()..].to_string();
        let next_is_whitespace = tokens[1].is_whitespace();
        if next_is_whitespace {
            existing.push_str(tokens[1].content());
        }
        if existing.matches('\n').count() >= 2 {
            return Ok(());
        }

        let indent = match existing.rfind(&['\n', '\r'][..]) {
            Some(i) => &existing[i + 1..],
            None => "",
        };
        let ending = config.line_ending.as_str();
        let whitespace = format!("{}{}{}", ending, ending, indent);

        let anchor = if next_is_whitespace { 1 } else { 0 };
        tokens.ensure_whitespace_at_index(anchor, 1, &whitespace)?;
        Ok(())
    }
}

/// One `<?php` tag at the very start and nothing outside PHP mode
fn is_monolithic_php(tokens: &TokenStream) -> bool {
    let starts_with_tag = tokens.get(0).is_some_and(|t| {
        t.is(TokenKind::OpenTag) && t.content().get(..5).is_some_and(|head| head.eq_ignore_ascii_case("<?php"))
    });
    starts_with_tag
        && !tokens.iter().skip(1).any(|t| {
            t.is_any(&[TokenKind::OpenTag, TokenKind::OpenTagWithEcho, TokenKind::InlineHtml])
        })
}
