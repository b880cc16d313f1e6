//! Call argument boundaries and constancy

use super::{comma_separated_items, unexpected, TokenRange};
use crate::error::CoreError;
use crate::navigator::BlockType;
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// One argument of a call, trimmed to its meaningful tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentAnalysis {
    pub start: usize,
    pub end: usize,
    /// No variables and no calls other than `array(...)`
    pub is_constant: bool,
}

impl ArgumentAnalysis {
    pub fn range(&self) -> TokenRange {
        TokenRange::new(self.start, self.end)
    }
}

/// Arguments of the call whose name sits at `name_index`.
///
/// The next meaningful token after the name must be `(`. A trailing comma
/// does not produce an empty argument.
pub fn function_arguments(stream: &TokenStream, name_index: usize) -> Result<Vec<ArgumentAnalysis>, CoreError> {
    let open = stream.require_next_meaningful(name_index)?;
    if !stream[open].is(TokenKind::OpenParen) {
        return Err(unexpected(stream, open, "`(` after function name"));
    }
    let close = stream.find_block_end(BlockType::Parenthesis, open)?;

    Ok(comma_separated_items(stream, open, close)?
        .into_iter()
        .map(|range| ArgumentAnalysis {
            start: range.start,
            end: range.end,
            is_constant: is_constant(stream, range),
        })
        .collect())
}

fn is_constant(stream: &TokenStream, range: TokenRange) -> bool {
    for index in range.start..=range.end {
        let token = &stream[index];
        if token.is_any(&[TokenKind::Variable, TokenKind::DynamicVarOpen]) || token.is_interpolated() {
            return false;
        }
        if token.is(TokenKind::OpenParen) {
            let is_array = stream
                .prev_meaningful(index)
                .is_some_and(|prev| stream[prev].is(TokenKind::Array));
            if !is_array {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn arguments(source: &str, name: &str) -> (TokenStream, Vec<ArgumentAnalysis>) {
        let tokens = TokenStream::from_source(source);
        let name_index = (0..tokens.len())
            .find(|&i| tokens[i].equals(name))
            .unwrap();
        let arguments = function_arguments(&tokens, name_index).unwrap();
        (tokens, arguments)
    }

    #[test]
    fn test_constancy_per_argument() {
        let (_, args) = arguments("<?php foo(1, $x, [1,2], bar());", "foo");
        let constancy: Vec<bool> = args.iter().map(|a| a.is_constant).collect();
        assert_eq!(constancy, vec![true, false, true, false]);
    }

    #[test]
    fn test_interpolated_strings_are_not_constant() {
        let (_, args) = arguments("<?php foo(\"a$x\", \"b{$y}\", 'c$z', \"d\");", "foo");
        let constancy: Vec<bool> = args.iter().map(|a| a.is_constant).collect();
        assert_eq!(constancy, vec![false, false, true, true]);

        let (_, args) = arguments("<?php foo(<<<EOT\nHi $name\nEOT\n, <<<'EOT'\nHi $name\nEOT\n);", "foo");
        let constancy: Vec<bool> = args.iter().map(|a| a.is_constant).collect();
        assert_eq!(constancy, vec![false, true]);
    }

    #[test]
    fn test_argument_spans() {
        let (tokens, args) = arguments("<?php foo( 'a' , bar(1, 2) , $c->d );", "foo");
        let spans: Vec<String> = args
            .iter()
            .map(|a| tokens.content_between(a.start, a.end))
            .collect();
        assert_eq!(spans, vec!["'a'", "bar(1, 2)", "$c->d"]);
    }

    #[test]
    fn test_long_array_is_constant() {
        let (_, args) = arguments("<?php foo(array(1, 2), array($a), CONSTANT, A::B);", "foo");
        let constancy: Vec<bool> = args.iter().map(|a| a.is_constant).collect();
        assert_eq!(constancy, vec![true, false, true, true]);
    }

    #[test]
    fn test_empty_and_trailing_comma() {
        let (_, args) = arguments("<?php foo();", "foo");
        assert!(args.is_empty());

        let (_, args) = arguments("<?php foo(1, 2,\n);", "foo");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_commas_in_nested_blocks_do_not_split() {
        let (_, args) = arguments("<?php foo(function ($a, $b) { return [$a, $b]; }, $c[1]);", "foo");
        assert_eq!(args.len(), 2);
        assert!(!args[0].is_constant);
    }

    #[test]
    fn test_name_without_parenthesis() {
        let tokens = TokenStream::from_source("<?php FOO;");
        let name = tokens.find_kind(TokenKind::Identifier)[0];
        assert!(matches!(
            function_arguments(&tokens, name),
            Err(CoreError::UnexpectedToken { .. })
        ));
    }
}
