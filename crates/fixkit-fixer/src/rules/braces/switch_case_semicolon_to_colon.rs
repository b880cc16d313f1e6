//! Replace the semicolon ending a `case`/`default` label with a colon

use fixkit_core::analyzer::switch_analysis;
use fixkit_core::{Token, TokenKind, TokenStream};

use crate::error::RuleError;
use crate::rule::{Rule, RuleConfig};

/// `case 1;` becomes `case 1:`
pub struct SwitchCaseSemicolonToColonRule;

impl Rule for SwitchCaseSemicolonToColonRule {
    fn name(&self) -> &'static str {
        "switch_case_semicolon_to_colon"
    }

    fn description(&self) -> &'static str {
        "A case should be followed by a colon and not a semicolon"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_token_kind_found(TokenKind::Switch)
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        for switch in tokens.find_kind(TokenKind::Switch) {
            let analysis = switch_analysis(tokens, switch)?;
            for case in analysis.cases {
                if tokens[case.colon_index].is(TokenKind::Semicolon) {
                    tokens.set_token(case.colon_index, Token::new(TokenKind::Colon, ":"))?;
                }
            }
        }
        Ok(())
    }
}
