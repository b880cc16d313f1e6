//! Remove space before the colon of a `case`/`default` label

use fixkit_core::analyzer::switch_analysis;
use fixkit_core::{TokenKind, TokenStream};

use crate::error::RuleError;
use crate::rule::{Rule, RuleConfig};

/// `case 1 :` becomes `case 1:`
pub struct SwitchCaseSpaceRule;

impl Rule for SwitchCaseSpaceRule {
    fn name(&self) -> &'static str {
        "switch_case_space"
    }

    fn description(&self) -> &'static str {
        "Remove extra spaces between the case value and the colon"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_token_kind_found(TokenKind::Switch)
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        for switch in tokens.find_kind(TokenKind::Switch) {
            let analysis = switch_analysis(tokens, switch)?;
            for case in analysis.cases {
                let Some(value) = tokens.prev_non_whitespace(case.colon_index) else {
                    continue;
                };
                // a line comment owns its line break
                if value + 1 == case.colon_index || tokens[value].is_comment() {
                    continue;
                }
                tokens.clear_range(value + 1, case.colon_index - 1)?;
            }
        }
        Ok(())
    }
}
