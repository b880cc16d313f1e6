//! Name data providers after the test that uses them

use std::collections::HashSet;

use fixkit_core::analyzer::{data_providers, DataProviderAnalysis};
use fixkit_core::{Token, TokenKind, TokenStream};

use super::test_class_bodies;
use crate::error::RuleError;
use crate::rule::{Capabilities, ConfigValue, OptionType, Rule, RuleConfig, RuleOption};

const DEFAULT_PREFIX: &str = "provide";
const DEFAULT_SUFFIX: &str = "Cases";

/// Renames a provider used by exactly one test to
/// `<prefix><TestNameWithoutTest><suffix>`, in the method declaration and in
/// the `@dataProvider` annotation.
///
/// Risky: providers can also be called by name from elsewhere.
pub struct DataProviderNameRule;

impl Rule for DataProviderNameRule {
    fn name(&self) -> &'static str {
        "data_provider_name"
    }

    fn description(&self) -> &'static str {
        "Data provider names must match the name of the test they provide for"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn is_risky(&self) -> bool {
        true
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            options: vec![
                RuleOption {
                    name: "prefix",
                    description: "Prefix replacing the `test` prefix of the test name",
                    option_type: OptionType::String,
                    default: Some(ConfigValue::String(DEFAULT_PREFIX.to_string())),
                },
                RuleOption {
                    name: "suffix",
                    description: "Suffix appended to the provider name",
                    option_type: OptionType::String,
                    default: Some(ConfigValue::String(DEFAULT_SUFFIX.to_string())),
                },
            ],
            ..Capabilities::default()
        }
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_all_token_kinds_found(&[TokenKind::Class, TokenKind::DocComment, TokenKind::Function])
    }

    fn fix(&self, tokens: &mut TokenStream, config: &RuleConfig) -> Result<(), RuleError> {
        let prefix = config.string_option(self.name(), "prefix", DEFAULT_PREFIX)?;
        let suffix = config.string_option(self.name(), "suffix", DEFAULT_SUFFIX)?;

        for (open, close) in test_class_bodies(tokens)? {
            // renames change doc comment lengths, so offsets are looked up
            // again after each one
            while let Some((provider, new_name)) = next_rename(tokens, open, close, prefix, suffix)? {
                rename(tokens, &provider, &new_name)?;
            }
        }
        Ok(())
    }
}

fn next_rename(
    tokens: &TokenStream,
    open: usize,
    close: usize,
    prefix: &str,
    suffix: &str,
) -> Result<Option<(DataProviderAnalysis, String)>, RuleError> {
    let methods: HashSet<String> = (open..close)
        .filter(|&i| tokens[i].is(TokenKind::Function))
        .filter_map(|i| tokens.next_meaningful(i))
        .map(|i| tokens[i].content().to_lowercase())
        .collect();

    for provider in data_providers(tokens, open, close)? {
        let [usage] = provider.usages.as_slice() else {
            continue;
        };
        let Some(test_name) = tokens
            .next_token_of_kind(usage.doc_index, &[TokenKind::Function])
            .and_then(|function| tokens.next_meaningful(function))
            .filter(|&name| tokens[name].is(TokenKind::Identifier))
        else {
            continue;
        };

        let new_name = provider_name(tokens[test_name].content(), prefix, suffix);
        if new_name == provider.name || methods.contains(&new_name.to_lowercase()) {
            continue;
        }
        return Ok(Some((provider, new_name)));
    }
    Ok(None)
}

fn rename(tokens: &mut TokenStream, provider: &DataProviderAnalysis, new_name: &str) -> Result<(), RuleError> {
    tokens.set_token(provider.name_index, Token::new(TokenKind::Identifier, new_name))?;

    for usage in &provider.usages {
        let doc = tokens[usage.doc_index].content();
        let end = doc[usage.offset..]
            .find(|c: char| c.is_whitespace() || c == '*')
            .map_or(doc.len(), |i| usage.offset + i);
        let content = format!("{}{}{}", &doc[..usage.offset], new_name, &doc[end..]);
        tokens.set_token(usage.doc_index, Token::new(TokenKind::DocComment, content))?;
    }
    Ok(())
}

/// `testFooBar` with the defaults gives `provideFooBarCases`
fn provider_name(test_name: &str, prefix: &str, suffix: &str) -> String {
    let base = if test_name.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("test")) {
        &test_name[4..]
    } else {
        test_name
    };
    let base = base.trim_start_matches('_');

    let mut chars = base.chars();
    let base: String = match chars.next() {
        Some(first) if prefix.is_empty() => first.to_lowercase().chain(chars).collect(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{}{}{}", prefix, base, suffix)
}
