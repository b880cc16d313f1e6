//! The contract every rewriting rule implements

use std::collections::HashMap;

use fixkit_core::TokenStream;
use serde::{Deserialize, Serialize};

use crate::config::LineEnding;
use crate::error::RuleError;

/// Values accepted for rule options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(i64),
    String(String),
    Array(Vec<String>),
    StringMap(HashMap<String, String>),
}

/// Configuration passed to every rule
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    pub line_ending: LineEnding,
    /// Option values keyed by rule name, then option name
    pub options: HashMap<String, HashMap<String, ConfigValue>>,
}

impl RuleConfig {
    /// Set one option for one rule
    pub fn with_option(mut self, rule: &str, option: &str, value: ConfigValue) -> Self {
        self.options
            .entry(rule.to_string())
            .or_default()
            .insert(option.to_string(), value);
        self
    }

    pub fn option(&self, rule: &str, option: &str) -> Option<&ConfigValue> {
        self.options.get(rule).and_then(|options| options.get(option))
    }

    pub fn bool_option(&self, rule: &str, option: &'static str, default: bool) -> Result<bool, RuleError> {
        match self.option(rule, option) {
            None => Ok(default),
            Some(ConfigValue::Bool(value)) => Ok(*value),
            Some(_) => Err(RuleError::InvalidOption {
                option,
                expected: "a boolean",
            }),
        }
    }

    pub fn string_option<'a>(&'a self, rule: &str, option: &'static str, default: &'a str) -> Result<&'a str, RuleError> {
        match self.option(rule, option) {
            None => Ok(default),
            Some(ConfigValue::String(value)) => Ok(value),
            Some(_) => Err(RuleError::InvalidOption {
                option,
                expected: "a string",
            }),
        }
    }
}

/// A configurable option of a rule
#[derive(Debug, Clone)]
pub struct RuleOption {
    pub name: &'static str,
    pub description: &'static str,
    pub option_type: OptionType,
    pub default: Option<ConfigValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    String,
}

/// Optional traits of a rule, in one record
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Configuration schema; empty when the rule takes no options
    pub options: Vec<RuleOption>,
    /// Set when the rule is deprecated, naming the rules replacing it
    pub deprecated_by: Option<Vec<&'static str>>,
    /// Whether the rule reads the line ending setting
    pub whitespace_aware: bool,
}

impl Capabilities {
    pub fn is_configurable(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated_by.is_some()
    }
}

/// A rewriting rule
pub trait Rule: Send + Sync {
    /// Snake case identifier used in configuration and relations
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Execution priority (higher = runs first)
    fn priority(&self) -> i32;

    /// Whether the rule can change runtime behavior
    fn is_risky(&self) -> bool {
        false
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Cheap pre-check over the whole stream. May say yes when `fix` ends
    /// up doing nothing, never no when `fix` would change something.
    fn is_applicable(&self, tokens: &TokenStream) -> bool;

    /// Apply every edit of this rule in one pass. Running it again on its
    /// own output must change nothing.
    fn fix(&self, tokens: &mut TokenStream, config: &RuleConfig) -> Result<(), RuleError>;
}
