//! Errors raised while running rules or resolving their order

use fixkit_core::CoreError;
use thiserror::Error;

/// A rule could not finish its pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error(transparent)]
    Structure(#[from] CoreError),

    #[error("Invalid value for option `{option}`: expected {expected}")]
    InvalidOption {
        option: &'static str,
        expected: &'static str,
    },
}

/// Failure of the application loop.
///
/// Edits made by the failing rule before it stopped are not rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Rule `{rule}` failed: {source}")]
    Rule {
        rule: &'static str,
        #[source]
        source: RuleError,
    },

    #[error("Unknown rule `{0}`")]
    UnknownRule(String),
}

/// Relation data that cannot produce a consistent order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriorityError {
    #[error("Rules {rules:?} must each run before the next, which forms a cycle")]
    Unresolvable { rules: Vec<String> },

    #[error("`{before}` ({before_priority}) must run before `{after}` ({after_priority})")]
    Contradiction {
        before: String,
        after: String,
        before_priority: i32,
        after_priority: i32,
    },

    #[error("Relation refers to unknown rule `{0}`")]
    UnknownRule(String),
}
