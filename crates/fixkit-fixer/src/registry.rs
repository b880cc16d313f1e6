//! Rule registry and the application loop
//!
//! The registry owns every available rule, looks them up by name, and runs
//! a selection of them over one token stream in priority order.

use std::collections::HashMap;
use std::sync::Arc;

use fixkit_core::TokenStream;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{ApplyError, PriorityError};
use crate::priority::PriorityResolver;
use crate::relations::{runs_after, runs_before, BUILTIN_RELATIONS};
use crate::rule::{Rule, RuleConfig};
use crate::rules::arrays::NoDuplicatedArrayKeyRule;
use crate::rules::braces::{SwitchCaseSemicolonToColonRule, SwitchCaseSpaceRule};
use crate::rules::class::PromotedConstructorPropertyRule;
use crate::rules::comments::{
    CommentSurroundedBySpacesRule, MultilineCommentOpeningClosingRule, SingleSpaceAroundCommentRule,
};
use crate::rules::phpunit::{DataProviderNameRule, PhpUnitAssertArgumentsOrderRule};
use crate::rules::whitespace::BlankLineAfterOpeningTagRule;

/// Information about a registered rule
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub priority: i32,
    pub is_risky: bool,
    pub is_configurable: bool,
    pub is_whitespace_aware: bool,
    pub deprecated_by: Option<Vec<&'static str>>,
    pub runs_before: Vec<&'static str>,
    pub runs_after: Vec<&'static str>,
}

/// Output of [`RuleRegistry::fix_source`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixResult {
    pub code: String,
    /// Rules that changed the stream, in the order they ran
    pub applied: Vec<&'static str>,
}

/// Registry of available rules
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    by_name: HashMap<&'static str, usize>,
}

impl RuleRegistry {
    /// Create a registry with every built-in rule
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(NoDuplicatedArrayKeyRule));
        registry.register(Arc::new(SwitchCaseSemicolonToColonRule));
        registry.register(Arc::new(SwitchCaseSpaceRule));
        registry.register(Arc::new(PromotedConstructorPropertyRule));
        registry.register(Arc::new(CommentSurroundedBySpacesRule));
        registry.register(Arc::new(MultilineCommentOpeningClosingRule));
        registry.register(Arc::new(SingleSpaceAroundCommentRule));
        registry.register(Arc::new(PhpUnitAssertArgumentsOrderRule));
        registry.register(Arc::new(DataProviderNameRule));
        registry.register(Arc::new(BlankLineAfterOpeningTagRule));

        registry
    }

    /// A registry with no rules
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a rule; declaration order breaks priority ties
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        let idx = self.rules.len();
        self.by_name.insert(rule.name(), idx);
        self.rules.push(rule);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    /// All rules in declaration order
    pub fn all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn list(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|r| {
                let capabilities = r.capabilities();
                RuleInfo {
                    name: r.name(),
                    description: r.description(),
                    priority: r.priority(),
                    is_risky: r.is_risky(),
                    is_configurable: capabilities.is_configurable(),
                    is_whitespace_aware: capabilities.whitespace_aware,
                    deprecated_by: capabilities.deprecated_by,
                    runs_before: runs_before(r.name()),
                    runs_after: runs_after(r.name()),
                }
            })
            .collect()
    }

    /// Resolve `names` and sort them: priority descending, then declaration
    /// order
    pub fn ordered(&self, names: &[&str]) -> Result<Vec<&Arc<dyn Rule>>, ApplyError> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let idx = *self
                .by_name
                .get(name)
                .ok_or_else(|| ApplyError::UnknownRule(name.to_string()))?;
            if !selected.contains(&idx) {
                selected.push(idx);
            }
        }
        selected.sort_by(|&a, &b| {
            self.rules[b]
                .priority()
                .cmp(&self.rules[a].priority())
                .then(a.cmp(&b))
        });
        Ok(selected.into_iter().map(|idx| &self.rules[idx]).collect())
    }

    /// Run the named rules over `tokens`, one after the other.
    ///
    /// Each rule sees the stream exactly as the previous one left it.
    /// Cleared placeholders are compacted at the end. Returns the rules that
    /// changed something. On failure the stream keeps whatever the failing
    /// rule had already done.
    pub fn apply(
        &self,
        tokens: &mut TokenStream,
        names: &[&str],
        config: &RuleConfig,
    ) -> Result<Vec<&'static str>, ApplyError> {
        let mut applied = Vec::new();

        for rule in self.ordered(names)? {
            if !rule.is_applicable(tokens) {
                trace!(rule = rule.name(), "not applicable");
                continue;
            }

            let before = tokens.edit_count();
            if let Err(source) = rule.fix(tokens, config) {
                warn!(rule = rule.name(), error = %source, "rule failed");
                return Err(ApplyError::Rule {
                    rule: rule.name(),
                    source,
                });
            }

            if tokens.edit_count() != before {
                debug!(rule = rule.name(), edits = tokens.edit_count() - before, "applied");
                applied.push(rule.name());
            }
        }

        tokens.clear_empty_tokens();
        Ok(applied)
    }

    /// Lex, fix and serialize `source`
    pub fn fix_source(&self, source: &str, names: &[&str], config: &RuleConfig) -> Result<FixResult, ApplyError> {
        let mut tokens = TokenStream::from_source(source);
        let applied = self.apply(&mut tokens, names, config)?;
        Ok(FixResult {
            code: tokens.generate_code(),
            applied,
        })
    }

    /// Run every registered rule that is neither risky nor deprecated
    pub fn fix_source_with_defaults(&self, source: &str, config: &RuleConfig) -> Result<FixResult, ApplyError> {
        let names: Vec<&str> = self
            .rules
            .iter()
            .filter(|r| !r.is_risky() && !r.capabilities().is_deprecated())
            .map(|r| r.name())
            .collect();
        self.fix_source(source, &names, config)
    }

    /// Relation graph of the registered rules with their declared
    /// priorities, plus the built-in relations between them
    pub fn priority_resolver(&self) -> Result<PriorityResolver, PriorityError> {
        let relations: Vec<(&str, &str)> = BUILTIN_RELATIONS
            .iter()
            .filter(|(before, after)| self.by_name.contains_key(before) && self.by_name.contains_key(after))
            .copied()
            .collect();
        PriorityResolver::from_relations(
            self.rules.iter().map(|r| (r.name(), Some(r.priority()))),
            &relations,
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use fixkit_core::{CoreError, TokenKind};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records the order rules ran in
    struct Recorder {
        name: &'static str,
        priority: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Rule for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "recorder"
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn is_applicable(&self, tokens: &TokenStream) -> bool {
            tokens.is_token_kind_found(TokenKind::Variable)
        }

        fn fix(&self, _tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl Rule for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn description(&self) -> &'static str {
            "always fails"
        }

        fn priority(&self) -> i32 {
            0
        }

        fn is_applicable(&self, _tokens: &TokenStream) -> bool {
            true
        }

        fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
            tokens.clear_at(1)?;
            Err(CoreError::MissingMeaningfulToken { index: 1 }.into())
        }
    }

    fn recording_registry(log: &Arc<Mutex<Vec<&'static str>>>) -> RuleRegistry {
        let mut registry = RuleRegistry::empty();
        for (name, priority) in [("low", -5), ("first_tie", 10), ("high", 20), ("second_tie", 10)] {
            registry.register(Arc::new(Recorder {
                name,
                priority,
                log: Arc::clone(log),
            }));
        }
        registry
    }

    #[test]
    fn test_registry_has_rules() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.len(), 10);
        assert!(registry.get("switch_case_space").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_order_is_priority_then_declaration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&log);
        let mut tokens = TokenStream::from_source("<?php $a;");

        registry
            .apply(&mut tokens, &["second_tie", "low", "high", "first_tie"], &RuleConfig::default())
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["high", "first_tie", "second_tie", "low"]);
    }

    #[test]
    fn test_not_applicable_rules_are_skipped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&log);
        let mut tokens = TokenStream::from_source("<?php echo 1;");

        let applied = registry.apply(&mut tokens, &["high"], &RuleConfig::default()).unwrap();

        assert!(applied.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_rule() {
        let registry = RuleRegistry::new();
        let mut tokens = TokenStream::from_source("<?php");
        assert_eq!(
            registry.apply(&mut tokens, &["no_such_rule"], &RuleConfig::default()),
            Err(ApplyError::UnknownRule("no_such_rule".to_string()))
        );
    }

    #[test]
    fn test_failure_names_rule_and_keeps_partial_edits() {
        let mut registry = RuleRegistry::empty();
        registry.register(Arc::new(Failing));
        let mut tokens = TokenStream::from_source("<?php $a;");

        let error = registry.apply(&mut tokens, &["failing"], &RuleConfig::default()).unwrap_err();

        assert!(matches!(error, ApplyError::Rule { rule: "failing", .. }));
        assert!(tokens[1].is_empty());
    }

    #[test]
    fn test_applied_lists_only_changing_rules() {
        let registry = RuleRegistry::new();
        let result = registry
            .fix_source(
                "<?php switch ($a) { case 1 ; break; }",
                &["switch_case_space", "switch_case_semicolon_to_colon", "no_duplicated_array_key"],
                &RuleConfig::default(),
            )
            .unwrap();

        assert_eq!(result.code, "<?php switch ($a) { case 1: break; }");
        assert_eq!(result.applied, vec!["switch_case_semicolon_to_colon", "switch_case_space"]);
    }

    #[test]
    fn test_list_rules() {
        let registry = RuleRegistry::new();
        let list = registry.list();

        assert_eq!(list.len(), registry.len());
        for info in &list {
            assert!(!info.name.is_empty());
            assert!(!info.description.is_empty());
        }
        let deprecated = list.iter().find(|i| i.name == "single_space_around_comment").unwrap();
        assert_eq!(deprecated.deprecated_by, Some(vec!["comment_surrounded_by_spaces"]));
    }

    #[test]
    fn test_builtin_priorities_resolve() {
        let registry = RuleRegistry::new();
        let ordered = registry.priority_resolver().unwrap().ordered().unwrap();
        assert_eq!(ordered.len(), registry.len());
    }
}
