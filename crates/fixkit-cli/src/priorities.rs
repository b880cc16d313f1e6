//! Resolve rule priorities from a relation file
//!
//! ```toml
//! # start from the built-in rules and relations
//! builtin = true
//!
//! [[rule]]
//! name = "custom_rule"
//! priority = 10
//!
//! [[relation]]
//! before = "custom_rule"
//! after = "switch_case_space"
//! ```

use anyhow::{Context, Result};
use colored::*;
use fixkit_fixer::{PriorityResolver, RuleRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Contents of a priorities file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PriorityFile {
    pub builtin: bool,
    pub rule: Vec<RuleEntry>,
    pub relation: Vec<RelationEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RuleEntry {
    pub name: String,
    pub priority: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RelationEntry {
    pub before: String,
    pub after: String,
}

/// A resolved rule in output order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPriority {
    pub name: String,
    pub priority: i32,
}

impl PriorityFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Build the relation graph described by this file
    pub fn resolver(&self, registry: &RuleRegistry) -> Result<PriorityResolver> {
        let mut resolver = if self.builtin {
            registry.priority_resolver()?
        } else {
            PriorityResolver::new()
        };

        for rule in &self.rule {
            resolver.add_rule(&rule.name, rule.priority);
        }
        for relation in &self.relation {
            resolver
                .add_relation(&relation.before, &relation.after)
                .with_context(|| format!("Invalid relation {} -> {}", relation.before, relation.after))?;
        }

        info!(rules = resolver.len(), relations = self.relation.len(), "priority graph loaded");
        Ok(resolver)
    }

    /// Every rule with its priority, first to run first
    pub fn resolve(&self, registry: &RuleRegistry) -> Result<Vec<ResolvedPriority>> {
        let ordered = self.resolver(registry)?.ordered()?;
        Ok(ordered
            .into_iter()
            .map(|(name, priority)| ResolvedPriority { name, priority })
            .collect())
    }
}

/// Print resolved priorities as a table or as JSON
pub fn print_priorities(priorities: &[ResolvedPriority], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(priorities)?);
        return Ok(());
    }

    println!("{}", "Resolved priorities:".bold());
    for entry in priorities {
        println!("  {:>6}  {}", entry.priority, entry.name.green());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn resolved(name: &str, priority: i32) -> ResolvedPriority {
        ResolvedPriority {
            name: name.to_string(),
            priority,
        }
    }

    #[test]
    fn test_resolve_standalone_file() {
        let file: PriorityFile = toml::from_str(
            r#"
[[rule]]
name = "indent"
priority = 50

[[rule]]
name = "align"

[[rule]]
name = "trim"

[[relation]]
before = "indent"
after = "align"

[[relation]]
before = "align"
after = "trim"
"#,
        )
        .unwrap();

        let priorities = file.resolve(&RuleRegistry::empty()).unwrap();
        assert_eq!(
            priorities,
            vec![resolved("indent", 50), resolved("align", 0), resolved("trim", -1)]
        );
    }

    #[test]
    fn test_resolve_on_top_of_builtin_rules() {
        let file: PriorityFile = toml::from_str(
            r#"
builtin = true

[[rule]]
name = "custom"

[[relation]]
before = "custom"
after = "switch_case_semicolon_to_colon"
"#,
        )
        .unwrap();

        let priorities = file.resolve(&RuleRegistry::new()).unwrap();
        let custom = priorities.iter().find(|p| p.name == "custom").unwrap();
        assert_eq!(custom.priority, 2);
        assert_eq!(priorities.len(), RuleRegistry::new().len() + 1);
    }

    #[test]
    fn test_cycle_is_reported() {
        let file: PriorityFile = toml::from_str(
            r#"
[[rule]]
name = "a"

[[rule]]
name = "b"

[[relation]]
before = "a"
after = "b"

[[relation]]
before = "b"
after = "a"
"#,
        )
        .unwrap();

        let err = file.resolve(&RuleRegistry::empty()).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_unknown_relation_target() {
        let file: PriorityFile = toml::from_str(
            r#"
[[rule]]
name = "a"

[[relation]]
before = "a"
after = "missing"
"#,
        )
        .unwrap();

        let err = file.resolve(&RuleRegistry::empty()).unwrap_err();
        assert!(format!("{:#}", err).contains("missing"));
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("priorities.toml");
        fs::write(&path, "[[rule]]\nname = \"only\"\npriority = 3\n").unwrap();

        let file = PriorityFile::load(&path).unwrap();
        assert!(!file.builtin);
        assert_eq!(file.resolve(&RuleRegistry::empty()).unwrap(), vec![resolved("only", 3)]);
    }
}
