//! End-to-end behavior of the built-in rule set

use fixkit_fixer::relations::BUILTIN_RELATIONS;
use fixkit_fixer::{ApplyError, PriorityError, PriorityResolver, RuleConfig, RuleRegistry};
use pretty_assertions::assert_eq;

#[test]
fn declared_priorities_satisfy_relations() {
    let registry = RuleRegistry::new();
    for (before, after) in BUILTIN_RELATIONS {
        let before_rule = registry.get(before).expect("relation names a registered rule");
        let after_rule = registry.get(after).expect("relation names a registered rule");
        assert!(
            before_rule.priority() > after_rule.priority(),
            "{} must have a higher priority than {}",
            before,
            after
        );
    }
}

#[test]
fn resolver_keeps_declared_priorities() {
    let registry = RuleRegistry::new();
    let resolved = registry.priority_resolver().unwrap().resolve().unwrap();
    for rule in registry.all() {
        assert_eq!(resolved[rule.name()], rule.priority(), "{}", rule.name());
    }
}

#[test]
fn resolver_derives_missing_priorities_from_relations() {
    let registry = RuleRegistry::new();
    let rules: Vec<(&str, Option<i32>)> = registry.names().into_iter().map(|name| (name, None)).collect();
    let resolved = PriorityResolver::from_relations(rules, BUILTIN_RELATIONS)
        .unwrap()
        .resolve()
        .unwrap();
    for (before, after) in BUILTIN_RELATIONS {
        assert!(resolved[*before] > resolved[*after], "{} before {}", before, after);
    }
}

#[test]
fn cyclic_relations_are_rejected() {
    let mut relations = BUILTIN_RELATIONS.to_vec();
    relations.push(("switch_case_space", "switch_case_semicolon_to_colon"));
    let registry = RuleRegistry::new();
    let rules: Vec<(&str, Option<i32>)> = registry.names().into_iter().map(|name| (name, None)).collect();
    let error = PriorityResolver::from_relations(rules, &relations)
        .unwrap()
        .resolve()
        .unwrap_err();
    assert!(matches!(error, PriorityError::Unresolvable { .. }));
}

#[test]
fn duplicate_key_removal_keeps_layout() {
    let registry = RuleRegistry::new();
    let result = registry
        .fix_source(
            "<?php\n$a = [\n    'foo' => 1,\n    'bar' => 2,\n    'foo' => 3,\n];\n",
            &["no_duplicated_array_key"],
            &RuleConfig::default(),
        )
        .unwrap();
    assert_eq!(result.code, "<?php\n$a = [\n    'bar' => 2,\n    'foo' => 3,\n];\n");
    assert_eq!(result.applied, vec!["no_duplicated_array_key"]);
}

#[test]
fn unknown_rule_is_reported() {
    let registry = RuleRegistry::new();
    let error = registry
        .fix_source("<?php", &["does_not_exist"], &RuleConfig::default())
        .unwrap_err();
    assert_eq!(error, ApplyError::UnknownRule("does_not_exist".to_string()));
}

const TEST_CLASS: &str = r#"<?php
class FooTest extends TestCase {
    private int $a;

    public function __construct(int $a) {
        $this->a = $a;
    }

    /**
     * @dataProvider cases
     */
    public function testFoo($x) {
        //check
        $this->assertSame($x, 1);
        switch ($x) {
            case 1 ;
                break;
        }
        $y = ['k' => 1, 'k' => 2];
    }

    public static function cases() {}
}
"#;

#[test]
fn all_rules_together_reach_a_fixed_point() {
    let registry = RuleRegistry::new();
    let names = registry.names();
    let config = RuleConfig::default();

    let first = registry.fix_source(TEST_CLASS, &names, &config).unwrap();
    assert!(first.code.starts_with("<?php\n\nclass FooTest"));
    assert!(first.code.contains("public function __construct(private int $a) {"));
    assert!(!first.code.contains("private int $a;"));
    assert!(first.code.contains("@dataProvider provideFooCases\n"));
    assert!(first.code.contains("public static function provideFooCases()"));
    assert!(first.code.contains("// check\n"));
    assert!(first.code.contains("$this->assertSame(1, $x);"));
    assert!(first.code.contains("case 1:\n"));
    assert!(first.code.contains("$y = ['k' => 2];"));
    assert!(first.applied.contains(&"comment_surrounded_by_spaces"));
    // the deprecated alias finds nothing left to do
    assert!(!first.applied.contains(&"single_space_around_comment"));

    let second = registry.fix_source(&first.code, &names, &config).unwrap();
    assert_eq!(second.code, first.code);
    assert!(second.applied.is_empty());
}

#[test]
fn defaults_skip_risky_and_deprecated_rules() {
    let registry = RuleRegistry::new();
    let result = registry
        .fix_source_with_defaults(TEST_CLASS, &RuleConfig::default())
        .unwrap();
    assert!(result.code.contains("$this->assertSame($x, 1);"));
    assert!(result.code.contains("@dataProvider cases\n"));
    assert!(!result.applied.contains(&"single_space_around_comment"));
    assert!(result.applied.contains(&"comment_surrounded_by_spaces"));
}
