//! Promote constructor parameters that only initialize a property

use fixkit_core::analyzer::{class_body, find_non_abstract_constructor, ConstructorAnalysis, PromotableAssignment};
use fixkit_core::{BlockType, CoreError, Direction, Token, TokenKind, TokenStream};

use crate::error::RuleError;
use crate::rule::{Capabilities, ConfigValue, OptionType, Rule, RuleConfig, RuleOption};

const ONLY_EXISTING: &str = "promote_only_existing_properties";

/// Turns a property declaration plus `$this->x = $x;` in the constructor
/// into a promoted constructor parameter.
pub struct PromotedConstructorPropertyRule;

impl Rule for PromotedConstructorPropertyRule {
    fn name(&self) -> &'static str {
        "promoted_constructor_property"
    }

    fn description(&self) -> &'static str {
        "Constructor properties must be promoted if possible"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            options: vec![RuleOption {
                name: ONLY_EXISTING,
                description: "Only promote parameters whose property is declared in the class",
                option_type: OptionType::Bool,
                default: Some(ConfigValue::Bool(false)),
            }],
            ..Capabilities::default()
        }
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_any_token_kind_found(&[TokenKind::Class, TokenKind::Trait])
            && tokens.is_all_token_kinds_found(&[TokenKind::Function, TokenKind::Variable])
    }

    fn fix(&self, tokens: &mut TokenStream, config: &RuleConfig) -> Result<(), RuleError> {
        let only_existing = config.bool_option(self.name(), ONLY_EXISTING, false)?;

        let mut classes = tokens.find_kind(TokenKind::Class);
        classes.extend(tokens.find_kind(TokenKind::Trait));
        classes.sort_unstable();

        // inserting a modifier shifts everything after the parameter, so
        // later classes go first and each promotion starts from a fresh
        // analysis
        for class in classes.into_iter().rev() {
            while let Some(promotion) = next_promotion(tokens, class, only_existing)? {
                promote(tokens, &promotion)?;
            }
        }
        Ok(())
    }
}

struct Promotion {
    /// First token of the parameter's type
    type_start: usize,
    visibility: TokenKind,
    readonly: bool,
    assignment: PromotableAssignment,
    /// First modifier and `;` of the property declaration
    declaration: Option<(usize, usize)>,
}

struct PropertyDeclaration {
    start: usize,
    end: usize,
    visibility: TokenKind,
    readonly: bool,
    type_text: String,
}

enum Property {
    Missing,
    Declared(PropertyDeclaration),
    /// Declared in a form a promoted parameter cannot express
    Unmovable,
}

fn next_promotion(tokens: &TokenStream, class: usize, only_existing: bool) -> Result<Option<Promotion>, RuleError> {
    let Some(constructor) = find_non_abstract_constructor(tokens, class)? else {
        return Ok(None);
    };
    let analysis = ConstructorAnalysis::new(tokens, constructor)?;
    let assignments = analysis.promotable_assignments()?;
    if assignments.is_empty() {
        return Ok(None);
    }
    let (open, close) = class_body(tokens, class)?;

    for (&variable, name) in &analysis.promotable_parameters() {
        let Some(assignment) = assignments.get(name).filter(|a| a.variable == *name) else {
            continue;
        };
        let (type_start, type_text) = parameter_type(tokens, variable)?;

        let (visibility, readonly, declaration) = match property_declaration(tokens, open, close, name)? {
            Property::Missing if only_existing => continue,
            Property::Missing => (TokenKind::Public, false, None),
            Property::Unmovable => continue,
            Property::Declared(declaration) => {
                if !declaration.type_text.is_empty() && declaration.type_text != type_text {
                    continue;
                }
                (
                    declaration.visibility,
                    declaration.readonly,
                    Some((declaration.start, declaration.end)),
                )
            }
        };

        return Ok(Some(Promotion {
            type_start,
            visibility,
            readonly,
            assignment: assignment.clone(),
            declaration,
        }));
    }

    Ok(None)
}

fn promote(tokens: &mut TokenStream, promotion: &Promotion) -> Result<(), RuleError> {
    let assignment = &promotion.assignment;
    tokens.clear_range(assignment.this_index + 1, assignment.semicolon_index)?;
    tokens.remove_with_lines_if_possible(assignment.this_index)?;

    if let Some((start, end)) = promotion.declaration {
        tokens.clear_range(start + 1, end)?;
        tokens.remove_with_lines_if_possible(start)?;
    }

    let mut modifiers = vec![
        Token::new(promotion.visibility, visibility_keyword(promotion.visibility)),
        Token::whitespace(" "),
    ];
    if promotion.readonly {
        modifiers.push(Token::new(TokenKind::Readonly, "readonly"));
        modifiers.push(Token::whitespace(" "));
    }
    tokens.insert_at(promotion.type_start, modifiers)?;
    Ok(())
}

fn visibility_keyword(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Private => "private",
        TokenKind::Protected => "protected",
        _ => "public",
    }
}

/// First token of the type of the parameter at `variable`, and the type
/// as written without whitespace
fn parameter_type(tokens: &TokenStream, variable: usize) -> Result<(usize, String), CoreError> {
    let mut start = variable;
    while let Some(prev) = tokens.prev_meaningful(start) {
        match tokens[prev].kind() {
            TokenKind::OpenParen | TokenKind::Comma | TokenKind::AttributeClose => break,
            // DNF group such as `(A&B)|null`
            TokenKind::CloseParen => start = tokens.find_block_start(BlockType::Parenthesis, prev)?,
            _ => start = prev,
        }
    }

    let mut parts: Vec<&str> = (start..variable)
        .filter(|&i| tokens[i].is_meaningful())
        .map(|i| tokens[i].content())
        .collect();
    if parts.last() == Some(&"&") {
        parts.pop();
    }
    Ok((start, parts.concat()))
}

/// Look for `$name` declared at the top level of the class body
fn property_declaration(tokens: &TokenStream, open: usize, close: usize, name: &str) -> Result<Property, CoreError> {
    let variable = format!("${}", name);
    let mut index = open + 1;
    while index < close {
        if let Some(end) = tokens.skip_block(index)? {
            index = end + 1;
            continue;
        }
        if tokens[index].is(TokenKind::Variable) && tokens[index].equals(&variable) {
            return Ok(declaration_at(tokens, index));
        }
        index += 1;
    }
    Ok(Property::Missing)
}

fn declaration_at(tokens: &TokenStream, variable: usize) -> Property {
    let mut modifiers = Vec::new();
    let mut type_parts = Vec::new();
    let mut start = variable;

    while let Some(prev) = tokens.prev_meaningful(start) {
        let token = &tokens[prev];
        if token.kind().is_member_modifier() {
            modifiers.push(token.kind());
        } else if modifiers.is_empty() && is_type_part(token) {
            type_parts.push(token.content());
        } else {
            break;
        }
        start = prev;
    }

    let movable_modifiers = modifiers
        .iter()
        .all(|kind| kind.is_visibility() || matches!(kind, TokenKind::Readonly | TokenKind::Var));
    let ends_statement = tokens
        .next_meaningful(variable)
        .is_some_and(|next| tokens[next].is(TokenKind::Semicolon));
    let has_doc_or_attribute = tokens
        .sibling_not_of_kind(start, Direction::Backward, &[TokenKind::Whitespace, TokenKind::Comment])
        .is_some_and(|prev| tokens[prev].is_any(&[TokenKind::DocComment, TokenKind::AttributeClose]));
    let after_comma = tokens
        .prev_meaningful(start)
        .is_some_and(|prev| tokens[prev].is(TokenKind::Comma));

    if modifiers.is_empty() || !movable_modifiers || !ends_statement || has_doc_or_attribute || after_comma {
        return Property::Unmovable;
    }
    let Some(end) = tokens.next_meaningful(variable) else {
        return Property::Unmovable;
    };

    type_parts.reverse();
    Property::Declared(PropertyDeclaration {
        start,
        end,
        visibility: modifiers
            .iter()
            .copied()
            .find(|kind| kind.is_visibility())
            .unwrap_or(TokenKind::Public),
        readonly: modifiers.contains(&TokenKind::Readonly),
        type_text: type_parts.concat(),
    })
}

fn is_type_part(token: &Token) -> bool {
    token.is_any(&[
        TokenKind::Identifier,
        TokenKind::NsSeparator,
        TokenKind::Question,
        TokenKind::Array,
    ]) || (token.is(TokenKind::Operator) && token.equals_any(&["|", "&"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{fix, fix_with};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_promotes_declared_and_missing_properties() {
        let source = r#"<?php
class Foo {
    private int $a;
    protected ?string $b;

    public function __construct(int $a, ?string $b, string $c) {
        $this->a = $a;
        $this->b = $b;
        $this->c = $c;
    }
}
"#;
        let expected = r#"<?php
class Foo {

    public function __construct(private int $a, protected ?string $b, public string $c) {
    }
}
"#;
        assert_eq!(fix(&PromotedConstructorPropertyRule, source), expected);
    }

    #[test]
    fn test_only_existing_properties() {
        let source = r#"<?php
class Foo {
    private int $a;

    public function __construct(int $a, string $c) {
        $this->a = $a;
        $this->c = $c;
    }
}
"#;
        let expected = r#"<?php
class Foo {

    public function __construct(private int $a, string $c) {
        $this->c = $c;
    }
}
"#;
        let config = RuleConfig::default().with_option(
            "promoted_constructor_property",
            ONLY_EXISTING,
            ConfigValue::Bool(true),
        );
        assert_eq!(fix_with(&PromotedConstructorPropertyRule, source, &config), expected);
    }

    #[test]
    fn test_readonly_and_untyped_property() {
        let source = "<?php\nclass Foo {\n    private readonly int $a;\n    var $b;\n\n    public function __construct(int $a, array $b) {\n        $this->a = $a;\n        $this->b = $b;\n    }\n}\n";
        let fixed = fix(&PromotedConstructorPropertyRule, source);
        assert!(fixed.contains("__construct(private readonly int $a, public array $b)"));
        assert!(!fixed.contains("$this->"));
        assert!(!fixed.contains("var $b;"));
    }

    #[test]
    fn test_left_alone() {
        for property in [
            "private string $a;",
            "private int $a = 1;",
            "private static int $a;",
            "private int $a, $z;",
            "/** @var int */\n    private int $a;",
            "#[Attr]\n    private int $a;",
        ] {
            let source = format!(
                "<?php\nclass Foo {{\n    {}\n\n    public function __construct(int $a) {{\n        $this->a = $a;\n    }}\n}}\n",
                property
            );
            assert_eq!(fix(&PromotedConstructorPropertyRule, &source), source, "{}", property);
        }
    }

    #[test]
    fn test_ambiguous_assignments_left_alone() {
        let source = "<?php\nclass Foo {\n    public function __construct(int $x, int $y) {\n        $this->a = $x;\n        $this->a = $y;\n    }\n}\n";
        assert_eq!(fix(&PromotedConstructorPropertyRule, source), source);
    }

    #[test]
    fn test_conditional_and_reassigned_left_alone() {
        let source = "<?php\nclass Foo {\n    public function __construct(int $a, int $b, bool $c) {\n        if ($c) {\n            $this->a = $a;\n        }\n        $b = $b + 1;\n        $this->b = $b;\n    }\n}\n";
        assert_eq!(fix(&PromotedConstructorPropertyRule, source), source);
    }

    #[test]
    fn test_parameters_written_in_place_left_alone() {
        for body in [
            "foreach ([1, 2] as $a) {}\n        $this->a = $a;",
            "foreach ($items as $k => $a) {}\n        $this->a = $a;",
            "[$a] = [5];\n        $this->a = $a;",
            "list($a) = [5];\n        $this->a = $a;",
            "++$a;\n        $this->a = $a;",
            "$a[] = 1;\n        $this->a = $a;",
        ] {
            let source = format!(
                "<?php\nclass Foo {{\n    public function __construct(array $a, array $items) {{\n        {}\n    }}\n}}\n",
                body
            );
            assert_eq!(fix(&PromotedConstructorPropertyRule, &source), source, "{}", body);
        }
    }

    #[test]
    fn test_untyped_and_promoted_parameters_skipped() {
        let source = "<?php\nclass Foo {\n    public function __construct($a, private int $b) {\n        $this->a = $a;\n    }\n}\n";
        assert_eq!(fix(&PromotedConstructorPropertyRule, source), source);
    }

    #[test]
    fn test_abstract_constructor() {
        let source = "<?php\nabstract class Foo {\n    abstract public function __construct(int $a);\n}\n";
        assert_eq!(fix(&PromotedConstructorPropertyRule, source), source);
    }

    #[test]
    fn test_two_classes() {
        let source = "<?php\nclass A {\n    public function __construct(int $a) {\n        $this->a = $a;\n    }\n}\nclass B {\n    public function __construct(int $b) {\n        $this->b = $b;\n    }\n}\n";
        let fixed = fix(&PromotedConstructorPropertyRule, source);
        assert!(fixed.contains("class A {\n    public function __construct(public int $a) {\n    }\n}"));
        assert!(fixed.contains("class B {\n    public function __construct(public int $b) {\n    }\n}"));
    }
}
