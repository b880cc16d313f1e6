//! Put the expected value first in PHPUnit assertions

use fixkit_core::analyzer::function_arguments;
use fixkit_core::{Token, TokenKind, TokenStream};

use super::test_class_bodies;
use crate::error::RuleError;
use crate::rule::{Rule, RuleConfig};

/// Assertions taking `(expected, actual)`, with the name to use once the
/// arguments are swapped
const ASSERTIONS: &[(&str, &str)] = &[
    ("assertEquals", "assertEquals"),
    ("assertNotEquals", "assertNotEquals"),
    ("assertEqualsCanonicalizing", "assertEqualsCanonicalizing"),
    ("assertEqualsIgnoringCase", "assertEqualsIgnoringCase"),
    ("assertEqualsWithDelta", "assertEqualsWithDelta"),
    ("assertSame", "assertSame"),
    ("assertNotSame", "assertNotSame"),
    ("assertCount", "assertCount"),
    ("assertNotCount", "assertNotCount"),
    ("assertGreaterThan", "assertLessThan"),
    ("assertGreaterThanOrEqual", "assertLessThanOrEqual"),
    ("assertLessThan", "assertGreaterThan"),
    ("assertLessThanOrEqual", "assertGreaterThanOrEqual"),
];

/// `$this->assertSame($result, 5)` becomes `$this->assertSame(5, $result)`.
///
/// Risky: the swap changes failure messages, and for the ordering
/// assertions the method itself.
pub struct PhpUnitAssertArgumentsOrderRule;

impl Rule for PhpUnitAssertArgumentsOrderRule {
    fn name(&self) -> &'static str {
        "php_unit_assert_arguments_order"
    }

    fn description(&self) -> &'static str {
        "The expected value must be the first argument of PHPUnit comparison assertions"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn is_risky(&self) -> bool {
        true
    }

    fn is_applicable(&self, tokens: &TokenStream) -> bool {
        tokens.is_token_kind_found(TokenKind::Class)
            && tokens.is_any_token_kind_found(&[TokenKind::ObjectOperator, TokenKind::DoubleColon])
    }

    fn fix(&self, tokens: &mut TokenStream, _config: &RuleConfig) -> Result<(), RuleError> {
        let mut calls = Vec::new();
        for (open, close) in test_class_bodies(tokens)? {
            calls.extend((open + 1..close).filter_map(|i| assertion_at(tokens, i).map(|renamed| (i, renamed))));
        }

        // later calls first: a swap inside an argument list shifts what follows
        for (name, renamed) in calls.into_iter().rev() {
            let arguments = function_arguments(tokens, name)?;
            let [expected, actual, ..] = arguments.as_slice() else {
                continue;
            };
            if expected.is_constant || !actual.is_constant {
                continue;
            }

            let first = tokens.tokens()[expected.start..=expected.end].to_vec();
            let second = tokens.tokens()[actual.start..=actual.end].to_vec();
            tokens.override_range(actual.start, actual.end, first)?;
            tokens.override_range(expected.start, expected.end, second)?;

            if !tokens[name].equals_ignore_case(renamed) {
                tokens.set_token(name, Token::new(TokenKind::Identifier, renamed))?;
            }
        }
        Ok(())
    }
}

/// The swapped name, when `index` names a method call to a known assertion
fn assertion_at(tokens: &TokenStream, index: usize) -> Option<&'static str> {
    let token = &tokens[index];
    if !token.is(TokenKind::Identifier) {
        return None;
    }
    let (_, renamed) = ASSERTIONS.iter().find(|(name, _)| token.equals_ignore_case(name))?;

    let operator = tokens.prev_meaningful(index)?;
    if !tokens[operator].is_any(&[TokenKind::ObjectOperator, TokenKind::DoubleColon]) {
        return None;
    }
    tokens.next_token_equals(index, &["("])?;
    Some(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::fix;
    use pretty_assertions::assert_eq;

    fn in_test(body: &str) -> String {
        format!("<?php\nclass FooTest extends TestCase {{\n    public function testFoo() {{\n        {}\n    }}\n}}\n", body)
    }

    #[test]
    fn test_swaps_variable_and_constant() {
        assert_eq!(
            fix(&PhpUnitAssertArgumentsOrderRule, &in_test("$this->assertSame($result, 5);")),
            in_test("$this->assertSame(5, $result);")
        );
    }

    #[test]
    fn test_keeps_extra_arguments() {
        assert_eq!(
            fix(
                &PhpUnitAssertArgumentsOrderRule,
                &in_test("static::assertEquals($a->foo(), ['x' => 1], 'message');")
            ),
            in_test("static::assertEquals(['x' => 1], $a->foo(), 'message');")
        );
    }

    #[test]
    fn test_renames_ordering_assertions() {
        assert_eq!(
            fix(&PhpUnitAssertArgumentsOrderRule, &in_test("$this->assertGreaterThan($x, 3);")),
            in_test("$this->assertLessThan(3, $x);")
        );
        assert_eq!(
            fix(&PhpUnitAssertArgumentsOrderRule, &in_test("$this->assertLessThanOrEqual(count($x), 3);")),
            in_test("$this->assertGreaterThanOrEqual(3, count($x));")
        );
    }

    #[test]
    fn test_correct_order_untouched() {
        for body in [
            "$this->assertSame(5, $result);",
            "$this->assertSame($a, $b);",
            "$this->assertSame(1, 2);",
            "$this->assertTrue($a, 'x');",
            "assertSame($a, 1);",
        ] {
            let source = in_test(body);
            assert_eq!(fix(&PhpUnitAssertArgumentsOrderRule, &source), source);
        }
    }

    #[test]
    fn test_interpolated_expectation_is_not_constant() {
        for body in [
            "$this->assertSame($a, \"x{$b}\");",
            "$this->assertSame($a, \"id-$id\");",
        ] {
            let source = in_test(body);
            assert_eq!(fix(&PhpUnitAssertArgumentsOrderRule, &source), source);
        }
        assert_eq!(
            fix(&PhpUnitAssertArgumentsOrderRule, &in_test("$this->assertSame($a, '$b');")),
            in_test("$this->assertSame('$b', $a);")
        );
    }

    #[test]
    fn test_only_inside_test_classes() {
        let source = "<?php class Helper { function f() { $this->assertSame($a, 1); } }";
        assert_eq!(fix(&PhpUnitAssertArgumentsOrderRule, source), source);
    }

    #[test]
    fn test_nested_calls() {
        assert_eq!(
            fix(
                &PhpUnitAssertArgumentsOrderRule,
                &in_test("$this->assertSame($this->wrap($this->assertCount($list, 2)), 'ok');")
            ),
            in_test("$this->assertSame('ok', $this->wrap($this->assertCount(2, $list)));")
        );
    }

    #[test]
    fn test_long_array_is_constant() {
        assert_eq!(
            fix(&PhpUnitAssertArgumentsOrderRule, &in_test("$this->assertEquals($x, array(1, 2));")),
            in_test("$this->assertEquals(array(1, 2), $x);")
        );
    }
}
