//! Property tests for the token stream engine
//!
//! 1. Lexing then serializing returns the input byte for byte
//! 2. Block matching is symmetric for every opener
//! 3. Edits applied back to front match a simulation that re-resolves
//!    positions after every edit
//! 4. A double-quoted argument embedding a variable is never constant,
//!    the same text single-quoted always is

use fixkit_core::analyzer::function_arguments;
use fixkit_core::{detect_block_type, Token, TokenKind, TokenStream};
use proptest::prelude::*;

/// Loose PHP-ish text, including bytes that do not form valid code
fn php_noise_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(r#"[a-z$_ ()\[\]{},;:?=>.'"/*#\n\t0-9\\é-]{0,80}"#)
        .expect("valid regex")
        .prop_map(|body| format!("<?php {body}"))
}

fn atom_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("1".to_string()),
        Just("$a".to_string()),
        Just("'x'".to_string()),
        Just("foo()".to_string()),
    ]
}

/// Well-formed nested expressions mixing every bracket flavour
fn nested_strategy() -> impl Strategy<Value = String> {
    atom_strategy().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| format!("foo({})", items.join(", "))),
            inner.clone().prop_map(|item| format!("$a[{item}]")),
            inner.clone().prop_map(|item| format!("function () {{ return {item}; }}")),
            inner.prop_map(|item| format!("array({item})")),
        ]
    })
}

proptest! {
    #[test]
    fn round_trip_is_identity(source in php_noise_strategy()) {
        let tokens = TokenStream::from_source(&source);
        prop_assert_eq!(tokens.generate_code(), source);
        prop_assert!(!tokens.is_changed());
    }

    #[test]
    fn block_start_of_block_end_is_opener(expression in nested_strategy()) {
        let source = format!("<?php $x = {expression};");
        let tokens = TokenStream::from_source(&source);

        for index in 0..tokens.len() {
            let Some(edge) = detect_block_type(&tokens[index]) else {
                continue;
            };
            if !edge.is_start {
                continue;
            }
            let end = tokens.find_block_end(edge.block, index).unwrap();
            prop_assert_eq!(tokens.find_block_start(edge.block, end).unwrap(), index);
        }
    }

    #[test]
    fn back_to_front_edits_match_reference(
        expression in nested_strategy(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
    ) {
        let source = format!("<?php $x = {expression};");
        let mut tokens = TokenStream::from_source(&source);

        // Every variable becomes `$v + $w`; numbers are cleared.
        let candidates: Vec<usize> = (0..tokens.len())
            .filter(|&i| tokens[i].is_any(&[TokenKind::Variable, TokenKind::Number]))
            .collect();
        prop_assume!(!candidates.is_empty());
        let mut targets: Vec<usize> = picks.iter().map(|p| candidates[p.index(candidates.len())]).collect();
        targets.sort_unstable();
        targets.dedup();

        // Reference: a plain vector of strings, re-locating each target by
        // its ordinal among original tokens after every edit.
        let mut reference: Vec<(usize, String)> = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.content().to_string()))
            .collect();
        for &target in &targets {
            let position = reference.iter().position(|(origin, _)| *origin == target).unwrap();
            if tokens[target].is(TokenKind::Variable) {
                reference.splice(
                    position..=position,
                    [
                        (usize::MAX, "$v".to_string()),
                        (usize::MAX, " + ".to_string()),
                        (usize::MAX, "$w".to_string()),
                    ],
                );
            } else {
                reference[position].1.clear();
            }
        }
        let expected: String = reference.into_iter().map(|(_, content)| content).collect();

        for &target in targets.iter().rev() {
            if tokens[target].is(TokenKind::Variable) {
                tokens
                    .override_range(
                        target,
                        target,
                        [
                            Token::new(TokenKind::Variable, "$v"),
                            Token::new(TokenKind::Operator, " + "),
                            Token::new(TokenKind::Variable, "$w"),
                        ],
                    )
                    .unwrap();
            } else {
                tokens.clear_at(target).unwrap();
            }
        }

        prop_assert_eq!(tokens.generate_code(), expected);
    }

    #[test]
    fn embedded_variable_decides_constancy(
        prefix in "[a-z ]{0,8}",
        name in "[a-z_][a-z0-9_]{0,6}",
        braced in any::<bool>(),
        suffix in "[a-z ]{0,8}",
    ) {
        let embedded = if braced { format!("{{${name}}}") } else { format!("${name}") };
        let text = format!("{prefix}{embedded}{suffix}");

        for (quote, constant) in [('"', false), ('\'', true)] {
            let source = format!("<?php foo({quote}{text}{quote});");
            let tokens = TokenStream::from_source(&source);
            let name_index = (0..tokens.len()).find(|&i| tokens[i].equals("foo")).unwrap();
            let arguments = function_arguments(&tokens, name_index).unwrap();
            prop_assert_eq!(arguments.len(), 1);
            prop_assert_eq!(arguments[0].is_constant, constant);
        }
    }
}
