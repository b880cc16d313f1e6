//! Ordering relations between the built-in rules
//!
//! Each pair reads "first must run before second". The list is plain data
//! so that the registry, the resolver tests and the CLI generation step
//! all read the same source.

pub const BUILTIN_RELATIONS: &[(&str, &str)] = &[
    ("comment_surrounded_by_spaces", "multiline_comment_opening_closing"),
    ("single_space_around_comment", "multiline_comment_opening_closing"),
    ("switch_case_semicolon_to_colon", "switch_case_space"),
    ("no_duplicated_array_key", "php_unit_assert_arguments_order"),
];

/// Rules `name` must run before
pub fn runs_before(name: &str) -> Vec<&'static str> {
    BUILTIN_RELATIONS
        .iter()
        .filter(|(before, _)| *before == name)
        .map(|(_, after)| *after)
        .collect()
}

/// Rules `name` must run after
pub fn runs_after(name: &str) -> Vec<&'static str> {
    BUILTIN_RELATIONS
        .iter()
        .filter(|(_, after)| *after == name)
        .map(|(before, _)| *before)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_directions() {
        assert_eq!(runs_before("switch_case_semicolon_to_colon"), vec!["switch_case_space"]);
        assert_eq!(
            runs_after("multiline_comment_opening_closing"),
            vec!["comment_surrounded_by_spaces", "single_space_around_comment"]
        );
        assert!(runs_before("switch_case_space").is_empty());
    }
}
