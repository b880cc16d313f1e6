//! PHPUnit test class rules

mod assert_arguments_order;
mod data_provider_name;

pub use assert_arguments_order::PhpUnitAssertArgumentsOrderRule;
pub use data_provider_name::DataProviderNameRule;

use fixkit_core::analyzer::class_body;
use fixkit_core::{CoreError, TokenKind, TokenStream};

/// `{` and `}` of every PHPUnit test class, in source order.
///
/// A test class is a named class whose name ends with `Test` or whose
/// parent class name ends with `TestCase`.
pub(crate) fn test_class_bodies(tokens: &TokenStream) -> Result<Vec<(usize, usize)>, CoreError> {
    let mut bodies = Vec::new();
    for class in tokens.find_kind(TokenKind::Class) {
        let Some(name) = tokens.next_meaningful(class) else {
            continue;
        };
        if !tokens[name].is(TokenKind::Identifier) {
            continue;
        }
        let is_test = tokens[name].content().ends_with("Test")
            || parent_name(tokens, name).is_some_and(|parent| parent.ends_with("TestCase"));
        if is_test {
            bodies.push(class_body(tokens, class)?);
        }
    }
    Ok(bodies)
}

/// Last segment of the `extends` clause following a class name
fn parent_name(tokens: &TokenStream, name: usize) -> Option<&str> {
    let extends = tokens.next_meaningful(name)?;
    if !tokens[extends].is(TokenKind::Extends) {
        return None;
    }
    let mut parent = None;
    let mut index = extends;
    while let Some(next) = tokens.next_meaningful(index) {
        match tokens[next].kind() {
            TokenKind::Identifier => parent = Some(tokens[next].content()),
            TokenKind::NsSeparator => {}
            _ => break,
        }
        index = next;
    }
    parent
}
