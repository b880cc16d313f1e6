//! PHPUnit data provider linkage

use std::collections::{BTreeMap, HashMap};

use super::annotations;
use crate::error::CoreError;
use crate::navigator::Direction;
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// Tokens allowed between a method's doc comment and its `function`
const METHOD_PREFIX: &[TokenKind] = &[
    TokenKind::Whitespace,
    TokenKind::Comment,
    TokenKind::Public,
    TokenKind::Protected,
    TokenKind::Private,
    TokenKind::Static,
    TokenKind::Final,
    TokenKind::Abstract,
];

/// Where a provider is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataProviderUsage {
    /// The doc comment holding the annotation
    pub doc_index: usize,
    /// Byte offset of the provider name inside the doc comment
    pub offset: usize,
}

/// A provider method and every annotation pointing at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataProviderAnalysis {
    pub name: String,
    /// The provider method's name token
    pub name_index: usize,
    pub usages: Vec<DataProviderUsage>,
}

/// Providers defined as methods in `[start, end)` and referenced from
/// `@dataProvider` annotations in the same range, ordered by definition.
///
/// Method names match case-insensitively. References to undefined methods
/// and providers nobody references are left out.
pub fn data_providers(stream: &TokenStream, start: usize, end: usize) -> Result<Vec<DataProviderAnalysis>, CoreError> {
    let end = end.min(stream.len());
    let methods = methods(stream, start, end);

    let mut referenced: Vec<(String, Vec<DataProviderUsage>)> = Vec::new();
    for &name_index in methods.values() {
        let function = stream.require_prev_meaningful(name_index)?;
        let Some(doc_index) = stream.sibling_not_of_kind(function, Direction::Backward, METHOD_PREFIX) else {
            continue;
        };
        if !stream[doc_index].is(TokenKind::DocComment) {
            continue;
        }

        for annotation in annotations(stream[doc_index].content()) {
            if annotation.tag != "dataProvider" {
                continue;
            }
            let Some(name) = annotation.value.split_whitespace().next() else {
                continue;
            };
            let usage = DataProviderUsage {
                doc_index,
                offset: annotation.value_offset,
            };
            match referenced.iter_mut().find(|(n, _)| n == name) {
                Some((_, usages)) => usages.push(usage),
                None => referenced.push((name.to_string(), vec![usage])),
            }
        }
    }

    let mut providers: BTreeMap<usize, DataProviderAnalysis> = BTreeMap::new();
    for (name, usages) in referenced {
        let Some(&name_index) = methods.get(&name.to_lowercase()) else {
            continue;
        };
        providers
            .entry(name_index)
            .or_insert_with(|| DataProviderAnalysis {
                name: stream[name_index].content().to_string(),
                name_index,
                usages: Vec::new(),
            })
            .usages
            .extend(usages);
    }

    Ok(providers
        .into_values()
        .map(|mut provider| {
            provider.usages.sort_by_key(|u| (u.doc_index, u.offset));
            provider
        })
        .collect())
}

/// Lowercased method name to its name token
fn methods(stream: &TokenStream, start: usize, end: usize) -> HashMap<String, usize> {
    let mut methods = HashMap::new();
    for index in start..end {
        if !stream[index].is(TokenKind::Function) {
            continue;
        }
        let Some(name) = stream.next_non_whitespace(index) else {
            continue;
        };
        if stream[name].is(TokenKind::Identifier) {
            methods.insert(stream[name].content().to_lowercase(), name);
        }
    }
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CLASS: &str = r#"<?php
class FooTest extends TestCase {
    /**
     * @dataProvider provideFooCases
     */
    public function testFoo($a) {}

    /**
     * @dataProvider PROVIDEFOOCASES
     * @dataProvider missingProvider
     */
    public function testBar($a) {}

    public static function unused() {}

    public static function provideFooCases() {}
}
"#;

    #[test]
    fn test_links_usages_to_provider() {
        let tokens = TokenStream::from_source(CLASS);
        let providers = data_providers(&tokens, 0, tokens.len()).unwrap();

        assert_eq!(providers.len(), 1);
        let provider = &providers[0];
        assert_eq!(provider.name, "provideFooCases");
        assert!(tokens[provider.name_index].equals("provideFooCases"));

        let usage = provider.usages[0];
        let doc = tokens[usage.doc_index].content();
        assert!(doc[usage.offset..].starts_with("provideFooCases"));
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        let tokens = TokenStream::from_source(CLASS);
        let providers = data_providers(&tokens, 0, tokens.len()).unwrap();
        let usages = &providers[0].usages;
        assert_eq!(usages.len(), 2);
        assert!(usages[0].doc_index < usages[1].doc_index);
        let doc = tokens[usages[1].doc_index].content();
        assert!(doc[usages[1].offset..].starts_with("PROVIDEFOOCASES"));
    }

    #[test]
    fn test_no_providers() {
        let tokens = TokenStream::from_source("<?php class A { public function foo() {} }");
        assert!(data_providers(&tokens, 0, tokens.len()).unwrap().is_empty());
    }
}
