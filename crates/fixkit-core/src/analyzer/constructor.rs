//! Constructor lookup and property promotion candidates

use std::collections::{BTreeMap, HashMap};

use super::{class_body, unexpected};
use crate::error::CoreError;
use crate::navigator::BlockType;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

const COMPOUND_ASSIGNMENTS: &[&str] = &[
    "+=", "-=", "*=", "/=", ".=", "%=", "&=", "|=", "^=", "<<=", ">>=", "**=", "??=", "++", "--",
];

/// `$this->property = $variable;` at the top level of a constructor body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotableAssignment {
    pub this_index: usize,
    pub property_index: usize,
    pub variable_index: usize,
    pub semicolon_index: usize,
    /// Assigned variable without the leading `$`
    pub variable: String,
}

/// Index of the `function` token of the constructor declared in the class,
/// trait or enum at `class_index`. Abstract constructors yield `None`.
pub fn find_non_abstract_constructor(stream: &TokenStream, class_index: usize) -> Result<Option<usize>, CoreError> {
    let token = stream.token(class_index)?;
    if !token.is_any(&[TokenKind::Class, TokenKind::Trait, TokenKind::Enum]) {
        return Err(unexpected(stream, class_index, "`class`, `trait` or `enum`"));
    }

    let (open, close) = class_body(stream, class_index)?;

    let mut index = open + 1;
    while index < close {
        if let Some(end) = stream.skip_block(index)? {
            index = end + 1;
            continue;
        }
        if stream[index].is(TokenKind::Function) {
            let name = stream.require_next_meaningful(index)?;
            if stream[name].equals_ignore_case("__construct") {
                return Ok((!is_abstract(stream, index)).then_some(index));
            }
        }
        index += 1;
    }

    Ok(None)
}

fn is_abstract(stream: &TokenStream, function_index: usize) -> bool {
    let mut index = function_index;
    while let Some(prev) = stream.prev_meaningful(index) {
        let kind = stream[prev].kind();
        if kind == TokenKind::Abstract {
            return true;
        }
        if !kind.is_member_modifier() {
            return false;
        }
        index = prev;
    }
    false
}

/// Innermost block around `index` opened after `limit`
fn enclosing_block(stream: &TokenStream, index: usize, limit: usize) -> Option<(usize, BlockType)> {
    let mut i = index;
    while i > limit + 1 {
        i -= 1;
        let Some(edge) = stream.detect_block_type_at(i) else {
            continue;
        };
        if edge.is_start {
            return Some((i, edge.block));
        }
        i = stream.find_block_start(edge.block, i).ok()?;
    }
    None
}

fn is_assignment(token: &Token) -> bool {
    token.is(TokenKind::Assign) || (token.is(TokenKind::Operator) && token.equals_any(COMPOUND_ASSIGNMENTS))
}

/// Facts about one constructor.
///
/// Borrows the stream, so it has to be dropped before the next edit.
#[derive(Debug, Clone, Copy)]
pub struct ConstructorAnalysis<'a> {
    stream: &'a TokenStream,
    constructor_index: usize,
    parameters_open: usize,
    parameters_close: usize,
}

impl<'a> ConstructorAnalysis<'a> {
    pub fn new(stream: &'a TokenStream, constructor_index: usize) -> Result<Self, CoreError> {
        if !stream.token(constructor_index)?.is(TokenKind::Function) {
            return Err(unexpected(stream, constructor_index, "`function`"));
        }
        let parameters_open = stream
            .next_token_of_kind(constructor_index, &[TokenKind::OpenParen])
            .ok_or(CoreError::MissingMeaningfulToken {
                index: constructor_index,
            })?;
        let parameters_close = stream.find_block_end(BlockType::Parenthesis, parameters_open)?;

        Ok(Self {
            stream,
            constructor_index,
            parameters_open,
            parameters_close,
        })
    }

    pub fn constructor_index(&self) -> usize {
        self.constructor_index
    }

    /// `(` and `)` of the parameter list
    pub fn parameters_bounds(&self) -> (usize, usize) {
        (self.parameters_open, self.parameters_close)
    }

    /// `{` and `}` of the body, if the constructor has one
    pub fn body_bounds(&self) -> Result<Option<(usize, usize)>, CoreError> {
        match self.stream.next_meaningful(self.parameters_close) {
            Some(open) if self.stream[open].is(TokenKind::OpenBrace) => {
                let close = self.stream.find_block_end(BlockType::CurlyBrace, open)?;
                Ok(Some((open, close)))
            }
            _ => Ok(None),
        }
    }

    /// Every parameter variable, `$` included
    pub fn constructor_parameter_names(&self) -> Vec<String> {
        (self.parameters_open + 1..self.parameters_close)
            .filter(|&i| self.stream[i].is(TokenKind::Variable))
            .map(|i| self.stream[i].content().to_string())
            .collect()
    }

    /// Typed, not yet promoted, non-variadic parameters: variable index to
    /// name without `$`
    pub fn promotable_parameters(&self) -> BTreeMap<usize, String> {
        let stream = self.stream;
        let mut parameters = BTreeMap::new();

        for index in self.parameters_open + 1..self.parameters_close {
            if !stream[index].is(TokenKind::Variable) {
                continue;
            }

            let Some(type_index) = stream.prev_meaningful(index) else {
                continue;
            };
            if stream[type_index].is_any(&[
                TokenKind::OpenParen,
                TokenKind::Comma,
                TokenKind::Callable,
                TokenKind::Ellipsis,
            ]) {
                continue;
            }

            let already_promoted = stream
                .prev_token_of_kind(
                    index,
                    &[
                        TokenKind::OpenParen,
                        TokenKind::Comma,
                        TokenKind::Public,
                        TokenKind::Protected,
                        TokenKind::Private,
                        TokenKind::Readonly,
                    ],
                )
                .is_some_and(|i| !stream[i].is_any(&[TokenKind::OpenParen, TokenKind::Comma]));
            if already_promoted {
                continue;
            }

            parameters.insert(index, stream[index].content()[1..].to_string());
        }

        parameters
    }

    /// Unconditional `$this->prop = $var;` statements keyed by property
    /// name.
    ///
    /// A property written more than once, a variable assigned to more than
    /// one property, or a variable reassigned anywhere in the body is
    /// ambiguous: every statement involving it is left out.
    pub fn promotable_assignments(&self) -> Result<BTreeMap<String, PromotableAssignment>, CoreError> {
        let Some((open, close)) = self.body_bounds()? else {
            return Ok(BTreeMap::new());
        };
        let stream = self.stream;

        let mut candidates = Vec::new();
        let mut property_writes: HashMap<String, usize> = HashMap::new();
        let mut variable_sources: HashMap<String, usize> = HashMap::new();
        let mut variable_writes: HashMap<String, usize> = HashMap::new();
        let mut depth = 0usize;

        for index in open + 1..close {
            let token = &stream[index];
            if let Some(edge) = stream.detect_block_type_at(index) {
                if edge.is_start {
                    depth += 1;
                } else {
                    depth = depth.saturating_sub(1);
                }
                continue;
            }
            if !token.is(TokenKind::Variable) {
                continue;
            }

            let next = stream.next_meaningful(index);
            if token.equals("$this") {
                if let Some(property) = self.written_property(index) {
                    *property_writes.entry(property).or_default() += 1;
                }
                continue;
            }

            if self.is_written(index, open) {
                *variable_writes.entry(token.content().to_string()).or_default() += 1;
                continue;
            }

            let Some(semicolon) = next.filter(|&n| stream[n].is(TokenKind::Semicolon)) else {
                continue;
            };
            let Some((this_index, property_index)) = self.assigned_property(index, open) else {
                continue;
            };

            *variable_sources.entry(token.content().to_string()).or_default() += 1;
            if depth == 0 {
                candidates.push(PromotableAssignment {
                    this_index,
                    property_index,
                    variable_index: index,
                    semicolon_index: semicolon,
                    variable: token.content()[1..].to_string(),
                });
            }
        }

        let mut assignments = BTreeMap::new();
        for candidate in candidates {
            let property = stream[candidate.property_index].content().to_string();
            let variable = stream[candidate.variable_index].content();
            let ambiguous = property_writes.get(&property).copied().unwrap_or(0) > 1
                || variable_sources.get(variable).copied().unwrap_or(0) > 1
                || variable_writes.contains_key(variable);
            if !ambiguous {
                assignments.insert(property, candidate);
            }
        }

        Ok(assignments)
    }

    /// Whether the variable at `index` is assigned, incremented, has an
    /// element written, or is the target of a foreach or destructuring
    fn is_written(&self, variable_index: usize, body_open: usize) -> bool {
        let stream = self.stream;
        let incremented = stream
            .prev_meaningful(variable_index)
            .is_some_and(|prev| stream[prev].is(TokenKind::Operator) && stream[prev].equals_any(&["++", "--"]));
        incremented || self.element_written(variable_index) || self.is_assignment_target(variable_index, body_open)
    }

    /// `$var = `, `$var[...] = ` or `$var[] .= `
    fn element_written(&self, variable_index: usize) -> bool {
        let stream = self.stream;
        let mut index = variable_index;
        while let Some(next) = stream.next_meaningful(index) {
            if !stream[next].is(TokenKind::OpenBracket) {
                return is_assignment(&stream[next]);
            }
            let Ok(close) = stream.find_block_end(BlockType::IndexSquareBrace, next) else {
                return false;
            };
            index = close;
        }
        false
    }

    /// Inside `[...] = `, `list(...) = ` or after `as` in a foreach header
    fn is_assignment_target(&self, variable_index: usize, body_open: usize) -> bool {
        let stream = self.stream;
        let mut inner = variable_index;
        while let Some((opener, block)) = enclosing_block(stream, inner, body_open) {
            match block {
                BlockType::ArraySquareBrace => {}
                BlockType::Parenthesis => {
                    let Some(keyword) = stream.prev_meaningful(opener) else {
                        return false;
                    };
                    if stream[keyword].is(TokenKind::Foreach) {
                        return stream.tokens()[opener..variable_index].iter().any(|t| t.is(TokenKind::As));
                    }
                    if !stream[keyword].is(TokenKind::List) {
                        return false;
                    }
                }
                _ => return false,
            }
            let Ok(closer) = stream.find_block_end(block, opener) else {
                return false;
            };
            if stream.next_meaningful(closer).is_some_and(|n| stream[n].is(TokenKind::Assign)) {
                return true;
            }
            inner = opener;
        }
        false
    }

    /// `$this->name` followed by an assignment operator
    fn written_property(&self, this_index: usize) -> Option<String> {
        let stream = self.stream;
        let operator = stream.next_meaningful(this_index)?;
        if !stream[operator].is(TokenKind::ObjectOperator) {
            return None;
        }
        let name = stream.next_meaningful(operator)?;
        if !stream[name].is(TokenKind::Identifier) {
            return None;
        }
        let after = stream.next_meaningful(name)?;
        is_assignment(&stream[after]).then(|| stream[name].content().to_string())
    }

    /// For the `$var` of `$this->prop = $var` starting a statement, the
    /// `$this` and `prop` indices
    fn assigned_property(&self, variable_index: usize, body_open: usize) -> Option<(usize, usize)> {
        let stream = self.stream;
        let assign = stream.prev_meaningful(variable_index)?;
        if !stream[assign].is(TokenKind::Assign) {
            return None;
        }
        let property = stream.prev_meaningful(assign)?;
        if !stream[property].is(TokenKind::Identifier) {
            return None;
        }
        let operator = stream.prev_meaningful(property)?;
        if !stream[operator].is(TokenKind::ObjectOperator) {
            return None;
        }
        let this = stream.prev_meaningful(operator)?;
        if !stream[this].equals("$this") {
            return None;
        }
        let before = stream.prev_meaningful(this)?;
        let starts_statement =
            before == body_open || stream[before].is_any(&[TokenKind::Semicolon, TokenKind::CloseBrace, TokenKind::OpenBrace]);
        starts_statement.then_some((this, property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_constructor<T>(source: &str, f: impl FnOnce(&ConstructorAnalysis<'_>) -> T) -> T {
        let tokens = TokenStream::from_source(source);
        let class = tokens.find_kind(TokenKind::Class)[0];
        let constructor = find_non_abstract_constructor(&tokens, class).unwrap().unwrap();
        let analysis = ConstructorAnalysis::new(&tokens, constructor).unwrap();
        f(&analysis)
    }

    fn assigned(source: &str) -> Vec<(String, String)> {
        with_constructor(source, |analysis| {
            analysis
                .promotable_assignments()
                .unwrap()
                .into_iter()
                .map(|(property, a)| (property, a.variable))
                .collect()
        })
    }

    #[test]
    fn test_find_constructor_skips_method_bodies() {
        let tokens = TokenStream::from_source(
            "<?php class A { public function foo() { $f = function __construct() {}; } public function __construct() {} }",
        );
        let class = tokens.find_kind(TokenKind::Class)[0];
        let constructor = find_non_abstract_constructor(&tokens, class).unwrap().unwrap();
        let public = tokens.prev_meaningful(constructor).unwrap();
        assert!(tokens[public].is(TokenKind::Public));
        assert_eq!(tokens.find_kind(TokenKind::Function)[2], constructor);
    }

    #[test]
    fn test_abstract_and_missing_constructor() {
        let tokens = TokenStream::from_source("<?php abstract class A { abstract public function __construct(); }");
        let class = tokens.find_kind(TokenKind::Class)[0];
        assert_eq!(find_non_abstract_constructor(&tokens, class).unwrap(), None);

        let tokens = TokenStream::from_source("<?php class A { public function foo() {} }");
        let class = tokens.find_kind(TokenKind::Class)[0];
        assert_eq!(find_non_abstract_constructor(&tokens, class).unwrap(), None);
    }

    #[test]
    fn test_anonymous_class() {
        let tokens = TokenStream::from_source("<?php $a = new class(1) { public function __CONSTRUCT($x) {} };");
        let class = tokens.find_kind(TokenKind::Class)[0];
        assert!(find_non_abstract_constructor(&tokens, class).unwrap().is_some());
    }

    #[test]
    fn test_promotable_parameters() {
        let names: Vec<String> = with_constructor(
            "<?php class A { public function __construct(int $a, $b, callable $c, string ...$d, private int $e, readonly int $f, ?Foo $g) {} }",
            |analysis| analysis.promotable_parameters().into_values().collect(),
        );
        assert_eq!(names, vec!["a", "g"]);
    }

    #[test]
    fn test_parameter_names() {
        let names = with_constructor(
            "<?php class A { public function __construct(int $a, private $b) {} }",
            |analysis| analysis.constructor_parameter_names(),
        );
        assert_eq!(names, vec!["$a", "$b"]);
    }

    #[test]
    fn test_promotable_assignments() {
        let assignments = assigned(
            "<?php class A { public function __construct($a, $b, $c) { $this->a = $a; $this->bar = $b; if ($c) { $this->c = $c; } } }",
        );
        assert_eq!(
            assignments,
            vec![("a".to_string(), "a".to_string()), ("bar".to_string(), "b".to_string())]
        );
    }

    #[test]
    fn test_duplicate_property_is_excluded() {
        let assignments = assigned(
            "<?php class A { public function __construct($x, $y) { $this->a = $x; $this->a = $y; } }",
        );
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_duplicate_variable_and_reassignment_are_excluded() {
        let assignments = assigned(
            "<?php class A { public function __construct($z, $w, $v) { $this->b = $z; $this->c = $z; $w = trim($w); $this->d = $w; $this->e = $v; } }",
        );
        assert_eq!(assignments, vec![("e".to_string(), "v".to_string())]);
    }

    #[test]
    fn test_foreach_targets_are_writes() {
        let assignments = assigned(
            "<?php class A { public function __construct(int $a, $k, $v, $r) { foreach ([1, 2] as $a) {} foreach ($r as $k => [$v]) {} $this->a = $a; $this->k = $k; $this->v = $v; $this->r = $r; } }",
        );
        assert_eq!(assignments, vec![("r".to_string(), "r".to_string())]);
    }

    #[test]
    fn test_destructuring_increment_and_element_writes() {
        let assignments = assigned(
            "<?php class A { public function __construct($a, $b, $c, $d, $e, $f) { [$a] = [5]; list($c) = [1]; ++$b; $d[] = 1; [[$e], $x] = $y; $this->a = $a; $this->b = $b; $this->c = $c; $this->d = $d; $this->e = $e; $this->f = [$f]; $this->g = $f; } }",
        );
        assert_eq!(assignments, vec![("g".to_string(), "f".to_string())]);
    }

    #[test]
    fn test_conditional_write_counts_against_property() {
        let assignments = assigned(
            "<?php class A { public function __construct($a) { $this->a = $a; if (!$a) { $this->a .= 'x'; } } }",
        );
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_no_body() {
        let tokens = TokenStream::from_source("<?php interface I { public function __construct(); } class A { public function __construct(); }");
        let class = tokens.find_kind(TokenKind::Class)[0];
        let constructor = find_non_abstract_constructor(&tokens, class).unwrap().unwrap();
        let analysis = ConstructorAnalysis::new(&tokens, constructor).unwrap();
        assert!(analysis.promotable_assignments().unwrap().is_empty());
    }
}
