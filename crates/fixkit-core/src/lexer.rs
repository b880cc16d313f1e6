//! PHP lexer - tokenizes source text into a [`TokenStream`]
//!
//! Lexing never fails: unknown bytes become single-character operator
//! tokens and unterminated strings or comments run to the end of input.
//! Whitespace and comments are kept as their own tokens so the stream
//! serializes back to the exact input.

use tracing::trace;

use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

const CASTS: &[&str] = &[
    "int", "integer", "bool", "boolean", "float", "double", "real", "string", "binary", "array",
    "object", "unset",
];

/// Operators of two or more characters, longest first
const MULTI_CHAR_OPERATORS: &[(&str, TokenKind)] = &[
    ("<<<", TokenKind::Operator),
    ("<<=", TokenKind::Operator),
    (">>=", TokenKind::Operator),
    ("**=", TokenKind::Operator),
    ("...", TokenKind::Ellipsis),
    ("<=>", TokenKind::Operator),
    ("===", TokenKind::Operator),
    ("!==", TokenKind::Operator),
    ("??=", TokenKind::Operator),
    ("?->", TokenKind::NullsafeObjectOperator),
    ("->", TokenKind::ObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::DoubleColon),
    ("??", TokenKind::Coalesce),
    ("++", TokenKind::Operator),
    ("--", TokenKind::Operator),
    ("==", TokenKind::Operator),
    ("!=", TokenKind::Operator),
    ("<>", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    (">=", TokenKind::Operator),
    ("&&", TokenKind::Operator),
    ("||", TokenKind::Operator),
    ("+=", TokenKind::Operator),
    ("-=", TokenKind::Operator),
    ("*=", TokenKind::Operator),
    ("/=", TokenKind::Operator),
    (".=", TokenKind::Operator),
    ("%=", TokenKind::Operator),
    ("&=", TokenKind::Operator),
    ("|=", TokenKind::Operator),
    ("^=", TokenKind::Operator),
    ("<<", TokenKind::Operator),
    (">>", TokenKind::Operator),
    ("**", TokenKind::Operator),
];

/// Tokenize PHP source into a stream
pub fn lex(source: &str) -> TokenStream {
    let mut tokens = Lexer::new(source).tokenize();
    classify(&mut tokens);
    trace!(bytes = source.len(), tokens = tokens.len(), "lexed");
    TokenStream::new(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    position: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        while self.position < self.input.len() {
            self.read_inline_html();
            self.read_php();
        }
        self.tokens
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, len: usize) {
        let end = (self.position + len).min(self.input.len());
        let content = &self.input[self.position..end];
        self.tokens.push(Token::new(kind, content));
        self.position = end;
    }

    /// Length of a single line break at `offset` from the current position
    fn newline_len_at(&self, offset: usize) -> usize {
        match (self.peek_at(offset), self.peek_at(offset + 1)) {
            (Some(b'\r'), Some(b'\n')) => 2,
            (Some(b'\n'), _) | (Some(b'\r'), _) => 1,
            _ => 0,
        }
    }

    fn read_inline_html(&mut self) {
        let rest = self.rest();
        let html_len = rest.find("<?").unwrap_or(rest.len());
        if html_len > 0 {
            self.push(TokenKind::InlineHtml, html_len);
        }

        let rest = self.rest();
        if rest.is_empty() {
            return;
        }

        if rest.len() >= 5 && rest.as_bytes()[..5].eq_ignore_ascii_case(b"<?php") {
            let after = self.peek_at(5);
            let trailing = match after {
                Some(b' ') | Some(b'\t') => 1,
                Some(b'\n') | Some(b'\r') => self.newline_len_at(5),
                _ => 0,
            };
            self.push(TokenKind::OpenTag, 5 + trailing);
        } else if rest.starts_with("<?=") {
            self.push(TokenKind::OpenTagWithEcho, 3);
        } else {
            self.push(TokenKind::OpenTag, 2);
        }
    }

    fn read_php(&mut self) {
        while let Some(ch) = self.peek() {
            let rest = self.rest();

            if rest.starts_with("?>") {
                let trailing = self.newline_len_at(2);
                self.push(TokenKind::CloseTag, 2 + trailing);
                return;
            }

            if rest.starts_with("<<<") && self.try_read_heredoc() {
                continue;
            }

            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    let len = rest
                        .find(|c: char| !matches!(c, ' ' | '\t' | '\n' | '\r'))
                        .unwrap_or(rest.len());
                    self.push(TokenKind::Whitespace, len);
                }
                '#' if rest.starts_with("#[") => self.push(TokenKind::AttributeOpen, 2),
                '#' => self.read_line_comment(),
                '/' if rest.starts_with("//") => self.read_line_comment(),
                '/' if rest.starts_with("/*") => self.read_block_comment(),
                '$' => {
                    let name_len = identifier_len(&rest[1..]);
                    if name_len > 0 {
                        self.push(TokenKind::Variable, 1 + name_len);
                    } else {
                        self.push(TokenKind::Operator, 1);
                    }
                }
                '\'' => self.read_quoted('\''),
                '"' => self.read_quoted('"'),
                '`' => self.read_quoted('`'),
                '(' => {
                    if let Some(len) = cast_len(rest) {
                        self.push(TokenKind::Cast, len);
                    } else {
                        self.push(TokenKind::OpenParen, 1);
                    }
                }
                ')' => self.push(TokenKind::CloseParen, 1),
                '{' => self.push(TokenKind::OpenBrace, 1),
                '}' => self.push(TokenKind::CloseBrace, 1),
                '[' => self.push(TokenKind::OpenBracket, 1),
                ']' => self.push(TokenKind::CloseBracket, 1),
                ',' => self.push(TokenKind::Comma, 1),
                ';' => self.push(TokenKind::Semicolon, 1),
                '\\' => self.push(TokenKind::NsSeparator, 1),
                c if c.is_ascii_digit() => self.read_number(),
                '.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.read_number(),
                c if is_identifier_start(c) => {
                    let len = identifier_len(rest);
                    let kind = TokenKind::keyword(&rest[..len]).unwrap_or(TokenKind::Identifier);
                    self.push(kind, len);
                }
                _ => self.read_operator(),
            }
        }
    }

    fn read_line_comment(&mut self) {
        let rest = self.rest();
        let mut len = rest.len();
        for (i, c) in rest.char_indices() {
            if c == '\n' || c == '\r' {
                len = i + self.newline_len_at(i);
                break;
            }
            if rest[i..].starts_with("?>") {
                len = i;
                break;
            }
        }
        self.push(TokenKind::Comment, len);
    }

    fn read_block_comment(&mut self) {
        let rest = self.rest();
        let len = rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
        let is_doc = rest.starts_with("/**")
            && rest[3..].chars().next().is_some_and(|c| c.is_whitespace());
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.push(kind, len);
    }

    fn read_quoted(&mut self, quote: char) {
        let rest = self.rest();
        let mut escaped = false;
        let mut len = rest.len();
        for (i, c) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            if c == '\\' {
                escaped = true;
            } else if c == quote {
                len = i + 1;
                break;
            }
        }
        self.push(TokenKind::StringLiteral, len);
    }

    /// Heredoc and nowdoc bodies are kept as one token, label to label
    fn try_read_heredoc(&mut self) -> bool {
        let rest = self.rest();
        let header = rest[3..].trim_start_matches([' ', '\t']);
        let header_offset = rest.len() - header.len();
        let (label, quote_len) = match header.chars().next() {
            Some('\'') | Some('"') => {
                let label_len = identifier_len(&header[1..]);
                (&header[1..1 + label_len], 2)
            }
            _ => {
                let label_len = identifier_len(header);
                (&header[..label_len], 0)
            }
        };
        if label.is_empty() {
            return false;
        }

        let header_end = header_offset + label.len() + quote_len;
        let Some(first_newline) = rest[header_end..].find('\n') else {
            return false;
        };

        let mut line_start = header_end + first_newline + 1;
        while line_start <= rest.len() {
            let line = &rest[line_start..];
            let trimmed = line.trim_start_matches([' ', '\t']);
            if trimmed.starts_with(label)
                && !trimmed[label.len()..]
                    .chars()
                    .next()
                    .is_some_and(is_identifier_continue)
            {
                let end = line_start + (line.len() - trimmed.len()) + label.len();
                self.push(TokenKind::Heredoc, end);
                return true;
            }
            match line.find('\n') {
                Some(i) => line_start += i + 1,
                None => break,
            }
        }

        self.push(TokenKind::Heredoc, rest.len());
        true
    }

    fn read_number(&mut self) {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut len = 0;

        if bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'b' | b'B' | b'o' | b'O') {
            len = 2;
            while len < bytes.len() && (bytes[len].is_ascii_hexdigit() || bytes[len] == b'_') {
                len += 1;
            }
            self.push(TokenKind::Number, len);
            return;
        }

        while len < bytes.len() && (bytes[len].is_ascii_digit() || bytes[len] == b'_') {
            len += 1;
        }
        if len < bytes.len() && bytes[len] == b'.' && bytes.get(len + 1).map_or(true, |b| *b != b'.') {
            len += 1;
            while len < bytes.len() && (bytes[len].is_ascii_digit() || bytes[len] == b'_') {
                len += 1;
            }
        }
        if len < bytes.len() && matches!(bytes[len], b'e' | b'E') {
            let mut exp = len + 1;
            if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                exp += 1;
            }
            if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                len = exp;
                while len < bytes.len() && bytes[len].is_ascii_digit() {
                    len += 1;
                }
            }
        }
        self.push(TokenKind::Number, len.max(1));
    }

    fn read_operator(&mut self) {
        let rest = self.rest();
        for (op, kind) in MULTI_CHAR_OPERATORS {
            if rest.starts_with(op) {
                self.push(*kind, op.len());
                return;
            }
        }

        let ch = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        let kind = match &rest[..ch] {
            ":" => TokenKind::Colon,
            "?" => TokenKind::Question,
            "=" => TokenKind::Assign,
            _ => TokenKind::Operator,
        };
        self.push(kind, ch);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

fn identifier_len(s: &str) -> usize {
    match s.chars().next() {
        Some(c) if is_identifier_start(c) => {}
        _ => return 0,
    }
    s.char_indices()
        .find(|(_, c)| !is_identifier_continue(*c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Length of a cast like `( int )` at the start of `s`
fn cast_len(s: &str) -> Option<usize> {
    let inner = s[1..].trim_start_matches([' ', '\t']);
    let word_len = identifier_len(inner);
    if word_len == 0 {
        return None;
    }
    let word = &inner[..word_len];
    if !CASTS.iter().any(|c| c.eq_ignore_ascii_case(word)) {
        return None;
    }
    let after = inner[word_len..].trim_start_matches([' ', '\t']);
    if !after.starts_with(')') {
        return None;
    }
    Some(s.len() - after.len() + 1)
}

/// Re-kind context sensitive punctuation and keywords used as names.
///
/// Square brackets become array literals or index accesses depending on
/// what precedes them, `#[` groups close with an attribute bracket, and
/// braces after `->` or `$` become dynamic property/variable braces.
fn classify(tokens: &mut [Token]) {
    let mut square_stack: Vec<TokenKind> = Vec::new();
    let mut curly_stack: Vec<TokenKind> = Vec::new();
    let mut prev_meaningful: Option<TokenKind> = None;

    for index in 0..tokens.len() {
        let kind = tokens[index].kind();
        let content = tokens[index].content().to_string();

        let new_kind = match kind {
            TokenKind::OpenBracket => {
                let is_index = matches!(
                    prev_meaningful,
                    Some(
                        TokenKind::Variable
                            | TokenKind::Identifier
                            | TokenKind::CloseParen
                            | TokenKind::CloseBracket
                            | TokenKind::ArrayClose
                            | TokenKind::StringLiteral
                            | TokenKind::DynamicPropClose
                            | TokenKind::DynamicVarClose
                    )
                );
                let open = if is_index {
                    TokenKind::OpenBracket
                } else {
                    TokenKind::ArrayOpen
                };
                square_stack.push(open);
                open
            }
            TokenKind::AttributeOpen => {
                square_stack.push(TokenKind::AttributeOpen);
                kind
            }
            TokenKind::CloseBracket => match square_stack.pop() {
                Some(TokenKind::ArrayOpen) => TokenKind::ArrayClose,
                Some(TokenKind::AttributeOpen) => TokenKind::AttributeClose,
                _ => TokenKind::CloseBracket,
            },
            TokenKind::OpenBrace => {
                let prev_raw = index.checked_sub(1).map(|i| &tokens[i]);
                let open = if matches!(
                    prev_meaningful,
                    Some(TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator)
                ) {
                    TokenKind::DynamicPropOpen
                } else if prev_raw.is_some_and(|t| t.is(TokenKind::Operator) && t.equals("$")) {
                    TokenKind::DynamicVarOpen
                } else {
                    TokenKind::OpenBrace
                };
                curly_stack.push(open);
                open
            }
            TokenKind::CloseBrace => match curly_stack.pop() {
                Some(TokenKind::DynamicPropOpen) => TokenKind::DynamicPropClose,
                Some(TokenKind::DynamicVarOpen) => TokenKind::DynamicVarClose,
                _ => TokenKind::CloseBrace,
            },
            k if k.is_keyword() && is_name_position(prev_meaningful, tokens, index) => {
                TokenKind::Identifier
            }
            _ => kind,
        };

        if new_kind != kind {
            tokens[index] = Token::new(new_kind, content);
        }
        if tokens[index].is_meaningful() {
            prev_meaningful = Some(new_kind);
        }
    }
}

/// Keywords after `->`, `::` or naming a function are plain identifiers
fn is_name_position(prev: Option<TokenKind>, tokens: &[Token], index: usize) -> bool {
    match prev {
        Some(TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator | TokenKind::DoubleColon) => true,
        Some(TokenKind::Function) | Some(TokenKind::Const) => tokens[index + 1..]
            .iter()
            .find(|t| t.is_meaningful())
            .is_some_and(|t| t.is_any(&[TokenKind::OpenParen, TokenKind::Assign])),
        _ => false,
    }
}
