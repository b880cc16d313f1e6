//! Token kinds and the immutable token value

use std::fmt;

/// Closed set of token kinds for the PHP grammar.
///
/// Keywords that rules look for structurally get their own kind; the rest
/// of the keyword space is lexed as [`TokenKind::Identifier`]. Context
/// sensitive punctuation (`[`, `{`, `]`, `}`) is re-kinded by the lexer's
/// classification pass so block matching never has to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    InlineHtml,
    OpenTag,
    OpenTagWithEcho,
    CloseTag,

    Whitespace,
    Comment,
    DocComment,
    /// Placeholder left behind by a cleared token
    Void,

    Variable,
    Identifier,
    StringLiteral,
    Heredoc,
    Number,
    Cast,

    Abstract,
    Array,
    As,
    Break,
    Callable,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    ElseIf,
    Empty,
    EndDeclare,
    EndFor,
    EndForeach,
    EndIf,
    EndSwitch,
    EndWhile,
    Enum,
    Extends,
    Final,
    Finally,
    Fn,
    For,
    Foreach,
    Function,
    Global,
    Goto,
    If,
    Implements,
    Include,
    Instanceof,
    Insteadof,
    Interface,
    Isset,
    List,
    Match,
    Namespace,
    New,
    Print,
    Private,
    Protected,
    Public,
    Readonly,
    Require,
    Return,
    Static,
    Switch,
    Throw,
    Trait,
    Try,
    Unset,
    Use,
    Var,
    While,
    Yield,

    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    /// `[` of an index access (`$a[0]`)
    OpenBracket,
    /// `]` of an index access
    CloseBracket,
    /// `[` of a short array literal
    ArrayOpen,
    /// `]` of a short array literal
    ArrayClose,
    /// `#[`
    AttributeOpen,
    /// `]` closing an attribute group
    AttributeClose,
    /// `{` in `$a->{...}`
    DynamicPropOpen,
    DynamicPropClose,
    /// `{` in `${...}`
    DynamicVarOpen,
    DynamicVarClose,

    Comma,
    Semicolon,
    Colon,
    Question,
    Assign,
    ObjectOperator,
    NullsafeObjectOperator,
    DoubleColon,
    DoubleArrow,
    Ellipsis,
    Coalesce,
    NsSeparator,
    Operator,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("abstract", TokenKind::Abstract),
    ("array", TokenKind::Array),
    ("as", TokenKind::As),
    ("break", TokenKind::Break),
    ("callable", TokenKind::Callable),
    ("case", TokenKind::Case),
    ("catch", TokenKind::Catch),
    ("class", TokenKind::Class),
    ("clone", TokenKind::Clone),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("declare", TokenKind::Declare),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("echo", TokenKind::Echo),
    ("else", TokenKind::Else),
    ("elseif", TokenKind::ElseIf),
    ("empty", TokenKind::Empty),
    ("enddeclare", TokenKind::EndDeclare),
    ("endfor", TokenKind::EndFor),
    ("endforeach", TokenKind::EndForeach),
    ("endif", TokenKind::EndIf),
    ("endswitch", TokenKind::EndSwitch),
    ("endwhile", TokenKind::EndWhile),
    ("enum", TokenKind::Enum),
    ("extends", TokenKind::Extends),
    ("final", TokenKind::Final),
    ("finally", TokenKind::Finally),
    ("fn", TokenKind::Fn),
    ("for", TokenKind::For),
    ("foreach", TokenKind::Foreach),
    ("function", TokenKind::Function),
    ("global", TokenKind::Global),
    ("goto", TokenKind::Goto),
    ("if", TokenKind::If),
    ("implements", TokenKind::Implements),
    ("include", TokenKind::Include),
    ("include_once", TokenKind::Include),
    ("instanceof", TokenKind::Instanceof),
    ("insteadof", TokenKind::Insteadof),
    ("interface", TokenKind::Interface),
    ("isset", TokenKind::Isset),
    ("list", TokenKind::List),
    ("match", TokenKind::Match),
    ("namespace", TokenKind::Namespace),
    ("new", TokenKind::New),
    ("print", TokenKind::Print),
    ("private", TokenKind::Private),
    ("protected", TokenKind::Protected),
    ("public", TokenKind::Public),
    ("readonly", TokenKind::Readonly),
    ("require", TokenKind::Require),
    ("require_once", TokenKind::Require),
    ("return", TokenKind::Return),
    ("static", TokenKind::Static),
    ("switch", TokenKind::Switch),
    ("throw", TokenKind::Throw),
    ("trait", TokenKind::Trait),
    ("try", TokenKind::Try),
    ("unset", TokenKind::Unset),
    ("use", TokenKind::Use),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
    ("yield", TokenKind::Yield),
];

impl TokenKind {
    /// Look up the keyword kind for a word, case-insensitively
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|(_, kind)| *kind)
    }

    /// Whether this kind was produced from a reserved word
    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| *kind == self)
    }

    /// Visibility keywords
    pub fn is_visibility(self) -> bool {
        matches!(self, TokenKind::Public | TokenKind::Protected | TokenKind::Private)
    }

    /// Keywords that can prefix a class member declaration
    pub fn is_member_modifier(self) -> bool {
        self.is_visibility()
            || matches!(
                self,
                TokenKind::Static | TokenKind::Abstract | TokenKind::Final | TokenKind::Readonly | TokenKind::Var
            )
    }
}

/// An immutable `(kind, content)` pair.
///
/// `content` is the exact source text, so concatenating every token of a
/// stream reproduces the original file byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    content: String,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// The placeholder a cleared token leaves behind
    pub fn void() -> Self {
        Self::new(TokenKind::Void, "")
    }

    pub fn whitespace(content: impl Into<String>) -> Self {
        Self::new(TokenKind::Whitespace, content)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Exact content comparison
    pub fn equals(&self, content: &str) -> bool {
        self.content == content
    }

    pub fn equals_any(&self, contents: &[&str]) -> bool {
        contents.iter().any(|c| self.content == *c)
    }

    /// Content comparison for keyword-like text (`SWITCH` equals `switch`)
    pub fn equals_ignore_case(&self, content: &str) -> bool {
        self.content.eq_ignore_ascii_case(content)
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::DocComment)
    }

    /// Cleared placeholder or a token with no content
    pub fn is_empty(&self) -> bool {
        self.kind == TokenKind::Void || self.content.is_empty()
    }

    /// Whitespace, comments and cleared placeholders
    pub fn is_gibberish(&self) -> bool {
        self.is_whitespace() || self.is_comment() || self.is_empty()
    }

    /// Anything a rule should look at when walking "meaningful" siblings
    pub fn is_meaningful(&self) -> bool {
        !self.is_gibberish()
    }

    /// Whether the content holds a line break
    pub fn contains_newline(&self) -> bool {
        self.content.contains('\n') || self.content.contains('\r')
    }

    /// Double-quoted string, backtick command or heredoc embedding a
    /// variable, whose value is only known at runtime
    pub fn is_interpolated(&self) -> bool {
        match self.kind {
            TokenKind::StringLiteral => {
                let content = self.content.strip_prefix(['b', 'B']).unwrap_or(&self.content);
                content.starts_with(['"', '`']) && has_embedded_variable(content)
            }
            TokenKind::Heredoc => {
                let label = self.content.trim_start_matches('<').trim_start_matches([' ', '\t']);
                !label.starts_with('\'') && has_embedded_variable(&self.content)
            }
            _ => false,
        }
    }
}

/// `$name`, `${` or `{$` outside a backslash escape
fn has_embedded_variable(content: &str) -> bool {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'$' => {
                if let Some(&next) = bytes.get(i + 1) {
                    if next == b'{' || next == b'_' || next.is_ascii_alphabetic() || next >= 0x80 {
                        return true;
                    }
                }
            }
            b'{' if bytes.get(i + 1) == Some(&b'$') => return true,
            _ => {}
        }
        i += 1;
    }
    false
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
