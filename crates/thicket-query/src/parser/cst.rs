//! Syntax kinds for the query language.
//!
//! `SyntaxKind` doubles as the token kind produced by the lexer and the node
//! kind produced by the parser. Logos derives token recognition; node kinds
//! carry no token attributes. `QueryLang` plugs the kinds into Rowan.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then the `__LAST`
/// sentinel. `#[repr(u16)]` lets `kind_from_raw` transmute.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    #[token("_", priority = 3)]
    Underscore,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    /// Separates a supertype from its subtype: `(expression/number)`.
    #[token("/")]
    Slash,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[doc(hidden)]
    StringLiteral, // Lexer-internal only

    DoubleQuote,
    /// String content between quotes, escapes still encoded.
    StrVal,

    #[token("ERROR")]
    KwError,

    #[token("MISSING")]
    KwMissing,

    /// Node, field and capture names. Dots and hyphens are allowed after the
    /// first character so capture names like `@function.name` lex as one
    /// token.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Id,

    /// Predicate or directive name: `#eq?`, `#set!`.
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    PredicateName,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,

    /// Coalesced unrecognized characters.
    Garbage,
    Error,

    // --- Node kinds ---
    Root,
    /// `(kind ...)`, `(_ ...)`, `(ERROR)`, `(MISSING ...)`
    Tree,
    /// `"literal"`
    Str,
    Wildcard,
    Alt,
    /// `((a) (b))`: consecutive siblings
    Group,
    Field,
    NegatedField,
    Capture,
    Quantifier,
    Anchor,
    /// `(#eq? @a "b")`
    Predicate,
    /// `@name` as a predicate argument
    CaptureRef,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Comment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryLang {}

impl Language for QueryLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: the value is in bounds and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<QueryLang>;
pub type SyntaxToken = rowan::SyntaxToken<QueryLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit set of token kinds for O(1) membership tests.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant is 64 or more.
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        kind < 64 && self.0 & (1 << kind) != 0
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..(__LAST as u16).min(64) {
            if self.0 & (1 << i) != 0 {
                list.entry(&QueryLang::kind_from_raw(rowan::SyntaxKind(i)));
            }
        }
        list.finish()
    }
}

pub mod token_sets {
    use super::*;

    /// Tokens that can start a pattern inside a node. `@` is excluded:
    /// captures suffix a pattern, they never start one.
    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        ParenOpen,
        BracketOpen,
        Underscore,
        Id,
        DoubleQuote,
        Dot,
        Negation,
    ]);

    /// Tokens that can start a top-level pattern.
    pub const ROOT_EXPR_FIRST: TokenSet =
        TokenSet::new(&[ParenOpen, BracketOpen, Underscore, Id, DoubleQuote]);

    pub const QUANTIFIERS: TokenSet = TokenSet::new(&[Star, Plus, Question]);

    /// Where an unexpected token inside a node stops being swallowed.
    pub const TREE_RECOVERY: TokenSet = TokenSet::new(&[BracketClose]);

    pub const ALT_RECOVERY: TokenSet = TokenSet::new(&[ParenClose]);

    pub const PREDICATE_RECOVERY: TokenSet = TokenSet::new(&[ParenOpen, BracketClose]);
}
