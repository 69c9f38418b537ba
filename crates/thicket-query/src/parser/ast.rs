//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors. Casting
//! only checks the kind; shape errors were already reported by the parser.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            /// Source range without leading trivia.
            pub fn text_range(&self) -> TextRange {
                trimmed_range(&self.0)
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Tree, Tree);
ast_node!(Str, Str);
ast_node!(Wildcard, Wildcard);
ast_node!(Alt, Alt);
ast_node!(Group, Group);
ast_node!(Field, Field);
ast_node!(NegatedField, NegatedField);
ast_node!(Capture, Capture);
ast_node!(Quantifier, Quantifier);
ast_node!(Anchor, Anchor);
ast_node!(Predicate, Predicate);
ast_node!(CaptureRef, CaptureRef);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Tree(Tree),
    Str(Str),
    Wildcard(Wildcard),
    Alt(Alt),
    Group(Group),
    Field(Field),
    NegatedField(NegatedField),
    Capture(Capture),
    Quantifier(Quantifier),
    Anchor(Anchor),
    Predicate(Predicate),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Tree => Tree::cast(node).map(Expr::Tree),
            SyntaxKind::Str => Str::cast(node).map(Expr::Str),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Expr::Wildcard),
            SyntaxKind::Alt => Alt::cast(node).map(Expr::Alt),
            SyntaxKind::Group => Group::cast(node).map(Expr::Group),
            SyntaxKind::Field => Field::cast(node).map(Expr::Field),
            SyntaxKind::NegatedField => NegatedField::cast(node).map(Expr::NegatedField),
            SyntaxKind::Capture => Capture::cast(node).map(Expr::Capture),
            SyntaxKind::Quantifier => Quantifier::cast(node).map(Expr::Quantifier),
            SyntaxKind::Anchor => Anchor::cast(node).map(Expr::Anchor),
            SyntaxKind::Predicate => Predicate::cast(node).map(Expr::Predicate),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::Tree(n) => n.as_cst(),
            Expr::Str(n) => n.as_cst(),
            Expr::Wildcard(n) => n.as_cst(),
            Expr::Alt(n) => n.as_cst(),
            Expr::Group(n) => n.as_cst(),
            Expr::Field(n) => n.as_cst(),
            Expr::NegatedField(n) => n.as_cst(),
            Expr::Capture(n) => n.as_cst(),
            Expr::Quantifier(n) => n.as_cst(),
            Expr::Anchor(n) => n.as_cst(),
            Expr::Predicate(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        trimmed_range(self.as_cst())
    }
}

/// A node's range starting at its first non-trivia token.
fn trimmed_range(node: &SyntaxNode) -> TextRange {
    let end = node.text_range().end();
    node.descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| !t.kind().is_trivia())
        .map_or(node.text_range(), |t| TextRange::new(t.text_range().start(), end))
}

fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    node.children_with_tokens().filter_map(|it| it.into_token())
}

fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    tokens(node).find(|t| t.kind() == kind)
}

/// A kind name written either as an identifier or as a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindName {
    pub text: String,
    pub named: bool,
    pub range: TextRange,
}

impl Root {
    pub fn exprs(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

/// What sits right after `(`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeHead {
    Wildcard,
    Kind(SyntaxToken),
    Error,
    Missing,
}

impl Tree {
    pub fn head(&self) -> Option<TreeHead> {
        tokens(&self.0).find_map(|t| match t.kind() {
            SyntaxKind::Underscore => Some(TreeHead::Wildcard),
            SyntaxKind::Id => Some(TreeHead::Kind(t)),
            SyntaxKind::KwError => Some(TreeHead::Error),
            SyntaxKind::KwMissing => Some(TreeHead::Missing),
            _ => None,
        })
    }

    /// The kind after `/` in `(supertype/subtype)`, or the argument of
    /// `(MISSING kind)`. Both are tokens placed directly in the tree node
    /// after its head.
    pub fn argument(&self) -> Option<KindName> {
        let mut after_head = tokens(&self.0)
            .skip_while(|t| {
                !matches!(
                    t.kind(),
                    SyntaxKind::Id | SyntaxKind::KwMissing | SyntaxKind::Underscore
                )
            })
            .skip(1)
            .filter(|t| !t.kind().is_trivia() && t.kind() != SyntaxKind::Slash);

        let first = after_head.next()?;
        match first.kind() {
            SyntaxKind::Id => Some(KindName {
                text: first.text().to_string(),
                named: true,
                range: first.text_range(),
            }),
            SyntaxKind::DoubleQuote => {
                let value = after_head.next()?;
                let (text, end) = if value.kind() == SyntaxKind::StrVal {
                    let close = after_head.next();
                    (
                        super::lexer::unescape(value.text()),
                        close.map_or(value.text_range().end(), |t| t.text_range().end()),
                    )
                } else {
                    (String::new(), value.text_range().end())
                };
                Some(KindName {
                    text,
                    named: false,
                    range: TextRange::new(first.text_range().start(), end),
                })
            }
            _ => None,
        }
    }

    pub fn has_slash(&self) -> bool {
        first_token(&self.0, SyntaxKind::Slash).is_some()
    }

    pub fn children(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl Str {
    /// Unescaped content; empty for `""`.
    pub fn value(&self) -> String {
        first_token(&self.0, SyntaxKind::StrVal)
            .map(|t| super::lexer::unescape(t.text()))
            .unwrap_or_default()
    }
}

impl Alt {
    pub fn branches(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl Group {
    pub fn children(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl Field {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::Id)
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl NegatedField {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::Id)
    }
}

impl Capture {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::Id)
    }

    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl Quantifier {
    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        tokens(&self.0).find(|t| {
            matches!(
                t.kind(),
                SyntaxKind::Star | SyntaxKind::Plus | SyntaxKind::Question
            )
        })
    }
}

/// One argument of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateArg {
    Capture(CaptureRef),
    Str(Str),
    Id(SyntaxToken),
}

impl Predicate {
    /// The name token, `#` included: `#eq?`.
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::PredicateName)
    }

    pub fn args(&self) -> impl Iterator<Item = PredicateArg> + '_ {
        self.0.children_with_tokens().filter_map(|it| match it {
            rowan::NodeOrToken::Node(node) => match node.kind() {
                SyntaxKind::CaptureRef => CaptureRef::cast(node).map(PredicateArg::Capture),
                SyntaxKind::Str => Str::cast(node).map(PredicateArg::Str),
                _ => None,
            },
            rowan::NodeOrToken::Token(token) => {
                (token.kind() == SyntaxKind::Id).then_some(PredicateArg::Id(token))
            }
        })
    }
}

impl CaptureRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::Id)
    }
}
