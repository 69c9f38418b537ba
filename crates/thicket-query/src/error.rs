use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Broad category of a query compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    Syntax,
    NodeType,
    Field,
    Capture,
    Predicate,
    Structure,
    Language,
}

impl From<DiagnosticKind> for QueryErrorKind {
    fn from(kind: DiagnosticKind) -> Self {
        use DiagnosticKind as D;
        match kind {
            D::UnknownNodeType => Self::NodeType,
            D::UnknownField => Self::Field,
            D::UnknownCapture => Self::Capture,
            D::UnknownPredicate | D::InvalidPredicateArguments | D::InvalidRegex => {
                Self::Predicate
            }
            D::NotASupertype
            | D::FieldNotOnNodeType
            | D::InvalidFieldChildType
            | D::InvalidChildType => Self::Structure,
            D::IncompatibleLanguage => Self::Language,
            D::NestingTooDeep
            | D::UnclosedTree
            | D::UnclosedAlternation
            | D::UnclosedString
            | D::ExpectedExpression
            | D::ExpectedCaptureName
            | D::ExpectedFieldName
            | D::ExpectedSubtype
            | D::EmptyTree
            | D::BareIdentifier
            | D::ErrorTakesNoArguments
            | D::ErrorMissingOutsideParens
            | D::MisplacedAnchor
            | D::MisplacedNegatedField
            | D::PredicateOutsidePattern
            | D::CaptureWithoutTarget
            | D::UnexpectedToken => Self::Syntax,
        }
    }
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Syntax => "syntax error",
            Self::NodeType => "invalid node type",
            Self::Field => "invalid field",
            Self::Capture => "invalid capture",
            Self::Predicate => "invalid predicate",
            Self::Structure => "impossible pattern",
            Self::Language => "incompatible language",
        };
        f.write_str(name)
    }
}

/// Why a query failed to compile.
///
/// `offset`, `row` and `column` locate the first problem in the query
/// source (column in bytes). Every diagnostic is kept for rendering.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} at {row}:{column}: {message}")]
pub struct QueryError {
    pub offset: usize,
    pub row: usize,
    pub column: usize,
    pub kind: QueryErrorKind,
    pub message: String,
    diagnostics: Diagnostics,
}

impl QueryError {
    /// Builds the error from the first surviving diagnostic. `None` when
    /// there is nothing to report.
    pub(crate) fn from_diagnostics(source: &str, diagnostics: Diagnostics) -> Option<Self> {
        let diagnostics = diagnostics.filtered();
        let primary = diagnostics.iter().next()?.clone();
        let offset = usize::from(primary.range().start()).min(source.len());
        let before = &source.as_bytes()[..offset];
        let row = before.iter().filter(|&&b| b == b'\n').count();
        let column = offset - before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        Some(Self {
            offset,
            row,
            column,
            kind: primary.kind().into(),
            message: primary.message().to_string(),
            diagnostics,
        })
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Renders every diagnostic against the query source.
    pub fn render(&self, source: &str) -> String {
        self.diagnostics.render(source)
    }

    pub fn render_colored(&self, source: &str, colored: bool) -> String {
        self.diagnostics.render_colored(source, colored)
    }
}
