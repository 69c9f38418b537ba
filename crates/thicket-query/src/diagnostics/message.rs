use rowan::TextRange;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When two diagnostics overlap, the higher-priority one suppresses the
/// lower-priority one, so an unclosed delimiter does not also produce a
/// cascade of "unexpected token" reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Aborts parsing; everything after it is swallowed
    NestingTooDeep,

    // Cascade everywhere after them
    UnclosedTree,
    UnclosedAlternation,
    UnclosedString,

    // Something required is missing
    ExpectedExpression,
    ExpectedCaptureName,
    ExpectedFieldName,
    ExpectedSubtype,

    // Something that does not belong
    EmptyTree,
    BareIdentifier,
    ErrorTakesNoArguments,
    ErrorMissingOutsideParens,
    MisplacedAnchor,
    MisplacedNegatedField,
    PredicateOutsidePattern,
    CaptureWithoutTarget,
    UnexpectedToken,

    // Names the language does not know
    IncompatibleLanguage,
    UnknownNodeType,
    UnknownField,
    UnknownCapture,
    UnknownPredicate,
    InvalidPredicateArguments,
    InvalidRegex,

    // Shapes the language can never produce
    NotASupertype,
    FieldNotOnNodeType,
    InvalidFieldChildType,
    InvalidChildType,
}

impl DiagnosticKind {
    /// Lower discriminant wins.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::UnclosedTree | Self::UnclosedAlternation | Self::UnclosedString
        )
    }

    pub fn is_root_cause_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedExpression
                | Self::ExpectedCaptureName
                | Self::ExpectedFieldName
                | Self::ExpectedSubtype
        )
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExpectedSubtype => Some("e.g., `expression/number`"),
            Self::ExpectedFieldName => Some("e.g., `!left`"),
            Self::EmptyTree => Some("use `(_)` to match any named node, or `_` for any node"),
            Self::BareIdentifier => Some("wrap in parentheses: `(identifier)`"),
            Self::MisplacedAnchor => Some("anchors go between the children of a node"),
            _ => None,
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedTree => "missing closing `)`",
            Self::UnclosedAlternation => "missing closing `]`",
            Self::UnclosedString => "unterminated string",
            Self::NestingTooDeep => "pattern is nested too deeply",

            Self::ExpectedExpression => "expected a pattern",
            Self::ExpectedCaptureName => "expected capture name",
            Self::ExpectedFieldName => "expected field name",
            Self::ExpectedSubtype => "expected subtype name",

            Self::EmptyTree => "empty `()` is not allowed",
            Self::BareIdentifier => "bare identifier is not valid",
            Self::ErrorTakesNoArguments => "`(ERROR)` cannot have children",
            Self::ErrorMissingOutsideParens => "special node requires parentheses",
            Self::MisplacedAnchor => "anchor is not valid here",
            Self::MisplacedNegatedField => "negated field is only valid inside a node",
            Self::PredicateOutsidePattern => "predicate must be inside a pattern",
            Self::CaptureWithoutTarget => "capture has no target",
            Self::UnexpectedToken => "unexpected token",

            Self::IncompatibleLanguage => "incompatible language version",
            Self::UnknownNodeType => "unknown node type",
            Self::UnknownField => "unknown field",
            Self::UnknownCapture => "unknown capture",
            Self::UnknownPredicate => "unknown predicate",
            Self::InvalidPredicateArguments => "invalid predicate arguments",
            Self::InvalidRegex => "invalid regular expression",

            Self::NotASupertype => "not a subtype",
            Self::FieldNotOnNodeType => "field not valid on this node type",
            Self::InvalidFieldChildType => "node type not valid for this field",
            Self::InvalidChildType => "node type not valid as child",
        }
    }

    /// Template for custom messages, `{}` marks the caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::ExpectedExpression => "expected a pattern {}".to_string(),
            Self::UnknownNodeType => "`{}` is not a valid node type".to_string(),
            Self::UnknownField => "`{}` is not a valid field".to_string(),
            Self::UnknownCapture => "capture `@{}` is not defined in this pattern".to_string(),
            Self::UnknownPredicate => "`#{}` is not a known predicate".to_string(),
            Self::NotASupertype => "{}".to_string(),
            Self::FieldNotOnNodeType => "field `{}` is not valid on this node type".to_string(),
            Self::InvalidFieldChildType => "node type `{}` is not valid for this field".to_string(),
            Self::InvalidChildType => "`{}` cannot be a child of this node".to_string(),
            Self::UnclosedTree | Self::UnclosedAlternation => {
                format!("{}; {{}}", self.fallback_message())
            }
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// `None` gives the fallback message, `Some(detail)` fills the template.
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// The range underlined in rendered output.
    pub(crate) range: TextRange,
    /// The range used when suppressing cascades. Defaults to `range`; the
    /// parser widens it to the enclosing delimiter.
    pub(crate) suppression_range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            suppression_range: range,
            message: message.into(),
            related: Vec::new(),
            hints: kind.default_hint().map(String::from).into_iter().collect(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
