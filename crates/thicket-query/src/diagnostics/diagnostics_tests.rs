use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    let first = diagnostics.iter().next().unwrap();
    assert_eq!(first.message(), "unknown node type");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(1, 4))
        .message("foo")
        .emit();

    let first = diagnostics.iter().next().unwrap();
    assert_eq!(first.kind(), DiagnosticKind::UnknownNodeType);
    assert_eq!(first.range(), range(1, 4));
    insta::assert_snapshot!(first.message(), @"`foo` is not a valid node type");
}

#[test]
fn fallback_template_appends_detail() {
    insta::assert_snapshot!(
        DiagnosticKind::UnexpectedToken.message(Some("unmatched `)`")),
        @"unexpected token: unmatched `)`"
    );
    insta::assert_snapshot!(
        DiagnosticKind::UnclosedAlternation.message(Some("expected `]`")),
        @"missing closing `]`; expected `]`"
    );
}

#[test]
fn default_hints_are_attached() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EmptyTree, range(1, 2))
        .emit();

    insta::assert_snapshot!(
        diagnostics.iter().next().unwrap().to_string(),
        @"error at 1..2: empty `()` is not allowed (hint: use `(_)` to match any named node, or `_` for any node)"
    );
}

#[test]
fn display_includes_related_and_hints() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownCapture, range(10, 14))
        .message("foo")
        .related_to("pattern starts here", range(0, 1))
        .hint("captures are scoped to one pattern")
        .emit();

    insta::assert_snapshot!(
        diagnostics.iter().next().unwrap().to_string(),
        @"error at 10..14: capture `@foo` is not defined in this pattern (related: pattern starts here at 0..1) (hint: captures are scoped to one pattern)"
    );
}

#[test]
fn builder_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 5))
        .message("primary")
        .related_to("related info", range(6, 10))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    let result = diagnostics.printer("hello world!").render();
    insta::assert_snapshot!(result, @r"
    error: missing closing `)`; primary
      |
    1 | hello world!
      | ^^^^^ ---- related info
    ");
}

#[test]
fn printer_with_path_and_hint() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::BareIdentifier, range(0, 10))
        .emit();

    let result = diagnostics.printer("identifier").path("query.scm").render();
    assert!(result.contains("bare identifier is not valid"));
    assert!(result.contains("query.scm"));
    assert!(result.contains("wrap in parentheses"));
}

#[test]
fn printer_widens_empty_range() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedCaptureName, range(4, 4))
        .emit();

    let result = diagnostics.render("(a) @");
    assert!(result.contains("expected capture name"));
    assert!(result.contains('^'));
}

#[test]
fn multiple_diagnostics_render_separately() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(1, 2))
        .message("a")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(5, 6))
        .message("b")
        .emit();

    let result = diagnostics.render("(a) (b)");
    assert_eq!(result.matches("error:").count(), 2);
    assert!(result.contains("`a` is not a valid node type"));
    assert!(result.contains("`b` is not a valid node type"));
}

#[test]
fn extend_appends() {
    let mut a = Diagnostics::new();
    a.report(DiagnosticKind::UnknownField, range(0, 1)).emit();
    let mut b = Diagnostics::new();
    b.report(DiagnosticKind::UnknownCapture, range(2, 3)).emit();

    a.extend(b);
    let kinds: Vec<_> = a.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        [DiagnosticKind::UnknownField, DiagnosticKind::UnknownCapture]
    );
}

#[test]
fn filtered_empty_diagnostics() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.filtered().is_empty());
    assert!(diagnostics.primary().is_none());
}

#[test]
fn filtered_no_suppression_disjoint_spans() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 5))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(10, 15))
        .emit();

    assert_eq!(diagnostics.filtered().len(), 2);
}

#[test]
fn filtered_suppresses_lower_priority_contained() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(5, 6))
        .emit();

    let filtered = diagnostics.filtered();
    let kinds: Vec<_> = filtered.iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, [DiagnosticKind::UnclosedTree]);
}

#[test]
fn filtered_uses_suppression_range() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(20, 20))
        .suppression_range(range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(5, 6))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(
        filtered.iter().next().unwrap().kind(),
        DiagnosticKind::UnclosedTree
    );
}

#[test]
fn filtered_root_cause_beats_unclosed_at_same_start() {
    for reversed in [false, true] {
        let mut diagnostics = Diagnostics::new();
        let mut kinds = [
            (DiagnosticKind::UnclosedTree, range(0, 8)),
            (DiagnosticKind::ExpectedExpression, range(0, 1)),
        ];
        if reversed {
            kinds.reverse();
        }
        for (kind, r) in kinds {
            diagnostics.report(kind, r).emit();
        }

        let survivors: Vec<_> = diagnostics.filtered().iter().map(|d| d.kind()).collect();
        assert_eq!(survivors, [DiagnosticKind::ExpectedExpression]);
    }
}

#[test]
fn filtered_same_span_higher_priority_wins() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::InvalidChildType, range(0, 10))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(0, 10))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(
        filtered.iter().next().unwrap().kind(),
        DiagnosticKind::UnknownNodeType
    );
}

#[test]
fn filtered_sorts_by_start() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownField, range(8, 9))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnknownNodeType, range(2, 3))
        .emit();

    let starts: Vec<u32> = diagnostics
        .filtered()
        .iter()
        .map(|d| d.range().start().into())
        .collect();
    assert_eq!(starts, [2, 8]);
}

#[test]
fn primary_is_earliest_survivor() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownField, range(8, 9))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnclosedTree, range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(3, 4))
        .emit();

    let primary = diagnostics.primary().unwrap();
    assert_eq!(primary.kind(), DiagnosticKind::UnclosedTree);
}
