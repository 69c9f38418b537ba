use crate::Query;

/// Guarantee flag at the start of each listed piece of `source`.
fn guaranteed_at(source: &str, pieces: &[&str]) -> Vec<(String, bool)> {
    let query = Query::new(&thicket_langs::arithmetic(), source).unwrap();
    let mut from = 0;
    pieces
        .iter()
        .map(|piece| {
            let offset = from + source[from..].find(piece).unwrap();
            from = offset + 1;
            (piece.to_string(), query.is_pattern_guaranteed_at_step(offset))
        })
        .collect()
}

#[test]
fn fixed_tokens_are_guaranteed() {
    let flags = guaranteed_at(
        r#"(parenthesized_expression "(" ")")"#,
        &["(parenthesized_expression", r#""(""#, r#"")""#],
    );

    insta::assert_debug_snapshot!(flags, @r#"
    [
        (
            "(parenthesized_expression",
            false,
        ),
        (
            "\"(\"",
            true,
        ),
        (
            "\")\"",
            true,
        ),
    ]
    "#);
}

#[test]
fn child_behind_a_supertype_is_not_guaranteed() {
    let flags = guaranteed_at(
        r#"(parenthesized_expression "(" (number) ")")"#,
        &["(parenthesized_expression", r#""(""#, "(number)", r#"")""#],
    );

    // Where `(number)` sits is unknown, so nothing after it can be placed either.
    let flags: Vec<_> = flags.into_iter().map(|(_, f)| f).collect();
    assert_eq!(flags, [false, false, false, false]);
}

#[test]
fn optional_steps_do_not_break_the_guarantee() {
    let flags = guaranteed_at(
        r#"(parenthesized_expression "(" (number)? @n ")")"#,
        &[r#""(""#, "(number)", r#"")""#],
    );

    let flags: Vec<_> = flags.into_iter().map(|(_, f)| f).collect();
    assert_eq!(flags, [true, false, true]);
}

#[test]
fn out_of_order_children_are_not_guaranteed() {
    let flags = guaranteed_at(
        r#"(parenthesized_expression ")" "(")"#,
        &[r#"")""#, r#""(""#],
    );

    let flags: Vec<_> = flags.into_iter().map(|(_, f)| f).collect();
    assert_eq!(flags, [false, false]);
}

#[test]
fn operator_varies_between_productions() {
    let flags = guaranteed_at(r#"(expression "+")"#, &["(expression", r#""+""#]);

    let flags: Vec<_> = flags.into_iter().map(|(_, f)| f).collect();
    assert_eq!(flags, [false, false]);
}

#[test]
fn captures_used_by_predicates_are_not_guaranteed() {
    let flags = guaranteed_at(
        r#"((parenthesized_expression "(" @open ")") (#eq? @open "("))"#,
        &[r#""(" @open"#, r#"")")"#],
    );

    let flags: Vec<_> = flags.into_iter().map(|(_, f)| f).collect();
    assert_eq!(flags, [false, true]);
}

#[test]
fn offsets_outside_any_step() {
    let query = Query::new(&thicket_langs::arithmetic(), r#"  (parenthesized_expression "(")"#).unwrap();

    assert!(!query.is_pattern_guaranteed_at_step(0));
    assert!(query.is_pattern_guaranteed_at_step(1000));
}
