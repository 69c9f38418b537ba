//! Infix arithmetic over numbers.
//!
//! ```text
//! expression: _operand ("+" | "-" | "*" | "/") _operand
//! _operand: number | expression | parenthesized_expression
//! parenthesized_expression: "(" _operand ")"
//! ```
//!
//! `*` and `/` bind tighter than `+` and `-`; all operators associate left.
//! Binary expressions carry `left`, `operator` and `right` fields. `#`
//! comments may appear anywhere.

use thicket_core::language::LanguageError;
use thicket_core::{Language, LanguageBuilder, SYMBOL_END, SymbolType};

pub(crate) fn build() -> Result<Language, LanguageError> {
    let mut b = LanguageBuilder::new("arithmetic").version(0, 3, 0);

    let number = b.token("number", SymbolType::Regular, r"[0-9]+(\.[0-9]+)?");
    let plus = b.literal("+");
    let minus = b.literal("-");
    let times = b.literal("*");
    let divide = b.literal("/");
    let lparen = b.literal("(");
    let rparen = b.literal(")");
    let comment = b.token("comment", SymbolType::Regular, "#[^\n]*");
    b.skip(r"[ \t\r\n]+");
    b.extra(comment);

    let expression = b.rule("expression", SymbolType::Regular);
    let parenthesized = b.rule("parenthesized_expression", SymbolType::Regular);
    let operand = b.rule("_operand", SymbolType::Supertype);
    b.supertype(operand, &[number, expression, parenthesized]);

    let left = b.field("left");
    let operator = b.field("operator");
    let right = b.field("right");
    let binary_fields = [(0, left), (1, operator), (2, right)];

    let add = b.production(expression, &[operand, plus, operand], &binary_fields);
    let sub = b.production(expression, &[operand, minus, operand], &binary_fields);
    let mul = b.production(expression, &[operand, times, operand], &binary_fields);
    let div = b.production(expression, &[operand, divide, operand], &binary_fields);
    let from_number = b.production(operand, &[number], &[]);
    let from_expression = b.production(operand, &[expression], &[]);
    let from_parens = b.production(operand, &[parenthesized], &[]);
    let parens = b.production(parenthesized, &[lparen, operand, rparen], &[]);

    let operators = [plus, minus, times, divide];
    let follow = [plus, minus, times, divide, rparen, SYMBOL_END];

    // Every state that expects an operand shares the same closure.
    let operand_start = |b: &mut LanguageBuilder, state, after_operand, after_expression| {
        b.state(state)
            .shift(number, 3)
            .shift(lparen, 5)
            .goto(operand, after_operand)
            .goto(expression, after_expression)
            .goto(parenthesized, 6);
    };

    operand_start(&mut b, 1, 4, 2);
    b.state(2).accept().reduce(&operators, from_expression);
    b.state(3).reduce(&follow, from_number);
    b.state(4)
        .shift(plus, 7)
        .shift(minus, 8)
        .shift(times, 9)
        .shift(divide, 10);
    operand_start(&mut b, 5, 11, 12);
    b.state(6).reduce(&follow, from_parens);
    operand_start(&mut b, 7, 13, 12);
    operand_start(&mut b, 8, 14, 12);
    operand_start(&mut b, 9, 15, 12);
    operand_start(&mut b, 10, 16, 12);
    b.state(11)
        .shift(rparen, 17)
        .shift(plus, 7)
        .shift(minus, 8)
        .shift(times, 9)
        .shift(divide, 10);
    b.state(12).reduce(&follow, from_expression);
    b.state(13)
        .reduce(&[plus, minus, rparen, SYMBOL_END], add)
        .shift(times, 9)
        .shift(divide, 10);
    b.state(14)
        .reduce(&[plus, minus, rparen, SYMBOL_END], sub)
        .shift(times, 9)
        .shift(divide, 10);
    b.state(15).reduce(&follow, mul);
    b.state(16).reduce(&follow, div);
    b.state(17).reduce(&follow, parens);

    b.build()
}
