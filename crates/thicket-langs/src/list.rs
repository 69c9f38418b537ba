//! Bracketed lists of values.
//!
//! ```text
//! document: _value
//! _value: number | identifier | list | null
//! list: "[" "]" | "[" _items "]"
//! _items: _value | _items "," _value
//! ```
//!
//! `null` is a keyword that also matches the identifier pattern, so the lexer
//! has to break the tie. `#` comments may appear anywhere.

use thicket_core::language::LanguageError;
use thicket_core::{Language, LanguageBuilder, SYMBOL_END, SymbolType};

pub(crate) fn build() -> Result<Language, LanguageError> {
    let mut b = LanguageBuilder::new("list").version(0, 3, 0);

    let lbracket = b.literal("[");
    let rbracket = b.literal("]");
    let comma = b.literal(",");
    let null = b.keyword("null", "null");
    let number = b.token("number", SymbolType::Regular, "-?[0-9]+");
    let identifier = b.token("identifier", SymbolType::Regular, "[a-zA-Z_][a-zA-Z0-9_]*");
    let comment = b.token("comment", SymbolType::Regular, "#[^\n]*");
    b.skip(r"[ \t\r\n]+");
    b.extra(comment);

    let document = b.rule("document", SymbolType::Regular);
    let list = b.rule("list", SymbolType::Regular);
    let value = b.rule("_value", SymbolType::Supertype);
    let items = b.rule("_items", SymbolType::Auxiliary);
    b.supertype(value, &[number, identifier, list, null]);

    let element = b.field("element");

    let root = b.production(document, &[value], &[]);
    let from_number = b.production(value, &[number], &[]);
    let from_identifier = b.production(value, &[identifier], &[]);
    let from_list = b.production(value, &[list], &[]);
    let from_null = b.production(value, &[null], &[]);
    let empty = b.production(list, &[lbracket, rbracket], &[]);
    let nonempty = b.production(list, &[lbracket, items, rbracket], &[]);
    let first = b.production(items, &[value], &[(0, element)]);
    let rest = b.production(items, &[items, comma, value], &[(2, element)]);

    let value_follow = [SYMBOL_END, comma, rbracket];
    let items_follow = [comma, rbracket];

    b.state(1)
        .shift(number, 3)
        .shift(identifier, 4)
        .shift(null, 5)
        .shift(lbracket, 6)
        .goto(document, 2)
        .goto(value, 7)
        .goto(list, 8);
    b.state(2).accept();
    b.state(3).reduce(&value_follow, from_number);
    b.state(4).reduce(&value_follow, from_identifier);
    b.state(5).reduce(&value_follow, from_null);
    b.state(6)
        .shift(rbracket, 9)
        .shift(number, 3)
        .shift(identifier, 4)
        .shift(null, 5)
        .shift(lbracket, 6)
        .goto(items, 10)
        .goto(value, 11)
        .goto(list, 8);
    b.state(7).reduce(&[SYMBOL_END], root);
    b.state(8).reduce(&value_follow, from_list);
    b.state(9).reduce(&value_follow, empty);
    b.state(10).shift(rbracket, 12).shift(comma, 13);
    b.state(11).reduce(&items_follow, first);
    b.state(12).reduce(&value_follow, nonempty);
    b.state(13)
        .shift(number, 3)
        .shift(identifier, 4)
        .shift(null, 5)
        .shift(lbracket, 6)
        .goto(value, 14)
        .goto(list, 8);
    b.state(14).reduce(&items_follow, rest);

    b.build()
}
