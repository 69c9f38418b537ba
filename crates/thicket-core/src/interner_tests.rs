use crate::Interner;

#[test]
fn intern_deduplicates() {
    let mut interner = Interner::new();

    let a = interner.intern("name");
    let b = interner.intern("name");
    let c = interner.intern("value");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 2);
}

#[test]
fn ids_are_dense_in_insertion_order() {
    let mut interner = Interner::new();

    let z = interner.intern("z");
    let a = interner.intern("a");

    assert_eq!(z.as_usize(), 0);
    assert_eq!(a.as_usize(), 1);
    assert_eq!(interner.strings().collect::<Vec<_>>(), ["z", "a"]);
}

#[test]
fn get_does_not_insert() {
    let mut interner = Interner::new();
    let id = interner.intern("x");

    assert_eq!(interner.get("x"), Some(id));
    assert_eq!(interner.get("y"), None);
    assert_eq!(interner.len(), 1);
}

#[test]
fn try_resolve_out_of_range() {
    let mut interner = Interner::new();
    interner.intern("x");

    assert_eq!(interner.try_resolve(0), Some("x"));
    assert_eq!(interner.try_resolve(1), None);
}
