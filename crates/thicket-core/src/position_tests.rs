use crate::{InputEdit, Length, Point, extent_of};

#[test]
fn point_add_same_row_accumulates_columns() {
    assert_eq!(Point::new(2, 3) + Point::new(0, 4), Point::new(2, 7));
}

#[test]
fn point_add_multiline_resets_column() {
    assert_eq!(Point::new(2, 3) + Point::new(1, 4), Point::new(3, 4));
}

#[test]
fn point_sub_inverts_add() {
    let base = Point::new(1, 5);
    for delta in [Point::new(0, 3), Point::new(2, 1)] {
        assert_eq!((base + delta) - base, delta);
    }
}

#[test]
fn point_sub_saturates() {
    assert_eq!(Point::new(0, 2) - Point::new(0, 5), Point::ZERO);
}

#[test]
fn length_arithmetic() {
    let padding = Length::new(3, Point::new(1, 0));
    let size = Length::new(2, Point::new(0, 2));
    let total = padding + size;

    assert_eq!(total, Length::new(5, Point::new(1, 2)));
    assert_eq!(total - padding, size);
}

#[test]
fn extent_counts_bytes_per_column() {
    assert_eq!(extent_of(b"ab\ncd\n"), Point::new(2, 0));
    assert_eq!(extent_of("é".as_bytes()), Point::new(0, 2));
}

#[test]
fn edit_apply_maps_positions() {
    // "1+2" -> "1+22"
    let edit = InputEdit {
        start_byte: 2,
        old_end_byte: 3,
        new_end_byte: 4,
        start_position: Point::new(0, 2),
        old_end_position: Point::new(0, 3),
        new_end_position: Point::new(0, 4),
    };

    assert_eq!(edit.apply(1, Point::new(0, 1)), (1, Point::new(0, 1)));
    assert_eq!(edit.apply(3, Point::new(0, 3)), (4, Point::new(0, 4)));
}

#[test]
fn point_display() {
    insta::assert_snapshot!(Point::new(3, 14).to_string(), @"(3, 14)");
}
