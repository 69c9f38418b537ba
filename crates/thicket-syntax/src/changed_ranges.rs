//! Structural diff between an edited tree and its reparse.
//!
//! Both trees are walked together. Subtrees shared by reference and free of
//! changes are skipped wholesale; nodes that agree on kind and span are
//! descended into; anything else is reported. Text-only changes that keep
//! the same structure are not reported.

use thicket_core::{Length, Range};

use crate::node::Node;
use crate::tree::Tree;

pub(crate) fn compute(old: &Tree, new: &Tree) -> Vec<Range> {
    let mut ranges = Vec::new();
    let mut pending = vec![(
        Node::new(old, old.root_subtree(), Length::ZERO, Length::ZERO),
        Node::new(new, new.root_subtree(), Length::ZERO, Length::ZERO),
    )];
    while let Some((old, new)) = pending.pop() {
        compare(old, new, &mut pending, &mut ranges);
    }
    normalize(ranges)
}

fn same_shape(old: &Node<'_>, new: &Node<'_>) -> bool {
    let (a, b) = (old.subtree(), new.subtree());
    a.symbol == b.symbol
        && a.flags.visible == b.flags.visible
        && a.flags.named == b.flags.named
        && a.flags.missing == b.flags.missing
        && a.flags.extra == b.flags.extra
        && a.is_leaf() == b.is_leaf()
}

/// Reports how `old` and `new` differ, queueing child pairs that still need
/// a comparison of their own.
fn compare<'o, 'n>(
    old: Node<'o>,
    new: Node<'n>,
    pending: &mut Vec<(Node<'o>, Node<'n>)>,
    out: &mut Vec<Range>,
) {
    if old.subtree().ptr_eq(new.subtree())
        && old.position().bytes == new.position().bytes
        && !old.has_changes()
    {
        return;
    }

    if !same_shape(&old, &new) {
        out.push(union(old.range(), new.range()));
        return;
    }

    let (old_range, new_range) = (old.range(), new.range());
    if old_range.start_byte != new_range.start_byte {
        out.push(between(old_range.start_byte, old_range.start_point, new_range.start_byte, new_range.start_point));
    }
    if old_range.end_byte != new_range.end_byte {
        out.push(between(old_range.end_byte, old_range.end_point, new_range.end_byte, new_range.end_point));
    }
    if old.subtree().is_leaf() {
        return;
    }

    let old_children: Vec<_> = old.raw_children().collect();
    let new_children: Vec<_> = new.raw_children().collect();
    let (mut i, mut j) = (0, 0);
    while i < old_children.len() && j < new_children.len() {
        let (a, b) = (old_children[i], new_children[j]);
        if a.start_byte() == b.start_byte() && a.kind_id() == b.kind_id() {
            pending.push((a, b));
            i += 1;
            j += 1;
        } else if (a.start_byte(), a.end_byte()) <= (b.start_byte(), b.end_byte()) {
            report(a, out);
            i += 1;
        } else {
            report(b, out);
            j += 1;
        }
    }
    old_children[i..].iter().for_each(|n| report(*n, out));
    new_children[j..].iter().for_each(|n| report(*n, out));
}

fn report(node: Node<'_>, out: &mut Vec<Range>) {
    // The end-of-input marker carries no structure.
    if node.subtree().symbol == thicket_core::SYMBOL_END && node.subtree().size.is_zero() {
        return;
    }
    out.push(node.range());
}

fn between(a: usize, a_point: thicket_core::Point, b: usize, b_point: thicket_core::Point) -> Range {
    if a <= b {
        Range::new(a, b, a_point, b_point)
    } else {
        Range::new(b, a, b_point, a_point)
    }
}

fn union(a: Range, b: Range) -> Range {
    let (start_byte, start_point) = if a.start_byte <= b.start_byte {
        (a.start_byte, a.start_point)
    } else {
        (b.start_byte, b.start_point)
    };
    let (end_byte, end_point) = if a.end_byte >= b.end_byte {
        (a.end_byte, a.end_point)
    } else {
        (b.end_byte, b.end_point)
    };
    Range::new(start_byte, end_byte, start_point, end_point)
}

/// Sorts and merges overlapping or touching ranges.
fn normalize(mut ranges: Vec<Range>) -> Vec<Range> {
    ranges.sort_by_key(|r| (r.start_byte, r.end_byte));
    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start_byte <= last.end_byte => {
                if range.end_byte > last.end_byte {
                    last.end_byte = range.end_byte;
                    last.end_point = range.end_point;
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}
