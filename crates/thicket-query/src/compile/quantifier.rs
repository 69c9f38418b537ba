//! How many nodes a capture can bind in one match.

use super::ir::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureQuantifier {
    #[default]
    Zero,
    ZeroOrOne,
    ZeroOrMore,
    One,
    OneOrMore,
}

use CaptureQuantifier::*;

impl CaptureQuantifier {
    /// Both sides occur in sequence.
    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (Zero, q) | (q, Zero) => q,
            (ZeroOrOne, ZeroOrOne) | (ZeroOrOne, ZeroOrMore) | (ZeroOrMore, ZeroOrOne) => {
                ZeroOrMore
            }
            (ZeroOrMore, ZeroOrMore) => ZeroOrMore,
            _ => OneOrMore,
        }
    }

    /// Exactly one side occurs.
    pub fn join(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Zero, One) | (One, Zero) => ZeroOrOne,
            (Zero, ZeroOrOne) | (ZeroOrOne, Zero) => ZeroOrOne,
            (One, ZeroOrOne) | (ZeroOrOne, One) => ZeroOrOne,
            (One, OneOrMore) | (OneOrMore, One) => OneOrMore,
            _ => ZeroOrMore,
        }
    }

    /// The quantity after wrapping in a repetition of `min..=max`.
    fn repeat(self, min: u32, max: Option<u32>) -> Self {
        if self == Zero {
            return Zero;
        }
        let optional = min == 0;
        let many = max.is_none_or(|m| m > 1);
        let zero = optional || matches!(self, ZeroOrOne | ZeroOrMore);
        let more = many || matches!(self, ZeroOrMore | OneOrMore);
        match (zero, more) {
            (false, false) => One,
            (false, true) => OneOrMore,
            (true, false) => ZeroOrOne,
            (true, true) => ZeroOrMore,
        }
    }
}

/// Quantifiers of every capture id below `capture_count` over a pattern.
pub fn capture_quantifiers(steps: &[Step], capture_count: usize) -> Vec<CaptureQuantifier> {
    let mut out = vec![Zero; capture_count];
    sequence(steps, &mut out);
    out
}

fn sequence(steps: &[Step], out: &mut [CaptureQuantifier]) {
    for step in steps {
        match step {
            Step::Node(node) => {
                for &id in &node.captures {
                    out[id as usize] = out[id as usize].add(One);
                }
                sequence(&node.children, out);
            }
            Step::Alt(branches) => {
                let mut joined: Option<Vec<CaptureQuantifier>> = None;
                for branch in branches {
                    let mut q = vec![Zero; out.len()];
                    sequence(branch, &mut q);
                    joined = Some(match joined {
                        None => q,
                        Some(acc) => acc.iter().zip(&q).map(|(a, b)| a.join(*b)).collect(),
                    });
                }
                for (slot, q) in out.iter_mut().zip(joined.unwrap_or_default()) {
                    *slot = slot.add(q);
                }
            }
            Step::Repeat { body, min, max } => {
                let mut q = vec![Zero; out.len()];
                sequence(body, &mut q);
                for (slot, q) in out.iter_mut().zip(q) {
                    *slot = slot.add(q.repeat(*min, *max));
                }
            }
            Step::Anchor => {}
        }
    }
}
