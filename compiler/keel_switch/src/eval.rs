//! Dispatch plan evaluation.
//!
//! [`evaluate`] is the reference semantics of a [`DispatchNode`] tree: what
//! the emitted instructions must do for a given scrutinee value.
//! [`reference_target`] is the naive first-match scan over the input
//! labels. Every plan the planner produces must agree with it on every
//! value; the property tests check exactly that.
//!
//! # Architecture
//!
//! The walker is a loop over the current node, so evaluation depth is not
//! bounded by the Rust stack.

use keel_ir::{
    utf16_len, utf16_unit_at, CaseLabel, CaseTarget, ConstValue, DispatchNode, LabelKind,
};

use crate::hash;

/// Route `value` through a plan tree to its target.
pub fn evaluate(root: &DispatchNode, value: &ConstValue) -> CaseTarget {
    let mut node = root;
    loop {
        node = match node {
            DispatchNode::Leaf(target) => return *target,

            DispatchNode::EqualityTest {
                value: expected,
                on_true,
                on_false,
            } => {
                if expected.pattern_eq(value) {
                    &**on_true
                } else {
                    &**on_false
                }
            }

            DispatchNode::RelationalTest {
                op,
                value: bound,
                on_true,
                on_false,
            } => {
                // Null, NaN and mismatched kinds fail every comparison.
                if value.compare(bound).is_some_and(|ord| op.holds(ord)) {
                    &**on_true
                } else {
                    &**on_false
                }
            }

            DispatchNode::JumpTable {
                base,
                entries,
                on_out_of_range,
            } => {
                let entry = value
                    .as_int()
                    .and_then(|v| usize::try_from(v - base).ok())
                    .and_then(|index| entries.get(index));
                entry.unwrap_or(&**on_out_of_range)
            }

            DispatchNode::HashDispatch {
                hash: hash_fn,
                buckets,
                on_miss,
            } => {
                let text = match value {
                    ConstValue::Str(s) => Some(&**s),
                    _ => None,
                };
                let code = hash::compute(*hash_fn, text);
                let hit = buckets
                    .binary_search_by_key(&code, |b| b.hash)
                    .ok()
                    .and_then(|i| {
                        buckets[i]
                            .candidates
                            .iter()
                            .find(|c| text == Some(&*c.value))
                    });
                match hit {
                    Some(candidate) => &candidate.on_match,
                    None => &**on_miss,
                }
            }

            DispatchNode::LengthDispatch {
                buckets,
                on_null,
                on_miss,
            } => match value {
                ConstValue::Null => &**on_null,
                ConstValue::Str(s) => {
                    let length = utf16_len(s);
                    match buckets.binary_search_by_key(&length, |b| b.length) {
                        Ok(i) => &buckets[i].node,
                        Err(_) => &**on_miss,
                    }
                }
                _ => &**on_miss,
            },

            DispatchNode::CharDispatch {
                index,
                arms,
                on_miss,
            } => {
                let unit = value.as_str().and_then(|s| utf16_unit_at(s, *index));
                let arm = unit.and_then(|u| {
                    arms.binary_search_by(|a| a.unit.cmp(&u))
                        .ok()
                        .map(|i| &arms[i].node)
                });
                arm.unwrap_or(&**on_miss)
            }
        };
    }
}

/// First label in source order that matches `value`, else the default.
///
/// A `Default` label in the list overrides `default`.
pub fn reference_target(
    labels: &[CaseLabel],
    default: CaseTarget,
    value: &ConstValue,
) -> CaseTarget {
    let mut fallback = default;
    for label in labels {
        if matches!(label.kind, LabelKind::Default) {
            fallback = label.target;
        } else if label.kind.matches(value) {
            return label.target;
        }
    }
    fallback
}
