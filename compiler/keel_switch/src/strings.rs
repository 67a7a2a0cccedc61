//! String switches: linear chains, hash dispatch, length-then-char dispatch.
//!
//! Small switches compare against each case in source order. Larger ones
//! use the configured [`StringStrategy`] when the target offers indexed
//! string access, and fall back to the chain when it does not. Every
//! strategy ends in a full string equality test, so a hash or character
//! collision can never select the wrong case.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use keel_ir::{
    utf16_len, utf16_unit_at, CaseTarget, CharArm, ConstValue, DispatchNode, HashBucket,
    LengthBucket, Strategy, StringCandidate, StringHash,
};

use crate::config::{PlannerConfig, StringStrategy};
use crate::hash;

/// One `case "..."` in source order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StringCase<'a> {
    pub value: &'a str,
    pub target: CaseTarget,
}

/// Plan a string switch. `null` is the `case null` target, if any.
pub(crate) fn plan(
    config: &PlannerConfig,
    cases: &[StringCase<'_>],
    null: Option<CaseTarget>,
    default: CaseTarget,
) -> (DispatchNode, Strategy) {
    if cases.is_empty() {
        let root = with_null_test(null, default, DispatchNode::leaf(default));
        return (root, Strategy::Trivial);
    }

    let strategy = if cases.len() < config.string_hash_threshold {
        StringStrategy::Linear
    } else if !config.supports_string_dispatch() {
        tracing::debug!(
            cases = cases.len(),
            caps = ?config.caps,
            "target lacks string primitives, using a linear chain"
        );
        StringStrategy::Linear
    } else {
        config.string_strategy
    };
    tracing::debug!(cases = cases.len(), ?strategy, "string switch");

    match strategy {
        StringStrategy::Linear => {
            let chain = equality_chain(cases, DispatchNode::leaf(default));
            (with_null_test(null, default, chain), Strategy::StringLinear)
        }
        StringStrategy::Hash => {
            let root = hash_dispatch(cases, default);
            (with_null_test(null, default, root), Strategy::StringHash)
        }
        StringStrategy::LengthThenChar => {
            let on_null = null.unwrap_or(default);
            (length_dispatch(cases, on_null, default), Strategy::StringLength)
        }
    }
}

/// Prefix `root` with `x == null` when a `case null` exists.
fn with_null_test(
    null: Option<CaseTarget>,
    default: CaseTarget,
    root: DispatchNode,
) -> DispatchNode {
    match null {
        Some(target) if target != default => {
            DispatchNode::equality(ConstValue::Null, DispatchNode::leaf(target), root)
        }
        _ => root,
    }
}

fn equality_chain(cases: &[StringCase<'_>], fall: DispatchNode) -> DispatchNode {
    cases.iter().rev().fold(fall, |next, case| {
        DispatchNode::equality(ConstValue::str(case.value), DispatchNode::leaf(case.target), next)
    })
}

fn hash_dispatch(cases: &[StringCase<'_>], default: CaseTarget) -> DispatchNode {
    let mut by_hash: BTreeMap<u32, SmallVec<[StringCandidate; 2]>> = BTreeMap::new();
    for case in cases {
        by_hash
            .entry(hash::string_hash(Some(case.value)))
            .or_default()
            .push(StringCandidate {
                value: case.value.into(),
                on_match: DispatchNode::leaf(case.target),
            });
    }
    let collisions = by_hash.values().filter(|c| c.len() > 1).count();
    if collisions > 0 {
        tracing::trace!(collisions, "hash buckets with more than one candidate");
    }
    DispatchNode::HashDispatch {
        hash: StringHash::Fnv1a32,
        buckets: by_hash
            .into_iter()
            .map(|(hash, candidates)| HashBucket { hash, candidates })
            .collect(),
        on_miss: Box::new(DispatchNode::leaf(default)),
    }
}

fn length_dispatch(
    cases: &[StringCase<'_>],
    on_null: CaseTarget,
    default: CaseTarget,
) -> DispatchNode {
    let mut by_length: BTreeMap<u32, Vec<&StringCase<'_>>> = BTreeMap::new();
    for case in cases {
        by_length.entry(utf16_len(case.value)).or_default().push(case);
    }
    let buckets = by_length
        .into_iter()
        .map(|(length, group)| LengthBucket {
            length,
            node: char_dispatch(length, &group, default),
        })
        .collect();
    DispatchNode::LengthDispatch {
        buckets,
        on_null: Box::new(DispatchNode::leaf(on_null)),
        on_miss: Box::new(DispatchNode::leaf(default)),
    }
}

/// Dispatch one length group on its first fully discriminating code unit.
fn char_dispatch(length: u32, group: &[&StringCase<'_>], default: CaseTarget) -> DispatchNode {
    let guard = |case: &StringCase<'_>| {
        DispatchNode::equality(
            ConstValue::str(case.value),
            DispatchNode::leaf(case.target),
            DispatchNode::leaf(default),
        )
    };
    if let [case] = group {
        return guard(*case);
    }

    let Some((index, mut arms)) = (0..length).find_map(|index| {
        let arms: Option<Vec<(u16, &StringCase<'_>)>> = group
            .iter()
            .map(|case| utf16_unit_at(case.value, index).map(|unit| (unit, *case)))
            .collect();
        let arms = arms?;
        let mut units: Vec<u16> = arms.iter().map(|&(unit, _)| unit).collect();
        units.sort_unstable();
        units.dedup();
        (units.len() == arms.len()).then_some((index, arms))
    }) else {
        tracing::trace!(length, cases = group.len(), "no discriminating index");
        let cases: Vec<StringCase<'_>> = group.iter().map(|case| **case).collect();
        return equality_chain(&cases, DispatchNode::leaf(default));
    };

    arms.sort_unstable_by_key(|&(unit, _)| unit);
    DispatchNode::CharDispatch {
        index,
        arms: arms
            .into_iter()
            .map(|(unit, case)| CharArm {
                unit,
                node: guard(case),
            })
            .collect(),
        on_miss: Box::new(DispatchNode::leaf(default)),
    }
}
