//! Input and output checks for the planner.
//!
//! The front end guarantees well-formed label sets, so these checks report
//! programming errors rather than user errors. [`plan`](crate::SwitchPlanner::plan)
//! runs both in debug builds; [`plan_checked`](crate::SwitchPlanner::plan_checked)
//! runs [`validate_labels`] unconditionally.
//!
//! # What's Checked
//!
//! Labels:
//! 1. At most one `default` and at most one `case null`
//! 2. Exact values pairwise distinct
//! 3. Every value representable in the scrutinee type
//! 4. `case null` only on nullable scrutinees
//! 5. No range labels on strings
//!
//! Plans:
//! 1. Hash buckets, length buckets and character arms sorted and unique
//! 2. Hash buckets non-empty and holding candidates with the bucket's hash
//! 3. Jump tables non-empty and no wider than a 32-bit index

use rustc_hash::FxHashSet;
use thiserror::Error;

use keel_ir::{
    CaseLabel, CaseTarget, ConstValue, DispatchNode, DispatchPlan, LabelKind, ScalarKind,
    ScrutineeType,
};

use crate::hash;

/// A label set the planner must not be called with.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LabelProblem {
    #[error("multiple default labels ({first} and {second})")]
    MultipleDefaults {
        first: CaseTarget,
        second: CaseTarget,
    },
    #[error("multiple null labels ({first} and {second})")]
    MultipleNullLabels {
        first: CaseTarget,
        second: CaseTarget,
    },
    #[error("duplicate case value {value}")]
    DuplicateValue { value: ConstValue },
    #[error("case value {value} does not fit scrutinee type {scrutinee}")]
    ValueDoesNotFit {
        value: ConstValue,
        scrutinee: ScrutineeType,
    },
    #[error("null label on non-nullable scrutinee type {scrutinee}")]
    NullOnNonNullable { scrutinee: ScrutineeType },
    #[error("null must be matched with a null label, not an exact label")]
    ExactNull,
    #[error("relational pattern on a string scrutinee")]
    RangeOnString,
}

/// Report every problem in a label set, in label order.
pub fn validate_labels(scrutinee: &ScrutineeType, labels: &[CaseLabel]) -> Vec<LabelProblem> {
    let mut problems = Vec::new();
    let mut default: Option<CaseTarget> = None;
    let mut null: Option<CaseTarget> = None;
    let mut seen: FxHashSet<&ConstValue> = FxHashSet::default();

    for label in labels {
        match &label.kind {
            LabelKind::Default => match default {
                Some(first) => problems.push(LabelProblem::MultipleDefaults {
                    first,
                    second: label.target,
                }),
                None => default = Some(label.target),
            },
            LabelKind::Null => {
                if !scrutinee.nullable {
                    problems.push(LabelProblem::NullOnNonNullable {
                        scrutinee: *scrutinee,
                    });
                }
                match null {
                    Some(first) => problems.push(LabelProblem::MultipleNullLabels {
                        first,
                        second: label.target,
                    }),
                    None => null = Some(label.target),
                }
            }
            LabelKind::Exact(value) => {
                if value.is_null() {
                    problems.push(LabelProblem::ExactNull);
                    continue;
                }
                check_fits(scrutinee, value, &mut problems);
                if !seen.insert(value) {
                    problems.push(LabelProblem::DuplicateValue {
                        value: value.clone(),
                    });
                }
            }
            LabelKind::Range { lo, hi } => {
                if matches!(scrutinee.kind, ScalarKind::String) {
                    problems.push(LabelProblem::RangeOnString);
                    continue;
                }
                for bound in lo.iter().chain(hi.iter()) {
                    check_fits(scrutinee, &bound.value, &mut problems);
                }
            }
        }
    }
    problems
}

fn check_fits(scrutinee: &ScrutineeType, value: &ConstValue, problems: &mut Vec<LabelProblem>) {
    if !value.fits(scrutinee) {
        problems.push(LabelProblem::ValueDoesNotFit {
            value: value.clone(),
            scrutinee: *scrutinee,
        });
    }
}

/// A structural defect in a produced plan (a planner bug).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlanProblem {
    #[error("jump table at base {base} has no entries")]
    EmptyJumpTable { base: i128 },
    #[error("jump table at base {base} has {len} entries, more than a 32-bit index")]
    TableTooWide { base: i128, len: usize },
    #[error("hash buckets not strictly ascending at {hash:#010x}")]
    UnsortedHashBuckets { hash: u32 },
    #[error("hash bucket {hash:#010x} is empty")]
    EmptyHashBucket { hash: u32 },
    #[error("candidate {value:?} does not hash to bucket {hash:#010x}")]
    MisplacedCandidate { value: Box<str>, hash: u32 },
    #[error("length buckets not strictly ascending at {length}")]
    UnsortedLengthBuckets { length: u32 },
    #[error("character arms at index {index} not strictly ascending at {unit:#06x}")]
    UnsortedCharArms { index: u32, unit: u16 },
}

/// Report every structural defect in a plan.
pub fn validate_plan(plan: &DispatchPlan) -> Vec<PlanProblem> {
    let mut problems = Vec::new();
    plan.root.walk(&mut |node| validate_node(node, &mut problems));
    problems
}

fn validate_node(node: &DispatchNode, problems: &mut Vec<PlanProblem>) {
    match node {
        DispatchNode::Leaf(_)
        | DispatchNode::EqualityTest { .. }
        | DispatchNode::RelationalTest { .. } => {}

        DispatchNode::JumpTable { base, entries, .. } => {
            if entries.is_empty() {
                problems.push(PlanProblem::EmptyJumpTable { base: *base });
            } else if u32::try_from(entries.len()).is_err() {
                problems.push(PlanProblem::TableTooWide {
                    base: *base,
                    len: entries.len(),
                });
            }
        }

        DispatchNode::HashDispatch {
            hash: hash_fn,
            buckets,
            ..
        } => {
            for pair in buckets.windows(2) {
                if pair[0].hash >= pair[1].hash {
                    problems.push(PlanProblem::UnsortedHashBuckets { hash: pair[1].hash });
                }
            }
            for bucket in buckets {
                if bucket.candidates.is_empty() {
                    problems.push(PlanProblem::EmptyHashBucket { hash: bucket.hash });
                }
                for candidate in &bucket.candidates {
                    if hash::compute(*hash_fn, Some(&*candidate.value)) != bucket.hash {
                        problems.push(PlanProblem::MisplacedCandidate {
                            value: candidate.value.clone(),
                            hash: bucket.hash,
                        });
                    }
                }
            }
        }

        DispatchNode::LengthDispatch { buckets, .. } => {
            for pair in buckets.windows(2) {
                if pair[0].length >= pair[1].length {
                    problems.push(PlanProblem::UnsortedLengthBuckets {
                        length: pair[1].length,
                    });
                }
            }
        }

        DispatchNode::CharDispatch { index, arms, .. } => {
            for pair in arms.windows(2) {
                if pair[0].unit >= pair[1].unit {
                    problems.push(PlanProblem::UnsortedCharArms {
                        index: *index,
                        unit: pair[1].unit,
                    });
                }
            }
        }
    }
}
