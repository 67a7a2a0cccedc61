//! Integral switches over exact values: buckets and jump tables.
//!
//! # Algorithm
//!
//! 1. **Sort** the case values.
//! 2. **Bucket**: walk the sorted values, pushing each as a new bucket and
//!    merging it into the bucket below while the merged bucket stays dense
//!    (`span <= density_factor * labels`). Merging repeats against earlier
//!    buckets, so a late run of values can pull a sparse prefix into one
//!    table.
//! 3. **Emit per bucket**: small buckets become equality tests, contiguous
//!    single-target buckets become a range check, everything else becomes a
//!    [`JumpTable`](DispatchNode::JumpTable) whose holes go to the default.
//! 4. **Connect buckets**: a few buckets chain through each other's
//!    out-of-range edge; more buckets get a balanced binary search on
//!    bucket boundaries, so out-of-range inside a leaf means "default".
//!
//! Buckets never overlap and are sorted, so every value falls into at most
//! one bucket's `[min, max]`.

use keel_ir::{CaseTarget, ConstValue, DispatchNode, RelOp};

use crate::config::PlannerConfig;
use crate::stack::ensure_sufficient_stack;

/// A run of sorted case values planned as one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    /// Index of the first value in the sorted value list.
    pub start: usize,
    /// One past the last value.
    pub end: usize,
    pub min: i128,
    pub max: i128,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Number of integers in `[min, max]`.
    pub fn span(&self) -> i128 {
        self.max - self.min + 1
    }

    pub fn contains(&self, value: i128) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Partition sorted, distinct values into dense buckets.
pub fn bucket(config: &PlannerConfig, values: &[i128]) -> Vec<Bucket> {
    debug_assert!(
        values.windows(2).all(|w| w[0] < w[1]),
        "bucket input must be sorted and distinct"
    );
    let mut stack: Vec<Bucket> = Vec::new();
    for (i, &value) in values.iter().enumerate() {
        let mut current = Bucket {
            start: i,
            end: i + 1,
            min: value,
            max: value,
        };
        while let Some(&prev) = stack.last() {
            let merged = Bucket {
                start: prev.start,
                end: current.end,
                min: prev.min,
                max: current.max,
            };
            if !is_dense(config, &merged) {
                break;
            }
            stack.pop();
            current = merged;
        }
        stack.push(current);
    }
    stack
}

fn is_dense(config: &PlannerConfig, bucket: &Bucket) -> bool {
    let labels = i128::try_from(bucket.len()).unwrap_or(i128::MAX);
    let span = bucket.span();
    span <= i128::from(config.density_factor).saturating_mul(labels)
        && span <= i128::from(config.max_table_span)
}

/// Plan exact integral cases (in any order) with `default` for misses.
pub(crate) fn plan(
    config: &PlannerConfig,
    cases: &[(i128, CaseTarget)],
    default: CaseTarget,
) -> DispatchNode {
    let mut sorted = cases.to_vec();
    sorted.sort_unstable_by_key(|&(value, _)| value);
    let values: Vec<i128> = sorted.iter().map(|&(value, _)| value).collect();
    let buckets = bucket(config, &values);
    tracing::debug!(
        cases = sorted.len(),
        buckets = buckets.len(),
        "integral switch bucketed"
    );
    let builder = Builder {
        config,
        cases: &sorted,
        default,
    };
    builder.build(&buckets)
}

struct Builder<'a> {
    config: &'a PlannerConfig,
    /// Sorted by value.
    cases: &'a [(i128, CaseTarget)],
    default: CaseTarget,
}

impl Builder<'_> {
    fn build(&self, buckets: &[Bucket]) -> DispatchNode {
        ensure_sufficient_stack(|| {
            if buckets.len() <= self.config.linear_bucket_limit.max(1) {
                return buckets
                    .iter()
                    .rev()
                    .fold(DispatchNode::leaf(self.default), |fall, b| {
                        self.bucket_node(b, fall)
                    });
            }
            let (left, right) = buckets.split_at(buckets.len() / 2);
            let pivot = left[left.len() - 1].max;
            tracing::trace!(%pivot, "bucket search split");
            DispatchNode::relational(
                RelOp::Gt,
                ConstValue::Int(pivot),
                self.build(right),
                self.build(left),
            )
        })
    }

    /// Test one bucket; values outside `[min, max]` continue at `fall`.
    fn bucket_node(&self, bucket: &Bucket, fall: DispatchNode) -> DispatchNode {
        let cases = &self.cases[bucket.start..bucket.end];
        let span = usize::try_from(bucket.span()).ok();

        let Some(span) = span.filter(|_| cases.len() >= self.config.min_table_labels) else {
            return equality_chain(cases, fall);
        };

        let target = cases[0].1;
        let single_target = cases.iter().all(|&(_, t)| t == target);
        if span == cases.len() && single_target && fall.as_leaf().is_some() {
            // Contiguous run to one target: `min <= x <= max`.
            let inside = DispatchNode::relational(
                RelOp::Gt,
                ConstValue::Int(bucket.max),
                fall.clone(),
                DispatchNode::leaf(target),
            );
            return DispatchNode::relational(RelOp::Lt, ConstValue::Int(bucket.min), fall, inside);
        }

        let mut entries = vec![DispatchNode::leaf(self.default); span];
        for &(value, target) in cases {
            entries[table_index(value, bucket.min)] = DispatchNode::leaf(target);
        }
        tracing::trace!(base = %bucket.min, span, labels = cases.len(), "jump table");
        DispatchNode::JumpTable {
            base: bucket.min,
            entries,
            on_out_of_range: Box::new(fall),
        }
    }
}

fn equality_chain(cases: &[(i128, CaseTarget)], fall: DispatchNode) -> DispatchNode {
    cases.iter().rev().fold(fall, |next, &(value, target)| {
        DispatchNode::equality(ConstValue::Int(value), DispatchNode::leaf(target), next)
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value lies in [base, base + span) and span fits usize"
)]
fn table_index(value: i128, base: i128) -> usize {
    (value - base) as usize
}
