//! Relational switches: interval splitting and balanced search trees.
//!
//! Used for integral switches with relational patterns and for every
//! float, double and decimal switch. Jump tables never apply here.
//!
//! # Algorithm
//!
//! 1. **Boundaries**: collect every exact value and every range bound
//!    (except NaN), sorted and deduplicated.
//! 2. **Pieces**: split the domain into alternating open intervals and
//!    points: `(-inf, b0)`, `b0`, `(b0, b1)`, `b1`, ..., `(bn, +inf)`.
//!    Integral intervals with no integers in them are dropped.
//! 3. **Assign**: each piece gets the first label in source order that
//!    covers it. No label can partially cover a piece because every bound
//!    is a boundary.
//! 4. **Runs**: neighbouring pieces with the same target merge.
//! 5. **Tree**: split the runs at the median. A run starting at point `v`
//!    is separated by `x < v`; a run starting after `a` by `x <= a`.
//!    A subtree whose open pieces all share one target and which has few
//!    remaining points becomes an equality chain instead.
//! 6. **NaN**: relational tests are false for NaN, so NaN walks the tree's
//!    false edges. When that lands anywhere but the NaN target, a leading
//!    NaN equality test fixes it.

use std::cmp::Ordering;

use keel_ir::{
    CaseLabel, CaseTarget, ConstValue, DispatchNode, IntKind, LabelKind, RelOp, ScrutineeType,
};

use crate::config::PlannerConfig;
use crate::eval::evaluate;
use crate::stack::ensure_sufficient_stack;

/// A disjoint part of the scrutinee domain.
#[derive(Clone, Debug, PartialEq)]
enum Piece {
    Point(ConstValue),
    /// Strictly between two boundaries; `None` is unbounded.
    Open(Option<ConstValue>, Option<ConstValue>),
}

/// Consecutive pieces routed to one target.
#[derive(Clone, Copy, Debug)]
struct Run {
    first: usize,
    last: usize,
    target: CaseTarget,
}

/// Plan `labels` (exact and range labels, source order) over `scrutinee`.
pub(crate) fn plan(
    config: &PlannerConfig,
    scrutinee: &ScrutineeType,
    labels: &[&CaseLabel],
    default: CaseTarget,
) -> DispatchNode {
    let pieces = split_domain(scrutinee.int_kind(), labels);
    let targets: Vec<CaseTarget> = pieces
        .iter()
        .map(|piece| first_cover(labels, piece).unwrap_or(default))
        .collect();
    let runs = merge_runs(&targets);
    tracing::debug!(
        pieces = pieces.len(),
        runs = runs.len(),
        "relational switch split"
    );

    let builder = Builder {
        config,
        pieces: &pieces,
        targets: &targets,
    };
    let root = builder.build(&runs);

    if !scrutinee.kind.is_float() {
        return root;
    }
    let nan = ConstValue::Float(f64::NAN);
    let nan_target = labels
        .iter()
        .find(|label| label.kind.matches(&nan))
        .map_or(default, |label| label.target);
    if evaluate(&root, &nan) == nan_target {
        root
    } else {
        tracing::trace!(%nan_target, "leading NaN test");
        DispatchNode::equality(nan, DispatchNode::leaf(nan_target), root)
    }
}

fn boundaries(labels: &[&CaseLabel]) -> Vec<ConstValue> {
    let mut points: Vec<ConstValue> = Vec::new();
    for label in labels {
        match &label.kind {
            LabelKind::Exact(value) => points.push(value.clone()),
            LabelKind::Range { lo, hi } => {
                points.extend(lo.iter().chain(hi.iter()).map(|b| b.value.clone()));
            }
            LabelKind::Default | LabelKind::Null => {}
        }
    }
    // NaN and null are not ordered; they never split the domain.
    points.retain(|v| v.compare(v).is_some());
    points.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
    points.dedup_by(|a, b| a.compare(b) == Some(Ordering::Equal));
    points
}

fn split_domain(int_kind: Option<IntKind>, labels: &[&CaseLabel]) -> Vec<Piece> {
    let points = boundaries(labels);
    let mut pieces = Vec::with_capacity(points.len() * 2 + 1);
    let mut prev: Option<&ConstValue> = None;
    for point in &points {
        if !open_is_empty(int_kind, prev, Some(point)) {
            pieces.push(Piece::Open(prev.cloned(), Some(point.clone())));
        }
        pieces.push(Piece::Point(point.clone()));
        prev = Some(point);
    }
    if !open_is_empty(int_kind, prev, None) {
        pieces.push(Piece::Open(prev.cloned(), None));
    }
    pieces
}

/// Whether an integral interval `(lo, hi)` holds no values of its kind.
fn open_is_empty(
    int_kind: Option<IntKind>,
    lo: Option<&ConstValue>,
    hi: Option<&ConstValue>,
) -> bool {
    let Some(kind) = int_kind else {
        return false;
    };
    let lower = lo.and_then(ConstValue::as_int).map_or(kind.min(), |v| v + 1);
    let upper = hi.and_then(ConstValue::as_int).map_or(kind.max(), |v| v - 1);
    lower > upper
}

fn first_cover(labels: &[&CaseLabel], piece: &Piece) -> Option<CaseTarget> {
    labels
        .iter()
        .find(|label| covers(&label.kind, piece))
        .map(|label| label.target)
}

fn covers(kind: &LabelKind, piece: &Piece) -> bool {
    match piece {
        Piece::Point(value) => kind.matches(value),
        Piece::Open(a, b) => {
            let LabelKind::Range { lo, hi } = kind else {
                return false;
            };
            let lo_ok = lo.as_ref().map_or(true, |lo| {
                a.as_ref()
                    .and_then(|a| lo.value.compare(a))
                    .is_some_and(Ordering::is_le)
            });
            let hi_ok = hi.as_ref().map_or(true, |hi| {
                b.as_ref()
                    .and_then(|b| hi.value.compare(b))
                    .is_some_and(Ordering::is_ge)
            });
            lo_ok && hi_ok
        }
    }
}

fn merge_runs(targets: &[CaseTarget]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (i, &target) in targets.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.target == target => run.last = i,
            _ => runs.push(Run {
                first: i,
                last: i,
                target,
            }),
        }
    }
    runs
}

struct Builder<'a> {
    config: &'a PlannerConfig,
    pieces: &'a [Piece],
    targets: &'a [CaseTarget],
}

impl Builder<'_> {
    fn build(&self, runs: &[Run]) -> DispatchNode {
        ensure_sufficient_stack(|| {
            if let [run] = runs {
                return DispatchNode::leaf(run.target);
            }
            if let Some(chain) = self.equality_chain(runs) {
                return chain;
            }
            let (left, right) = runs.split_at(runs.len() / 2);
            let (op, value) = match &self.pieces[right[0].first] {
                Piece::Point(v) => (RelOp::Lt, v.clone()),
                Piece::Open(Some(a), _) => (RelOp::Le, a.clone()),
                Piece::Open(None, _) => unreachable!("only the first piece is unbounded below"),
            };
            DispatchNode::relational(op, value, self.build(left), self.build(right))
        })
    }

    /// An equality chain covering `runs`, if the region is simple enough.
    fn equality_chain(&self, runs: &[Run]) -> Option<DispatchNode> {
        let (first, last) = (runs.first()?.first, runs.last()?.last);
        let mut fallback: Option<CaseTarget> = None;
        let mut points: Vec<(&ConstValue, CaseTarget)> = Vec::new();
        for i in first..=last {
            let target = self.targets[i];
            match &self.pieces[i] {
                Piece::Point(value) => points.push((value, target)),
                Piece::Open(..) => match fallback {
                    None => fallback = Some(target),
                    Some(existing) if existing != target => return None,
                    Some(_) => {}
                },
            }
        }
        // A region of integral points only: the last point needs no test.
        let fallback = match fallback {
            Some(target) => target,
            None => points.pop()?.1,
        };
        points.retain(|&(_, target)| target != fallback);
        if points.len() > self.config.max_equality_chain {
            return None;
        }
        Some(
            points
                .iter()
                .rev()
                .fold(DispatchNode::leaf(fallback), |next, &(value, target)| {
                    DispatchNode::equality(value.clone(), DispatchNode::leaf(target), next)
                }),
        )
    }
}

#[cfg(test)]
mod tests;
