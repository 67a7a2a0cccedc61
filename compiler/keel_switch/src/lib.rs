//! Switch dispatch planning for the Keel compiler.
//!
//! Given a scrutinee type and the front end's resolved case labels, the
//! planner chooses a [`DispatchPlan`]:
//!
//! - **Integral exact switches**: dense buckets become jump
//!   tables, sparse ones equality tests, with a binary search over buckets
//!   when there are many.
//! - **Relational and floating-point switches**: the domain is
//!   split into disjoint intervals and searched with a balanced tree.
//! - **String switches**: linear chains, FNV-1a hash dispatch
//!   or length-then-character dispatch, always guarded by full equality.
//!
//! [`evaluate`] interprets a plan and [`reference_target`] is the naive
//! first-match scan it must agree with.
//!
//! # Design
//!
//! Planning is pure: the same labels and configuration always give the same
//! plan, so callers may plan switches in parallel and cache the results
//! (feature `cache`). Target capability gaps degrade to simpler strategies
//! and never fail.
//!
//! # Crate Dependencies
//!
//! Depends only on `keel_ir` for constants, labels and the plan tree. No
//! emitter dependency: plans are backend-independent.

pub mod config;
mod eval;
pub mod hash;
mod integral;
mod ranges;
mod stack;
mod strings;
pub mod validate;

#[cfg(feature = "cache")]
mod cache;

use rustc_hash::FxHashSet;

use keel_ir::{
    CaseLabel, CaseTarget, ConstValue, DispatchNode, DispatchPlan, LabelKind, ScalarKind,
    ScrutineeType, Strategy,
};

#[cfg(feature = "cache")]
pub use cache::{PlanCache, PlanCacheError, PlanKey};
pub use config::{PlannerConfig, StringStrategy, TargetCaps};
pub use eval::{evaluate, reference_target};
pub use hash::string_hash;
pub use integral::{bucket, Bucket};
pub use validate::{validate_labels, validate_plan, LabelProblem, PlanProblem};

use strings::StringCase;

/// Plans switches under one configuration.
#[derive(Clone, Debug, Default)]
pub struct SwitchPlanner {
    config: PlannerConfig,
}

impl SwitchPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan one switch.
    ///
    /// `default` is the target for values no label matches; a `Default`
    /// label in `labels` supersedes it. Labels must be well formed (see
    /// [`validate_labels`]); debug builds assert this and check the
    /// resulting plan with [`validate_plan`].
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(scrutinee = %scrutinee, labels = labels.len())
    )]
    pub fn plan(
        &self,
        scrutinee: &ScrutineeType,
        labels: &[CaseLabel],
        default: CaseTarget,
    ) -> DispatchPlan {
        if cfg!(debug_assertions) {
            let problems = validate_labels(scrutinee, labels);
            debug_assert!(problems.is_empty(), "invalid case labels: {problems:?}");
        }

        let plan = self.build(scrutinee, labels, default);
        tracing::debug!(
            strategy = ?plan.strategy,
            nodes = plan.root.node_count(),
            depth = plan.root.depth(),
            "switch planned"
        );

        if cfg!(debug_assertions) {
            let problems = validate_plan(&plan);
            debug_assert!(problems.is_empty(), "malformed dispatch plan: {problems:?}");
        }
        plan
    }

    /// Like [`plan`](Self::plan), but rejects invalid labels with the first
    /// problem found instead of asserting.
    pub fn plan_checked(
        &self,
        scrutinee: &ScrutineeType,
        labels: &[CaseLabel],
        default: CaseTarget,
    ) -> Result<DispatchPlan, LabelProblem> {
        if let Some(problem) = validate_labels(scrutinee, labels).into_iter().next() {
            tracing::debug!(%problem, "rejecting case labels");
            return Err(problem);
        }
        Ok(self.plan(scrutinee, labels, default))
    }

    fn build(
        &self,
        scrutinee: &ScrutineeType,
        labels: &[CaseLabel],
        default: CaseTarget,
    ) -> DispatchPlan {
        let mut default_label = None;
        let mut null = None;
        let mut valued: Vec<&CaseLabel> = Vec::with_capacity(labels.len());
        for label in labels {
            match &label.kind {
                LabelKind::Default => {
                    default_label.get_or_insert(label.target);
                }
                LabelKind::Null => {
                    null.get_or_insert(label.target);
                }
                LabelKind::Exact(value) if value.is_null() => {
                    null.get_or_insert(label.target);
                }
                LabelKind::Exact(_) | LabelKind::Range { .. } => valued.push(label),
            }
        }
        let default = default_label.unwrap_or(default);

        if scrutinee.kind == ScalarKind::String {
            let cases = string_cases(&valued);
            let (root, strategy) = strings::plan(&self.config, &cases, null, default);
            return DispatchPlan::new(root, strategy);
        }

        let on_null = null.unwrap_or(default);
        if valued.is_empty() {
            let leaf = DispatchNode::leaf(default);
            let root = if scrutinee.nullable && on_null != default {
                DispatchNode::equality(ConstValue::Null, DispatchNode::leaf(on_null), leaf)
            } else {
                leaf
            };
            return DispatchPlan::new(root, Strategy::Trivial);
        }

        let (root, strategy) = match integral_cases(scrutinee, &valued) {
            Some(cases) => (
                integral::plan(&self.config, &cases, default),
                Strategy::JumpTable,
            ),
            None => (
                ranges::plan(&self.config, scrutinee, &valued, default),
                Strategy::SearchTree,
            ),
        };
        let root = if scrutinee.nullable {
            DispatchNode::equality(ConstValue::Null, DispatchNode::leaf(on_null), root)
        } else {
            root
        };
        DispatchPlan::new(root, strategy)
    }
}

/// Exact integral cases, first occurrence of each value. `None` when the
/// switch needs relational planning.
fn integral_cases(
    scrutinee: &ScrutineeType,
    labels: &[&CaseLabel],
) -> Option<Vec<(i128, CaseTarget)>> {
    scrutinee.int_kind()?;
    let mut seen = FxHashSet::default();
    let mut cases = Vec::with_capacity(labels.len());
    for label in labels {
        let LabelKind::Exact(value) = &label.kind else {
            return None;
        };
        let value = value.as_int()?;
        if seen.insert(value) {
            cases.push((value, label.target));
        }
    }
    Some(cases)
}

/// Exact string cases in source order, first occurrence of each value.
fn string_cases<'a>(labels: &[&'a CaseLabel]) -> Vec<StringCase<'a>> {
    let mut seen = FxHashSet::default();
    let mut cases = Vec::with_capacity(labels.len());
    for &label in labels {
        let LabelKind::Exact(value) = &label.kind else {
            continue;
        };
        if let Some(value) = value.as_str() {
            if seen.insert(value) {
                cases.push(StringCase {
                    value,
                    target: label.target,
                });
            }
        }
    }
    cases
}

/// Plan one switch with the default configuration.
pub fn plan(scrutinee: &ScrutineeType, labels: &[CaseLabel], default: CaseTarget) -> DispatchPlan {
    SwitchPlanner::default().plan(scrutinee, labels, default)
}
