use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use keel_ir::{Bound, ScalarKind};

use crate::eval::reference_target;

use super::*;

fn t(n: u32) -> CaseTarget {
    CaseTarget::new(n)
}

fn f(v: f64) -> ConstValue {
    ConstValue::Float(v)
}

fn run(scrutinee: ScrutineeType, labels: &[CaseLabel], default: CaseTarget) -> DispatchNode {
    let refs: Vec<&CaseLabel> = labels.iter().collect();
    plan(&PlannerConfig::default(), &scrutinee, &refs, default)
}

fn check(root: &DispatchNode, labels: &[CaseLabel], default: CaseTarget, values: &[ConstValue]) {
    for value in values {
        assert_eq!(
            evaluate(root, value),
            reference_target(labels, default, value),
            "value {value}"
        );
    }
}

#[test]
fn exclusive_upper_bound_reaches_later_exact_label() {
    let labels = [
        CaseLabel::range(f(27.1), f(29.1), t(19)),
        CaseLabel::exact(f(29.1), t(20)),
    ];
    let root = run(ScrutineeType::new(ScalarKind::Float64), &labels, t(0));
    assert_eq!(evaluate(&root, &f(29.1)), t(20));
    assert_eq!(evaluate(&root, &f(27.1)), t(19));
    assert_eq!(evaluate(&root, &f(29.099_999)), t(19));
    assert_eq!(evaluate(&root, &f(27.0)), t(0));
    assert_eq!(evaluate(&root, &f(30.0)), t(0));
    // The split tests `x < 29.1` first.
    let DispatchNode::RelationalTest { op, value, .. } = &root else {
        panic!("expected a search split, got {root:?}");
    };
    assert_eq!((*op, value), (RelOp::Lt, &f(29.1)));
}

#[test]
fn earlier_range_shadows_later_exact() {
    let labels = [
        CaseLabel::range(f(0.0), f(10.0), t(1)),
        CaseLabel::exact(f(5.0), t(2)),
        CaseLabel::exact(f(10.0), t(3)),
    ];
    let root = run(ScrutineeType::new(ScalarKind::Float64), &labels, t(0));
    assert_eq!(evaluate(&root, &f(5.0)), t(1));
    assert_eq!(evaluate(&root, &f(10.0)), t(3));
    check(
        &root,
        &labels,
        t(0),
        &[f(-1.0), f(0.0), f(-0.0), f(9.5), f(11.0), f(f64::INFINITY)],
    );
}

#[test]
fn nan_goes_to_default_without_nan_label() {
    // `x < 1.0` is false for NaN, so NaN would land on the `>= 1.0` side.
    let labels = [
        CaseLabel::relational(None, Some(Bound::exclusive(f(1.0))), t(1)),
        CaseLabel::relational(Some(Bound::inclusive(f(1.0))), None, t(2)),
    ];
    let root = run(ScrutineeType::new(ScalarKind::Float64), &labels, t(0));
    assert!(matches!(
        &root,
        DispatchNode::EqualityTest { value, .. } if value.is_nan()
    ));
    assert_eq!(evaluate(&root, &f(f64::NAN)), t(0));
    assert_eq!(evaluate(&root, &f(0.5)), t(1));
    assert_eq!(evaluate(&root, &f(1.0)), t(2));
}

#[test]
fn nan_label_matches_only_nan() {
    let labels = [
        CaseLabel::exact(f(f64::NAN), t(1)),
        CaseLabel::relational(Some(Bound::inclusive(f(0.0))), None, t(2)),
    ];
    let root = run(ScrutineeType::new(ScalarKind::Float32), &labels, t(0));
    check(
        &root,
        &labels,
        t(0),
        &[f(f64::NAN), f(-f64::NAN), f(0.0), f(-1.0), f(f64::NEG_INFINITY)],
    );
}

#[test]
fn no_nan_test_when_nan_already_reaches_default() {
    let labels = [CaseLabel::exact(f(1.5), t(1))];
    let root = run(ScrutineeType::new(ScalarKind::Float64), &labels, t(0));
    assert_eq!(
        root,
        DispatchNode::equality(f(1.5), DispatchNode::leaf(t(1)), DispatchNode::leaf(t(0)))
    );
}

#[test]
fn integral_relational_patterns() {
    let labels = [
        CaseLabel::relational(None, Some(Bound::exclusive(ConstValue::Int(0))), t(1)),
        CaseLabel::exact(ConstValue::Int(0), t(2)),
        CaseLabel::relational(
            Some(Bound::exclusive(ConstValue::Int(0))),
            Some(Bound::exclusive(ConstValue::Int(10))),
            t(3),
        ),
    ];
    let root = run(ScrutineeType::integral(IntKind::I32), &labels, t(0));
    let values: Vec<ConstValue> = (-3..=13).map(ConstValue::Int).collect();
    check(&root, &labels, t(0), &values);
    check(
        &root,
        &labels,
        t(0),
        &[ConstValue::Int(i128::from(i32::MIN)), ConstValue::Int(i128::from(i32::MAX))],
    );
}

#[test]
fn integral_points_without_gaps_need_no_final_test() {
    let labels = [
        CaseLabel::exact(ConstValue::Int(0), t(1)),
        CaseLabel::relational(Some(Bound::inclusive(ConstValue::Int(1))), None, t(2)),
    ];
    let root = run(ScrutineeType::integral(IntKind::U8), &labels, t(0));
    assert_eq!(
        root,
        DispatchNode::equality(
            ConstValue::Int(0),
            DispatchNode::leaf(t(1)),
            DispatchNode::leaf(t(2)),
        )
    );
}

#[test]
fn decimals_compare_numerically() {
    let d = |m: i64, scale: u32| ConstValue::Decimal(Decimal::new(m, scale));
    let labels = [
        CaseLabel::exact(d(10, 1), t(1)),
        CaseLabel::range(d(200, 2), d(3, 0), t(2)),
        CaseLabel::exact(d(35, 1), t(3)),
        CaseLabel::exact(d(4, 0), t(4)),
        CaseLabel::exact(d(45, 1), t(5)),
    ];
    let root = run(ScrutineeType::new(ScalarKind::Decimal), &labels, t(0));
    assert_eq!(evaluate(&root, &d(100, 2)), t(1));
    check(
        &root,
        &labels,
        t(0),
        &[d(0, 0), d(2, 0), d(25, 1), d(3, 0), d(35, 1), d(400, 2), d(45, 1), d(5, 0)],
    );
}

#[test]
fn many_runs_build_a_balanced_tree() {
    let labels: Vec<CaseLabel> = (0..32)
        .map(|i| {
            let lo = f(f64::from(i) * 10.0);
            let hi = f(f64::from(i) * 10.0 + 5.0);
            CaseLabel::range(lo, hi, t(i + 1))
        })
        .collect();
    let root = run(ScrutineeType::new(ScalarKind::Float64), &labels, t(0));
    // 65 runs; a balanced tree is logarithmic in that.
    assert!(root.depth() <= 10, "depth {}", root.depth());
    let values: Vec<ConstValue> = (-5..330).map(|i| f(f64::from(i))).collect();
    check(&root, &labels, t(0), &values);
}
