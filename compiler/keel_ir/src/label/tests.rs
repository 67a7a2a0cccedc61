use super::*;

fn t(n: u32) -> CaseTarget {
    CaseTarget::new(n)
}

#[test]
fn exact_uses_pattern_equality() {
    let label = CaseLabel::exact(ConstValue::Float(f64::NAN), t(0));
    assert!(label.kind.matches(&ConstValue::Float(f64::NAN)));
    assert!(!label.kind.matches(&ConstValue::Float(1.0)));
}

#[test]
fn range_is_inclusive_low_exclusive_high() {
    let label = CaseLabel::range(ConstValue::Float(27.1), ConstValue::Float(29.1), t(19));
    assert!(label.kind.matches(&ConstValue::Float(27.1)));
    assert!(label.kind.matches(&ConstValue::Float(29.0)));
    assert!(!label.kind.matches(&ConstValue::Float(29.1)));
    assert!(!label.kind.matches(&ConstValue::Float(27.0)));
}

#[test]
fn open_relational_bounds() {
    let below_five = CaseLabel::relational(None, Some(Bound::exclusive(ConstValue::Int(5))), t(0));
    assert!(below_five.kind.matches(&ConstValue::Int(i128::from(i64::MIN))));
    assert!(!below_five.kind.matches(&ConstValue::Int(5)));

    let above = CaseLabel::relational(Some(Bound::exclusive(ConstValue::Int(5))), None, t(1));
    assert!(above.kind.matches(&ConstValue::Int(6)));
    assert!(!above.kind.matches(&ConstValue::Int(5)));
}

#[test]
fn ranges_never_match_nan_or_null() {
    let everything = CaseLabel::relational(None, None, t(0));
    assert!(everything.kind.matches(&ConstValue::Float(0.0)));
    assert!(!everything.kind.matches(&ConstValue::Float(f64::NAN)));
    assert!(!everything.kind.matches(&ConstValue::Null));
}

#[test]
fn null_and_default_labels() {
    assert!(CaseLabel::null(t(0)).kind.matches(&ConstValue::Null));
    assert!(!CaseLabel::null(t(0)).kind.matches(&ConstValue::Int(0)));
    assert!(!CaseLabel::default(t(0)).kind.matches(&ConstValue::Int(0)));
}

#[test]
fn target_display() {
    assert_eq!(t(7).to_string(), "L7");
}
