use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;

use super::*;

fn hash_of(value: &ConstValue) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// IntKind bounds

#[test]
fn int_kind_bounds() {
    assert_eq!(IntKind::I8.min(), -128);
    assert_eq!(IntKind::I8.max(), 127);
    assert_eq!(IntKind::U8.max(), 255);
    assert_eq!(IntKind::Char.max(), 0xFFFF);
    assert_eq!(IntKind::I64.min(), i128::from(i64::MIN));
    assert_eq!(IntKind::U64.max(), i128::from(u64::MAX));
}

#[test]
fn int_kind_contains() {
    assert!(IntKind::U16.contains(0));
    assert!(!IntKind::U16.contains(-1));
    assert!(!IntKind::I32.contains(i128::from(i32::MAX) + 1));
}

// Structural identity

#[test]
fn negative_zero_is_structurally_zero() {
    let a = ConstValue::Float(0.0);
    let b = ConstValue::Float(-0.0);
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn nan_is_structurally_equal_to_nan() {
    let a = ConstValue::Float(f64::NAN);
    let b = ConstValue::Float(-f64::NAN);
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn decimal_identity_ignores_scale() {
    let a = ConstValue::Decimal(Decimal::new(10, 1));
    let b = ConstValue::Decimal(Decimal::new(100, 2));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn different_kinds_never_equal() {
    assert_ne!(ConstValue::Int(1), ConstValue::Float(1.0));
    assert_ne!(ConstValue::Null, ConstValue::str(""));
}

// Pattern equality

#[test]
fn pattern_eq_matches_nan() {
    assert!(ConstValue::Float(f64::NAN).pattern_eq(&ConstValue::Float(f64::NAN)));
    assert!(!ConstValue::Float(f64::NAN).pattern_eq(&ConstValue::Float(0.0)));
}

#[test]
fn pattern_eq_null_only_matches_null() {
    assert!(ConstValue::Null.pattern_eq(&ConstValue::Null));
    assert!(!ConstValue::Null.pattern_eq(&ConstValue::str("")));
    assert!(!ConstValue::str("").pattern_eq(&ConstValue::Null));
}

// Ordering

#[test]
fn compare_same_kind() {
    assert_eq!(
        ConstValue::Int(-5).compare(&ConstValue::Int(3)),
        Some(Ordering::Less)
    );
    assert_eq!(
        ConstValue::Float(29.1).compare(&ConstValue::Float(29.1)),
        Some(Ordering::Equal)
    );
    assert_eq!(
        ConstValue::Decimal(Decimal::new(15, 1)).compare(&ConstValue::Decimal(Decimal::ONE)),
        Some(Ordering::Greater)
    );
}

#[test]
fn compare_nan_and_null_are_unordered() {
    assert_eq!(
        ConstValue::Float(f64::NAN).compare(&ConstValue::Float(1.0)),
        None
    );
    assert_eq!(ConstValue::Null.compare(&ConstValue::Int(0)), None);
    assert_eq!(ConstValue::Int(0).compare(&ConstValue::Float(0.0)), None);
}

// Representability

#[test]
fn fits_checks_kind_and_range() {
    let byte = ScrutineeType::integral(IntKind::U8);
    assert!(ConstValue::Int(255).fits(&byte));
    assert!(!ConstValue::Int(256).fits(&byte));
    assert!(!ConstValue::Null.fits(&byte));
    assert!(ConstValue::Null.fits(&ScrutineeType::nullable(ScalarKind::Integral(IntKind::U8))));
    assert!(!ConstValue::str("x").fits(&byte));
}

#[test]
fn fits_float32_rejects_unrepresentable() {
    let float = ScrutineeType::new(ScalarKind::Float32);
    assert!(ConstValue::Float(0.5).fits(&float));
    assert!(!ConstValue::Float(0.1).fits(&float));
    assert!(ConstValue::Float(f64::NAN).fits(&float));
}

#[test]
fn strings_are_always_nullable() {
    assert!(ScrutineeType::string().nullable);
    assert_eq!(ScrutineeType::string().to_string(), "string");
    assert_eq!(
        ScrutineeType::nullable(ScalarKind::Integral(IntKind::I32)).to_string(),
        "int?"
    );
}

// UTF-16

#[test]
fn utf16_measures_code_units() {
    assert_eq!(utf16_len("abc"), 3);
    assert_eq!(utf16_len("\u{1F600}"), 2);
    assert_eq!(utf16_unit_at("abc", 1), Some(u16::from(b'b')));
    assert_eq!(utf16_unit_at("abc", 3), None);
}

#[test]
fn display_forms() {
    assert_eq!(ConstValue::Null.to_string(), "null");
    assert_eq!(ConstValue::Int(-3).to_string(), "-3");
    assert_eq!(ConstValue::str("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(ConstValue::Decimal(Decimal::new(25, 1)).to_string(), "2.5m");
}
