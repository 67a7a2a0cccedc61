//! Scrutinee types and resolved constant values.
//!
//! Case values arrive from the front end already folded to constants. Every
//! integer width (including `u64`) is carried as `i128` so bucket spans and
//! jump-table bases can be computed without overflow. Strings are measured in
//! UTF-16 code units, the unit of the target runtime's string type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;

// Scrutinee types

/// Integral scrutinee kind. Enums switch over their underlying kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    /// UTF-16 code unit.
    Char,
}

impl IntKind {
    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            IntKind::I8 | IntKind::U8 => 8,
            IntKind::I16 | IntKind::U16 | IntKind::Char => 16,
            IntKind::I32 | IntKind::U32 => 32,
            IntKind::I64 | IntKind::U64 => 64,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64)
    }

    /// Smallest representable value.
    pub const fn min(self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.bits() - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub const fn max(self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.bits() - 1)) - 1
        } else {
            (1i128 << self.bits()) - 1
        }
    }

    /// Returns `true` if `value` is representable in this kind.
    pub const fn contains(self, value: i128) -> bool {
        value >= self.min() && value <= self.max()
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "sbyte",
            IntKind::I16 => "short",
            IntKind::I32 => "int",
            IntKind::I64 => "long",
            IntKind::U8 => "byte",
            IntKind::U16 => "ushort",
            IntKind::U32 => "uint",
            IntKind::U64 => "ulong",
            IntKind::Char => "char",
        }
    }
}

/// The governing type of a switch, without nullability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarKind {
    Integral(IntKind),
    Float32,
    Float64,
    Decimal,
    String,
}

impl ScalarKind {
    pub const fn is_integral(self) -> bool {
        matches!(self, ScalarKind::Integral(_))
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float32 | ScalarKind::Float64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Integral(kind) => kind.name(),
            ScalarKind::Float32 => "float",
            ScalarKind::Float64 => "double",
            ScalarKind::Decimal => "decimal",
            ScalarKind::String => "string",
        }
    }
}

/// A scrutinee type: scalar kind plus nullability.
///
/// Strings are reference types and therefore always nullable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrutineeType {
    pub kind: ScalarKind,
    pub nullable: bool,
}

impl ScrutineeType {
    /// Non-nullable scrutinee (strings stay nullable).
    pub const fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: matches!(kind, ScalarKind::String),
        }
    }

    /// Nullable value-type scrutinee (`int?`, `double?`, ...).
    pub const fn nullable(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    pub const fn integral(kind: IntKind) -> Self {
        Self::new(ScalarKind::Integral(kind))
    }

    pub const fn string() -> Self {
        Self::new(ScalarKind::String)
    }

    /// The integral kind, if this is an integral scrutinee.
    pub const fn int_kind(&self) -> Option<IntKind> {
        match self.kind {
            ScalarKind::Integral(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for ScrutineeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if self.nullable && !matches!(self.kind, ScalarKind::String) {
            f.write_str("?")?;
        }
        Ok(())
    }
}

// Constant values

/// A resolved constant: a case value or a runtime scrutinee value.
///
/// Structural identity (`Eq`/`Hash`) canonicalizes floats so that `-0.0`
/// and `0.0` are one value and every NaN is one value; decimals compare
/// numerically. Matching semantics for exact labels live in
/// [`pattern_eq`](ConstValue::pattern_eq).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    Null,
    Int(i128),
    Float(f64),
    Decimal(Decimal),
    Str(Box<str>),
}

impl ConstValue {
    pub fn str(s: &str) -> Self {
        ConstValue::Str(s.into())
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            ConstValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, ConstValue::Float(f) if f.is_nan())
    }

    /// Exact-label matching semantics.
    ///
    /// NaN matches NaN, `-0.0` matches `0.0`, decimals match numerically
    /// (`1.0m` matches `1.00m`), strings match ordinally and `Null` matches
    /// only `Null`. Values of different kinds never match.
    pub fn pattern_eq(&self, other: &ConstValue) -> bool {
        match (self, other) {
            (ConstValue::Null, ConstValue::Null) => true,
            (ConstValue::Int(a), ConstValue::Int(b)) => a == b,
            (ConstValue::Float(a), ConstValue::Float(b)) => {
                (a.is_nan() && b.is_nan()) || a == b
            }
            (ConstValue::Decimal(a), ConstValue::Decimal(b)) => a == b,
            (ConstValue::Str(a), ConstValue::Str(b)) => a == b,
            _ => false,
        }
    }

    /// Order two values of the same kind.
    ///
    /// Returns `None` for NaN, `Null`, or values of different kinds:
    /// every relational test against such a value is false.
    pub fn compare(&self, other: &ConstValue) -> Option<Ordering> {
        match (self, other) {
            (ConstValue::Int(a), ConstValue::Int(b)) => Some(a.cmp(b)),
            (ConstValue::Float(a), ConstValue::Float(b)) => a.partial_cmp(b),
            (ConstValue::Decimal(a), ConstValue::Decimal(b)) => Some(a.cmp(b)),
            (ConstValue::Str(a), ConstValue::Str(b)) => {
                Some(a.encode_utf16().cmp(b.encode_utf16()))
            }
            _ => None,
        }
    }

    /// Returns `true` if this value is representable in `ty`.
    pub fn fits(&self, ty: &ScrutineeType) -> bool {
        match (self, ty.kind) {
            (ConstValue::Null, _) => ty.nullable,
            (ConstValue::Int(v), ScalarKind::Integral(kind)) => kind.contains(*v),
            (ConstValue::Float(_), ScalarKind::Float64)
            | (ConstValue::Decimal(_), ScalarKind::Decimal)
            | (ConstValue::Str(_), ScalarKind::String) => true,
            (ConstValue::Float(v), ScalarKind::Float32) => !v.is_finite() || fits_f32(*v),
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstValue::Null => "null",
            ConstValue::Int(_) => "integer",
            ConstValue::Float(_) => "floating-point",
            ConstValue::Decimal(_) => "decimal",
            ConstValue::Str(_) => "string",
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "round-trip through f32 detects values float cannot hold"
)]
fn fits_f32(value: f64) -> bool {
    f64::from(value as f32) == value
}

/// Canonical bit pattern for structural float identity.
fn canonical_float_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Null, ConstValue::Null) => true,
            (ConstValue::Int(a), ConstValue::Int(b)) => a == b,
            (ConstValue::Float(a), ConstValue::Float(b)) => {
                canonical_float_bits(*a) == canonical_float_bits(*b)
            }
            (ConstValue::Decimal(a), ConstValue::Decimal(b)) => a == b,
            (ConstValue::Str(a), ConstValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl Hash for ConstValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ConstValue::Null => {}
            ConstValue::Int(v) => v.hash(state),
            ConstValue::Float(v) => canonical_float_bits(*v).hash(state),
            ConstValue::Decimal(v) => v.normalize().hash(state),
            ConstValue::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v:?}"),
            ConstValue::Decimal(v) => write!(f, "{v}m"),
            ConstValue::Str(s) => write!(f, "\"{}\"", s.escape_debug()),
        }
    }
}

// UTF-16 helpers

/// Length of `s` in UTF-16 code units.
#[expect(
    clippy::cast_possible_truncation,
    reason = "case strings are far shorter than u32::MAX code units"
)]
pub fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

/// The UTF-16 code unit of `s` at `index`, if in bounds.
pub fn utf16_unit_at(s: &str, index: u32) -> Option<u16> {
    s.encode_utf16().nth(index as usize)
}

#[cfg(test)]
mod tests;
