//! Case labels as handed over by the front end.
//!
//! A switch is a list of [`CaseLabel`]s in source order. Exact labels are
//! pairwise distinct after constant folding; range labels (relational
//! patterns) may overlap, in which case the first label in source order wins.

use std::fmt;

use crate::constant::ConstValue;

/// Opaque identifier of the code a label jumps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct CaseTarget(u32);

impl CaseTarget {
    /// Create a target from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One end of a range label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Bound {
    pub value: ConstValue,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: ConstValue) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: ConstValue) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// What a label matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LabelKind {
    /// Matches values equal to the constant (see [`ConstValue::pattern_eq`]).
    Exact(ConstValue),
    /// Matches values inside the bounds. A missing bound is unbounded.
    Range {
        lo: Option<Bound>,
        hi: Option<Bound>,
    },
    /// Taken when no other label matches.
    Default,
    /// Matches the null scrutinee (nullable scrutinees only).
    Null,
}

impl LabelKind {
    /// Reference matching semantics, used by the plan soundness oracle.
    ///
    /// `Default` never matches here; it is the fallback after a full scan.
    pub fn matches(&self, value: &ConstValue) -> bool {
        match self {
            LabelKind::Exact(expected) => expected.pattern_eq(value),
            LabelKind::Null => value.is_null(),
            LabelKind::Default => false,
            LabelKind::Range { lo, hi } => {
                let above = lo.as_ref().map_or(true, |lo| {
                    value.compare(&lo.value).is_some_and(|ord| {
                        ord.is_gt() || (lo.inclusive && ord.is_eq())
                    })
                });
                let below = hi.as_ref().map_or(true, |hi| {
                    value.compare(&hi.value).is_some_and(|ord| {
                        ord.is_lt() || (hi.inclusive && ord.is_eq())
                    })
                });
                // A fully unbounded range still rejects null and NaN.
                above && below && value.compare(value).is_some()
            }
        }
    }
}

/// One `case` entry: what it matches and where it goes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseLabel {
    pub kind: LabelKind,
    pub target: CaseTarget,
}

impl CaseLabel {
    pub fn exact(value: ConstValue, target: CaseTarget) -> Self {
        Self {
            kind: LabelKind::Exact(value),
            target,
        }
    }

    /// `>= lo and < hi`.
    pub fn range(lo: ConstValue, hi: ConstValue, target: CaseTarget) -> Self {
        Self::relational(Some(Bound::inclusive(lo)), Some(Bound::exclusive(hi)), target)
    }

    /// Arbitrary relational pattern (`< a`, `> a and <= b`, ...).
    pub fn relational(lo: Option<Bound>, hi: Option<Bound>, target: CaseTarget) -> Self {
        Self {
            kind: LabelKind::Range { lo, hi },
            target,
        }
    }

    pub fn default(target: CaseTarget) -> Self {
        Self {
            kind: LabelKind::Default,
            target,
        }
    }

    pub fn null(target: CaseTarget) -> Self {
        Self {
            kind: LabelKind::Null,
            target,
        }
    }
}

#[cfg(test)]
mod tests;
