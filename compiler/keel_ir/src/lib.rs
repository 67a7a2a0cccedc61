//! Shared lowering types for the Keel compiler back half.
//!
//! This crate holds the data model that both lowering components agree on:
//!
//! - **Constants** ([`ConstValue`], [`ScrutineeType`]): resolved case values
//!   over integral, floating-point, decimal and string scrutinees.
//! - **Case labels** ([`CaseLabel`], [`LabelKind`]): the front end's
//!   duplicate-checked label set for one switch.
//! - **Dispatch plans** ([`DispatchPlan`], [`DispatchNode`]): the lowered
//!   decision structure consumed by the instruction emitter.
//! - **Symbols and delegates** ([`SymbolTable`], [`ConversionSite`],
//!   [`CacheSlot`]): the input and output of method-group cache synthesis.
//!
//! # Crate Dependencies
//!
//! No `keel_*` dependencies. `keel_switch` builds plans over these types,
//! `keel_delegate` builds cache slots, and `keelc` drives both.

pub mod constant;
pub mod delegate;
pub mod label;
pub mod plan;
pub mod symbols;

pub use constant::{utf16_len, utf16_unit_at, ConstValue, IntKind, ScalarKind, ScrutineeType};
pub use delegate::{
    CacheKey, CacheSlot, ContainerId, ConversionForm, ConversionSite, EnclosingScope,
    NotCacheable, ReceiverShape, SitePosition, SlotIndex,
};
pub use label::{Bound, CaseLabel, CaseTarget, LabelKind};
pub use plan::{
    CharArm, DispatchNode, DispatchPlan, HashBucket, LengthBucket, RelOp, Strategy,
    StringCandidate, StringHash,
};
pub use symbols::{
    MethodDef, MethodId, MethodRef, PrimitiveType, SymbolTable, TypeDef, TypeDefId, TypeParamDef,
    TypeParamId, TypeParamOwner, TypeRef,
};
