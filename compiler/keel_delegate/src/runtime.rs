//! Runtime model of cache slots.
//!
//! Executes lowered conversions the way generated code would, so tests can
//! observe delegate identity: every construction gets a fresh serial, and a
//! cached conversion returns the stored delegate after its first run.
//!
//! Storage is per instantiation. A slot in a generic container is keyed by
//! the type arguments bound to the container's parameters, so `Test<int>`
//! and `Test<string>` never see each other's delegates.
//!
//! # Initialization Race
//!
//! Generated code checks and stores without synchronization. Two threads
//! may both see an unset slot, both construct and both store. The
//! step-wise API ([`load`](CacheStorage::load),
//! [`construct`](CacheStorage::construct), [`store`](CacheStorage::store))
//! lets tests interleave those steps; the last store wins and every
//! delegate built for a slot has the same type and target.

use rustc_hash::FxHashMap;
use thiserror::Error;

use keel_ir::{CacheSlot, ContainerId, MethodRef, SlotIndex, TypeParamId, TypeRef};

use crate::lower::{CacheOp, LabelId, LoweredConversion};

/// A constructed delegate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DelegateValue {
    /// Allocation identity; unique per construction.
    pub serial: u64,
    pub delegate_type: TypeRef,
    pub target: MethodRef,
}

impl DelegateValue {
    /// Same delegate type and target, regardless of identity.
    pub fn is_equivalent(&self, other: &DelegateValue) -> bool {
        self.delegate_type == other.delegate_type && self.target == other.target
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Unset,
    /// Seen unset and being constructed; readers still see it unset.
    Constructing,
    Set(DelegateValue),
}

/// Type arguments of one generic instantiation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Instantiation(FxHashMap<TypeParamId, TypeRef>);

impl Instantiation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bind(mut self, param: TypeParamId, arg: TypeRef) -> Self {
        self.0.insert(param, arg);
        self
    }

    pub fn get(&self, param: TypeParamId) -> Option<&TypeRef> {
        self.0.get(&param)
    }

    fn apply(&self, ty: &TypeRef) -> TypeRef {
        ty.substitute(&|param| self.get(param).cloned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("`{op}` needs a value on the stack")]
    StackUnderflow { op: String },
    #[error("branch to undefined label L{}", .0.raw())]
    MissingLabel(LabelId),
    #[error("sequence left {0} values on the stack, expected 1")]
    UnbalancedStack(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SlotAddress {
    container: ContainerId,
    /// Arguments bound to the container's parameters.
    args: Vec<TypeRef>,
    index: SlotIndex,
}

impl SlotAddress {
    fn of(slot: &CacheSlot, inst: &Instantiation) -> Self {
        Self {
            container: slot.container,
            args: slot
                .scope
                .params()
                .iter()
                .map(|&param| inst.get(param).cloned().unwrap_or(TypeRef::Param(param)))
                .collect(),
            index: slot.index,
        }
    }
}

/// Slot storage of one running program.
#[derive(Debug, Default)]
pub struct CacheStorage {
    slots: FxHashMap<SlotAddress, SlotState>,
    next_serial: u64,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, slot: &CacheSlot, inst: &Instantiation) -> SlotState {
        self.slots
            .get(&SlotAddress::of(slot, inst))
            .cloned()
            .unwrap_or_default()
    }

    /// The stored delegate, if the slot is set.
    pub fn load(&self, slot: &CacheSlot, inst: &Instantiation) -> Option<DelegateValue> {
        match self.slots.get(&SlotAddress::of(slot, inst)) {
            Some(SlotState::Set(value)) => Some(value.clone()),
            Some(SlotState::Unset | SlotState::Constructing) | None => None,
        }
    }

    /// Note that a construction for `slot` has started.
    pub fn begin(&mut self, slot: &CacheSlot, inst: &Instantiation) {
        let state = self.slots.entry(SlotAddress::of(slot, inst)).or_default();
        if *state == SlotState::Unset {
            *state = SlotState::Constructing;
        }
    }

    /// Allocate a new delegate.
    pub fn construct(
        &mut self,
        delegate_type: &TypeRef,
        target: &MethodRef,
        inst: &Instantiation,
    ) -> DelegateValue {
        self.next_serial += 1;
        DelegateValue {
            serial: self.next_serial,
            delegate_type: inst.apply(delegate_type),
            target: target.substitute(&|param| inst.get(param).cloned()),
        }
    }

    pub fn store(&mut self, slot: &CacheSlot, inst: &Instantiation, value: DelegateValue) {
        self.slots
            .insert(SlotAddress::of(slot, inst), SlotState::Set(value));
    }

    /// Total constructions so far.
    pub fn constructions(&self) -> u64 {
        self.next_serial
    }

    /// Run a lowered conversion and return the delegate it produces.
    pub fn evaluate(
        &mut self,
        lowered: &LoweredConversion,
        inst: &Instantiation,
    ) -> Result<DelegateValue, RuntimeError> {
        let ops = lowered.ops(LabelId::new(0));
        let slot = lowered.slot();
        let mut stack: Vec<DelegateValue> = Vec::new();
        // `LoadSlot` of an unset slot pushes null.
        let mut null_on_top = false;
        let mut pc = 0;
        while let Some(op) = ops.get(pc) {
            pc += 1;
            match op {
                CacheOp::LoadSlot { .. } => {
                    let slot = slot.ok_or_else(|| underflow(op))?;
                    match self.load(slot, inst) {
                        Some(value) => stack.push(value),
                        None => null_on_top = true,
                    }
                }
                CacheOp::BranchIfSet(label) => {
                    if null_on_top {
                        null_on_top = false;
                        continue;
                    }
                    if stack.is_empty() {
                        return Err(underflow(op));
                    }
                    pc = ops
                        .iter()
                        .position(|op| *op == CacheOp::Label(*label))
                        .ok_or(RuntimeError::MissingLabel(*label))?;
                }
                CacheOp::Construct {
                    delegate_type,
                    target,
                    ..
                } => {
                    if let Some(slot) = slot {
                        self.begin(slot, inst);
                    }
                    let value = self.construct(delegate_type, target, inst);
                    tracing::trace!(serial = value.serial, "delegate constructed");
                    stack.push(value);
                }
                CacheOp::StoreSlot { .. } => {
                    let slot = slot.ok_or_else(|| underflow(op))?;
                    let value = stack.last().cloned().ok_or_else(|| underflow(op))?;
                    self.store(slot, inst, value);
                }
                CacheOp::Label(_) => {}
            }
        }
        match (stack.pop(), stack.len()) {
            (Some(value), 0) => Ok(value),
            (Some(_), rest) => Err(RuntimeError::UnbalancedStack(rest + 1)),
            (None, _) => Err(RuntimeError::UnbalancedStack(0)),
        }
    }
}

fn underflow(op: &CacheOp) -> RuntimeError {
    RuntimeError::StackUnderflow { op: op.to_string() }
}
