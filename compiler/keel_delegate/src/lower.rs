//! Lowered form of a method-group conversion.
//!
//! A cached conversion becomes the lazy check/construct/store sequence:
//!
//! ```text
//!     LoadSlot(slot)
//!     BranchIfSet(done)
//!     Construct(delegate, target)
//!     StoreSlot(slot)
//! done:
//! ```
//!
//! leaving the delegate on the stack on both paths. An uncached conversion
//! is a bare `Construct`. The emitter chooses the concrete instructions.

use std::fmt;

use keel_ir::{CacheSlot, ContainerId, MethodRef, NotCacheable, ReceiverShape, SlotIndex, TypeRef};

/// A branch target owned by the emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct LabelId(u32);

impl LabelId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheOp {
    /// Push the slot's current value (null when unset).
    LoadSlot {
        container: ContainerId,
        index: SlotIndex,
    },
    /// Pop; if the value was non-null, push it back and jump.
    BranchIfSet(LabelId),
    /// Push a new delegate.
    Construct {
        delegate_type: TypeRef,
        target: MethodRef,
        receiver: ReceiverShape,
    },
    /// Store the top of stack into the slot, keeping it.
    StoreSlot {
        container: ContainerId,
        index: SlotIndex,
    },
    Label(LabelId),
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOp::LoadSlot { container, index } => {
                write!(f, "load   c{}[{}]", container.raw(), index.raw())
            }
            CacheOp::BranchIfSet(label) => write!(f, "brset  L{}", label.raw()),
            CacheOp::Construct { receiver, .. } => write!(f, "new    ({receiver:?})"),
            CacheOp::StoreSlot { container, index } => {
                write!(f, "store  c{}[{}]", container.raw(), index.raw())
            }
            CacheOp::Label(label) => write!(f, "L{}:", label.raw()),
        }
    }
}

/// What the emitter does at one conversion site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoweredConversion {
    Cached {
        slot: CacheSlot,
        /// Unnormalized spelling, for the construction itself.
        delegate_type: TypeRef,
        target: MethodRef,
    },
    Uncached {
        reason: NotCacheable,
        delegate_type: TypeRef,
        target: MethodRef,
        receiver: ReceiverShape,
    },
}

impl LoweredConversion {
    pub fn slot(&self) -> Option<&CacheSlot> {
        match self {
            LoweredConversion::Cached { slot, .. } => Some(slot),
            LoweredConversion::Uncached { .. } => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.slot().is_some()
    }

    /// The instruction sequence, branching to `done` when the slot is set.
    pub fn ops(&self, done: LabelId) -> Vec<CacheOp> {
        match self {
            LoweredConversion::Cached {
                slot,
                delegate_type,
                target,
            } => vec![
                CacheOp::LoadSlot {
                    container: slot.container,
                    index: slot.index,
                },
                CacheOp::BranchIfSet(done),
                CacheOp::Construct {
                    delegate_type: delegate_type.clone(),
                    target: target.clone(),
                    receiver: slot.key.receiver,
                },
                CacheOp::StoreSlot {
                    container: slot.container,
                    index: slot.index,
                },
                CacheOp::Label(done),
            ],
            LoweredConversion::Uncached {
                delegate_type,
                target,
                receiver,
                ..
            } => vec![CacheOp::Construct {
                delegate_type: delegate_type.clone(),
                target: target.clone(),
                receiver: *receiver,
            }],
        }
    }
}

#[cfg(test)]
mod tests;
