//! Method-group conversion sites and the cache slots synthesized for them.

use std::fmt;

use crate::symbols::{MethodId, MethodRef, TypeDefId, TypeParamId, TypeRef};

/// What a delegate captures besides its target method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ReceiverShape {
    /// Static method or statically referenced extension method.
    Static,
    /// Instance method; captures `this` or a receiver expression.
    Instance,
    /// Extension method invoked through a receiver (`x.Ext`); captures `x`.
    BoundExtension,
}

/// How the conversion is spelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionForm {
    /// `Action a = Target;`
    Implicit,
    /// `(Action)Target`
    Cast,
    /// `new Action(Target)`
    DelegateCreation,
    /// `Action a = new(Target);`
    TargetTypedNew,
}

/// Where the conversion is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SitePosition {
    Ordinary,
    /// Inside a lambda converted to an expression tree.
    ExpressionTree,
    /// Static field initializer or static constructor; runs once.
    StaticInitializer,
}

/// Why a site is constructed fresh on every evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotCacheable {
    /// Caching is switched off for this compilation.
    Disabled,
    /// Explicit `new D(M)` or `new(M)`: each evaluation must allocate.
    ExplicitCreation,
    ExpressionTree,
    StaticInitializer,
    CapturedReceiver(ReceiverShape),
}

impl fmt::Display for NotCacheable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotCacheable::Disabled => f.write_str("delegate caching disabled"),
            NotCacheable::ExplicitCreation => f.write_str("explicit delegate creation"),
            NotCacheable::ExpressionTree => f.write_str("inside an expression tree"),
            NotCacheable::StaticInitializer => f.write_str("static initializer"),
            NotCacheable::CapturedReceiver(shape) => write!(f, "captures a receiver ({shape:?})"),
        }
    }
}

/// One method-group-to-delegate conversion found during lowering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConversionSite {
    pub delegate_type: TypeRef,
    pub target: MethodRef,
    pub receiver: ReceiverShape,
    pub form: ConversionForm,
    pub position: SitePosition,
    /// Type whose member body contains the conversion.
    pub containing_type: TypeDefId,
    /// Innermost method (or local function) containing the conversion.
    /// `None` for field initializers.
    pub containing_method: Option<MethodId>,
}

impl ConversionSite {
    /// An ordinary implicit conversion of a static method group.
    pub fn new(
        delegate_type: TypeRef,
        target: MethodRef,
        containing_type: TypeDefId,
        containing_method: Option<MethodId>,
    ) -> Self {
        Self {
            delegate_type,
            target,
            receiver: ReceiverShape::Static,
            form: ConversionForm::Implicit,
            position: SitePosition::Ordinary,
            containing_type,
            containing_method,
        }
    }

    #[must_use]
    pub fn with_form(mut self, form: ConversionForm) -> Self {
        self.form = form;
        self
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: ReceiverShape) -> Self {
        self.receiver = receiver;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: SitePosition) -> Self {
        self.position = position;
        self
    }

    /// Whether the site may be served from a cache slot.
    ///
    /// Checks only what the site itself determines; configuration-level
    /// switches are applied by the synthesizer.
    pub fn cacheability(&self) -> Result<(), NotCacheable> {
        match self.form {
            ConversionForm::DelegateCreation | ConversionForm::TargetTypedNew => {
                return Err(NotCacheable::ExplicitCreation)
            }
            ConversionForm::Implicit | ConversionForm::Cast => {}
        }
        match self.position {
            SitePosition::ExpressionTree => return Err(NotCacheable::ExpressionTree),
            SitePosition::StaticInitializer => return Err(NotCacheable::StaticInitializer),
            SitePosition::Ordinary => {}
        }
        match self.receiver {
            ReceiverShape::Static => Ok(()),
            shape @ (ReceiverShape::Instance | ReceiverShape::BoundExtension) => {
                Err(NotCacheable::CapturedReceiver(shape))
            }
        }
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheability().is_ok()
    }
}

/// The generic context a cache container is instantiated over.
///
/// Two slots may share a container only if their scopes are equal: equal
/// scopes instantiate identically, so a slot never sees a delegate built
/// for different type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum EnclosingScope {
    /// No type parameters: one container per module.
    Module,
    Type {
        owner: TypeDefId,
        params: Vec<TypeParamId>,
    },
    Method {
        owner: MethodId,
        params: Vec<TypeParamId>,
    },
}

impl EnclosingScope {
    /// Type parameters the container is generic over.
    pub fn params(&self) -> &[TypeParamId] {
        match self {
            EnclosingScope::Module => &[],
            EnclosingScope::Type { params, .. } | EnclosingScope::Method { params, .. } => params,
        }
    }
}

/// Normalized identity of a cached delegate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheKey {
    pub delegate_type: TypeRef,
    pub target: MethodRef,
    pub receiver: ReceiverShape,
}

/// A synthesized container holding cache slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ContainerId(u32);

impl ContainerId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a slot within its container, in first-seen order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SlotIndex(u32);

impl SlotIndex {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a cacheable conversion stores its delegate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheSlot {
    pub container: ContainerId,
    pub index: SlotIndex,
    pub key: CacheKey,
    pub scope: EnclosingScope,
}

#[cfg(test)]
mod tests;
