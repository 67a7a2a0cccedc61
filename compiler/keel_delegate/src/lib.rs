//! Method-group conversion caching for the Keel compiler.
//!
//! Converting a static method group to a delegate allocates. When the
//! conversion cannot observe its receiver, the compiler instead stores the
//! delegate in a lazily initialized static slot and reuses it:
//!
//! - **Keys**: the delegate type and target after normalization, so
//!   spellings of one runtime type share a slot ([`cache_key`]).
//! - **Scopes**: the slot lives in a container tied to the generic scope
//!   its key mentions ([`enclosing_scope`]).
//! - **Containers**: one per scope, one slot per distinct key
//!   ([`ContainerRegistry`]).
//! - **Lowering**: the check/construct/store sequence ([`LoweredConversion`]).
//!
//! [`CacheStorage`] runs lowered conversions against per-instantiation
//! storage, for tests that observe delegate identity.
//!
//! # Design
//!
//! Synthesis is deterministic in lowering order: container and slot
//! indices depend only on the order sites are offered. Sites run
//! sequentially; nothing here is shared across threads.
//!
//! # Crate Dependencies
//!
//! Depends on `keel_ir` for symbols, sites and cache slots.

mod config;
mod lower;
mod normalize;
mod registry;
mod runtime;
mod scope;
mod synthesize;

pub use config::SynthesizerConfig;
pub use lower::{CacheOp, LabelId, LoweredConversion};
pub use normalize::{cache_key, normalize_method, normalize_type};
pub use registry::{Container, ContainerRegistry};
pub use runtime::{CacheStorage, DelegateValue, Instantiation, RuntimeError, SlotState};
pub use scope::{enclosing_scope, ScopePolicy};
pub use synthesize::CacheSynthesizer;
