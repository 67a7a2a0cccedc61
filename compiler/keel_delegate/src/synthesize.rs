//! The cache synthesizer.
//!
//! # Algorithm
//!
//! For each conversion site, in lowering order:
//!
//! 1. **Gate**: configuration first (caching disabled), then the site's own
//!    [`cacheability`](ConversionSite::cacheability). Non-cacheable sites
//!    lower to a fresh construction.
//! 2. **Key**: normalize delegate type and target ([`cache_key`]).
//! 3. **Scope**: compute the enclosing scope under the configured policy.
//! 4. **Slot**: look up or create the container for the scope and the slot
//!    for the key in the [`ContainerRegistry`].
//!
//! Steps 2-4 are deterministic, so two sites with equal keys in equal
//! scopes always share a slot.

use keel_ir::{CacheSlot, ConversionSite, NotCacheable, SymbolTable};

use crate::config::SynthesizerConfig;
use crate::lower::LoweredConversion;
use crate::normalize::cache_key;
use crate::registry::ContainerRegistry;
use crate::scope::enclosing_scope;

/// Decides and allocates cache slots for one compilation.
pub struct CacheSynthesizer<'a> {
    symbols: &'a SymbolTable,
    config: SynthesizerConfig,
}

impl<'a> CacheSynthesizer<'a> {
    pub fn new(symbols: &'a SymbolTable, config: SynthesizerConfig) -> Self {
        Self { symbols, config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Site cacheability with configuration applied.
    pub fn cacheability(&self, site: &ConversionSite) -> Result<(), NotCacheable> {
        if !self.config.enabled {
            return Err(NotCacheable::Disabled);
        }
        site.cacheability()
    }

    /// The slot serving `site`, or `None` if it must construct every time.
    pub fn synthesize(
        &self,
        site: &ConversionSite,
        registry: &mut ContainerRegistry,
    ) -> Option<CacheSlot> {
        match self.cacheability(site) {
            Ok(()) => Some(self.allocate(site, registry)),
            Err(reason) => {
                self.trace_uncached(site, reason);
                None
            }
        }
    }

    /// Lower `site` to a cached or uncached conversion.
    pub fn lower(
        &self,
        site: &ConversionSite,
        registry: &mut ContainerRegistry,
    ) -> LoweredConversion {
        if let Err(reason) = self.cacheability(site) {
            self.trace_uncached(site, reason);
            return LoweredConversion::Uncached {
                reason,
                delegate_type: site.delegate_type.clone(),
                target: site.target.clone(),
                receiver: site.receiver,
            };
        }
        LoweredConversion::Cached {
            slot: self.allocate(site, registry),
            delegate_type: site.delegate_type.clone(),
            target: site.target.clone(),
        }
    }

    fn allocate(&self, site: &ConversionSite, registry: &mut ContainerRegistry) -> CacheSlot {
        let key = cache_key(self.symbols, site);
        let scope = enclosing_scope(self.symbols, site, &key, self.config.scope_policy);
        let slot = registry.slot_for(&scope, &key);
        tracing::debug!(
            delegate = %self.symbols.display_type(&key.delegate_type),
            target_method = %self.symbols.display_method(&key.target),
            container = slot.container.raw(),
            slot = slot.index.raw(),
            "conversion cached"
        );
        slot
    }

    fn trace_uncached(&self, site: &ConversionSite, reason: NotCacheable) {
        tracing::trace!(
            target_method = %self.symbols.display_method(&site.target),
            %reason,
            "conversion not cached"
        );
    }
}
