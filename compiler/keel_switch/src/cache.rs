//! Plan cache.
//!
//! Identical switches are common in generated code (enum `ToString`
//! helpers, state machines stamped out per type). The cache stores each
//! plan once, bincode-encoded, keyed by a fingerprint of everything that
//! determines it: scrutinee type, labels, default target and planner
//! configuration.
//!
//! # Cache Granularity
//!
//! Per switch. Each entry stores a hash of its encoded bytes, checked on
//! every hit, so a corrupted entry surfaces as [`PlanCacheError::Corrupt`]
//! instead of a wrong plan.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use thiserror::Error;

use keel_ir::{CaseLabel, CaseTarget, DispatchPlan, ScrutineeType};

use crate::SwitchPlanner;

#[derive(Debug, Error)]
pub enum PlanCacheError {
    #[error("failed to encode dispatch plan: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode dispatch plan: {0}")]
    Decode(#[source] bincode::Error),
    #[error("cached plan {key:#018x} failed its integrity check")]
    Corrupt { key: u64 },
}

/// Cache key: fingerprint of a planner invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlanKey(u64);

impl PlanKey {
    pub fn new(
        planner: &SwitchPlanner,
        scrutinee: &ScrutineeType,
        labels: &[CaseLabel],
        default: CaseTarget,
    ) -> Self {
        let mut hasher = FxHasher::default();
        planner.config().hash(&mut hasher);
        scrutinee.hash(&mut hasher);
        labels.hash(&mut hasher);
        default.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One encoded plan.
#[derive(Clone, Debug)]
struct CachedPlan {
    /// Bincode-encoded `DispatchPlan`.
    data: Vec<u8>,
    /// Hash of `data` for integrity verification.
    hash: u64,
}

fn hash_bytes(data: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    data.hash(&mut hasher);
    hasher.finish()
}

/// In-memory cache of encoded dispatch plans.
#[derive(Debug, Default)]
pub struct PlanCache {
    entries: FxHashMap<PlanKey, CachedPlan>,
    hits: usize,
    misses: usize,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached plan for this invocation, planning and storing it
    /// on a miss.
    pub fn get_or_plan(
        &mut self,
        planner: &SwitchPlanner,
        scrutinee: &ScrutineeType,
        labels: &[CaseLabel],
        default: CaseTarget,
    ) -> Result<DispatchPlan, PlanCacheError> {
        let key = PlanKey::new(planner, scrutinee, labels, default);
        if let Some(cached) = self.entries.get(&key) {
            if hash_bytes(&cached.data) != cached.hash {
                return Err(PlanCacheError::Corrupt { key: key.raw() });
            }
            self.hits += 1;
            tracing::trace!(key = key.raw(), "plan cache hit");
            return bincode::deserialize(&cached.data).map_err(PlanCacheError::Decode);
        }

        self.misses += 1;
        let plan = planner.plan(scrutinee, labels, default);
        let data = bincode::serialize(&plan).map_err(PlanCacheError::Encode)?;
        let hash = hash_bytes(&data);
        tracing::trace!(key = key.raw(), bytes = data.len(), "plan cache store");
        self.entries.insert(key, CachedPlan { data, hash });
        Ok(plan)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    #[cfg(test)]
    fn corrupt(&mut self, key: PlanKey) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.data.push(0);
        }
    }
}
