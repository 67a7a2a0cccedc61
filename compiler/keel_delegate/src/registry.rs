//! Per-compilation container registry.
//!
//! One container per distinct [`EnclosingScope`], one slot per distinct
//! [`CacheKey`] within a container. Containers and slots are numbered in
//! first-seen order, so the same sequence of sites always yields the same
//! layout.
//!
//! The registry is owned by the compilation and passed explicitly to the
//! synthesizer; there is no global table.

use rustc_hash::FxHashMap;

use keel_ir::{CacheKey, CacheSlot, ContainerId, EnclosingScope, SlotIndex};

/// A synthesized holder of cache slots.
#[derive(Clone, Debug)]
pub struct Container {
    pub id: ContainerId,
    pub scope: EnclosingScope,
    /// Slot keys, indexed by [`SlotIndex`].
    slots: Vec<CacheKey>,
    by_key: FxHashMap<CacheKey, SlotIndex>,
}

impl Container {
    fn new(id: ContainerId, scope: EnclosingScope) -> Self {
        Self {
            id,
            scope,
            slots: Vec::new(),
            by_key: FxHashMap::default(),
        }
    }

    pub fn slots(&self) -> &[CacheKey] {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&CacheKey> {
        self.slots.get(index.index())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of type parameters the container is generic over.
    pub fn arity(&self) -> usize {
        self.scope.params().len()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "container and slot counts are far below u32::MAX"
)]
fn next_raw(len: usize) -> u32 {
    len as u32
}

#[derive(Clone, Debug, Default)]
pub struct ContainerRegistry {
    containers: Vec<Container>,
    by_scope: FxHashMap<EnclosingScope, ContainerId>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The container for `scope`, created on first request.
    pub fn container_for(&mut self, scope: &EnclosingScope) -> ContainerId {
        if let Some(&id) = self.by_scope.get(scope) {
            return id;
        }
        let id = ContainerId::new(next_raw(self.containers.len()));
        tracing::debug!(container = id.raw(), ?scope, "new cache container");
        self.containers.push(Container::new(id, scope.clone()));
        self.by_scope.insert(scope.clone(), id);
        id
    }

    /// The slot for `key` in the container for `scope`, created on first
    /// request.
    pub fn slot_for(&mut self, scope: &EnclosingScope, key: &CacheKey) -> CacheSlot {
        let id = self.container_for(scope);
        let container = &mut self.containers[id.index()];
        let index = match container.by_key.get(key) {
            Some(&index) => index,
            None => {
                let index = SlotIndex::new(next_raw(container.slots.len()));
                tracing::trace!(container = id.raw(), slot = index.raw(), "new cache slot");
                container.slots.push(key.clone());
                container.by_key.insert(key.clone(), index);
                index
            }
        };
        CacheSlot {
            container: id,
            index,
            key: key.clone(),
            scope: scope.clone(),
        }
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.index())
    }

    /// Containers in creation order.
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Total slots across all containers.
    pub fn slot_count(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }
}
