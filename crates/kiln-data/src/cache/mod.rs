// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A path-ordered cache of resources with lazy garbage collection.

use kiln_core::{ResourceHandle, ResourceLoader, ResourcePath, WeakResourceHandle};
use std::{
    collections::BTreeMap,
    fmt,
    ops::Bound::{Excluded, Unbounded},
    sync::Arc,
};

/// One node of the [`CacheIndex`].
///
/// The entry owns its loader but only observes the resource. Once every strong
/// handle to the resource is gone the entry is dead and waits to be swept.
#[derive(Clone)]
pub struct CacheEntry {
    resource: WeakResourceHandle,
    loader: Arc<dyn ResourceLoader>,
}

impl CacheEntry {
    /// Creates an entry observing `resource`.
    pub fn new(resource: &ResourceHandle, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            resource: resource.downgrade(),
            loader,
        }
    }

    /// A strong handle to the cached resource, if it is still alive.
    pub fn resource(&self) -> Option<ResourceHandle> {
        self.resource.upgrade()
    }

    /// The loader that populates the resource.
    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    /// An entry is live while its resource is.
    pub fn is_live(&self) -> bool {
        self.resource.is_alive()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("live", &self.is_live())
            .field("state", &self.loader.state())
            .finish()
    }
}

/// Maps each resource path to at most one live (loader, resource) pair.
///
/// Dead entries are not removed when their resource dies: the resource does not
/// know about the index. Instead every successful [`find`](Self::find) looks at
/// the entry that follows the hit in path order and removes it if it is dead.
/// Cleanup thus costs O(1) per lookup and needs no sweeper thread.
#[derive(Default)]
pub struct CacheIndex {
    entries: BTreeMap<ResourcePath, CacheEntry>,
}

impl CacheIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup.
    ///
    /// On a hit, the next entry in path order is swept if its resource died. The
    /// returned entry itself may be dead; callers check [`CacheEntry::resource`].
    pub fn find(&mut self, path: &ResourcePath) -> Option<&CacheEntry> {
        if !self.entries.contains_key(path) {
            return None;
        }

        let dead_neighbor = self
            .entries
            .range::<ResourcePath, _>((Excluded(path), Unbounded))
            .next()
            .filter(|(_, entry)| !entry.is_live())
            .map(|(neighbor, _)| neighbor.clone());

        if let Some(neighbor) = dead_neighbor {
            log::trace!("Cache: sweeping dead entry '{neighbor}' next to '{path}'");
            self.entries.remove(&neighbor);
        }

        self.entries.get(path)
    }

    /// Inserts `entry` at `path` unless a live entry already occupies it.
    ///
    /// A dead entry at the same path is replaced. Returns `true` on insertion.
    pub fn insert(&mut self, path: ResourcePath, entry: CacheEntry) -> bool {
        if self.entries.get(&path).is_some_and(CacheEntry::is_live) {
            return false;
        }
        self.entries.insert(path, entry);
        true
    }

    /// Inserts `entry` at `path` whether or not a live entry exists, returning
    /// the resource that was cached there before, if it was still alive.
    pub fn replace(&mut self, path: ResourcePath, entry: CacheEntry) -> Option<ResourceHandle> {
        self.entries
            .insert(path, entry)
            .and_then(|previous| previous.resource())
    }

    /// Removes the entry at `path` and returns its resource if still alive.
    ///
    /// The resource itself is not dropped here; the caller decides whether to
    /// keep it.
    pub fn remove(&mut self, path: &ResourcePath) -> Option<ResourceHandle> {
        self.entries.remove(path).and_then(|entry| entry.resource())
    }

    /// Number of entries, live or dead.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose resource is still alive.
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_live()).count()
    }

    /// Returns `true` if an entry, live or dead, exists at `path`.
    ///
    /// Unlike [`find`](Self::find) this never sweeps.
    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.entries.contains_key(path)
    }
}
