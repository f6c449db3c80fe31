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

use super::ResourcePath;
use parking_lot::RwLock;
use std::{
    any::Any,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

/// Identity of a live resource.
///
/// Derived from the address of the shared cell, so it is unique among all
/// resources that are alive at the same time. Anything that needs a stable id
/// must keep a strong [`ResourceHandle`] alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

struct ResourceCell {
    path: ResourcePath,
    commits: AtomicU64,
    payload: RwLock<Box<dyn Any + Send + Sync>>,
}

/// A thread-safe, reference-counted handle to a loadable resource.
///
/// The handle carries the resource's identity ([`ResourcePath`]), a commit
/// counter and a type-erased payload. Loaders write into the payload with
/// [`commit_with`](Self::commit_with), which bumps the counter by exactly one.
/// Consumers compare [`commit_count`](Self::commit_count) against the value they
/// saw last to detect that new data has arrived.
///
/// Cloning a handle is cheap. The resource is dropped together with its last
/// strong handle, on whichever thread that happens.
#[derive(Clone)]
pub struct ResourceHandle(Arc<ResourceCell>);

impl ResourceHandle {
    /// Creates a resource at `path` holding `payload`.
    ///
    /// The commit counter starts at zero: a freshly created resource has not
    /// received any data from a loader yet.
    pub fn new<T: Any + Send + Sync>(path: impl Into<ResourcePath>, payload: T) -> Self {
        Self(Arc::new(ResourceCell {
            path: path.into(),
            commits: AtomicU64::new(0),
            payload: RwLock::new(Box::new(payload)),
        }))
    }

    /// The normalized path this resource is keyed by.
    pub fn path(&self) -> &ResourcePath {
        &self.0.path
    }

    /// The identity of this resource.
    pub fn id(&self) -> ResourceId {
        ResourceId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// How many times a loader has merged data into this resource.
    pub fn commit_count(&self) -> u64 {
        self.0.commits.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles point to the same resource.
    pub fn ptr_eq(&self, other: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of strong handles currently alive.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Creates a non-owning observer of this resource.
    pub fn downgrade(&self) -> WeakResourceHandle {
        WeakResourceHandle(Arc::downgrade(&self.0))
    }

    /// Returns `true` if the payload is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.payload.read().is::<T>()
    }

    /// Runs `f` with shared access to the payload.
    ///
    /// Returns `None` if the payload is not a `T`.
    pub fn read<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let payload = self.0.payload.read();
        payload.downcast_ref::<T>().map(f)
    }

    /// Merges data into the payload and counts it as one commit.
    ///
    /// This is what a loader's `commit` step calls. The counter is incremented
    /// after `f` returns and before the write lock is released, so a reader that
    /// observes the new count also observes the new data. Returns `None`, and
    /// leaves the counter untouched, if the payload is not a `T`.
    pub fn commit_with<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut payload = self.0.payload.write();
        let target = payload.downcast_mut::<T>()?;
        let result = f(target);
        let commits = self.0.commits.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("Resource '{}': commit #{commits}", self.0.path);
        Some(result)
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("path", &self.0.path)
            .field("commits", &self.commit_count())
            .finish()
    }
}

/// A non-owning observer of a [`ResourceHandle`].
///
/// The cache index stores these so that caching a resource never keeps it alive.
#[derive(Clone, Default)]
pub struct WeakResourceHandle(Weak<ResourceCell>);

impl WeakResourceHandle {
    /// Attempts to obtain a strong handle. Fails once the resource was dropped.
    pub fn upgrade(&self) -> Option<ResourceHandle> {
        self.0.upgrade().map(ResourceHandle)
    }

    /// Returns `true` while at least one strong handle exists.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakResourceHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
