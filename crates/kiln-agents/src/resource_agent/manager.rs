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

use super::{BlockMode, FactoryRegistry, LoadOptions, ManagerConfig};
use anyhow::{Context, Result};
use kiln_core::{
    Executor, FileSystem, LoadState, ResourceEvent, ResourceFactory, ResourceHandle,
    ResourceLoader, ResourcePath,
};
use kiln_data::{CacheEntry, CacheIndex, EventChannel};
use kiln_infra::ThreadPool;
use kiln_lanes::{LoadDriver, PreloadedLoader};
use parking_lot::Mutex;
use std::sync::Arc;

/// The public entry point for loading resources.
///
/// A manager owns a cache index of live resources, a coalescing event channel
/// and an executor. Loads either run on the executor or, when asked to block,
/// on the calling thread; either way progress is reported through events that
/// the single consumer thread drains with [`pop_event`](Self::pop_event) or
/// [`update`](Self::update) and commits.
///
/// The index lock is only held while resolving a path; loaders are never
/// stepped under it.
pub struct ResourceManager {
    executor: Arc<dyn Executor>,
    file_system: Arc<dyn FileSystem>,
    factories: FactoryRegistry,
    index: Mutex<CacheIndex>,
    channel: Arc<EventChannel>,
    config: ManagerConfig,
}

impl ResourceManager {
    /// Creates a manager backed by a [`ThreadPool`] sized from `config`.
    pub fn new(config: ManagerConfig, file_system: Arc<dyn FileSystem>) -> Result<Self> {
        let pool = ThreadPool::new(
            config.resolved_worker_threads(),
            &config.worker_name_prefix,
        )
        .context("Failed to start the resource loading thread pool")?;
        Ok(Self::with_executor(config, file_system, Arc::new(pool)))
    }

    /// Creates a manager that runs background work on `executor`.
    pub fn with_executor(
        config: ManagerConfig,
        file_system: Arc<dyn FileSystem>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        log::info!(
            "ResourceManager: created with {} background workers.",
            executor.worker_count()
        );
        Self {
            executor,
            file_system,
            factories: FactoryRegistry::new(),
            index: Mutex::new(CacheIndex::new()),
            channel: Arc::new(EventChannel::new()),
            config,
        }
    }

    /// The configuration the manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The file system loads are read from.
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.file_system
    }

    /// Registers `factory`. It takes priority over every factory registered
    /// before it.
    pub fn register_factory(&self, factory: impl ResourceFactory + 'static) {
        self.factories.register(Arc::new(factory));
    }

    /// The registered factories.
    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// Returns the resource for `path`, starting a load on a cache miss.
    ///
    /// A cached resource that is still alive is returned as is and no event is
    /// generated. Otherwise the first factory accepting the path creates a new
    /// resource and loader, the pair is cached and the load is dispatched per
    /// `options.block`. Returns `None` when no factory accepts the path; nothing
    /// is cached in that case.
    ///
    /// The returned resource may still be empty: check its commit count or the
    /// events rather than assuming it is populated.
    pub fn load(
        &self,
        path: impl Into<ResourcePath>,
        options: &LoadOptions,
    ) -> Option<ResourceHandle> {
        self.resolve_and_dispatch(path.into(), options, false)
    }

    /// Like [`load`](Self::load) but always creates a fresh resource and
    /// loader, replacing any cached entry. Holders of the previous resource keep
    /// it unchanged.
    pub fn reload(
        &self,
        path: impl Into<ResourcePath>,
        options: &LoadOptions,
    ) -> Option<ResourceHandle> {
        self.resolve_and_dispatch(path.into(), options, true)
    }

    fn resolve_and_dispatch(
        &self,
        path: ResourcePath,
        options: &LoadOptions,
        replace: bool,
    ) -> Option<ResourceHandle> {
        let (resource, loader) = {
            let mut index = self.index.lock();
            if !replace {
                if let Some(resource) = index.find(&path).and_then(CacheEntry::resource) {
                    log::debug!("ResourceManager: cache hit for '{path}'.");
                    return Some(resource);
                }
            }

            let Some((factory, resource)) = self.factories.resolve(&path, &options.args) else {
                log::warn!("ResourceManager: no factory accepts '{path}'.");
                return None;
            };
            let loader = factory.create_loader(&options.args);
            let entry = CacheEntry::new(&resource, Arc::clone(&loader));
            if replace {
                index.replace(path.clone(), entry);
            } else {
                index.insert(path.clone(), entry);
            }
            log::debug!(
                "ResourceManager: '{path}' handled by factory '{}'.",
                factory.name()
            );
            (resource, loader)
        };

        let driver = LoadDriver::for_file(
            resource.clone(),
            loader,
            Arc::clone(&self.file_system),
        );
        self.dispatch(driver, options);
        Some(resource)
    }

    /// Caches an already populated resource without running a loader.
    ///
    /// A `Loaded` event is still emitted so that trackers waiting on the path
    /// see it finish. Returns the resource previously cached at the same path,
    /// if it was alive.
    pub fn cache(&self, resource: ResourceHandle) -> Option<ResourceHandle> {
        let loader: Arc<dyn ResourceLoader> = Arc::new(PreloadedLoader);
        let previous = self.index.lock().replace(
            resource.path().clone(),
            CacheEntry::new(&resource, Arc::clone(&loader)),
        );
        self.channel.push_back(ResourceEvent::new(resource, loader));
        previous
    }

    /// Removes the cache entry for `path` and hands its resource to the
    /// caller. The next `load` of the path creates a new resource.
    pub fn uncache(&self, path: impl Into<ResourcePath>) -> Option<ResourceHandle> {
        let path = path.into();
        let resource = self.index.lock().remove(&path);
        if resource.is_some() {
            log::debug!("ResourceManager: uncached '{path}'.");
        }
        resource
    }

    /// Runs a caller-supplied loader against `resource` through the regular
    /// dispatch and commit pipeline, without touching the cache.
    ///
    /// No stream is opened: the loader's `load` always receives `None` and
    /// decides what that means. `options.args` is not used since the loader
    /// already exists.
    pub fn custom_load(
        &self,
        resource: ResourceHandle,
        loader: Arc<dyn ResourceLoader>,
        options: &LoadOptions,
    ) {
        self.dispatch(LoadDriver::detached(resource, loader), options);
    }

    fn dispatch(&self, mut driver: LoadDriver, options: &LoadOptions) {
        let priority = options
            .priority
            .unwrap_or_else(|| self.config.default_task_priority());
        let limit = match options.block {
            BlockMode::Background => {
                self.executor
                    .enqueue(Box::new(driver.into_task(Arc::clone(&self.channel))), priority);
                return;
            }
            BlockMode::UntilStopped => None,
            BlockMode::Iterations(n) => Some(n),
        };

        // The channel stays locked for the whole blocking pass.
        let state = driver.drive_blocking(&mut self.channel.lock(), limit);
        if !state.is_stopped() {
            log::trace!(
                "ResourceManager: '{}' continues in the background after {} steps.",
                driver.resource().path(),
                driver.iterations()
            );
            self.executor
                .enqueue(Box::new(driver.into_task(Arc::clone(&self.channel))), priority);
        }
    }

    /// Takes the oldest pending event, if any.
    ///
    /// The caller is expected to call [`ResourceEvent::commit`] when the state
    /// allows it.
    pub fn pop_event(&self) -> Option<ResourceEvent> {
        self.channel.pop_front()
    }

    /// Number of events waiting to be drained.
    pub fn pending_events(&self) -> usize {
        self.channel.len()
    }

    /// One consumer tick: drains up to `max_events_per_update` events, commits
    /// those that can commit and logs aborted loads.
    ///
    /// Returns the drained events so callers can feed a
    /// [`LoadTracker`](super::LoadTracker).
    pub fn update(&self) -> Vec<ResourceEvent> {
        let max = self.config.max_events_per_update;
        let mut drained = Vec::new();
        while max == 0 || drained.len() < max {
            let Some(event) = self.channel.pop_front() else {
                break;
            };
            match event.state() {
                state if state.can_commit() => event.commit(),
                LoadState::Aborted => {
                    log::warn!("ResourceManager: '{}' failed to load.", event.path());
                }
                _ => {}
            }
            drained.push(event);
        }
        drained
    }

    /// Returns `true` if a live resource is cached at `path`.
    ///
    /// This is a regular lookup and may sweep a dead neighbor entry.
    pub fn is_cached(&self, path: impl Into<ResourcePath>) -> bool {
        self.index
            .lock()
            .find(&path.into())
            .is_some_and(CacheEntry::is_live)
    }

    /// Number of cached resources that are still alive.
    pub fn cached_count(&self) -> usize {
        self.index.lock().live_count()
    }

    /// Number of cache entries, including dead ones not swept yet.
    pub fn cache_entry_count(&self) -> usize {
        self.index.lock().len()
    }

    /// Reloads every path in `paths` that has a live cache entry and returns
    /// the new resources.
    ///
    /// The index only observes resources, so a reloaded resource stays cached
    /// for as long as the caller keeps the returned handle. Holders of the
    /// previous resource keep the old data.
    pub fn reload_changed<I>(&self, paths: I, options: &LoadOptions) -> Vec<ResourceHandle>
    where
        I: IntoIterator<Item = ResourcePath>,
    {
        let mut reloaded = Vec::new();
        for path in paths {
            if !self.is_cached(path.clone()) {
                continue;
            }
            if let Some(resource) = self.reload(path.clone(), options) {
                log::info!("ResourceManager: reloaded '{path}'.");
                reloaded.push(resource);
            }
        }
        reloaded
    }

    /// Stops the executor. Work that has not started is dropped.
    pub fn shutdown(&self) {
        self.executor.shutdown();
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        // Running tasks may still use the file system and loaders.
        self.shutdown();
    }
}
