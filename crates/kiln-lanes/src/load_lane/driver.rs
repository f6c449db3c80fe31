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

use super::LoadTask;
use kiln_core::{
    ByteStream, FileSystem, LoadState, ResourceEvent, ResourceHandle, ResourceLoader,
};
use kiln_data::{EventChannel, PendingEvents};
use std::sync::Arc;

/// Steps one loader against one resource.
pub struct LoadDriver {
    resource: ResourceHandle,
    loader: Arc<dyn ResourceLoader>,
    source: Option<Arc<dyn FileSystem>>,
    stream: Option<Box<dyn ByteStream>>,
    started: bool,
    iterations: u32,
}

impl LoadDriver {
    /// A driver that opens the resource's path through `file_system` on its
    /// first step.
    pub fn for_file(
        resource: ResourceHandle,
        loader: Arc<dyn ResourceLoader>,
        file_system: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            resource,
            loader,
            source: Some(file_system),
            stream: None,
            started: false,
            iterations: 0,
        }
    }

    /// A driver for work that is not backed by a file.
    ///
    /// The loader always receives `None` as its stream.
    pub fn detached(resource: ResourceHandle, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            resource,
            loader,
            source: None,
            stream: None,
            started: false,
            iterations: 0,
        }
    }

    /// The resource being loaded.
    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    /// The loader's current state.
    pub fn state(&self) -> LoadState {
        self.loader.state()
    }

    /// How many times [`step`](Self::step) ran.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// An event describing this load.
    pub fn event(&self) -> ResourceEvent {
        ResourceEvent::new(self.resource.clone(), Arc::clone(&self.loader))
    }

    /// Runs one `load` call.
    ///
    /// The first call opens the stream. If that fails, the loader is called
    /// without a stream, which it must treat as an abort.
    pub fn step(&mut self) -> LoadState {
        if !self.started {
            self.started = true;
            if let Some(file_system) = &self.source {
                match file_system.open(self.resource.path()) {
                    Ok(stream) => self.stream = Some(stream),
                    Err(e) => log::warn!("LoadDriver: {e}"),
                }
            }
        }

        self.iterations += 1;
        let stream = self
            .stream
            .as_mut()
            .map(|stream| &mut **stream as &mut dyn ByteStream);
        let state = self.loader.load(stream, Some(self.resource.path()));
        log::trace!(
            "LoadDriver: '{}' step {} -> {}",
            self.resource.path(),
            self.iterations,
            state
        );
        state
    }

    /// Steps synchronously, pushing an event after every step.
    ///
    /// Runs until the loader stops or, when `limit` is set, until `limit`
    /// steps were taken. `events` is the locked channel queue: the caller keeps
    /// the channel locked for the whole pass.
    pub fn drive_blocking(&mut self, events: &mut PendingEvents, limit: Option<u32>) -> LoadState {
        let mut state = self.loader.state();
        let mut taken = 0;
        while !state.is_stopped() && limit.is_none_or(|limit| taken < limit) {
            state = self.step();
            taken += 1;
            events.push_back(self.event());
        }
        state
    }

    /// Wraps the driver into a background task reporting to `channel`.
    pub fn into_task(self, channel: Arc<EventChannel>) -> LoadTask {
        LoadTask::new(self, channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::{ResourcePath, VfsError};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct SingleFile;

    impl FileSystem for SingleFile {
        fn open(&self, path: &ResourcePath) -> Result<Box<dyn ByteStream>, VfsError> {
            if path.as_str() == "present.bin" {
                Ok(Box::new(Cursor::new(vec![1u8, 2, 3])))
            } else {
                Err(VfsError::NotFound(path.clone()))
            }
        }
    }

    /// Reaches `Loaded` after `steps` calls; aborts when given no stream.
    struct CountingLoader {
        steps: u32,
        calls: AtomicU32,
        aborted: std::sync::atomic::AtomicBool,
    }

    impl CountingLoader {
        fn new(steps: u32) -> Self {
            Self {
                steps,
                calls: AtomicU32::new(0),
                aborted: Default::default(),
            }
        }
    }

    impl ResourceLoader for CountingLoader {
        fn load(&self, stream: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
            if stream.is_none() {
                self.aborted.store(true, Ordering::SeqCst);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.state()
        }
        fn commit(&self, _: &ResourceHandle) {}
        fn state(&self) -> LoadState {
            let calls = self.calls.load(Ordering::SeqCst);
            if self.aborted.load(Ordering::SeqCst) {
                LoadState::Aborted
            } else if calls == 0 {
                LoadState::NotLoaded
            } else if calls >= self.steps {
                LoadState::Loaded
            } else {
                LoadState::Loading
            }
        }
    }

    #[test]
    fn blocking_pass_honors_the_iteration_limit() {
        let loader = Arc::new(CountingLoader::new(10));
        let resource = ResourceHandle::new("present.bin", ());
        let mut driver = LoadDriver::for_file(resource, loader.clone(), Arc::new(SingleFile));
        let channel = EventChannel::new();

        let state = driver.drive_blocking(&mut channel.lock(), Some(2));

        assert_eq!(state, LoadState::Loading);
        assert_eq!(driver.iterations(), 2);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        // Both pushes were for the same resource.
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn unbounded_blocking_pass_runs_to_completion() {
        let loader = Arc::new(CountingLoader::new(4));
        let resource = ResourceHandle::new("present.bin", ());
        let mut driver = LoadDriver::for_file(resource, loader, Arc::new(SingleFile));
        let channel = EventChannel::new();

        assert_eq!(driver.drive_blocking(&mut channel.lock(), None), LoadState::Loaded);
        assert_eq!(driver.iterations(), 4);
    }

    #[test]
    fn missing_file_reaches_loader_as_absent_stream() {
        let loader = Arc::new(CountingLoader::new(10));
        let resource = ResourceHandle::new("missing.bin", ());
        let mut driver = LoadDriver::for_file(resource, loader, Arc::new(SingleFile));
        let channel = EventChannel::new();

        let state = driver.drive_blocking(&mut channel.lock(), Some(5));
        assert_eq!(state, LoadState::Aborted);
        assert_eq!(driver.iterations(), 1);
    }

    #[test]
    fn detached_driver_never_opens_a_stream() {
        let loader = Arc::new(CountingLoader::new(1));
        let mut driver = LoadDriver::detached(ResourceHandle::new("present.bin", ()), loader);
        assert_eq!(driver.step(), LoadState::Aborted);
    }
}
