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

use kiln_core::{LoadState, ResourceEvent, ResourcePath};
use std::collections::BTreeSet;

/// Tracks when a set of resources has finished loading.
///
/// Feed it the events returned by
/// [`ResourceManager::update`](super::ResourceManager::update). A tracked path
/// counts as finished the first time an event reports it `Loaded` or
/// `Aborted`; later events for it are ignored.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    waiting: BTreeSet<ResourcePath>,
    total: usize,
    succeeded: Vec<ResourcePath>,
    failed: Vec<ResourcePath>,
}

impl LoadTracker {
    /// Tracks `paths`. Duplicates are counted once.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ResourcePath>,
    {
        let waiting: BTreeSet<ResourcePath> = paths.into_iter().map(Into::into).collect();
        Self {
            total: waiting.len(),
            waiting,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Records `event`. Returns `true` if it finished a tracked path.
    pub fn observe(&mut self, event: &ResourceEvent) -> bool {
        let state = event.state();
        if !state.is_stopped() || !self.waiting.remove(event.path()) {
            return false;
        }
        let path = event.path().clone();
        if state == LoadState::Aborted {
            self.failed.push(path);
        } else {
            self.succeeded.push(path);
        }
        true
    }

    /// Records every event in `events`.
    pub fn observe_all<'a>(&mut self, events: impl IntoIterator<Item = &'a ResourceEvent>) {
        for event in events {
            self.observe(event);
        }
    }

    /// `(finished, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.total - self.waiting.len(), self.total)
    }

    /// Returns `true` once every tracked path has finished.
    pub fn is_complete(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Paths that finished `Loaded`, in completion order.
    pub fn succeeded(&self) -> &[ResourcePath] {
        &self.succeeded
    }

    /// Paths that finished `Aborted`, in completion order.
    pub fn failed(&self) -> &[ResourcePath] {
        &self.failed
    }

    /// Paths still loading.
    pub fn waiting(&self) -> impl Iterator<Item = &ResourcePath> {
        self.waiting.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::{AtomicLoadState, ByteStream, ResourceHandle, ResourceLoader};
    use std::sync::Arc;

    struct Fixed(AtomicLoadState);

    impl ResourceLoader for Fixed {
        fn load(&self, _: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
            self.0.get()
        }
        fn commit(&self, _: &ResourceHandle) {}
        fn state(&self) -> LoadState {
            self.0.get()
        }
    }

    fn event(path: &str, state: LoadState) -> ResourceEvent {
        ResourceEvent::new(
            ResourceHandle::new(path, ()),
            Arc::new(Fixed(AtomicLoadState::new(state))),
        )
    }

    #[test]
    fn completes_when_every_path_stopped() {
        let mut tracker = LoadTracker::new(["a.txt", "b.txt", "./a.txt"]);
        assert_eq!(tracker.progress(), (0, 2));

        assert!(!tracker.observe(&event("a.txt", LoadState::PartialLoaded)));
        assert!(tracker.observe(&event("a.txt", LoadState::Loaded)));
        assert!(!tracker.observe(&event("a.txt", LoadState::Loaded)));
        assert!(!tracker.observe(&event("other.txt", LoadState::Loaded)));
        assert!(!tracker.is_complete());

        tracker.observe_all(&[event("b.txt", LoadState::Aborted)]);
        assert!(tracker.is_complete());
        assert_eq!(tracker.progress(), (2, 2));
        assert_eq!(tracker.succeeded(), [ResourcePath::new("a.txt")]);
        assert_eq!(tracker.failed(), [ResourcePath::new("b.txt")]);
    }

    #[test]
    fn empty_tracker_is_complete() {
        let tracker = LoadTracker::new(Vec::<String>::new());
        assert!(tracker.is_complete());
        assert_eq!(tracker.waiting().count(), 0);
    }
}
