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

//! The coalescing hand-off between worker threads and the consumer thread.
//!
//! The channel carries "there is something new to check" signals, not a
//! history of updates. At most one event per resource is pending at any time:
//! pushing an event for a resource that already has one queued is a no-op, and
//! the consumer picks up whatever state the loader is in when it gets around to
//! the event. This bounds memory and avoids commit storms when the consumer
//! falls behind a fast loader.

use ahash::AHashMap;
use kiln_core::{ResourceEvent, ResourceId};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;

/// The queue behind an [`EventChannel`]'s lock.
///
/// Modelled as a map from resource identity to its single pending event, plus
/// the FIFO order in which identities first became pending.
#[derive(Default)]
pub struct PendingEvents {
    order: VecDeque<ResourceId>,
    events: AHashMap<ResourceId, ResourceEvent>,
}

impl PendingEvents {
    /// Appends `event` unless an event for the same resource is pending.
    ///
    /// Returns `true` if the event was queued, `false` if it was coalesced.
    pub fn push_back(&mut self, event: ResourceEvent) -> bool {
        let id = event.resource.id();
        if self.events.contains_key(&id) {
            log::trace!("EventChannel: coalesced event for '{}'", event.path());
            return false;
        }
        self.order.push_back(id);
        self.events.insert(id, event);
        true
    }

    /// Removes and returns the oldest pending event.
    pub fn pop_front(&mut self) -> Option<ResourceEvent> {
        while let Some(id) = self.order.pop_front() {
            if let Some(event) = self.events.remove(&id) {
                return Some(event);
            }
        }
        None
    }

    /// Number of pending events, which is also the number of distinct
    /// resources with something new to check.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Exclusive access to an [`EventChannel`]'s queue.
///
/// Background tasks hold this guard across their bookkeeping and release it
/// with [`MutexGuard::unlocked`] around the actual decoding step.
pub type ChannelGuard<'a> = MutexGuard<'a, PendingEvents>;

/// A thread-safe, deduplicating FIFO of [`ResourceEvent`]s.
#[derive(Default)]
pub struct EventChannel {
    pending: Mutex<PendingEvents>,
}

impl EventChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the queue for a sequence of operations.
    pub fn lock(&self) -> ChannelGuard<'_> {
        self.pending.lock()
    }

    /// Pushes `event`, coalescing it with a pending event for the same resource.
    pub fn push_back(&self, event: ResourceEvent) -> bool {
        self.pending.lock().push_back(event)
    }

    /// Pops the oldest pending event, if any.
    pub fn pop_front(&self) -> Option<ResourceEvent> {
        self.pending.lock().pop_front()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::{ByteStream, LoadState, ResourceHandle, ResourceLoader, ResourcePath};
    use std::{sync::Arc, thread};

    struct IdleLoader;

    impl ResourceLoader for IdleLoader {
        fn load(&self, _: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
            LoadState::Loaded
        }
        fn commit(&self, _: &ResourceHandle) {}
        fn state(&self) -> LoadState {
            LoadState::Loaded
        }
    }

    fn event_for(resource: &ResourceHandle) -> ResourceEvent {
        ResourceEvent::new(resource.clone(), Arc::new(IdleLoader))
    }

    #[test]
    fn repeated_pushes_for_one_resource_yield_one_event() {
        let channel = EventChannel::new();
        let texture = ResourceHandle::new("wall.png", ());

        assert!(channel.push_back(event_for(&texture)));
        for _ in 0..9 {
            assert!(!channel.push_back(event_for(&texture)));
        }

        assert_eq!(channel.len(), 1);
        let event = channel.pop_front().expect("one event should be pending");
        assert!(event.resource.ptr_eq(&texture));
        assert!(channel.pop_front().is_none());
    }

    #[test]
    fn events_are_delivered_in_first_push_order() {
        let channel = EventChannel::new();
        let a = ResourceHandle::new("a.png", ());
        let b = ResourceHandle::new("b.png", ());
        let c = ResourceHandle::new("c.png", ());

        channel.push_back(event_for(&a));
        channel.push_back(event_for(&b));
        channel.push_back(event_for(&a));
        channel.push_back(event_for(&c));

        let order: Vec<_> = std::iter::from_fn(|| channel.pop_front())
            .map(|event| event.path().to_string())
            .collect();
        assert_eq!(order, ["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn resource_can_be_requeued_after_its_event_was_popped() {
        let channel = EventChannel::new();
        let a = ResourceHandle::new("a.png", ());

        channel.push_back(event_for(&a));
        assert!(channel.pop_front().is_some());
        assert!(channel.push_back(event_for(&a)));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn concurrent_producers_never_exceed_one_event_per_resource() {
        let channel = Arc::new(EventChannel::new());
        let resources: Vec<_> = (0..4)
            .map(|i| ResourceHandle::new(format!("r{i}.bin"), ()))
            .collect();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let channel = Arc::clone(&channel);
                let resources = resources.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        for resource in &resources {
                            channel.push_back(event_for(resource));
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("producer thread panicked");
        }

        assert_eq!(channel.len(), resources.len());
    }
}
