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

use kiln_agents::{LoadOptions, LoadTracker, ManagerConfig, ResourceManager};
use kiln_core::{
    AtomicLoadState, ByteStream, LoadArgs, LoadState, ResourceFactory, ResourceHandle,
    ResourceLoader, ResourcePath,
};
use kiln_infra::{DeferredExecutor, MemoryFileSystem};
use kiln_lanes::{TextFactory, TextResource};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

// --- Test fixtures ---

/// Needs `steps` calls to reach `Loaded`, then commits exactly once.
struct DelayLoader {
    steps: u32,
    calls: Arc<AtomicU32>,
    done: AtomicU32,
    state: AtomicLoadState,
}

impl ResourceLoader for DelayLoader {
    fn load(&self, stream: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if stream.is_none() {
            return self.state.set(LoadState::Aborted);
        }
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if done >= self.steps {
            self.state.set(LoadState::Loaded)
        } else {
            self.state.set(LoadState::Loading)
        }
    }

    fn commit(&self, target: &ResourceHandle) {
        if self.state() != LoadState::Loaded {
            return;
        }
        // Only the first terminal commit merges anything.
        if target.read(|steps: &u32| *steps == 0) == Some(true) {
            target.commit_with(|steps: &mut u32| *steps = self.steps);
        }
    }

    fn state(&self) -> LoadState {
        self.state.get()
    }
}

/// Accepts `.delay` files. The `steps` argument sets the loader's length.
struct DelayFactory {
    calls: Arc<AtomicU32>,
}

impl ResourceFactory for DelayFactory {
    fn name(&self) -> &str {
        "delay"
    }

    fn create_resource(&self, path: &ResourcePath, _: &LoadArgs) -> Option<ResourceHandle> {
        (path.extension().as_deref() == Some("delay"))
            .then(|| ResourceHandle::new(path.clone(), 0u32))
    }

    fn create_loader(&self, args: &LoadArgs) -> Arc<dyn ResourceLoader> {
        Arc::new(DelayLoader {
            steps: args.parse("steps").unwrap_or(10),
            calls: Arc::clone(&self.calls),
            done: AtomicU32::new(0),
            state: AtomicLoadState::new(LoadState::NotLoaded),
        })
    }
}

/// Aborts on its first `load` call, stream or not.
struct AbortLoader(AtomicLoadState);

impl ResourceLoader for AbortLoader {
    fn load(&self, _: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
        self.0.set(LoadState::Aborted)
    }
    fn commit(&self, target: &ResourceHandle) {
        if self.state().can_commit() {
            target.commit_with(|_: &mut ()| ());
        }
    }
    fn state(&self) -> LoadState {
        self.0.get()
    }
}

struct AbortFactory;

impl ResourceFactory for AbortFactory {
    fn name(&self) -> &str {
        "abort"
    }
    fn create_resource(&self, path: &ResourcePath, _: &LoadArgs) -> Option<ResourceHandle> {
        (path.extension().as_deref() == Some("ext")).then(|| ResourceHandle::new(path.clone(), ()))
    }
    fn create_loader(&self, _: &LoadArgs) -> Arc<dyn ResourceLoader> {
        Arc::new(AbortLoader(AtomicLoadState::new(LoadState::NotLoaded)))
    }
}

struct Fixture {
    manager: ResourceManager,
    files: Arc<MemoryFileSystem>,
    executor: Arc<DeferredExecutor>,
    calls: Arc<AtomicU32>,
}

fn fixture() -> Fixture {
    let files = Arc::new(
        MemoryFileSystem::new()
            .with_file("a.delay", "")
            .with_file("b.delay", "")
            .with_file("c.delay", "")
            .with_file("poem.txt", "one\ntwo\nthree\nfour\nfive"),
    );
    let executor = Arc::new(DeferredExecutor::new());
    let manager =
        ResourceManager::with_executor(ManagerConfig::default(), files.clone(), executor.clone());
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_factory(DelayFactory {
        calls: Arc::clone(&calls),
    });
    manager.register_factory(AbortFactory);
    manager.register_factory(TextFactory::new());
    Fixture {
        manager,
        files,
        executor,
        calls,
    }
}

/// Runs background work and drains events until nothing is left.
fn settle(fixture: &Fixture) -> Vec<kiln_core::ResourceEvent> {
    let mut drained = Vec::new();
    loop {
        let ran = fixture.executor.run_pending();
        let events = fixture.manager.update();
        if ran == 0 && events.is_empty() {
            return drained;
        }
        drained.extend(events);
    }
}

// --- Cache behavior ---

#[test]
fn cache_hit_returns_the_same_resource_without_events() {
    let fx = fixture();
    let first = fx.manager.load("a.delay", &LoadOptions::background()).unwrap();
    settle(&fx);

    let second = fx.manager.load("./a.delay", &LoadOptions::background()).unwrap();

    assert!(first.ptr_eq(&second));
    assert_eq!(fx.manager.pending_events(), 0);
    assert_eq!(fx.executor.pending(), 0);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 10);
}

#[test]
fn dead_entries_are_swept_by_an_unrelated_lookup() {
    let fx = fixture();
    let a = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    let b = fx.manager.load("b.delay", &LoadOptions::blocking()).unwrap();
    settle(&fx);

    drop(b);
    assert_eq!(fx.manager.cached_count(), 1);
    assert_eq!(fx.manager.cache_entry_count(), 2, "nothing sweeps eagerly");

    // A miss does not sweep.
    assert!(!fx.manager.is_cached("zzz.delay"));
    assert_eq!(fx.manager.cache_entry_count(), 2);

    // A hit on `a` inspects its successor `b` and removes it.
    assert!(fx.manager.is_cached("a.delay"));
    assert_eq!(fx.manager.cache_entry_count(), 1);
    drop(a);
}

#[test]
fn dropped_resource_is_recreated_on_next_load() {
    let fx = fixture();
    let first = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    settle(&fx);
    let weak = first.downgrade();
    drop(first);
    assert!(!weak.is_alive());

    let second = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    settle(&fx);
    assert_eq!(second.commit_count(), 1);
    assert_eq!(fx.manager.cache_entry_count(), 1);
}

#[test]
fn uncache_then_load_goes_through_the_factory_again() {
    let fx = fixture();
    let original = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    settle(&fx);

    let taken = fx.manager.uncache("a.delay").unwrap();
    assert!(taken.ptr_eq(&original));
    assert!(!fx.manager.is_cached("a.delay"));

    let fresh = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    assert!(!fresh.ptr_eq(&original));
    assert_eq!(fx.calls.load(Ordering::SeqCst), 20);
}

#[test]
fn reload_replaces_the_cached_resource() {
    let fx = fixture();
    let old = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    let new = fx.manager.reload("a.delay", &LoadOptions::blocking()).unwrap();
    settle(&fx);

    assert!(!old.ptr_eq(&new));
    let again = fx.manager.load("a.delay", &LoadOptions::background()).unwrap();
    assert!(again.ptr_eq(&new));
    assert_eq!(old.commit_count(), 1, "the old resource is left as it was");
}

#[test]
fn reload_changed_only_touches_live_entries() {
    let fx = fixture();
    let a = fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();
    settle(&fx);

    let reloaded = fx.manager.reload_changed(
        [ResourcePath::new("a.delay"), ResourcePath::new("b.delay")],
        &LoadOptions::blocking(),
    );

    assert_eq!(reloaded.len(), 1);
    assert!(!reloaded[0].ptr_eq(&a));
    assert!(!fx.manager.is_cached("b.delay"));
    let current = fx.manager.load("a.delay", &LoadOptions::background()).unwrap();
    assert!(current.ptr_eq(&reloaded[0]));
}

#[test]
fn reloaded_resources_stay_cached_across_changes() {
    fn lines(resource: &ResourceHandle) -> Option<Vec<String>> {
        resource.read(|text: &TextResource| text.lines.clone())
    }

    let fx = fixture();
    let original = fx.manager.load("poem.txt", &LoadOptions::blocking()).unwrap();
    settle(&fx);

    fx.files.insert("poem.txt", "v2");
    let first = fx
        .manager
        .reload_changed([ResourcePath::new("poem.txt")], &LoadOptions::blocking());
    settle(&fx);

    assert_eq!(first.len(), 1);
    assert_eq!(lines(&first[0]), Some(vec!["v2".to_owned()]));
    assert!(fx.manager.is_cached("poem.txt"));
    assert_eq!(lines(&original).map(|l| l.len()), Some(5), "old holders keep the old data");
    let hit = fx.manager.load("poem.txt", &LoadOptions::background()).unwrap();
    assert!(hit.ptr_eq(&first[0]));

    fx.files.insert("poem.txt", "v3");
    let second = fx
        .manager
        .reload_changed([ResourcePath::new("poem.txt")], &LoadOptions::blocking());
    settle(&fx);

    assert_eq!(second.len(), 1);
    assert_eq!(lines(&second[0]), Some(vec!["v3".to_owned()]));
    assert!(fx.manager.is_cached("poem.txt"));
}

#[test]
fn cache_inserts_a_ready_resource_and_reports_it() {
    let fx = fixture();
    let ready = ResourceHandle::new("baked.txt", TextResource::default());
    assert!(fx.manager.cache(ready.clone()).is_none());

    let events = fx.manager.update();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state(), LoadState::Loaded);
    assert_eq!(ready.commit_count(), 0);

    let loaded = fx.manager.load("baked.txt", &LoadOptions::background()).unwrap();
    assert!(loaded.ptr_eq(&ready));
    assert_eq!(fx.executor.pending(), 0);

    let replacement = ResourceHandle::new("baked.txt", TextResource::default());
    let previous = fx.manager.cache(replacement).unwrap();
    assert!(previous.ptr_eq(&ready));
}

// --- Loading protocol ---

#[test]
fn unknown_extension_yields_nothing() {
    let fx = fixture();
    assert!(fx.manager.load("image.png", &LoadOptions::blocking()).is_none());
    assert_eq!(fx.manager.cache_entry_count(), 0);
    assert_eq!(fx.manager.pending_events(), 0);
}

#[test]
fn missing_file_aborts_without_commits() {
    let fx = fixture();
    let resource = fx.manager.load("missing.ext", &LoadOptions::background()).unwrap();
    assert_eq!(fx.manager.pending_events(), 0, "nothing ran yet");

    let mut tracker = LoadTracker::new(["missing.ext"]);
    tracker.observe_all(&settle(&fx));

    assert!(tracker.is_complete());
    assert_eq!(tracker.failed(), [ResourcePath::new("missing.ext")]);
    assert_eq!(resource.commit_count(), 0);
}

#[test]
fn blocking_iterations_run_exactly_that_many_steps() {
    let fx = fixture();
    let resource = fx.manager.load("a.delay", &LoadOptions::block_for(2)).unwrap();

    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
    assert_eq!(fx.executor.pending(), 1, "the rest continues in the background");
    assert_eq!(fx.manager.pending_events(), 1);

    settle(&fx);
    assert_eq!(fx.calls.load(Ordering::SeqCst), 10);
    assert_eq!(resource.commit_count(), 1);
}

#[test]
fn blocking_iterations_stop_early_on_abort() {
    let fx = fixture();
    fx.manager.load("missing.ext", &LoadOptions::block_for(5)).unwrap();
    assert_eq!(fx.executor.pending(), 0);

    let events = fx.manager.update();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state(), LoadState::Aborted);
}

#[test]
fn background_delay_load_commits_once() {
    let fx = fixture();
    let resource = fx.manager.load("a.delay", &LoadOptions::background()).unwrap();
    assert_eq!(fx.calls.load(Ordering::SeqCst), 0);

    let events = settle(&fx);
    assert!(events.iter().any(|event| event.state() == LoadState::Loaded));
    assert_eq!(resource.commit_count(), 1);
}

#[test]
fn repeated_pushes_for_one_resource_coalesce() {
    let fx = fixture();
    fx.manager.load("a.delay", &LoadOptions::blocking()).unwrap();

    // Ten steps, ten pushes, one pending event.
    assert_eq!(fx.calls.load(Ordering::SeqCst), 10);
    assert_eq!(fx.manager.pending_events(), 1);
}

#[test]
fn blocking_and_background_paths_agree() {
    let fx = fixture();
    let options = LoadOptions::default().with_args("steps=4");
    let blocking = fx
        .manager
        .load("a.delay", &LoadOptions::blocking().with_args("steps=4"))
        .unwrap();
    let background = fx.manager.load("b.delay", &options).unwrap();
    settle(&fx);

    assert_eq!(blocking.commit_count(), background.commit_count());
    assert_eq!(blocking.read(|steps: &u32| *steps), Some(4));
    assert_eq!(background.read(|steps: &u32| *steps), Some(4));
}

#[test]
fn text_loads_match_across_paths() {
    let fx = fixture();
    let blocking = fx
        .manager
        .load("poem.txt", &LoadOptions::blocking().with_args("chunk=3"))
        .unwrap();
    settle(&fx);
    let blocking_lines = blocking.read(|text: &TextResource| text.clone()).unwrap();
    fx.manager.uncache("poem.txt");

    let background = fx
        .manager
        .load("poem.txt", &LoadOptions::background().with_args("chunk=3"))
        .unwrap();
    settle(&fx);
    let background_lines = background.read(|text: &TextResource| text.clone()).unwrap();

    assert!(blocking_lines.complete);
    assert_eq!(blocking_lines, background_lines);
    assert_eq!(blocking_lines.lines, ["one", "two", "three", "four", "five"]);
}

#[test]
fn later_factory_overrides_earlier_one() {
    struct Shout;

    impl ResourceFactory for Shout {
        fn name(&self) -> &str {
            "shout"
        }
        fn create_resource(&self, path: &ResourcePath, _: &LoadArgs) -> Option<ResourceHandle> {
            (path.extension().as_deref() == Some("txt"))
                .then(|| ResourceHandle::new(path.clone(), String::new()))
        }
        fn create_loader(&self, _: &LoadArgs) -> Arc<dyn ResourceLoader> {
            Arc::new(AbortLoader(AtomicLoadState::new(LoadState::NotLoaded)))
        }
    }

    let fx = fixture();
    fx.manager.register_factory(Shout);
    let resource = fx.manager.load("poem.txt", &LoadOptions::blocking()).unwrap();

    assert!(resource.is::<String>());
    assert!(!resource.is::<TextResource>());
}

#[test]
fn custom_load_runs_without_a_stream_or_cache_entry() {
    /// Marks the target once, on the consumer thread.
    struct OneShot(AtomicLoadState);

    impl ResourceLoader for OneShot {
        fn load(&self, stream: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
            assert!(stream.is_none());
            self.0.set(LoadState::Loaded)
        }
        fn commit(&self, target: &ResourceHandle) {
            if self.0.get().can_commit() {
                target.commit_with(|compiled: &mut bool| *compiled = true);
            }
        }
        fn state(&self) -> LoadState {
            self.0.get()
        }
    }

    let fx = fixture();
    let target = ResourceHandle::new("shader/main", false);
    fx.manager.custom_load(
        target.clone(),
        Arc::new(OneShot(AtomicLoadState::new(LoadState::NotLoaded))),
        &LoadOptions::background(),
    );
    settle(&fx);

    assert_eq!(target.read(|compiled: &bool| *compiled), Some(true));
    assert_eq!(target.commit_count(), 1);
    assert_eq!(fx.manager.cache_entry_count(), 0);
}

#[test]
fn update_respects_the_event_budget() {
    let files = MemoryFileSystem::new()
        .with_file("a.delay", "")
        .with_file("b.delay", "")
        .with_file("c.delay", "");
    let config = ManagerConfig {
        max_events_per_update: 2,
        ..ManagerConfig::default()
    };
    let manager =
        ResourceManager::with_executor(config, Arc::new(files), Arc::new(DeferredExecutor::new()));
    manager.register_factory(DelayFactory {
        calls: Arc::new(AtomicU32::new(0)),
    });
    for path in ["a.delay", "b.delay", "c.delay"] {
        manager.load(path, &LoadOptions::blocking()).unwrap();
    }

    assert_eq!(manager.update().len(), 2);
    assert_eq!(manager.update().len(), 1);
    assert!(manager.update().is_empty());
}

// --- Thread pool end to end ---

#[test]
fn thread_pool_loads_reach_the_consumer() {
    let files = MemoryFileSystem::new()
        .with_file("a.delay", "")
        .with_file("b.delay", "")
        .with_file("poem.txt", "one\ntwo");
    let config = ManagerConfig {
        worker_threads: 2,
        ..ManagerConfig::default()
    };
    let manager = ResourceManager::new(config, Arc::new(files)).unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_factory(DelayFactory {
        calls: Arc::clone(&calls),
    });
    manager.register_factory(TextFactory::new());

    let paths = ["a.delay", "b.delay", "poem.txt"];
    let handles: Vec<_> = paths
        .iter()
        .map(|path| manager.load(*path, &LoadOptions::background()).unwrap())
        .collect();

    let mut tracker = LoadTracker::new(paths);
    let deadline = Instant::now() + Duration::from_secs(10);
    while !tracker.is_complete() && Instant::now() < deadline {
        tracker.observe_all(&manager.update());
        std::thread::sleep(Duration::from_millis(1));
    }

    assert!(tracker.is_complete(), "loads did not finish: {tracker:?}");
    assert!(tracker.failed().is_empty());
    assert_eq!(handles[0].commit_count(), 1);
    assert_eq!(handles[1].commit_count(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 20);
    assert_eq!(
        handles[2].read(|text: &TextResource| text.lines.clone()),
        Some(vec!["one".to_owned(), "two".to_owned()])
    );
    manager.shutdown();
}
