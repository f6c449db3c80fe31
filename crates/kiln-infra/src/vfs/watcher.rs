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

use crossbeam_channel::{Receiver, TryRecvError};
use kiln_core::ResourcePath;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches a directory tree and reports which resources changed on disk.
///
/// Notifications arrive on a background thread owned by `notify`; they are
/// queued and only turned into [`ResourcePath`]s when the owner polls.
pub struct FileWatcher {
    root: PathBuf,
    events: Receiver<notify::Result<Event>>,
    // Kept alive for as long as we want notifications.
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Starts watching `root` recursively.
    pub fn new(root: impl AsRef<Path>) -> notify::Result<Self> {
        let root = root.as_ref().canonicalize().map_err(notify::Error::io)?;
        let (sender, events) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = sender.send(res);
        })?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        log::info!("FileWatcher: watching '{}'.", root.display());

        Ok(Self {
            root,
            events,
            _watcher: watcher,
        })
    }

    /// The watched directory, canonicalized.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drains pending notifications and returns the changed resources, each
    /// at most once, in the order they were first reported.
    pub fn poll_changes(&self) -> Vec<ResourcePath> {
        let mut changed = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    if !is_content_change(&event.kind) {
                        continue;
                    }
                    for path in &event.paths {
                        if let Some(resource) = relative_resource_path(&self.root, path) {
                            if !changed.contains(&resource) {
                                changed.push(resource);
                            }
                        }
                    }
                }
                Ok(Err(err)) => log::warn!("FileWatcher: {err}"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("FileWatcher: notification channel closed.");
                    break;
                }
            }
        }
        changed
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn relative_resource_path(root: &Path, path: &Path) -> Option<ResourcePath> {
    let relative = path.strip_prefix(root).ok()?;
    let resource = ResourcePath::new(relative.to_string_lossy());
    (!resource.is_empty()).then_some(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn paths_are_made_relative_to_the_root() {
        let root = Path::new("/data/res");
        assert_eq!(
            relative_resource_path(root, Path::new("/data/res/text/a.txt")),
            Some(ResourcePath::new("text/a.txt"))
        );
        assert_eq!(relative_resource_path(root, Path::new("/data/res")), None);
        assert_eq!(relative_resource_path(root, Path::new("/elsewhere/a.txt")), None);
    }

    #[test]
    fn reports_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = FileWatcher::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("hot.txt"), b"v1").unwrap();

        let target = ResourcePath::new("hot.txt");
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while !seen && Instant::now() < deadline {
            seen = watcher.poll_changes().contains(&target);
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(seen, "no change reported for {target}");
    }
}
