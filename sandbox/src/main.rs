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

//! Loads text resources through the resource manager and ticks the consumer
//! loop until they are ready, optionally hot-reloading them afterwards.

use anyhow::{bail, Context, Result};
use clap::Parser;
use kiln_agents::{BlockMode, LoadOptions, LoadTracker, ManagerConfig, ResourceManager};
use kiln_core::{FileSystem, ResourceHandle, ResourcePath};
use kiln_infra::{logging::init_logging, DirectoryFileSystem, FileWatcher, PackFileSystem};
use kiln_lanes::{TextFactory, TextResource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "sandbox", about = "Kiln resource loading sandbox")]
struct Args {
    /// Directory resources are read from.
    #[arg(long, default_value = "resources", conflicts_with = "pack")]
    root: PathBuf,
    /// Read resources from a pack directory instead.
    #[arg(long)]
    pack: Option<PathBuf>,
    /// Manager configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Negative: background, 0: block until done, n: block for n steps.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    block: i32,
    /// Loader arguments, e.g. `chunk=64`.
    #[arg(long, default_value = "")]
    args: String,
    /// Extensions handled by the text loader.
    #[arg(long, value_delimiter = ',', default_value = "txt,md,toml")]
    extensions: Vec<String>,
    /// Keep watching `--root` for this many seconds and reload changed files.
    #[arg(long)]
    watch: Option<u64>,
    /// Resources to load.
    #[arg(required = true)]
    paths: Vec<String>,
}

fn main() -> Result<()> {
    init_logging("info");
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };
    let file_system: Arc<dyn FileSystem> = match &args.pack {
        Some(dir) => Arc::new(
            PackFileSystem::open(dir)
                .with_context(|| format!("Failed to open pack '{}'", dir.display()))?,
        ),
        None => Arc::new(DirectoryFileSystem::new(&args.root)),
    };

    let manager = ResourceManager::new(config, file_system)?;
    manager.register_factory(TextFactory::with_extensions(&args.extensions));

    let options = LoadOptions {
        block: BlockMode::from_iterations(args.block),
        priority: None,
        args: args.args.as_str().into(),
    };

    let started = Instant::now();
    let mut handles = Vec::new();
    for path in &args.paths {
        match manager.load(path.as_str(), &options) {
            Some(handle) => handles.push(handle),
            None => log::error!("No factory accepts '{path}'."),
        }
    }
    if handles.is_empty() {
        bail!("nothing to load");
    }

    let mut tracker = LoadTracker::new(handles.iter().map(|h| h.path().clone()));
    while !tracker.is_complete() {
        tracker.observe_all(&manager.update());
        let (done, total) = tracker.progress();
        log::debug!("Progress: {done}/{total}");
        thread::sleep(TICK);
    }
    log::info!(
        "Loaded {} resources in {:.1} ms ({} failed).",
        tracker.succeeded().len(),
        started.elapsed().as_secs_f64() * 1000.0,
        tracker.failed().len()
    );
    for handle in &handles {
        report(handle);
    }

    if let Some(seconds) = args.watch {
        if args.pack.is_some() {
            bail!("--watch requires a directory root");
        }
        watch(
            &manager,
            &args.root,
            Duration::from_secs(seconds),
            &options,
            &mut handles,
        )?;
    }

    manager.shutdown();
    Ok(())
}

fn report(handle: &ResourceHandle) {
    let summary = handle.read(|text: &TextResource| (text.lines.len(), text.complete));
    match summary {
        Some((lines, true)) => println!(
            "{}: {lines} lines, {} commits",
            handle.path(),
            handle.commit_count()
        ),
        Some((lines, false)) => println!("{}: incomplete after {lines} lines", handle.path()),
        None => println!("{}: not a text resource", handle.path()),
    }
}

fn watch(
    manager: &ResourceManager,
    root: &Path,
    duration: Duration,
    options: &LoadOptions,
    handles: &mut Vec<ResourceHandle>,
) -> Result<()> {
    let watcher = FileWatcher::new(root)
        .with_context(|| format!("Failed to watch '{}'", root.display()))?;
    log::info!("Watching '{}' for {}s.", root.display(), duration.as_secs());

    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        let changed: Vec<ResourcePath> = watcher.poll_changes();
        // Reloaded resources stay cached only while a handle is held.
        for fresh in manager.reload_changed(changed, options) {
            match handles.iter_mut().find(|h| h.path() == fresh.path()) {
                Some(slot) => *slot = fresh,
                None => handles.push(fresh),
            }
        }
        for event in manager.update() {
            if event.state().is_stopped() {
                report(&event.resource);
            }
        }
        thread::sleep(TICK);
    }
    Ok(())
}
