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

//! Progressive loading of UTF-8 text resources.

use kiln_core::{
    AtomicLoadState, ByteStream, LoadArgs, LoadState, ResourceFactory, ResourceHandle,
    ResourceLoader, ResourcePath,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Bytes read per `load` call unless overridden with the `chunk` argument.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A text file, split into lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextResource {
    /// The lines committed so far, without line terminators.
    pub lines: Vec<String>,
    /// Set by the final commit once the whole file was read.
    pub complete: bool,
}

#[derive(Default)]
struct TextStaging {
    carry: Vec<u8>,
    pending: Vec<String>,
    decoded: usize,
    finished: bool,
    completion_committed: bool,
}

/// Reads a text stream one chunk per step.
///
/// Every step decodes the complete lines found so far and reports
/// `PartialLoaded`; the end of the stream flushes the trailing line and reports
/// `Loaded`. Invalid UTF-8 or a read error aborts the load.
pub struct TextLoader {
    chunk_size: usize,
    state: AtomicLoadState,
    staging: Mutex<TextStaging>,
}

impl TextLoader {
    /// Creates a loader reading `chunk_size` bytes per step.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            state: AtomicLoadState::default(),
            staging: Mutex::new(TextStaging::default()),
        }
    }

    fn abort(&self, path: Option<&ResourcePath>, reason: &str) -> LoadState {
        log::warn!(
            "TextLoader: aborting '{}': {reason}",
            path.map(ResourcePath::as_str).unwrap_or("<unknown>")
        );
        self.state.set(LoadState::Aborted)
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

fn decode_line(mut bytes: Vec<u8>) -> Result<String, std::string::FromUtf8Error> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes)
}

impl ResourceLoader for TextLoader {
    fn load(
        &self,
        stream: Option<&mut dyn ByteStream>,
        path_hint: Option<&ResourcePath>,
    ) -> LoadState {
        let current = self.state.get();
        if current.is_stopped() {
            return current;
        }
        let Some(stream) = stream else {
            return self.abort(path_hint, "no stream available");
        };
        if current == LoadState::NotLoaded {
            self.state.set(LoadState::Loading);
        }

        let mut chunk = vec![0u8; self.chunk_size];
        let read = match stream.read(&mut chunk) {
            Ok(read) => read,
            Err(e) => return self.abort(path_hint, &e.to_string()),
        };

        let mut staging = self.staging.lock();
        if read == 0 {
            if !staging.carry.is_empty() {
                let tail = std::mem::take(&mut staging.carry);
                match decode_line(tail) {
                    Ok(line) => {
                        staging.pending.push(line);
                        staging.decoded += 1;
                    }
                    Err(e) => {
                        drop(staging);
                        return self.abort(path_hint, &e.to_string());
                    }
                }
            }
            staging.finished = true;
            drop(staging);
            return self.state.set(LoadState::Loaded);
        }

        staging.carry.extend_from_slice(&chunk[..read]);
        while let Some(end) = staging.carry.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = staging.carry.drain(..=end).collect();
            match decode_line(line) {
                Ok(line) => {
                    staging.pending.push(line);
                    staging.decoded += 1;
                }
                Err(e) => {
                    drop(staging);
                    return self.abort(path_hint, &e.to_string());
                }
            }
        }

        let next = if staging.decoded > 0 {
            LoadState::PartialLoaded
        } else {
            LoadState::Loading
        };
        drop(staging);
        self.state.set(next)
    }

    fn commit(&self, target: &ResourceHandle) {
        if !self.state.get().can_commit() {
            return;
        }

        let (lines, complete) = {
            let mut staging = self.staging.lock();
            let completes = staging.finished && !staging.completion_committed;
            if staging.pending.is_empty() && !completes {
                return;
            }
            if completes {
                staging.completion_committed = true;
            }
            (std::mem::take(&mut staging.pending), completes)
        };

        let merged = target.commit_with(|text: &mut TextResource| {
            text.lines.extend(lines);
            text.complete |= complete;
        });
        if merged.is_none() {
            log::error!(
                "TextLoader: '{}' does not hold a TextResource",
                target.path()
            );
        }
    }

    fn state(&self) -> LoadState {
        self.state.get()
    }
}

/// Creates [`TextResource`]s and [`TextLoader`]s for a set of extensions.
///
/// Recognized arguments: `chunk=<bytes>`.
pub struct TextFactory {
    extensions: Vec<String>,
}

impl TextFactory {
    /// A factory for `.txt` files.
    pub fn new() -> Self {
        Self::with_extensions(["txt"])
    }

    /// A factory for the given extensions (case-insensitive, without dot).
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl Default for TextFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceFactory for TextFactory {
    fn name(&self) -> &str {
        "text"
    }

    fn create_resource(&self, path: &ResourcePath, _args: &LoadArgs) -> Option<ResourceHandle> {
        let extension = path.extension()?;
        self.extensions
            .contains(&extension)
            .then(|| ResourceHandle::new(path.clone(), TextResource::default()))
    }

    fn create_loader(&self, args: &LoadArgs) -> Arc<dyn ResourceLoader> {
        let chunk_size = args.parse("chunk").unwrap_or(DEFAULT_CHUNK_SIZE);
        Arc::new(TextLoader::new(chunk_size))
    }
}
