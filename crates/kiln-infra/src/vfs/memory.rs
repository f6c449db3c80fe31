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

use kiln_core::{ByteStream, FileSystem, ResourcePath, VfsError};
use parking_lot::RwLock;
use std::{collections::HashMap, io::Cursor, sync::Arc};

/// An in-memory file system.
///
/// Contents are shared, so opening a file never copies it. Files can be
/// replaced at any time; streams opened earlier keep reading the old bytes.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<ResourcePath, Arc<[u8]>>>,
}

impl MemoryFileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(self, path: impl Into<ResourcePath>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Stores `contents` at `path`, replacing any previous file.
    pub fn insert(&self, path: impl Into<ResourcePath>, contents: impl AsRef<[u8]>) {
        self.files
            .write()
            .insert(path.into(), Arc::from(contents.as_ref()));
    }

    /// Deletes the file at `path`. Returns `true` if it existed.
    pub fn remove(&self, path: &ResourcePath) -> bool {
        self.files.write().remove(path).is_some()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Returns `true` if no file is stored.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &ResourcePath) -> Result<Box<dyn ByteStream>, VfsError> {
        let contents = self
            .files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.clone()))?;
        Ok(Box::new(Cursor::new(contents)))
    }

    fn exists(&self, path: &ResourcePath) -> bool {
        self.files.read().contains_key(path)
    }
}
