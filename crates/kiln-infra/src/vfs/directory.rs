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
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

/// Serves resources straight from a directory on disk.
///
/// Resource paths are resolved relative to the root. Normalized paths never
/// contain `..`, so nothing outside the root is reachable.
#[derive(Debug, Clone)]
pub struct DirectoryFileSystem {
    root: PathBuf,
}

impl DirectoryFileSystem {
    /// Creates a file system rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory resources are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The on-disk location of `path`.
    pub fn resolve(&self, path: &ResourcePath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

impl FileSystem for DirectoryFileSystem {
    fn open(&self, path: &ResourcePath) -> Result<Box<dyn ByteStream>, VfsError> {
        let full = self.resolve(path);
        let metadata = fs::metadata(&full).map_err(|e| VfsError::from_io(path, e))?;
        if !metadata.is_file() {
            return Err(VfsError::NotFound(path.clone()));
        }
        let file = File::open(&full).map_err(|e| VfsError::from_io(path, e))?;
        log::trace!("DirectoryFileSystem: opened '{}'.", full.display());
        Ok(Box::new(BufReader::new(file)))
    }

    fn exists(&self, path: &ResourcePath) -> bool {
        self.resolve(path).is_file()
    }
}
