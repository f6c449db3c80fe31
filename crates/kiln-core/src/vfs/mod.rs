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

//! The file-system abstraction consumed by the loading pipeline.
//!
//! The engine only needs one operation: open a path for reading. Whether the
//! bytes come from a directory, a pack file or memory is up to the
//! [`FileSystem`] implementation (see `kiln-infra`).

use crate::resource::ResourcePath;
use std::io::{self, Read, Seek};
use thiserror::Error;

/// A readable, seekable byte source handed to loaders.
pub trait ByteStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> ByteStream for T {}

/// Errors raised when a path cannot be opened.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No file exists at this path.
    #[error("resource '{0}' was not found")]
    NotFound(ResourcePath),
    /// The underlying storage failed.
    #[error("I/O error while opening '{path}': {source}")]
    Io {
        /// The path being opened.
        path: ResourcePath,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl VfsError {
    /// Wraps an I/O error, mapping `NotFound` to [`VfsError::NotFound`].
    pub fn from_io(path: &ResourcePath, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            VfsError::NotFound(path.clone())
        } else {
            VfsError::Io {
                path: path.clone(),
                source,
            }
        }
    }
}

/// Opens resource paths for reading.
///
/// Implementations are shared between worker threads, hence `Send + Sync`.
pub trait FileSystem: Send + Sync {
    /// Opens `path` and returns a stream positioned at its first byte.
    fn open(&self, path: &ResourcePath) -> Result<Box<dyn ByteStream>, VfsError>;

    /// Returns `true` if `path` can be opened.
    ///
    /// The default implementation attempts an open.
    fn exists(&self, path: &ResourcePath) -> bool {
        self.open(path).is_ok()
    }
}
