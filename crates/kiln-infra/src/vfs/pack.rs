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
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fs::{self, File},
    io::{self, BufWriter, Cursor, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// File name of the pack index inside a pack directory.
pub const INDEX_FILE_NAME: &str = "index.bin";
/// File name of the concatenated file contents inside a pack directory.
pub const DATA_FILE_NAME: &str = "data.pack";

/// Location of one file inside `data.pack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackEntry {
    /// Normalized resource path.
    pub path: String,
    /// Byte offset of the first byte in the data file.
    pub offset: u64,
    /// Length in bytes.
    pub size: u64,
}

/// Errors raised while reading or writing a pack.
#[derive(Debug, Error)]
pub enum PackError {
    /// A pack file could not be read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The index could not be decoded.
    #[error("failed to decode pack index: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    /// The index could not be encoded.
    #[error("failed to encode pack index: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// An index entry points past the end of the data file.
    #[error("entry '{path}' ends at byte {end} but the data file holds {len} bytes")]
    OutOfBounds {
        /// The offending entry.
        path: String,
        /// One past its last byte.
        end: u64,
        /// Size of the data file.
        len: u64,
    },
    /// Two entries share the same normalized path.
    #[error("duplicate pack entry '{0}'")]
    Duplicate(ResourcePath),
}

impl PackError {
    fn io(path: &Path, source: io::Error) -> Self {
        PackError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serves resources from a pack: an `index.bin` listing entries and a
/// `data.pack` holding their bytes back to back.
///
/// Reads are serialized through one file handle. Each open copies the entry
/// into memory, so returned streams are independent of each other.
#[derive(Debug)]
pub struct PackFileSystem {
    entries: HashMap<ResourcePath, PackEntry>,
    data: Mutex<File>,
}

impl PackFileSystem {
    /// Opens the pack stored in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PackError> {
        let dir = dir.as_ref();
        Self::from_files(dir.join(INDEX_FILE_NAME), dir.join(DATA_FILE_NAME))
    }

    /// Opens a pack from explicit index and data file locations.
    pub fn from_files(
        index_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
    ) -> Result<Self, PackError> {
        let index_path = index_path.as_ref();
        let data_path = data_path.as_ref();

        let bytes = fs::read(index_path).map_err(|e| PackError::io(index_path, e))?;
        let (index, _): (Vec<PackEntry>, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;

        let data = File::open(data_path).map_err(|e| PackError::io(data_path, e))?;
        let len = data
            .metadata()
            .map_err(|e| PackError::io(data_path, e))?
            .len();

        let mut entries = HashMap::with_capacity(index.len());
        for entry in index {
            let end = entry.offset.saturating_add(entry.size);
            if end > len {
                return Err(PackError::OutOfBounds {
                    path: entry.path,
                    end,
                    len,
                });
            }
            let key = ResourcePath::new(&entry.path);
            if entries.contains_key(&key) {
                return Err(PackError::Duplicate(key));
            }
            entries.insert(key, entry);
        }

        log::info!(
            "PackFileSystem: loaded {} entries from '{}'.",
            entries.len(),
            index_path.display()
        );
        Ok(Self {
            entries,
            data: Mutex::new(data),
        })
    }

    /// Number of files in the pack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pack holds no file.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for `path`.
    pub fn entry(&self, path: &ResourcePath) -> Option<&PackEntry> {
        self.entries.get(path)
    }

    /// Iterates over the paths stored in the pack, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &ResourcePath> {
        self.entries.keys()
    }
}

impl FileSystem for PackFileSystem {
    fn open(&self, path: &ResourcePath) -> Result<Box<dyn ByteStream>, VfsError> {
        let entry = self
            .entries
            .get(path)
            .ok_or_else(|| VfsError::NotFound(path.clone()))?;

        let mut buffer = vec![0; entry.size as usize];
        {
            let mut data = self.data.lock();
            data.seek(SeekFrom::Start(entry.offset))
                .and_then(|_| data.read_exact(&mut buffer))
                .map_err(|source| VfsError::Io {
                    path: path.clone(),
                    source,
                })?;
        }
        Ok(Box::new(Cursor::new(buffer)))
    }

    fn exists(&self, path: &ResourcePath) -> bool {
        self.entries.contains_key(path)
    }
}

/// Totals reported by [`PackBuilder::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    /// Number of files written.
    pub entries: usize,
    /// Size of `data.pack`.
    pub data_bytes: u64,
    /// Size of `index.bin`.
    pub index_bytes: usize,
}

/// Writes a pack readable by [`PackFileSystem`].
///
/// File contents are streamed to `data.pack` as they are added; the index is
/// written by [`finish`](Self::finish).
pub struct PackBuilder {
    dir: PathBuf,
    data: BufWriter<File>,
    offset: u64,
    entries: Vec<PackEntry>,
    seen: HashSet<ResourcePath>,
}

impl PackBuilder {
    /// Creates `dir` if needed and starts a new pack inside it, truncating
    /// any previous one.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, PackError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PackError::io(&dir, e))?;
        let data_path = dir.join(DATA_FILE_NAME);
        let data = File::create(&data_path).map_err(|e| PackError::io(&data_path, e))?;
        Ok(Self {
            dir,
            data: BufWriter::new(data),
            offset: 0,
            entries: Vec::new(),
            seen: HashSet::new(),
        })
    }

    /// Appends `contents` under `path`.
    pub fn add(&mut self, path: impl Into<ResourcePath>, contents: &[u8]) -> Result<(), PackError> {
        let path = path.into();
        if !self.seen.insert(path.clone()) {
            return Err(PackError::Duplicate(path));
        }
        self.data
            .write_all(contents)
            .map_err(|e| PackError::io(&self.dir.join(DATA_FILE_NAME), e))?;

        let size = contents.len() as u64;
        self.entries.push(PackEntry {
            path: path.as_str().to_owned(),
            offset: self.offset,
            size,
        });
        self.offset += size;
        Ok(())
    }

    /// Reads `source` from disk and appends it under `path`.
    pub fn add_file(
        &mut self,
        path: impl Into<ResourcePath>,
        source: impl AsRef<Path>,
    ) -> Result<(), PackError> {
        let source = source.as_ref();
        let contents = fs::read(source).map_err(|e| PackError::io(source, e))?;
        self.add(path, &contents)
    }

    /// Number of files added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was added yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flushes the data file and writes the index.
    pub fn finish(mut self) -> Result<PackSummary, PackError> {
        let data_path = self.dir.join(DATA_FILE_NAME);
        self.data
            .flush()
            .map_err(|e| PackError::io(&data_path, e))?;

        let index_path = self.dir.join(INDEX_FILE_NAME);
        let encoded = bincode::serde::encode_to_vec(&self.entries, bincode::config::standard())?;
        fs::write(&index_path, &encoded).map_err(|e| PackError::io(&index_path, e))?;

        log::debug!(
            "PackBuilder: wrote {} entries ({} bytes) to '{}'.",
            self.entries.len(),
            self.offset,
            self.dir.display()
        );
        Ok(PackSummary {
            entries: self.entries.len(),
            data_bytes: self.offset,
            index_bytes: encoded.len(),
        })
    }
}
