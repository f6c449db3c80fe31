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

//! File system backends for the resource manager.
//!
//! Every backend implements [`kiln_core::FileSystem`], so the manager can be
//! pointed at a directory during development, at a pack in shipped builds and
//! at memory in tests without any other change.

mod directory;
mod memory;
mod pack;
mod watcher;

pub use directory::DirectoryFileSystem;
pub use memory::MemoryFileSystem;
pub use pack::{
    PackBuilder, PackEntry, PackError, PackFileSystem, PackSummary, DATA_FILE_NAME,
    INDEX_FILE_NAME,
};
pub use watcher::FileWatcher;
