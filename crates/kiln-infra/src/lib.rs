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

//! # Kiln Infra
//!
//! Concrete implementations of the contracts defined in `kiln-core`:
//!
//! - executors: a priority [`ThreadPool`] and a caller-driven [`DeferredExecutor`],
//! - file systems: [`DirectoryFileSystem`], [`MemoryFileSystem`] and the
//!   pack-backed [`PackFileSystem`] with its [`PackBuilder`],
//! - a [`FileWatcher`] for hot reloading,
//! - logging bootstrap for binaries.

#![warn(missing_docs)]

pub mod executor;
pub mod logging;
pub mod vfs;

pub use executor::{DeferredExecutor, ExecutorError, ThreadPool};
pub use vfs::{
    DirectoryFileSystem, FileWatcher, MemoryFileSystem, PackBuilder, PackEntry, PackError,
    PackFileSystem, PackSummary,
};
