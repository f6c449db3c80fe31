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

//! # Kiln Core
//!
//! Foundational crate containing the contracts shared by every part of the
//! resource loading engine: the shared resource handle, the progressive loader
//! protocol, the file-system abstraction and the executor interface.
//!
//! Nothing in here knows how resources are cached, scheduled or decoded. Those
//! concerns live in `kiln-data`, `kiln-lanes`, `kiln-infra` and `kiln-agents`.

#![warn(missing_docs)]

pub mod executor;
pub mod loader;
pub mod resource;
pub mod vfs;

pub use executor::{Executor, RunSignal, Task, TaskPriority};
pub use loader::{AtomicLoadState, LoadState, ResourceEvent, ResourceFactory, ResourceLoader};
pub use resource::{LoadArgs, ResourceHandle, ResourceId, ResourcePath, WeakResourceHandle};
pub use vfs::{ByteStream, FileSystem, VfsError};
