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

//! # Kiln Data
//!
//! The two shared data structures of the loading engine:
//!
//! - [`CacheIndex`]: the path-ordered map from a resource path to its loader and
//!   a weak observation of the resource, with garbage collection folded into
//!   ordinary lookups.
//! - [`EventChannel`]: the coalescing hand-off from worker threads to the
//!   consumer thread.
//!
//! Neither structure locks itself against the other; callers own the locking
//! policy (see `kiln-agents`).

#![warn(missing_docs)]

pub mod cache;
pub mod channel;

pub use cache::{CacheEntry, CacheIndex};
pub use channel::{ChannelGuard, EventChannel, PendingEvents};
