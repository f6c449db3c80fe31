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

//! The progressive loading protocol.
//!
//! Every format-specific loader implements [`ResourceLoader`]. Loading is split
//! in two halves that run on different threads:
//!
//! - [`ResourceLoader::load`] runs on a worker thread. It performs one unit of
//!   work (a scan-line, a mip level, a chunk of samples, or the whole file) and
//!   reports the resulting [`LoadState`].
//! - [`ResourceLoader::commit`] runs on the single consumer thread. It moves
//!   whatever has been decoded so far into the target resource. This is where
//!   device calls that are only legal on one thread belong.
//!
//! A [`ResourceFactory`] pairs a resource constructor with a loader constructor
//! for one family of resources.

mod event;
mod state;

pub use event::*;
pub use state::*;

use crate::resource::{LoadArgs, ResourceHandle, ResourcePath};
use crate::vfs::ByteStream;

/// A stateful, format-specific loader driven one step at a time.
///
/// A loader is stepped by at most one worker thread at a time, while the
/// consumer thread may concurrently call [`state`](Self::state) and
/// [`commit`](Self::commit). Implementations keep the state in a single atomic
/// word (see [`AtomicLoadState`]) and only publish a new state after the data
/// that state describes has been fully written to the staging area.
pub trait ResourceLoader: Send + Sync {
    /// Advances the state machine by one unit of work.
    ///
    /// Called repeatedly until a stopped state is returned. On the very first
    /// call `stream` is `None` when the source could not be opened; file loaders
    /// must then move straight to [`LoadState::Aborted`]. Parse errors detected
    /// mid-stream also end in `Aborted`.
    fn load(
        &self,
        stream: Option<&mut dyn ByteStream>,
        path_hint: Option<&ResourcePath>,
    ) -> LoadState;

    /// Merges the data decoded since the previous commit into `target`.
    ///
    /// Each effective merge goes through [`ResourceHandle::commit_with`], which
    /// increments the commit counter once. Must do nothing unless
    /// [`LoadState::can_commit`] holds, and should do nothing when no new data
    /// is staged.
    fn commit(&self, target: &ResourceHandle);

    /// A non-blocking snapshot of the current state.
    fn state(&self) -> LoadState;
}

/// Creates resources and their loaders for one resource family.
///
/// The manager tries registered factories in turn; the first one whose
/// [`create_resource`](Self::create_resource) returns `Some` handles the path.
pub trait ResourceFactory: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &str;

    /// Creates an empty resource for `path`, or `None` if this factory does not
    /// handle it (typically decided by extension).
    fn create_resource(&self, path: &ResourcePath, args: &LoadArgs) -> Option<ResourceHandle>;

    /// Creates a fresh loader for a resource this factory just created.
    fn create_loader(&self, args: &LoadArgs) -> std::sync::Arc<dyn ResourceLoader>;
}
