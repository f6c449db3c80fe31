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

use super::{LoadState, ResourceLoader};
use crate::resource::{ResourceHandle, ResourcePath};
use std::{fmt, sync::Arc};

/// "This loader made progress on this resource."
///
/// Events are signals, not payloads: by the time the consumer handles one, the
/// loader may have moved further. [`commit`](Self::commit) always merges
/// whatever is current.
#[derive(Clone)]
pub struct ResourceEvent {
    /// The resource the loader writes into.
    pub resource: ResourceHandle,
    /// The loader that produced the event.
    pub loader: Arc<dyn ResourceLoader>,
}

impl ResourceEvent {
    /// Creates an event.
    pub fn new(resource: ResourceHandle, loader: Arc<dyn ResourceLoader>) -> Self {
        Self { resource, loader }
    }

    /// The path of the resource.
    pub fn path(&self) -> &ResourcePath {
        self.resource.path()
    }

    /// The loader's current state.
    pub fn state(&self) -> LoadState {
        self.loader.state()
    }

    /// Commits the loader's staged data into the resource.
    pub fn commit(&self) {
        self.loader.commit(&self.resource);
    }
}

impl fmt::Debug for ResourceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEvent")
            .field("path", self.path())
            .field("state", &self.state())
            .finish()
    }
}
