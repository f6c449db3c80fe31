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

use kiln_core::{ByteStream, LoadState, ResourceHandle, ResourceLoader, ResourcePath};

/// The loader attached to resources that were cached fully formed.
///
/// It reports `Loaded` from the start and has nothing to commit, so events
/// carrying it flow through the consumer like any finished load.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreloadedLoader;

impl ResourceLoader for PreloadedLoader {
    fn load(&self, _: Option<&mut dyn ByteStream>, _: Option<&ResourcePath>) -> LoadState {
        LoadState::Loaded
    }

    fn commit(&self, _: &ResourceHandle) {}

    fn state(&self) -> LoadState {
        LoadState::Loaded
    }
}
