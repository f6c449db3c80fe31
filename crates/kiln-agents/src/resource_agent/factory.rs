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

use kiln_core::{LoadArgs, ResourceFactory, ResourceHandle, ResourcePath};
use parking_lot::RwLock;
use std::sync::Arc;

/// The registered factories, in registration order.
///
/// Resolution tries the most recently registered factory first, so a later
/// registration overrides an earlier one interested in the same paths.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: RwLock<Vec<Arc<dyn ResourceFactory>>>,
}

impl FactoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory` with the highest priority so far.
    pub fn register(&self, factory: Arc<dyn ResourceFactory>) {
        log::debug!("FactoryRegistry: registered '{}'.", factory.name());
        self.factories.write().push(factory);
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    /// Finds the factory handling `path` and the resource it created for it.
    pub fn resolve(
        &self,
        path: &ResourcePath,
        args: &LoadArgs,
    ) -> Option<(Arc<dyn ResourceFactory>, ResourceHandle)> {
        self.factories.read().iter().rev().find_map(|factory| {
            factory
                .create_resource(path, args)
                .map(|resource| (Arc::clone(factory), resource))
        })
    }
}
