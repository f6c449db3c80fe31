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

use kiln_core::{LoadArgs, TaskPriority};

/// Where and how long a load runs before the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// Hand the whole load to the executor and return at once, possibly
    /// before any data exists.
    #[default]
    Background,
    /// Drive the loader on the calling thread until it stops.
    UntilStopped,
    /// Drive the loader on the calling thread for this many steps, or fewer if
    /// it stops earlier, then hand the rest to the executor.
    Iterations(u32),
}

impl BlockMode {
    /// Converts a signed iteration count: negative runs in the background,
    /// zero blocks until the loader stops, `n` blocks for `n` steps.
    pub fn from_iterations(iterations: i32) -> Self {
        match iterations {
            i32::MIN..=-1 => BlockMode::Background,
            0 => BlockMode::UntilStopped,
            n => BlockMode::Iterations(n.unsigned_abs()),
        }
    }
}

/// Options for a single load request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Blocking behavior.
    pub block: BlockMode,
    /// Priority of the background part of the load. `None` uses the manager's
    /// configured default.
    pub priority: Option<TaskPriority>,
    /// Loader arguments, passed unmodified to the factory and the loader.
    pub args: LoadArgs,
}

impl LoadOptions {
    /// A background load with default priority and no arguments.
    pub fn background() -> Self {
        Self::default()
    }

    /// A load driven to completion on the calling thread.
    pub fn blocking() -> Self {
        Self {
            block: BlockMode::UntilStopped,
            ..Self::default()
        }
    }

    /// A load that blocks for `iterations` steps before continuing in the
    /// background.
    pub fn block_for(iterations: u32) -> Self {
        Self {
            block: BlockMode::Iterations(iterations),
            ..Self::default()
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the loader arguments.
    pub fn with_args(mut self, args: impl Into<LoadArgs>) -> Self {
        self.args = args.into();
        self
    }
}
