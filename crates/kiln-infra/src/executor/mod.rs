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

//! Executors able to run background load tasks.

mod deferred;
mod thread_pool;

pub use deferred::DeferredExecutor;
pub use thread_pool::ThreadPool;

use kiln_core::{Task, TaskPriority};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors raised while building an executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The worker pool could not be started.
    #[error("failed to build worker pool '{name}': {source}")]
    Build {
        /// Thread name prefix of the pool.
        name: String,
        /// The underlying error.
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

/// A task waiting in a priority queue.
///
/// Ordered by priority, then by submission order so that tasks of equal
/// priority start first-in first-out from a max-heap.
pub(crate) struct QueuedTask {
    pub(crate) priority: TaskPriority,
    pub(crate) sequence: u64,
    pub(crate) task: Box<dyn Task>,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
