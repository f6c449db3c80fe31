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

use super::QueuedTask;
use kiln_core::{Executor, RunSignal, Task, TaskPriority};
use parking_lot::Mutex;
use std::collections::BinaryHeap;

#[derive(Default)]
struct DeferredQueue {
    heap: BinaryHeap<QueuedTask>,
    next_sequence: u64,
}

/// An executor without threads: tasks wait until the owner calls
/// [`run_pending`](Self::run_pending) and then run on the caller's thread.
///
/// Useful on single-threaded hosts and wherever a test needs to control
/// exactly when background work happens.
#[derive(Default)]
pub struct DeferredExecutor {
    queue: Mutex<DeferredQueue>,
    signal: RunSignal,
}

impl DeferredExecutor {
    /// Creates an empty executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().heap.len()
    }

    /// Runs queued tasks, highest priority first, until the queue is empty.
    ///
    /// Tasks enqueued while running are picked up too. Returns how many tasks
    /// ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.signal.keep_running() {
            let Some(queued) = self.queue.lock().heap.pop() else {
                break;
            };
            queued.task.run(&self.signal);
            ran += 1;
        }
        ran
    }
}

impl Executor for DeferredExecutor {
    fn enqueue(&self, task: Box<dyn Task>, priority: TaskPriority) {
        if !self.signal.keep_running() {
            log::warn!("DeferredExecutor: task submitted after shutdown was dropped.");
            return;
        }
        let mut queue = self.queue.lock();
        let sequence = queue.next_sequence;
        queue.next_sequence += 1;
        queue.heap.push(QueuedTask {
            priority,
            sequence,
            task,
        });
    }

    fn shutdown(&self) {
        self.signal.stop();
        self.queue.lock().heap.clear();
    }

    fn worker_count(&self) -> usize {
        0
    }
}
