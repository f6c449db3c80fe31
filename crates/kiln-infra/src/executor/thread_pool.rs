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

use super::{ExecutorError, QueuedTask};
use kiln_core::{Executor, RunSignal, Task, TaskPriority};
use parking_lot::{Condvar, Mutex};
use std::{collections::BinaryHeap, sync::Arc};

#[derive(Default)]
struct TaskQueue {
    heap: BinaryHeap<QueuedTask>,
    next_sequence: u64,
}

struct Shared {
    queue: Mutex<TaskQueue>,
    signal: RunSignal,
    // Jobs handed to rayon that have not returned yet.
    in_flight: Mutex<usize>,
    drained: Condvar,
}

impl Shared {
    /// Body of every rayon job: runs whichever queued task has the highest
    /// priority when a worker gets to it.
    fn run_next(self: &Arc<Self>) {
        let _job = InFlight(Arc::clone(self));
        if !self.signal.keep_running() {
            return;
        }
        let next = self.queue.lock().heap.pop();
        if let Some(queued) = next {
            queued.task.run(&self.signal);
        }
    }
}

/// Releases one in-flight slot when a job ends, even by unwinding.
struct InFlight(Arc<Shared>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut in_flight = self.0.in_flight.lock();
        *in_flight -= 1;
        if *in_flight == 0 {
            self.0.drained.notify_all();
        }
    }
}

/// A fixed-size pool of named worker threads fed from one priority queue.
///
/// Workers come from a rayon pool. Each submission pushes the task onto a
/// shared heap and spawns one rayon job that pops the best task available
/// when it starts, so tasks of higher priority overtake older ones. Shutdown
/// clears the run signal, drops every task that has not started and waits
/// for running jobs to return; tasks that are running observe the signal
/// between their own iterations.
pub struct ThreadPool {
    shared: Arc<Shared>,
    pool: rayon::ThreadPool,
    worker_count: usize,
}

impl ThreadPool {
    /// Starts `threads` workers (at least one) named `{name_prefix}-{index}`.
    pub fn new(threads: usize, name_prefix: &str) -> Result<Self, ExecutorError> {
        let threads = threads.max(1);
        let prefix = name_prefix.to_owned();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .panic_handler(|_| log::error!("ThreadPool: a load task panicked."))
            .build()
            .map_err(|source| ExecutorError::Build {
                name: name_prefix.to_owned(),
                source,
            })?;

        log::info!("ThreadPool: started {threads} workers ('{name_prefix}-*').");
        Ok(Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(TaskQueue::default()),
                signal: RunSignal::new(),
                in_flight: Mutex::new(0),
                drained: Condvar::new(),
            }),
            pool,
            worker_count: threads,
        })
    }

    /// One worker per CPU, minus one for the consumer thread, but at least one.
    pub fn default_thread_count() -> usize {
        num_cpus::get().saturating_sub(1).max(1)
    }

    /// Number of queued tasks that have not started yet.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().heap.len()
    }
}

impl Executor for ThreadPool {
    fn enqueue(&self, task: Box<dyn Task>, priority: TaskPriority) {
        if !self.shared.signal.keep_running() {
            log::warn!("ThreadPool: task submitted after shutdown was dropped.");
            return;
        }
        {
            let mut queue = self.shared.queue.lock();
            let sequence = queue.next_sequence;
            queue.next_sequence += 1;
            queue.heap.push(QueuedTask {
                priority,
                sequence,
                task,
            });
        }
        *self.shared.in_flight.lock() += 1;

        let shared = Arc::clone(&self.shared);
        self.pool.spawn(move || shared.run_next());
    }

    fn shutdown(&self) {
        self.shared.signal.stop();
        let dropped = {
            let mut queue = self.shared.queue.lock();
            let dropped = queue.heap.len();
            queue.heap.clear();
            dropped
        };
        if dropped > 0 {
            log::debug!("ThreadPool: dropped {dropped} queued tasks on shutdown.");
        }

        if self.pool.current_thread_index().is_some() {
            // Shutdown requested from a task; waiting here would wait on ourselves.
            return;
        }
        let mut in_flight = self.shared.in_flight.lock();
        if *in_flight == 0 {
            return;
        }
        while *in_flight > 0 {
            self.shared.drained.wait(&mut in_flight);
        }
        log::info!("ThreadPool: all running tasks returned.");
    }

    fn worker_count(&self) -> usize {
        self.worker_count
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
