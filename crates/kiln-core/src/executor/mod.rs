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

//! The contract a worker pool must satisfy to run background loads.
//!
//! The engine submits boxed [`Task`]s with a [`TaskPriority`] and never manages
//! their lifetime afterwards: a task consumes itself when it runs. Cancellation
//! is cooperative; tasks poll the [`RunSignal`] between units of work.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Scheduling priority of a task. Higher values run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TaskPriority(pub i32);

impl TaskPriority {
    /// Background work that can wait.
    pub const LOW: TaskPriority = TaskPriority(-10);
    /// The default priority.
    pub const NORMAL: TaskPriority = TaskPriority(0);
    /// Work the user is waiting on.
    pub const HIGH: TaskPriority = TaskPriority(10);
}

/// A shared "keep running" flag.
///
/// The executor owns the signal and clears it on shutdown; tasks check it
/// between iterations and return early once it is cleared.
#[derive(Debug, Clone)]
pub struct RunSignal(Arc<AtomicBool>);

impl RunSignal {
    /// Creates a signal in the running state.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Returns `false` once shutdown was requested.
    pub fn keep_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Requests shutdown.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for RunSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit of work submitted to an [`Executor`].
pub trait Task: Send {
    /// Runs the task to completion or until `signal` asks it to stop.
    fn run(self: Box<Self>, signal: &RunSignal);
}

/// A worker pool able to run [`Task`]s.
pub trait Executor: Send + Sync {
    /// Queues `task`. Tasks with a higher priority are started first.
    fn enqueue(&self, task: Box<dyn Task>, priority: TaskPriority);

    /// Stops the workers and waits for running tasks to return.
    ///
    /// Queued tasks that have not started are dropped. Calling this more than
    /// once is a no-op.
    fn shutdown(&self);

    /// Number of worker threads, zero for executors driven by the caller.
    fn worker_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_is_shared_between_clones() {
        let signal = RunSignal::new();
        let observer = signal.clone();
        assert!(observer.keep_running());
        signal.stop();
        assert!(!observer.keep_running());
    }

    #[test]
    fn priorities_order_high_above_low() {
        assert!(TaskPriority::HIGH > TaskPriority::NORMAL);
        assert!(TaskPriority::NORMAL > TaskPriority::LOW);
        assert_eq!(TaskPriority::default(), TaskPriority::NORMAL);
    }
}
