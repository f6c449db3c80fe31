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

use super::LoadDriver;
use kiln_core::{RunSignal, Task};
use kiln_data::EventChannel;
use parking_lot::MutexGuard;
use std::sync::Arc;

/// Drives one loader to a stopped state on a worker thread.
///
/// The task holds the channel lock while it does bookkeeping and releases it
/// only for the duration of each `load` call, so the consumer's `pop_front` is
/// never blocked by decoding. After every step it pushes an event. The task is
/// consumed when it finishes; the executor does not track it.
pub struct LoadTask {
    driver: LoadDriver,
    channel: Arc<EventChannel>,
}

impl LoadTask {
    /// Creates a task that continues `driver` and reports to `channel`.
    pub fn new(driver: LoadDriver, channel: Arc<EventChannel>) -> Self {
        Self { driver, channel }
    }
}

impl Task for LoadTask {
    fn run(mut self: Box<Self>, signal: &RunSignal) {
        if self.driver.state().is_stopped() {
            return;
        }

        let channel = Arc::clone(&self.channel);
        let mut events = channel.lock();
        let driver = &mut self.driver;

        while signal.keep_running() {
            let state = MutexGuard::unlocked(&mut events, || driver.step());
            events.push_back(driver.event());
            if state.is_stopped() {
                log::debug!(
                    "LoadTask: '{}' finished as {} after {} steps",
                    driver.resource().path(),
                    state,
                    driver.iterations()
                );
                return;
            }
        }

        log::debug!(
            "LoadTask: '{}' interrupted by shutdown",
            driver.resource().path()
        );
    }
}
