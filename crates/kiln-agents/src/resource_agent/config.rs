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

use anyhow::{Context, Result};
use kiln_core::TaskPriority;
use kiln_infra::ThreadPool;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Configuration of a [`ResourceManager`](super::ResourceManager).
///
/// Every field is optional in TOML; missing ones take their default value.
///
/// ```toml
/// worker_threads = 4
/// worker_name_prefix = "loader"
/// max_events_per_update = 64
/// default_priority = 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Number of background workers. `0` picks one per CPU, minus one for the
    /// consumer thread, and at least one.
    pub worker_threads: usize,
    /// Thread name prefix for the workers.
    pub worker_name_prefix: String,
    /// Upper bound on events handled by one `update` call. `0` drains the
    /// whole channel.
    pub max_events_per_update: usize,
    /// Priority of loads that do not specify one.
    pub default_priority: i32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            worker_name_prefix: "kiln-loader".to_owned(),
            max_events_per_update: 0,
            default_priority: TaskPriority::NORMAL.0,
        }
    }
}

impl ManagerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse resource manager configuration")
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration '{}'", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid configuration in '{}'", path.display()))
    }

    /// The worker count to start, with `0` resolved.
    pub fn resolved_worker_threads(&self) -> usize {
        match self.worker_threads {
            0 => ThreadPool::default_thread_count(),
            n => n,
        }
    }

    /// [`default_priority`](Self::default_priority) as a task priority.
    pub fn default_task_priority(&self) -> TaskPriority {
        TaskPriority(self.default_priority)
    }
}
