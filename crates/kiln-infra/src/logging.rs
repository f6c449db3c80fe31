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

//! Logging bootstrap shared by the binaries.

/// Installs `env_logger` as the `log` backend.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` is used (for example
/// `"info"` or `"kiln_agents=debug,info"`). Calling this twice is harmless: the
/// second call leaves the existing logger in place.
pub fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized.");
    }
}
