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

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The state of a loader's progressive state machine.
///
/// `NotLoaded → Loading → {PartialLoaded, Loaded, Aborted}`. `PartialLoaded`
/// may be reported any number of times before a stopped state. `Loaded` and
/// `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LoadState {
    /// No work has been done yet.
    #[default]
    NotLoaded = 0,
    /// Work is in progress but nothing can be committed yet.
    Loading = 1,
    /// Some data is decoded and can be committed; more will follow.
    PartialLoaded = 2,
    /// All data is decoded.
    Loaded = 3,
    /// Loading failed or no data was available.
    Aborted = 4,
}

impl LoadState {
    /// `commit` will have an effect in this state.
    pub fn can_commit(self) -> bool {
        matches!(self, LoadState::PartialLoaded | LoadState::Loaded)
    }

    /// No further `load` calls are meaningful.
    pub fn is_stopped(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Aborted)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => LoadState::Loading,
            2 => LoadState::PartialLoaded,
            3 => LoadState::Loaded,
            4 => LoadState::Aborted,
            _ => LoadState::NotLoaded,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::NotLoaded => write!(f, "NotLoaded"),
            LoadState::Loading => write!(f, "Loading"),
            LoadState::PartialLoaded => write!(f, "PartialLoaded"),
            LoadState::Loaded => write!(f, "Loaded"),
            LoadState::Aborted => write!(f, "Aborted"),
        }
    }
}

/// A [`LoadState`] stored in a single atomic word.
///
/// Stores use release ordering and loads use acquire ordering, so a consumer
/// that observes a state also observes every staging write made before it was
/// published.
#[derive(Debug, Default)]
pub struct AtomicLoadState(AtomicU8);

impl AtomicLoadState {
    /// Creates a new atomic state.
    pub fn new(state: LoadState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    /// Reads the current state.
    pub fn get(&self) -> LoadState {
        LoadState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Publishes a new state and returns it.
    pub fn set(&self, state: LoadState) -> LoadState {
        self.0.store(state as u8, Ordering::Release);
        state
    }
}
