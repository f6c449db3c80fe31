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

//! Drivers that advance a loader's state machine and publish its progress.
//!
//! A [`LoadDriver`] owns everything one load needs: the resource, the loader,
//! where the bytes come from and the stream once it is open. The same driver
//! can run a few iterations on the caller's thread and then be handed to a
//! worker as a [`LoadTask`], keeping its open stream.

mod driver;
pub mod loading;
mod preloaded;
mod task;

pub use driver::LoadDriver;
pub use preloaded::PreloadedLoader;
pub use task::LoadTask;
