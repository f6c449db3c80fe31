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

//! Identity and ownership primitives for loadable resources.
//!
//! A resource is addressed by a normalized [`ResourcePath`] and shared through a
//! [`ResourceHandle`]. The cache only ever keeps a [`WeakResourceHandle`], so a
//! resource lives exactly as long as somebody outside the cache holds on to it.
//!
//! [`LoadArgs`] carries the opaque, loader-defined option string that travels
//! from a load request to the factory and loader untouched.

mod args;
mod handle;
mod path;

pub use args::*;
pub use handle::*;
pub use path::*;
