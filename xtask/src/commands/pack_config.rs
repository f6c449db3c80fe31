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

use serde::Deserialize;
use std::path::PathBuf;

/// Contents of `Resources.toml`.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct PackManifest {
    /// Directories scanned recursively for files to pack. Paths inside the
    /// pack are relative to the directory a file was found in.
    pub source_directories: Vec<PathBuf>,
    /// Where `index.bin` and `data.pack` are written.
    pub output_directory: PathBuf,
}

impl Default for PackManifest {
    fn default() -> Self {
        Self {
            source_directories: vec![PathBuf::from("resources")],
            output_directory: PathBuf::from(".dist/resources"),
        }
    }
}
