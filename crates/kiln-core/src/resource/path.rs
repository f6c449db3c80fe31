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

/// A normalized, forward-slash separated resource path.
///
/// This is the identity key of every resource. Two requests that spell the same
/// file differently (`./textures\wall.png` and `textures/wall.png`) resolve to
/// the same `ResourcePath` and therefore to the same cache entry.
///
/// Normalization rules:
/// - backslashes become forward slashes,
/// - empty segments and `.` segments are dropped,
/// - `..` removes the previous segment; a leading `..` is dropped so a path can
///   never climb above its root,
/// - case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Normalizes `raw` into a resource path.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim().replace('\\', "/");
        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self(segments.join("/"))
    }

    /// Returns the normalized path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment of the path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The lower-cased extension of the last segment, without the dot.
    ///
    /// Returns `None` when the file name has no dot or only a leading one
    /// (`.hidden`).
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(name[dot + 1..].to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourcePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourcePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&String> for ResourcePath {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_dots() {
        let path = ResourcePath::new("./a\\b//c/../d.TXT");
        assert_eq!(path.as_str(), "a/b/d.TXT");
        assert_eq!(path.extension().as_deref(), Some("txt"));
        assert_eq!(path.file_name(), "d.TXT");
    }

    #[test]
    fn leading_parent_segments_cannot_escape_root() {
        assert_eq!(ResourcePath::new("../../etc/passwd").as_str(), "etc/passwd");
    }

    #[test]
    fn equal_spellings_share_identity() {
        assert_eq!(
            ResourcePath::new("textures/wall.png"),
            ResourcePath::new(" ./textures\\wall.png ")
        );
    }

    #[test]
    fn extension_edge_cases() {
        assert_eq!(ResourcePath::new("dir.d/readme").extension(), None);
        assert_eq!(ResourcePath::new(".hidden").extension(), None);
        assert_eq!(
            ResourcePath::new("archive.tar.GZ").extension().as_deref(),
            Some("gz")
        );
        assert!(ResourcePath::new("./").is_empty());
    }
}
