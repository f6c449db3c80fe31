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

use std::{fmt, str::FromStr};

/// Loader-defined options attached to a load request.
///
/// The raw string travels unmodified from the request to the factory and the
/// loader. It is conventionally a `;`-separated list of `name=value` pairs; a
/// bare `name` counts as a flag set to `true`:
///
/// ```
/// use kiln_core::resource::LoadArgs;
///
/// let args = LoadArgs::new("chunk=512; tangents");
/// assert_eq!(args.get("chunk"), Some("512"));
/// assert_eq!(args.parse::<usize>("chunk"), Some(512));
/// assert!(args.flag("tangents"));
/// assert!(!args.flag("mipmaps"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadArgs(String);

impl LoadArgs {
    /// Wraps a raw argument string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw string, exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Iterates over the `(name, value)` pairs. Flags yield an empty value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (pair, ""),
            })
    }

    /// Value of the last occurrence of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs()
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .last()
    }

    /// Parses the value of `name`. Missing or malformed values yield `None`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name)?.parse().ok()
    }

    /// Interprets `name` as a boolean switch.
    ///
    /// A bare name, `1`, `true`, `yes` and `on` are true; everything else,
    /// including absence, is false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(str::to_ascii_lowercase).as_deref(),
            Some("" | "1" | "true" | "yes" | "on")
        )
    }
}

impl fmt::Display for LoadArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoadArgs {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LoadArgs {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_string_is_preserved() {
        let raw = " chunk = 64 ;; block ";
        let args = LoadArgs::new(raw);
        assert_eq!(args.as_str(), raw);
        assert_eq!(args.to_string(), raw);
    }

    #[test]
    fn later_values_override_earlier_ones() {
        let args = LoadArgs::new("chunk=64;chunk=128");
        assert_eq!(args.parse::<u32>("chunk"), Some(128));
    }

    #[test]
    fn flags_and_malformed_values() {
        let args = LoadArgs::new("block;mips=off;count=abc;Tangents=YES");
        assert!(args.flag("block"));
        assert!(!args.flag("mips"));
        assert!(args.flag("Tangents"));
        assert_eq!(args.parse::<u32>("count"), None);
        assert!(LoadArgs::default().is_empty());
    }
}
