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

use crate::commands::pack_config::PackManifest;
use crate::helpers::*;
use anyhow::{Context, Result};
use kiln_core::ResourcePath;
use kiln_infra::PackBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file to pack and the resource path it is stored under.
#[derive(Debug, PartialEq)]
struct SourceFile {
    resource: ResourcePath,
    location: PathBuf,
}

pub fn pack(manifest_path: &Path, output: Option<PathBuf>) -> Result<()> {
    print_task_start("Packing Resources", PACKAGE, MAGENTA);

    let manifest = load_manifest(manifest_path)?;
    let output = output.unwrap_or(manifest.output_directory);

    let (existing, missing): (Vec<_>, Vec<_>) = manifest
        .source_directories
        .into_iter()
        .partition(|dir| dir.is_dir());
    for dir in &missing {
        print_error(&format!("Skipping missing directory '{}'", dir.display()));
    }
    if existing.is_empty() {
        print_error("No valid source directories found. Nothing to pack.");
        return Ok(());
    }

    let sources = collect_sources(&existing)?;
    if sources.is_empty() {
        print_success("No files found to pack.");
        return Ok(());
    }
    print_info(&format!("Found {} files to pack.", sources.len()));

    let mut builder = PackBuilder::create(&output)
        .with_context(|| format!("Failed to start pack in '{}'", output.display()))?;
    for source in &sources {
        builder
            .add_file(source.resource.clone(), &source.location)
            .with_context(|| format!("Failed to pack '{}'", source.location.display()))?;
    }
    let summary = builder.finish().context("Failed to finish pack")?;

    print_success(&format!(
        "Wrote {} entries to '{}' (data {:.2} MB, index {:.2} KB)",
        summary.entries,
        output.display(),
        summary.data_bytes as f64 / (1024.0 * 1024.0),
        summary.index_bytes as f64 / 1024.0
    ));
    Ok(())
}

/// Reads the manifest, or falls back to the defaults when it does not exist.
fn load_manifest(path: &Path) -> Result<PackManifest> {
    if !path.exists() {
        print_info(&format!(
            "No '{}' found. Using default configuration.",
            path.display()
        ));
        return Ok(PackManifest::default());
    }
    print_info(&format!("Loading configuration from '{}'.", path.display()));
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
}

/// Lists every file under `dirs`, sorted by resource path.
///
/// When two directories provide the same resource path, the first directory
/// listed wins.
fn collect_sources(dirs: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut sources: Vec<SourceFile> = Vec::new();
    for dir in dirs {
        for entry in WalkDir::new(dir) {
            let entry = entry.with_context(|| format!("Failed to scan '{}'", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(dir)
                .context("Walked outside the source directory")?;
            let resource = ResourcePath::new(relative.to_string_lossy());
            if sources.iter().any(|source| source.resource == resource) {
                print_error(&format!("Ignoring duplicate resource '{resource}'"));
                continue;
            }
            sources.push(SourceFile {
                resource,
                location: entry.into_path(),
            });
        }
    }
    sources.sort_by(|a, b| a.resource.cmp(&b.resource));
    Ok(sources)
}
