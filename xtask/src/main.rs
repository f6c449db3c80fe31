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

//! Workspace automation: `cargo xtask <command>`.

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask", version, about = "Kiln build automation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build every crate in the workspace.
    Build,
    /// Run unit, integration and doc tests.
    Test,
    /// Type-check the workspace.
    Check,
    /// Format all code.
    Format,
    /// Run clippy with warnings as errors.
    Clippy,
    /// Run build, test, check, format and clippy in sequence.
    Ci,
    /// Build a resource pack from the directories listed in a manifest.
    Pack {
        /// Manifest to read.
        #[arg(long, default_value = "Resources.toml")]
        manifest: PathBuf,
        /// Overrides the manifest's output directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build => commands::ci::build(),
        Command::Test => commands::ci::test(),
        Command::Check => commands::ci::check(),
        Command::Format => commands::ci::format(),
        Command::Clippy => commands::ci::clippy(),
        Command::Ci => commands::ci::all(),
        Command::Pack { manifest, output } => commands::pack::pack(&manifest, output),
    }
}
