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

use crate::helpers::*;
use anyhow::Result;
use std::time::Instant;

struct Step {
    name: &'static str,
    emoji: &'static str,
    color: &'static str,
    info: &'static str,
    args: &'static [&'static str],
}

const BUILD: Step = Step {
    name: "Build",
    emoji: HAMMER,
    color: BLUE,
    info: "Compiling all workspace crates in debug mode",
    args: &["build", "--workspace", "--exclude", "xtask"],
};

const TEST: Step = Step {
    name: "Tests",
    emoji: TEST_TUBE,
    color: GREEN,
    info: "Running unit tests, integration tests and doc tests",
    args: &["test", "--workspace"],
};

const CHECK_STEP: Step = Step {
    name: "Check",
    emoji: MAGNIFIER,
    color: CYAN,
    info: "Checking code for errors without building executables",
    args: &["check", "--workspace"],
};

const FORMAT: Step = Step {
    name: "Format",
    emoji: BRUSH,
    color: MAGENTA,
    info: "Formatting code using rustfmt with default settings",
    // `fmt` takes `--all`, not `--workspace`.
    args: &["fmt", "--all"],
};

const CLIPPY_STEP: Step = Step {
    name: "Clippy",
    emoji: CLIPPY,
    color: YELLOW,
    info: "Running Clippy linter with warnings as errors",
    args: &["clippy", "--workspace", "--", "-D", "warnings"],
};

fn run(step: &Step) -> Result<()> {
    print_task_start(step.name, step.emoji, step.color);
    print_info(step.info);
    execute_command("cargo", step.args, step.name)
}

pub fn build() -> Result<()> {
    run(&BUILD)
}

pub fn test() -> Result<()> {
    run(&TEST)
}

pub fn check() -> Result<()> {
    run(&CHECK_STEP)
}

pub fn format() -> Result<()> {
    run(&FORMAT)
}

pub fn clippy() -> Result<()> {
    run(&CLIPPY_STEP)
}

/// Runs every step, continuing past failures, and fails if any step failed.
pub fn all() -> Result<()> {
    let steps = [&BUILD, &TEST, &CHECK_STEP, &FORMAT, &CLIPPY_STEP];
    let started = Instant::now();
    let failed: Vec<&str> = steps
        .iter()
        .filter(|step| run(step).is_err())
        .map(|step| step.name)
        .collect();

    let seconds = started.elapsed().as_secs_f64();
    if failed.is_empty() {
        print_success(&format!(
            "All {} tasks completed in {seconds:.2}s",
            steps.len()
        ));
        Ok(())
    } else {
        print_error(&format!(
            "{}/{} tasks failed: {}",
            failed.len(),
            steps.len(),
            failed.join(", ")
        ));
        anyhow::bail!("CI pipeline failed")
    }
}
