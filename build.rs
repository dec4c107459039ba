//! Build script for partyforge
//!
//! Embeds git commit, branch, build timestamp, target and rustc version
//! into the binary for the `version` command.

use std::env;
use std::process::Command;

fn main() {
    // Rerun if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    // Get git information
    let git_hash = get_git_hash();
    let git_branch = get_git_branch();
    let git_dirty = is_git_dirty();

    // Get build information
    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let rustc_version = get_rustc_version();

    // Set environment variables for compilation
    println!("cargo:rustc-env=PARTYFORGE_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=PARTYFORGE_GIT_BRANCH={}", git_branch);
    println!("cargo:rustc-env=PARTYFORGE_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=PARTYFORGE_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=PARTYFORGE_TARGET={}", target);
    println!("cargo:rustc-env=PARTYFORGE_PROFILE={}", profile);
    println!("cargo:rustc-env=PARTYFORGE_RUSTC_VERSION={}", rustc_version);
}

/// Run a command and return its trimmed stdout, or "unknown"
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn get_git_hash() -> String {
    command_output("git", &["rev-parse", "--short=8", "HEAD"])
}

fn get_git_branch() -> String {
    command_output("git", &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Check if the git working directory is dirty
fn is_git_dirty() -> &'static str {
    Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .map(|output| {
            if output.status.success() && !output.stdout.is_empty() {
                "true"
            } else {
                "false"
            }
        })
        .unwrap_or("unknown")
}

fn get_rustc_version() -> String {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    command_output(&rustc, &["--version"])
}
