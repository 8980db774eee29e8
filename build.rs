// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::process::Command;

fn main() {
    // Build identity is baked into the library so sinks and crash dumps can
    // name the exact binary that produced them.
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=HOTLOG_GIT_HASH={git_hash}");

    let build_type = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=HOTLOG_BUILD_TYPE={build_type}");

    println!("cargo:rerun-if-changed=build.rs");
}
