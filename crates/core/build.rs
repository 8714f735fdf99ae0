use std::env;
use std::process::Command;

// Exposes GIT_VERSION (git describe, falling back to the package version)
// and BUILD_UUID (a fresh UUID v7 per build) to the crate.
fn main() {
    let version = git_describe()
        .unwrap_or_else(|| format!("v{}", env::var("CARGO_PKG_VERSION").unwrap_or_default()));
    println!("cargo:rustc-env=GIT_VERSION={}", version);
    println!("cargo:rustc-env=BUILD_UUID={}", uuid::Uuid::now_v7());
    println!("cargo:rerun-if-changed=build.rs");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty", "--always"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8(output.stdout).ok()?;
    let version = version.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}
