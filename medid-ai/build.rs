//! Stamps medid-ai with build identification, read back by `src/build_info.rs`

use std::process::Command;

fn main() {
    emit("MEDID_GIT_HASH", &git_describe().unwrap_or_else(|| "unknown".into()));
    emit(
        "MEDID_BUILD_TIMESTAMP",
        &chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    emit(
        "MEDID_BUILD_PROFILE",
        &std::env::var("PROFILE").unwrap_or_else(|_| "unknown".into()),
    );
}

/// Abbreviated commit, suffixed `-dirty` for uncommitted changes
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string()).filter(|s| !s.is_empty())
}

fn emit(name: &str, value: &str) {
    println!("cargo:rustc-env={}={}", name, value);
}
