//! Embeds git and toolchain metadata into the binary (see `src/version.rs`).

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    emit("GIT_HASH", git(&["rev-parse", "--short=8", "HEAD"]));
    emit("GIT_BRANCH", git(&["rev-parse", "--abbrev-ref", "HEAD"]));
    emit(
        "GIT_DIRTY",
        git(&["status", "--porcelain"]).map(|out| {
            if out.is_empty() { "false" } else { "true" }.to_string()
        }),
    );
    emit(
        "BUILD_TIMESTAMP",
        Some(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    );
    emit("TARGET", env::var("TARGET").ok());
    emit("PROFILE", env::var("PROFILE").ok());
    emit("RUSTC_VERSION", run("rustc", &["--version"]));
}

fn emit(key: &str, value: Option<String>) {
    println!(
        "cargo:rustc-env=CLAIMSIM_{}={}",
        key,
        value.unwrap_or_else(|| "unknown".to_string())
    );
}

fn git(args: &[&str]) -> Option<String> {
    run("git", args)
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
