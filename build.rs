//! Build script for backports: embeds a human-readable version string.
//!
//! `BUILD_INFO_HUMAN` is `<pkg version> (<git describe>) <rustc version>`.
//! When the checkout has no tags the describe part becomes
//! `v<pkg version>-<commit time>-<short sha>`, and when git is not
//! available at all it falls back to the build time.

use std::process::Command;

use chrono::{DateTime, Utc};

fn main() {
    for path in ["src", "build.rs", "Cargo.toml"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let info = [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        Some(format!("({})", describe())),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={info}");
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn describe() -> String {
    let pkg = env!("CARGO_PKG_VERSION");

    match run("git", &["describe", "--tags", "--always", "--dirty"]) {
        Some(desc) if desc.starts_with('v') || desc.contains("-g") => desc,
        Some(_) => {
            let sha = run("git", &["rev-parse", "--short=12", "HEAD"])
                .unwrap_or_else(|| "unknown".to_string());
            let stamp = run("git", &["log", "-1", "--format=%ct"])
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .unwrap_or_else(Utc::now);
            format!("v{pkg}-{}-{sha}", stamp.format("%Y%m%d%H%M%S"))
        }
        None => format!("v{pkg}-{}", Utc::now().format("%Y%m%d%H%M%S")),
    }
}
