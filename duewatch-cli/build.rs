use std::path::Path;
use std::process::Command;

/// Stamps `DUEWATCH_BUILD_SHA` for `duewatch --version`.
///
/// Packagers building outside a checkout can preset the variable.
fn main() {
    println!("cargo:rerun-if-env-changed=DUEWATCH_BUILD_SHA");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");

    let git_head = workspace.join(".git").join("HEAD");
    if git_head.exists() {
        println!("cargo:rerun-if-changed={}", git_head.display());
    }

    let sha = std::env::var("DUEWATCH_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| describe(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=DUEWATCH_BUILD_SHA={sha}");
}

/// Short commit id, suffixed `-dirty` when the tree has local edits.
fn describe(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}
