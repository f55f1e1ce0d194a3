//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - Time only enters the engine through the error toast timer
//! - No panicking shortcuts in production code
//! - The core crate stays headless (no printing, no UI or CLI crates)
//!
//! The helpers below locate production sources relative to the workspace
//! root and strip the trailing `#[cfg(test)]` module of each file.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories checked by every rule
pub const PRODUCTION_DIRS: &[&str] = &["gallery/core/src", "gallery/shell/src"];

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Numbered code lines of a file, comments and test module removed
#[must_use]
pub fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    code_lines(&content)
}

/// Numbered code lines of `content`, stopping at the first `#[cfg(test)]`
#[must_use]
pub fn code_lines(content: &str) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| {
            let code = line.split("//").next().unwrap_or(line);
            (idx + 1, code.to_string())
        })
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// `path:line - code` entries for every production line matching `pred`
pub fn scan<F>(dirs: &[&str], pred: F) -> Vec<String>
where
    F: Fn(&Path, &str) -> bool,
{
    let mut violations = Vec::new();
    for dir in dirs {
        for path in rust_files(dir) {
            for (line_number, code) in production_lines(&path) {
                if pred(&path, &code) {
                    violations.push(format!(
                        "{}:{} - {}",
                        path.display(),
                        line_number,
                        code.trim()
                    ));
                }
            }
        }
    }
    violations
}

/// Print the violations and fail
///
/// # Panics
///
/// Always, when `violations` is not empty.
pub fn report(title: &str, violations: &[String], guidance: &[&str]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in guidance {
        eprintln!("  {line}");
    }
    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lines_drop_comments_and_tests() {
        let content = "\
//! Module docs with .unwrap()
fn run() {
    let x = 1; // .unwrap()
}

#[cfg(test)]
mod tests {
    fn t() { Some(1).unwrap(); }
}";
        let lines = code_lines(content);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], (2, "fn run() {".to_string()));
        assert!(lines.iter().all(|(_, code)| !code.contains("unwrap")));
    }

    #[test]
    fn test_workspace_root_holds_production_dirs() {
        for dir in PRODUCTION_DIRS {
            assert!(
                workspace_root().join(dir).is_dir(),
                "missing production dir {dir}"
            );
        }
    }
}
