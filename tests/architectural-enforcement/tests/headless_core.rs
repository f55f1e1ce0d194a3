//! Integration Test: Headless Core
//!
//! **Policy**: `gallery-core` holds page state only. Drawing, terminal I/O,
//! argument parsing and log subscribers belong to a surface crate.

use std::fs;
use std::path::Path;

use architectural_enforcement::{report, scan, workspace_root};

/// Crates a surface may use but the core must not
const SURFACE_CRATES: &[&str] = &[
    "ratatui",
    "crossterm",
    "clap",
    "tracing-subscriber",
    "web-sys",
    "gtk",
    "egui",
];

#[test]
fn test_core_has_no_surface_dependencies() {
    let manifest = workspace_root().join("gallery/core/Cargo.toml");
    let content = fs::read_to_string(&manifest).unwrap_or_default();
    assert!(!content.is_empty(), "cannot read {}", manifest.display());

    let violations: Vec<String> = content
        .lines()
        .map(|line| line.split('#').next().unwrap_or(line).trim())
        .filter_map(|line| {
            let name = line.split('=').next()?.trim();
            SURFACE_CRATES
                .contains(&name)
                .then(|| format!("{}: {line}", manifest.display()))
        })
        .collect();

    report(
        "CRITICAL: Surface crates found in gallery-core!",
        &violations,
        &["✅ REQUIRED: move rendering and CLI concerns into gallery-shell"],
    );
}

#[test]
fn test_core_does_not_print() {
    let violations = scan(&["gallery/core/src"], |_: &Path, code| {
        code.contains("println!(")
            || code.contains("eprintln!(")
            || code.contains("print!(")
            || code.contains("dbg!(")
    });

    report(
        "CRITICAL: Direct output found in gallery-core!",
        &violations,
        &[
            "✅ REQUIRED: emit a RenderDirective for the surface",
            "✅ REQUIRED: use tracing macros for diagnostics",
        ],
    );
}
