//! Integration Test: Timer Confinement
//!
//! **Policy**: The engine never sleeps. The only clock in production code is
//! the error toast countdown; everything else waits on request completions.
//! **Exceptions**: `gallery/core/src/dialogue/toast.rs`, test code

use std::path::Path;

use architectural_enforcement::{report, scan, PRODUCTION_DIRS};

const TIMER_MODULE: &str = "dialogue/toast.rs";

fn is_sleep(code: &str) -> bool {
    code.contains("sleep(") || code.contains("sleep_until(")
}

#[test]
fn test_sleep_only_in_toast_timer() {
    let violations = scan(PRODUCTION_DIRS, |path: &Path, code| {
        is_sleep(code) && !path.ends_with(TIMER_MODULE)
    });

    report(
        "CRITICAL: Sleep calls found outside the toast timer!",
        &violations,
        &[
            "✅ ACCEPTABLE: tokio::time::sleep_until in the toast countdown task",
            "❌ FORBIDDEN: sleeping to wait for a request; await its completion instead",
        ],
    );
}

#[test]
fn test_toast_timer_uses_tokio_clock() {
    let violations = scan(PRODUCTION_DIRS, |_: &Path, code| {
        code.contains("std::thread::sleep") || code.contains("std::time::Instant")
    });

    report(
        "CRITICAL: Blocking or wall-clock timing found!",
        &violations,
        &["✅ REQUIRED: tokio::time so paused-clock tests can drive the countdown"],
    );
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep("    tokio::time::sleep(Duration::from_secs(1)).await;"));
    assert!(is_sleep("    tokio::time::sleep_until(deadline).await;"));
    assert!(!is_sleep("    let asleep = false;"));
}
