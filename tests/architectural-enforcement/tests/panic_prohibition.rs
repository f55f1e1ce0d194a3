//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code propagates errors with `?`. A bad server
//! response or a surface event in the wrong state must never abort the page.
//! **Exceptions**: test code

use std::path::Path;

use architectural_enforcement::{report, scan, PRODUCTION_DIRS};

fn is_panicking_shortcut(code: &str) -> bool {
    code.contains(".unwrap()")
        || code.contains(".expect(")
        || code.contains("panic!(")
        || code.contains("unimplemented!(")
        || code.contains("todo!(")
}

#[test]
fn test_no_panicking_shortcuts_in_production_code() {
    let violations = scan(PRODUCTION_DIRS, |_: &Path, code| is_panicking_shortcut(code));

    report(
        "CRITICAL: Panicking shortcuts found in production code!",
        &violations,
        &[
            "❌ FORBIDDEN: .unwrap(), .expect(..), panic!, todo!, unimplemented!",
            "✅ REQUIRED: return a Result and let the caller decide",
            "✅ ACCEPTABLE: unwrap_or, unwrap_or_else, unwrap_or_default",
        ],
    );
}

#[test]
fn test_panic_detection() {
    assert!(is_panicking_shortcut("let x = y.unwrap();"));
    assert!(is_panicking_shortcut("let x = y.expect(\"set\");"));
    assert!(!is_panicking_shortcut("let x = y.unwrap_or_default();"));
    assert!(!is_panicking_shortcut("let x = y.unwrap_or_else(|| z);"));
}
