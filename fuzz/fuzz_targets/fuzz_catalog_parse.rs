// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz catalog TOML parsing, validation and application.
//!
//! Verifies:
//! 1. `parse_catalog` never panics on arbitrary input.
//! 2. `validate_catalog` never panics, and its warnings Display cleanly.
//! 3. A catalog that validates applies under both policies without panics.
//! 4. Round-trip: serialize back to TOML and re-parse produces the same catalog.
#![no_main]
use coded_error::{Coder, Registry};
use coded_error_catalog::{RegistrationPolicy, parse_catalog, validate_catalog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // --- Property 1 ---
    let catalog = match parse_catalog(s) {
        Ok(c) => c,
        Err(_) => return,
    };

    // --- Property 2 ---
    let warnings = match validate_catalog(&catalog) {
        Ok(w) => w,
        Err(e) => {
            let _ = e.to_string();
            return;
        }
    };
    for w in &warnings {
        let _ = format!("{w}");
    }

    // --- Property 3 ---
    let registry = Registry::new();
    let n = catalog
        .apply(&registry, RegistrationPolicy::Override)
        .expect("validated catalog must apply");
    assert_eq!(n, catalog.len());
    for coder in &catalog.coders {
        let got = registry.lookup(coder.code).expect("applied code must resolve");
        assert_ne!(got.http_status(), 0);
    }
    let fresh = Registry::new();
    let _ = catalog.apply(&fresh, RegistrationPolicy::Strict);

    // --- Property 4 ---
    if let Ok(text) = toml::to_string(&catalog) {
        let back = parse_catalog(&text).expect("re-parse of serialized catalog");
        assert_eq!(back, catalog);
    }
});
