// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz coded-error chains against a registry.
//!
//! Verifies:
//! 1. `try_register` never panics, whatever the code.
//! 2. `is_code` agrees with a plain scan of the codes used to build the chain.
//! 3. `parse_coder` always yields a Coder, and it is either the registered
//!    one for the outermost code or the unknown Coder.
#![no_main]
use arbitrary::Arbitrary;
use coded_error::{CodedError, Coder, DefaultCoder, Registry, UNKNOWN_CODE, is_code};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    registered: Vec<(i32, u16)>,
    chain: Vec<i32>,
    query: i32,
}

fuzz_target!(|input: Input| {
    let Some((&innermost, rest)) = input.chain.split_last() else {
        return;
    };
    if input.chain.len() > 256 {
        return;
    }

    // --- Property 1 ---
    let registry = Registry::new();
    for &(code, http) in &input.registered {
        let _ = registry.try_register(DefaultCoder::new(code, http, "fuzz", ""));
    }

    let mut err = CodedError::new(innermost, "root");
    for &code in rest.iter().rev() {
        err = CodedError::wrap(err, code, "layer");
    }

    // --- Property 2 ---
    assert_eq!(is_code(&err, input.query), input.chain.contains(&input.query));

    // --- Property 3 ---
    let coder = registry
        .parse_coder(Some(&err))
        .expect("an error always has a coder");
    match registry.lookup(input.chain[0]) {
        Some(expected) => assert_eq!(coder.code(), expected.code()),
        None => assert_eq!(coder.code(), UNKNOWN_CODE),
    }
});
