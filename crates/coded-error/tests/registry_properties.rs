// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based and concurrency tests for the registry and chain walks.

use std::sync::Arc;
use std::thread;

use coded_error::{CodedError, Coder, DefaultCoder, Registry, UNKNOWN_CODE, is_code};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn fast_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    }
}

/// Any registrable code other than the unknown one.
fn arb_code() -> BoxedStrategy<i32> {
    prop_oneof![2..1_000i32, 100_000..999_999i32, i32::MIN..0i32].boxed()
}

fn arb_coder(code: i32) -> BoxedStrategy<DefaultCoder> {
    (
        prop_oneof![Just(0u16), 100u16..600u16],
        "[A-Za-z ]{1,24}",
        "(/docs/[a-z]{1,8})?",
    )
        .prop_map(move |(http, message, reference)| {
            DefaultCoder::new(code, http, message, reference)
        })
        .boxed()
}

fn chain_of(codes: &[i32]) -> CodedError {
    let (&innermost, rest) = codes.split_last().expect("non-empty chain");
    let mut err = CodedError::new(innermost, format!("layer {innermost}"));
    for &code in rest.iter().rev() {
        err = CodedError::wrap(err, code, format!("layer {code}"));
    }
    err
}

// ── Registry ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(fast_config())]

    #[test]
    fn lookup_returns_registered_fields(
        (first, second) in arb_code().prop_flat_map(|c| (arb_coder(c), arb_coder(c)))
    ) {
        let registry = Registry::new();
        let code = first.code;

        registry.register(first.clone());
        let got = DefaultCoder::from_coder(registry.lookup(code).unwrap().as_ref());
        prop_assert_eq!(got, DefaultCoder::from_coder(&first));

        registry.register(second.clone());
        let got = DefaultCoder::from_coder(registry.lookup(code).unwrap().as_ref());
        prop_assert_eq!(got, DefaultCoder::from_coder(&second));
    }

    #[test]
    fn repeated_lookups_agree(coder in arb_code().prop_flat_map(arb_coder)) {
        let registry = Registry::new();
        let code = coder.code;
        registry.register(coder);
        let a = DefaultCoder::from_coder(registry.lookup(code).unwrap().as_ref());
        let b = DefaultCoder::from_coder(registry.lookup(code).unwrap().as_ref());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn unregistered_codes_resolve_to_unknown(code in arb_code()) {
        let registry = Registry::new();
        prop_assert!(registry.lookup(code).is_none());
        let err = CodedError::new(code, "unregistered");
        let coder = registry.parse_coder(Some(&err)).unwrap();
        prop_assert_eq!(coder.code(), UNKNOWN_CODE);
        prop_assert_eq!(coder.http_status(), 500);
    }

    #[test]
    fn http_status_is_never_zero(coder in arb_code().prop_flat_map(arb_coder)) {
        prop_assert_ne!(coder.http_status(), 0);
    }
}

// ── Chain membership ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(fast_config())]

    #[test]
    fn is_code_matches_any_layer(codes in prop::collection::vec(arb_code(), 1..12), query in arb_code()) {
        let err = chain_of(&codes);
        prop_assert_eq!(is_code(&err, query), codes.contains(&query));
        for code in &codes {
            prop_assert!(is_code(&err, *code));
        }
    }

    #[test]
    fn is_code_is_stable(codes in prop::collection::vec(arb_code(), 1..8), query in arb_code()) {
        let err = chain_of(&codes);
        let first = is_code(&err, query);
        for _ in 0..4 {
            prop_assert_eq!(is_code(&err, query), first);
        }
    }
}

/// Runs `f` on a thread with a small stack so per-link recursion overflows.
fn on_small_stack(f: impl FnOnce() + Send + 'static) {
    thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(f)
        .expect("spawn")
        .join()
        .expect("chain operations stay within the stack");
}

#[test]
fn long_chain_is_walked_and_dropped_without_recursion() {
    on_small_stack(|| {
        let codes: Vec<i32> = (2..200_004).collect();
        let err = chain_of(&codes);
        assert!(is_code(&err, 2));
        assert!(is_code(&err, 200_003));
        assert!(!is_code(&err, 200_004));
        drop(err);
    });
}

#[test]
fn long_chain_formats_without_recursion() {
    on_small_stack(|| {
        let codes: Vec<i32> = (2..100_002).collect();
        let err = chain_of(&codes);
        let debug = format!("{err:?}");
        assert!(debug.contains("code: 100001"));
        let display = format!("{err:#}");
        assert!(display.ends_with("layer 100001"));
    });
}

#[test]
fn long_chain_with_foreign_root_drops() {
    on_small_stack(|| {
        let mut err = CodedError::wrap(std::io::Error::other("disk"), 2, "root");
        for code in 3..200_003 {
            err = CodedError::wrap(err, code, "layer");
        }
        assert_eq!(err.root_cause().to_string(), "disk");
        drop(err);
    });
}

// ── Concurrency ─────────────────────────────────────────────────────────

#[test]
fn concurrent_registrations_are_all_visible() {
    const N: i32 = 64;
    let registry = Arc::new(Registry::new());

    thread::scope(|s| {
        for i in 0..N {
            let registry = &registry;
            s.spawn(move || {
                let code = 200_000 + i;
                registry.register(DefaultCoder::new(
                    code,
                    400 + (i % 100) as u16,
                    format!("message {code}"),
                    "",
                ));
            });
        }
    });

    thread::scope(|s| {
        for i in 0..N {
            let registry = &registry;
            s.spawn(move || {
                let code = 200_000 + i;
                let coder = registry.lookup(code).expect("registered");
                assert_eq!(coder.code(), code);
                assert_eq!(coder.http_status(), 400 + (i % 100) as u16);
                assert_eq!(coder.message(), format!("message {code}"));
            });
        }
    });

    assert_eq!(registry.len(), N as usize + 1);
}

#[test]
fn concurrent_must_register_admits_exactly_one() {
    let registry = Registry::new();
    let winners: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = &registry;
                s.spawn(move || {
                    registry
                        .try_register(DefaultCoder::new(300_000, 409, format!("writer {i}"), ""))
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum()
    });
    assert_eq!(winners, 1);
}
