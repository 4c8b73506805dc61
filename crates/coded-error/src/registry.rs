// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

//! Code → [`Coder`] registry.
//!
//! A [`Registry`] is created holding exactly one entry, the built-in
//! [`UNKNOWN_CODER`](crate::UNKNOWN_CODER) under code `1`. Entries are added
//! by registration and never removed. The process-wide instance returned by
//! [`global`] backs the free functions [`register`], [`must_register`],
//! [`try_register`] and [`lookup`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use crate::coder::{Coder, RESERVED_CODE, UNKNOWN_CODER};

/// Recoverable form of the registration failures.
///
/// [`Registry::register`] and [`Registry::must_register`] treat these as
/// programmer errors and panic; [`Registry::try_register`] hands them back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Code `0` is the unknown-code sentinel and cannot be registered.
    #[error("code `0` is reserved as the unknown error sentinel")]
    ReservedCode,

    /// The code already has a Coder.
    #[error("code {code} already registered")]
    AlreadyRegistered {
        /// The colliding code.
        code: i32,
    },
}

/// Thread-safe mapping from integer code to [`Coder`].
///
/// # Examples
///
/// ```
/// use coded_error::{Coder, DefaultCoder, Registry};
///
/// let registry = Registry::new();
/// registry.register(DefaultCoder::new(100_001, 400, "bad request", ""));
///
/// let coder = registry.lookup(100_001).unwrap();
/// assert_eq!(coder.http_status(), 400);
/// assert!(registry.lookup(100_002).is_none());
/// ```
pub struct Registry {
    codes: Mutex<HashMap<i32, Arc<dyn Coder>>>,
}

impl Registry {
    /// Create a registry seeded with the unknown Coder.
    #[must_use]
    pub fn new() -> Self {
        let mut codes: HashMap<i32, Arc<dyn Coder>> = HashMap::new();
        codes.insert(UNKNOWN_CODER.code, Arc::new(UNKNOWN_CODER));
        Self {
            codes: Mutex::new(codes),
        }
    }

    // Fatal registrations panic only after the guard is dropped, so poison
    // can only come from a caller's own Coder panicking mid-insert.
    fn entries(&self) -> MutexGuard<'_, HashMap<i32, Arc<dyn Coder>>> {
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `coder`, silently replacing any Coder already under its code.
    ///
    /// # Panics
    ///
    /// Panics if `coder.code()` is `0`.
    #[track_caller]
    pub fn register(&self, coder: impl Coder + 'static) {
        let code = coder.code();
        if code == RESERVED_CODE {
            fatal(RegistryError::ReservedCode);
        }
        let http_status = coder.http_status();
        let replaced = self.entries().insert(code, Arc::new(coder)).is_some();
        if replaced {
            debug!(code, http_status, replaced, "coder overridden");
        } else {
            debug!(code, http_status, "coder registered");
        }
    }

    /// Register `coder`, treating an existing entry for its code as fatal.
    ///
    /// Use this at start-up for catalogs whose codes must never collide.
    ///
    /// # Panics
    ///
    /// Panics if `coder.code()` is `0` or is already registered.
    #[track_caller]
    pub fn must_register(&self, coder: impl Coder + 'static) {
        if let Err(err) = self.try_register(coder) {
            fatal(err);
        }
    }

    /// Register `coder` unless its code is reserved or already taken.
    pub fn try_register(&self, coder: impl Coder + 'static) -> Result<(), RegistryError> {
        let code = coder.code();
        if code == RESERVED_CODE {
            return Err(RegistryError::ReservedCode);
        }
        let http_status = coder.http_status();
        {
            let mut codes = self.entries();
            if codes.contains_key(&code) {
                return Err(RegistryError::AlreadyRegistered { code });
            }
            codes.insert(code, Arc::new(coder));
        }
        debug!(code, http_status, "coder registered");
        Ok(())
    }

    /// The Coder registered under `code`, if any.
    #[must_use]
    pub fn lookup(&self, code: i32) -> Option<Arc<dyn Coder>> {
        self.entries().get(&code).cloned()
    }

    /// Whether `code` has a Coder.
    #[must_use]
    pub fn is_registered(&self, code: i32) -> bool {
        self.entries().contains_key(&code)
    }

    /// Number of registered codes, the unknown Coder included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether no code is registered. A fresh registry already holds the
    /// unknown Coder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Sorted snapshot of every registered code.
    #[must_use]
    pub fn codes(&self) -> Vec<i32> {
        let mut codes: Vec<i32> = self.entries().keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("codes", &self.codes())
            .finish()
    }
}

#[track_caller]
fn fatal(err: RegistryError) -> ! {
    error!(error = %err, "invalid coder registration");
    panic!("{err}");
}

// ---------------------------------------------------------------------------
// Process-wide registry
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry. Seeded with the unknown Coder on first access.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// [`Registry::register`] on the process-wide registry.
///
/// # Panics
///
/// Panics if `coder.code()` is `0`.
#[track_caller]
pub fn register(coder: impl Coder + 'static) {
    GLOBAL.register(coder);
}

/// [`Registry::must_register`] on the process-wide registry.
///
/// # Panics
///
/// Panics if `coder.code()` is `0` or is already registered.
#[track_caller]
pub fn must_register(coder: impl Coder + 'static) {
    GLOBAL.must_register(coder);
}

/// [`Registry::try_register`] on the process-wide registry.
pub fn try_register(coder: impl Coder + 'static) -> Result<(), RegistryError> {
    GLOBAL.try_register(coder)
}

/// [`Registry::lookup`] on the process-wide registry.
pub fn lookup(code: i32) -> Option<Arc<dyn Coder>> {
    GLOBAL.lookup(code)
}
