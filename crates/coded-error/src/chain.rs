// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

//! Coded-error chains and the queries that walk them.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::coder::{Coder, UNKNOWN_CODER};
use crate::registry::{Registry, global};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// One link of a coded-error chain: an integer code, a message for logs,
/// and an optional wrapped cause.
///
/// The code need not be registered when the error is built; it is resolved
/// against a [`Registry`] only when [`parse_coder`] is asked.
///
/// # Examples
///
/// ```
/// use coded_error::{CodedError, is_code};
///
/// let io = std::io::Error::other("disk full");
/// let inner = CodedError::wrap(io, 100_301, "write failed");
/// let outer = CodedError::wrap(inner, 100_001, "save document");
///
/// assert!(is_code(&outer, 100_301));
/// assert!(!is_code(&outer, 100_999));
/// ```
pub struct CodedError {
    code: i32,
    message: String,
    cause: Option<BoxError>,
}

impl CodedError {
    /// A root error with no cause.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Wrap `cause` under `code`.
    pub fn wrap(cause: impl Into<BoxError>, code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Attach (or replace) the wrapped cause.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Code carried by this link.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Internal message of this link.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Consume this link, returning its wrapped cause.
    pub fn into_cause(mut self) -> Option<BoxError> {
        self.cause.take()
    }

    /// Whether any link in this chain carries `code`.
    pub fn is_code(&self, code: i32) -> bool {
        is_code(self, code)
    }

    /// Iterate the chain from this link inward, stopping at the first cause
    /// that is not a [`CodedError`].
    pub fn links(&self) -> Links<'_> {
        Links { next: Some(self) }
    }

    /// The innermost error of the chain, coded or not.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

/// Wrapped chain links are listed flat, outer to inner, under `wrapped`;
/// a foreign cause at the end of the chain appears under `cause`.
impl fmt::Debug for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("CodedError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        let wrapped: Vec<LinkDebug<'_>> = self.links().skip(1).map(LinkDebug).collect();
        if !wrapped.is_empty() {
            d.field("wrapped", &wrapped);
        }
        // `links` stops at the first foreign cause, so the last link's cause
        // is never a `CodedError`.
        if let Some(cause) = self.links().last().and_then(|link| link.cause.as_deref()) {
            d.field("cause", &cause);
        }
        d.finish()
    }
}

struct LinkDebug<'a>(&'a CodedError);

impl fmt::Debug for LinkDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodedError")
            .field("code", &self.0.code)
            .field("message", &self.0.message)
            .finish()
    }
}

// Unlink iteratively so dropping a long chain uses constant stack.
impl Drop for CodedError {
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(boxed) = next {
            next = match boxed.downcast::<CodedError>() {
                Ok(mut coded) => coded.cause.take(),
                Err(_) => None,
            };
        }
    }
}

/// `{}` prints this link's message; `{:#}` appends every cause, outer to
/// inner, separated by `": "`.
impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if f.alternate() {
            let mut next = StdError::source(self);
            while let Some(err) = next {
                match as_coded(err) {
                    Some(coded) => write!(f, ": {}", coded.message)?,
                    None => write!(f, ": {err}")?,
                }
                next = err.source();
            }
        }
        Ok(())
    }
}

impl StdError for CodedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Iterator over consecutive [`CodedError`] links. See [`CodedError::links`].
#[derive(Debug, Clone)]
pub struct Links<'a> {
    next: Option<&'a CodedError>,
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a CodedError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.source().and_then(as_coded);
        Some(current)
    }
}

/// View `err` as a chain link, if it is one.
pub fn as_coded<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a CodedError> {
    err.downcast_ref::<CodedError>()
}

/// Resolve the [`Coder`] for `err` against the process-wide registry.
///
/// * `None` yields `None`: there was no error.
/// * A [`CodedError`] whose code is registered yields that Coder.
/// * Anything else, including an unregistered code, yields the unknown
///   Coder (code `1`, HTTP 500).
///
/// Only the outermost error is consulted.
pub fn parse_coder(err: Option<&(dyn StdError + 'static)>) -> Option<Arc<dyn Coder>> {
    global().parse_coder(err)
}

/// Whether any [`CodedError`] link in `err`'s chain carries `code`.
///
/// The walk goes outer to inner and ends at the first cause that is not a
/// [`CodedError`]; an error that is not a chain link carries no code.
pub fn is_code(err: &(dyn StdError + 'static), code: i32) -> bool {
    match as_coded(err) {
        Some(head) => head.links().any(|link| link.code == code),
        None => false,
    }
}

impl Registry {
    /// [`parse_coder`] against this registry.
    pub fn parse_coder(&self, err: Option<&(dyn StdError + 'static)>) -> Option<Arc<dyn Coder>> {
        let err = err?;
        let coder = as_coded(err)
            .and_then(|coded| self.lookup(coded.code))
            .unwrap_or_else(|| Arc::new(UNKNOWN_CODER));
        Some(coder)
    }
}
