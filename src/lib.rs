// SPDX-License-Identifier: MIT OR Apache-2.0
//! coded-errors
//!
//! Facade over the workspace: the registry and error chain from
//! [`coded_error`], and TOML catalogs under [`catalog`].

#![deny(unsafe_code)]

pub use coded_error::*;

/// TOML catalogs of error codes.
pub use coded_error_catalog as catalog;
