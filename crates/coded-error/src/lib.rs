// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stable integer error codes for internal errors.
//!
//! A [`Coder`] describes a code: the HTTP status to answer with, the text a
//! client may see, and where the code is documented. Coders live in a
//! [`Registry`]; the process-wide one is reached through [`register`],
//! [`must_register`] and [`lookup`].
//!
//! Errors carry only the integer. A [`CodedError`] holds a code and an
//! optional wrapped cause, and [`parse_coder`] / [`is_code`] resolve or match
//! that code from wherever the error surfaces.
//!
//! ```
//! use coded_error::{CodedError, DefaultCoder, is_code, parse_coder, register};
//!
//! register(DefaultCoder::new(110_001, 404, "User not found", "/docs/errors#110001"));
//!
//! let err = CodedError::new(110_001, "no row for id 42");
//! let coder = parse_coder(Some(&err)).unwrap();
//! assert_eq!(coder.http_status(), 404);
//! assert_eq!(coder.message(), "User not found");
//! assert!(is_code(&err, 110_001));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chain;
pub mod coder;
pub mod registry;

pub use chain::{CodedError, Links, as_coded, is_code, parse_coder};
pub use coder::{
    Coder, DEFAULT_HTTP_STATUS, DefaultCoder, RESERVED_CODE, UNKNOWN_CODE, UNKNOWN_CODER,
};
pub use registry::{
    Registry, RegistryError, global, lookup, must_register, register, try_register,
};
