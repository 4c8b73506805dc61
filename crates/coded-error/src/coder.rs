// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

//! The [`Coder`] capability set and its stock implementation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Code reserved as the "unregistered" sentinel. Never registrable.
pub const RESERVED_CODE: i32 = 0;

/// Code permanently bound to the built-in unknown Coder.
pub const UNKNOWN_CODE: i32 = 1;

/// HTTP status reported when a Coder leaves its status unset.
pub const DEFAULT_HTTP_STATUS: u16 = 500;

/// The fallback descriptor returned whenever no specific Coder applies.
pub const UNKNOWN_CODER: DefaultCoder = DefaultCoder {
    code: UNKNOWN_CODE,
    http: DEFAULT_HTTP_STATUS,
    message: Cow::Borrowed("An internal server error occurred"),
    reference: Cow::Borrowed("https://github.com/rtmzk/errors/README.md"),
};

/// Descriptor bundling an error code with the metadata shown to clients.
///
/// Implementors must be cheap to share: registries hand out
/// `Arc<dyn Coder>` to every caller that resolves an error.
pub trait Coder: fmt::Debug + Send + Sync {
    /// Stable, non-zero integer identity. Used as the registry key.
    fn code(&self) -> i32;

    /// HTTP status associated with the code.
    fn http_status(&self) -> u16;

    /// External (user-facing) error text.
    fn message(&self) -> &str;

    /// Location of the documentation for this code.
    fn reference(&self) -> &str;
}

impl<T: Coder + ?Sized> Coder for Arc<T> {
    fn code(&self) -> i32 {
        (**self).code()
    }

    fn http_status(&self) -> u16 {
        (**self).http_status()
    }

    fn message(&self) -> &str {
        (**self).message()
    }

    fn reference(&self) -> &str {
        (**self).reference()
    }
}

impl<T: Coder + ?Sized> Coder for Box<T> {
    fn code(&self) -> i32 {
        (**self).code()
    }

    fn http_status(&self) -> u16 {
        (**self).http_status()
    }

    fn message(&self) -> &str {
        (**self).message()
    }

    fn reference(&self) -> &str {
        (**self).reference()
    }
}

/// Plain value implementation of [`Coder`].
///
/// An `http` of `0` means "unset" and reads back as
/// [`DEFAULT_HTTP_STATUS`].
///
/// # Examples
///
/// ```
/// use coded_error::{Coder, DefaultCoder};
///
/// let coder = DefaultCoder::new(100_201, 0, "record not found", "");
/// assert_eq!(coder.http_status(), 500);
/// assert_eq!(coder.message(), "record not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DefaultCoder {
    /// Integer code.
    pub code: i32,
    /// HTTP status; `0` means unset.
    #[serde(default, rename = "http_status")]
    pub http: u16,
    /// User-facing text.
    pub message: Cow<'static, str>,
    /// Documentation reference.
    #[serde(default)]
    pub reference: Cow<'static, str>,
}

impl DefaultCoder {
    /// Build a descriptor from its parts.
    pub fn new(
        code: i32,
        http: u16,
        message: impl Into<Cow<'static, str>>,
        reference: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code,
            http,
            message: message.into(),
            reference: reference.into(),
        }
    }

    /// Copy the observable fields of any [`Coder`] into a value.
    pub fn from_coder(coder: &dyn Coder) -> Self {
        Self::new(
            coder.code(),
            coder.http_status(),
            coder.message().to_owned(),
            coder.reference().to_owned(),
        )
    }
}

impl Coder for DefaultCoder {
    fn code(&self) -> i32 {
        self.code
    }

    fn http_status(&self) -> u16 {
        if self.http == 0 {
            DEFAULT_HTTP_STATUS
        } else {
            self.http
        }
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for DefaultCoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
