// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative error-code catalogs.
//!
//! A catalog lists [`DefaultCoder`]s in TOML so a service can keep its
//! client-visible codes next to its configuration instead of in code:
//!
//! ```toml
//! [[coder]]
//! code = 110001
//! http_status = 404
//! message = "User not found"
//! reference = "https://docs.example.com/errors#110001"
//! ```
//!
//! [`parse_catalog`] / [`load_catalog`] read one, [`validate_catalog`] checks
//! it, and [`Catalog::apply`] registers it under a [`RegistrationPolicy`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use coded_error::{
    DEFAULT_HTTP_STATUS, DefaultCoder, RESERVED_CODE, Registry, RegistryError, UNKNOWN_CODE,
    global,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable naming the catalog file used by
/// [`load_catalog`] when no path is given.
pub const CATALOG_ENV: &str = "CODED_ERRORS_CATALOG";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading, validating or applying a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file does not exist.
    #[error("catalog file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The catalog file exists but could not be read.
    #[error("failed to read catalog {path}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid TOML catalog.
    #[error("failed to parse catalog: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("catalog validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// A registry rejected an entry while applying the catalog.
    #[error("failed to register catalog entry: {0}")]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent a catalog from being applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// The entry has no user-facing text.
    EmptyMessage {
        /// Offending code.
        code: i32,
    },
    /// The entry does not point at any documentation.
    MissingReference {
        /// Offending code.
        code: i32,
    },
    /// The entry replaces the built-in unknown Coder.
    OverridesUnknown,
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogWarning::EmptyMessage { code } => write!(f, "code {code} has an empty message"),
            CatalogWarning::MissingReference { code } => {
                write!(f, "code {code} has no documentation reference")
            }
            CatalogWarning::OverridesUnknown => {
                write!(f, "code {UNKNOWN_CODE} replaces the built-in unknown coder")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// An ordered list of Coders to register.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Catalog {
    /// Entries, in file order.
    #[serde(default, rename = "coder")]
    pub coders: Vec<DefaultCoder>,
}

/// How [`Catalog::apply`] treats codes that are already registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Replace existing entries ([`Registry::register`]).
    #[default]
    Override,
    /// Refuse existing entries ([`Registry::try_register`]); the first
    /// collision aborts the apply, leaving earlier entries registered.
    Strict,
}

impl Catalog {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coders.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coders.is_empty()
    }

    /// The entry for `code`, if listed.
    #[must_use]
    pub fn get(&self, code: i32) -> Option<&DefaultCoder> {
        self.coders.iter().find(|c| c.code == code)
    }

    /// Validate the catalog, then register every entry into `registry`.
    ///
    /// Returns the number of entries registered.
    pub fn apply(
        &self,
        registry: &Registry,
        policy: RegistrationPolicy,
    ) -> Result<usize, CatalogError> {
        validate_catalog(self)?;
        for coder in &self.coders {
            match policy {
                RegistrationPolicy::Override => registry.register(coder.clone()),
                RegistrationPolicy::Strict => registry.try_register(coder.clone())?,
            }
        }
        info!(entries = self.coders.len(), ?policy, "error catalog applied");
        Ok(self.coders.len())
    }

    /// [`Catalog::apply`] against the process-wide registry.
    pub fn apply_global(&self, policy: RegistrationPolicy) -> Result<usize, CatalogError> {
        self.apply(global(), policy)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a catalog.
///
/// * If `path` is `Some`, reads and parses the file.
/// * Otherwise, if [`CATALOG_ENV`] is set, reads the file it names.
/// * Otherwise returns an empty catalog.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    let from_env = std::env::var_os(CATALOG_ENV).map(std::path::PathBuf::from);
    match path.or(from_env.as_deref()) {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|source| {
                let path = p.display().to_string();
                if source.kind() == std::io::ErrorKind::NotFound {
                    CatalogError::FileNotFound { path }
                } else {
                    CatalogError::Io { path, source }
                }
            })?;
            parse_catalog(&content)
        }
        None => Ok(Catalog::default()),
    }
}

/// Parse a TOML string into a [`Catalog`].
pub fn parse_catalog(content: &str) -> Result<Catalog, CatalogError> {
    toml::from_str::<Catalog>(content).map_err(|e| CatalogError::ParseError {
        reason: e.to_string(),
    })
}

/// JSON Schema describing the catalog file format.
#[must_use]
pub fn catalog_schema() -> schemars::Schema {
    schemars::schema_for!(Catalog)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed catalog, returning advisory warnings.
///
/// Reserved code `0`, duplicate codes and HTTP statuses outside `100..=599`
/// are hard errors, reported together as a
/// [`CatalogError::ValidationError`]. An `http_status` of `0` is allowed and
/// reads back as the default (500).
pub fn validate_catalog(catalog: &Catalog) -> Result<Vec<CatalogWarning>, CatalogError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<CatalogWarning> = Vec::new();
    let mut seen = BTreeSet::new();

    for coder in &catalog.coders {
        let code = coder.code;
        if code == RESERVED_CODE {
            errors.push(format!(
                "code {RESERVED_CODE} is reserved for unregistered errors"
            ));
            continue;
        }
        if !seen.insert(code) {
            errors.push(format!("code {code} is listed more than once"));
        }
        if coder.http != 0 && !(100..=599).contains(&coder.http) {
            errors.push(format!(
                "code {code}: http_status {} out of range (100..=599, or 0 for {DEFAULT_HTTP_STATUS})",
                coder.http
            ));
        }
        if code == UNKNOWN_CODE {
            warnings.push(CatalogWarning::OverridesUnknown);
        }
        if coder.message.trim().is_empty() {
            warnings.push(CatalogWarning::EmptyMessage { code });
        }
        if coder.reference.trim().is_empty() {
            warnings.push(CatalogWarning::MissingReference { code });
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(CatalogError::ValidationError { reasons: errors })
    }
}
