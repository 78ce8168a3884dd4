//! HTTP-style status codes carried by canonical errors.
//!
//! Every record holds a [`StatusCode`] that is guaranteed to lie in `100..=599`.
//! Values coming from caller options or from locale keys are validated once, at
//! construction, and anything out of range falls back to the configured default
//! instead of failing the error path.
//!
//! # Locale Key Guessing
//!
//! Locale keys are dot-delimited category paths such as `server.404.missing`.
//! [`guess_status_code`] derives a status from the key's structure:
//!
//! ```rust
//! use remie::codes::{guess_status_code, StatusCode};
//!
//! assert_eq!(guess_status_code(Some("server.400.forbidden")), StatusCode::FORBIDDEN);
//! assert_eq!(guess_status_code(Some("server.409.conflict")).value(), 409);
//! assert_eq!(guess_status_code(Some("billing.card.declined")), StatusCode::INTERNAL_SERVER_ERROR);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lowest valid status code (inclusive).
pub const MIN_STATUS_CODE: u16 = 100;

/// Highest valid status code (inclusive).
pub const MAX_STATUS_CODE: u16 = 599;

/// Locale keys with a fixed status code, compared ASCII case-insensitively.
const RECOGNIZED_LOCALE_KEYS: [(&str, StatusCode); 3] = [
    ("server.400.forbidden", StatusCode::FORBIDDEN),
    ("server.400.notfound", StatusCode::NOT_FOUND),
    ("server.400.unauthorized", StatusCode::UNAUTHORIZED),
];

/// First path segment that marks a key as carrying its own status code.
const SERVER_CATEGORY: &str = "server";

/// Validated HTTP-style status code (100-599).
///
/// # Copy Semantics
///
/// Small numeric value with no ownership concerns, passed by value everywhere.
///
/// # Example
///
/// ```rust
/// # use remie::StatusCode;
/// const TEAPOT: StatusCode = StatusCode::new(418);
/// assert!(StatusCode::checked_new(42).is_err());
/// assert_eq!(TEAPOT.value(), 418);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StatusCode(u16);

impl StatusCode {
    /// 401 Unauthorized.
    pub const UNAUTHORIZED: Self = Self(401);
    /// 403 Forbidden.
    pub const FORBIDDEN: Self = Self(403);
    /// 404 Not Found.
    pub const NOT_FOUND: Self = Self(404);
    /// 500 Internal Server Error, the global default.
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Create a status code with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics at compile time (in const contexts) or at runtime if the value is
    /// outside `100..=599`. Use [`StatusCode::checked_new`] for untrusted input.
    #[inline]
    pub const fn new(code: u16) -> Self {
        assert!(
            code >= MIN_STATUS_CODE && code <= MAX_STATUS_CODE,
            "Status code must be 100-599"
        );
        Self(code)
    }

    /// Create a status code with runtime validation.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError::OutOfRange`] if the value is outside `100..=599`.
    #[inline]
    pub fn checked_new(code: u16) -> Result<Self, StatusCodeError> {
        if (MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&code) {
            Ok(Self(code))
        } else {
            Err(StatusCodeError::OutOfRange { value: code })
        }
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Whether this is a client-side (4xx) status.
    #[inline]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Whether this is a server-side (5xx) status.
    #[inline]
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = StatusCodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::checked_new(value)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for status code validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusCodeError {
    /// Value lies outside `100..=599`.
    #[error("status code {value} is outside the valid range (100-599)")]
    OutOfRange {
        /// The rejected value.
        value: u16,
    },
}

/// Guess the status code for a locale key from its structure.
///
/// Resolution order:
/// 1. Recognized keys (`server.400.forbidden`, `server.400.notFound`,
///    `server.400.unauthorized`) map to 403, 404 and 401.
/// 2. Keys whose first segment is `server` use their second segment as the code,
///    provided it parses to a valid status.
/// 3. Everything else, including an absent or empty key, is 500.
pub fn guess_status_code(locale_key: Option<&str>) -> StatusCode {
    let Some(key) = locale_key.filter(|k| !k.is_empty()) else {
        return StatusCode::INTERNAL_SERVER_ERROR;
    };

    if let Some((_, code)) = RECOGNIZED_LOCALE_KEYS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(key))
    {
        return *code;
    }

    let mut segments = key.split('.');
    if segments.next() == Some(SERVER_CATEGORY) {
        if let Some(code) = segments
            .next()
            .and_then(|segment| segment.parse::<u16>().ok())
            .and_then(|value| StatusCode::checked_new(value).ok())
        {
            return code;
        }
    }

    StatusCode::INTERNAL_SERVER_ERROR
}
