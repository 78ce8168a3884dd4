//! Canonical error record and the values it carries.
//!
//! # Architecture
//!
//! - `Fault`: the message/code/stack triple describing the actual failure
//! - `InternalMessage`: developer-only context that never crosses the trust boundary
//! - `ErrorOptions`: caller-supplied construction options
//! - `CanonicalError`: the normalized record produced by the [`Normalizer`](crate::Normalizer)
//! - `RecordSnapshot`: a plain projection of every record field, used for copies
//!   and trusted logging
//!
//! # Trust Boundary
//!
//! `InternalMessage` renders a redaction placeholder through `Display` and is
//! zeroized on drop, the same treatment internal diagnostics get elsewhere in this
//! crate. The only way to read it is the explicit `as_str()` accessor.

use crate::codes::StatusCode;
use crate::logging::InternalLog;
use crate::presenter::{self, ExternalView, VisibilityPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Parameter and reference data attached to a record.
pub type DataMap = serde_json::Map<String, Value>;

// ============================================================================
// Severity Level
// ============================================================================

/// Severity of a canonical error.
///
/// Serialized in lowercase (`"fatal"`, `"error"`, ...) to match log-level names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Irrecoverable for the process.
    Fatal,
    /// Failed operation; the default.
    #[default]
    Error,
    /// Non-fatal problem allowing forward progress.
    Warn,
    /// Informational.
    Info,
    /// Development diagnostics.
    Debug,
    /// Most verbose.
    Trace,
}

impl Level {
    /// Every level, most to least severe.
    pub const ALL: [Level; 6] = [
        Self::Fatal,
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Lowercase name of the level.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error level '{0}'")]
pub struct LevelParseError(String);

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LevelParseError(s.to_owned()))
    }
}

// ============================================================================
// Internal Message
// ============================================================================

/// Developer-only context attached to a record.
///
/// Never emitted by the presenter. Cleared from memory on drop.
///
/// # Display Policy
///
/// `Display` ALWAYS writes a redacted placeholder so the message cannot leak
/// through generic formatting. Use [`InternalMessage::as_str`] in trusted code.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalMessage(String);

impl InternalMessage {
    /// Wrap a developer-facing message.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Raw message for trusted logging.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the message is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for InternalMessage {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InternalMessage {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InternalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[INTERNAL MESSAGE REDACTED]")
    }
}

impl fmt::Debug for InternalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InternalMessage([REDACTED])")
    }
}

// ============================================================================
// Fault
// ============================================================================

/// The underlying failure: message, optional lowercase code, optional stack.
///
/// The code is lowercased on every path that sets it, including deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FaultRepr")]
pub struct Fault {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

#[derive(Deserialize)]
struct FaultRepr {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    stack: Option<String>,
}

impl From<FaultRepr> for Fault {
    fn from(repr: FaultRepr) -> Self {
        Self::new(repr.message)
            .with_code_opt(repr.code)
            .with_stack_opt(repr.stack)
    }
}

impl Fault {
    /// Create a fault with a message and no code or stack.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            stack: None,
        }
    }

    /// Attach a code. Stored lowercase.
    #[inline]
    pub fn with_code(mut self, code: impl AsRef<str>) -> Self {
        self.code = Some(code.as_ref().to_lowercase());
        self
    }

    /// Attach a code if one is given. Stored lowercase.
    #[inline]
    pub fn with_code_opt(mut self, code: Option<impl AsRef<str>>) -> Self {
        self.code = code.map(|c| c.as_ref().to_lowercase());
        self
    }

    /// Attach a stack trace.
    #[inline]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[inline]
    fn with_stack_opt(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }

    /// Human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Lowercase identifier, if any.
    #[inline]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Stack or cause trace, if any.
    #[inline]
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }
}

// ============================================================================
// Construction Options
// ============================================================================

/// Options supplied when normalizing an error.
///
/// Unset fields mean "no preference": the normalizer falls back to the value the
/// input itself carries, then to the configured default. Options are never
/// modified by the normalizer.
///
/// Deserializes from camelCase keys; `httpStatusCode` and `sanitizeOptions` are
/// accepted as aliases.
///
/// ```rust
/// # use remie::{ErrorOptions, Level};
/// let options = ErrorOptions::new()
///     .with_level(Level::Warn)
///     .with_status_code(409)
///     .with_internal_message("duplicate row in accounts table");
/// assert_eq!(options.level, Some(Level::Warn));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorOptions {
    /// Force the record to stay inside the trust boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_only: Option<bool>,
    /// Developer-only message; fires the internal-message event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_message: Option<InternalMessage>,
    /// Severity override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// Status code override; validated during normalization.
    #[serde(alias = "httpStatusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Interpolation parameters for localized messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_data: Option<DataMap>,
    /// Context related to the cause of the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_data: Option<DataMap>,
    /// Code for plain-string errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Visibility policy used by [`CanonicalError::sanitize`].
    #[serde(alias = "sanitizeOptions", skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<VisibilityPolicy>,
}

impl ErrorOptions {
    /// Empty options.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the internal-only flag.
    #[inline]
    pub fn with_internal_only(mut self, internal_only: bool) -> Self {
        self.internal_only = Some(internal_only);
        self
    }

    /// Set the developer-only message.
    #[inline]
    pub fn with_internal_message(mut self, message: impl Into<InternalMessage>) -> Self {
        self.internal_message = Some(message.into());
        self
    }

    /// Set the severity.
    #[inline]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the status code.
    #[inline]
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Set localization parameters.
    #[inline]
    pub fn with_message_data(mut self, data: DataMap) -> Self {
        self.message_data = Some(data);
        self
    }

    /// Set reference data.
    #[inline]
    pub fn with_reference_data(mut self, data: DataMap) -> Self {
        self.reference_data = Some(data);
        self
    }

    /// Set the code used for plain-string errors.
    #[inline]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the record's default visibility policy.
    #[inline]
    pub fn with_sanitize(mut self, policy: VisibilityPolicy) -> Self {
        self.sanitize = Some(policy);
        self
    }

    /// Internal message, if set and non-empty.
    #[inline]
    pub(crate) fn effective_internal_message(&self) -> Option<&InternalMessage> {
        self.internal_message.as_ref().filter(|m| !m.is_empty())
    }
}

// ============================================================================
// Canonical Record
// ============================================================================

/// Normalized error record.
///
/// Built by the [`Normalizer`](crate::Normalizer); read through accessors.
/// The only mutation path is [`CanonicalError::set`], which rebuilds every field
/// from a [`RecordSnapshot`].
///
/// # Display
///
/// `Display` is safe for untrusted viewers: it never renders the internal
/// message, and internal-only records render a generic line.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalError {
    pub(crate) error: Fault,
    pub(crate) internal_only: bool,
    pub(crate) internal_message: Option<InternalMessage>,
    pub(crate) level: Level,
    pub(crate) status_code: StatusCode,
    pub(crate) message_data: Option<DataMap>,
    pub(crate) reference_data: Option<DataMap>,
    pub(crate) options: ErrorOptions,
}

impl CanonicalError {
    /// Underlying fault.
    #[inline]
    pub const fn error(&self) -> &Fault {
        &self.error
    }

    /// Whether the record must stay inside the trust boundary.
    #[inline]
    pub const fn internal_only(&self) -> bool {
        self.internal_only
    }

    /// Developer-only message, for trusted code.
    #[inline]
    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_ref().map(InternalMessage::as_str)
    }

    /// Severity.
    #[inline]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Status code, always in `100..=599`.
    #[inline]
    pub const fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Localization parameters.
    #[inline]
    pub const fn message_data(&self) -> Option<&DataMap> {
        self.message_data.as_ref()
    }

    /// Reference data.
    #[inline]
    pub const fn reference_data(&self) -> Option<&DataMap> {
        self.reference_data.as_ref()
    }

    /// Options the record was built with.
    #[inline]
    pub const fn options(&self) -> &ErrorOptions {
        &self.options
    }

    /// Read a field by its wire name.
    ///
    /// `message`, `code` and `stack` read through to the fault. Unknown keys and
    /// unset fields return `None`.
    pub fn get(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "message" => Some(FieldValue::Text(self.error.message())),
            "code" => self.error.code().map(FieldValue::Text),
            "stack" => self.error.stack().map(FieldValue::Text),
            "internalOnly" => Some(FieldValue::Flag(self.internal_only)),
            "internalMessage" => self.internal_message().map(FieldValue::Text),
            "level" => Some(FieldValue::Level(self.level)),
            "statusCode" | "httpStatusCode" => Some(FieldValue::Status(self.status_code)),
            "messageData" => self.message_data.as_ref().map(FieldValue::Data),
            "referenceData" => self.reference_data.as_ref().map(FieldValue::Data),
            _ => None,
        }
    }

    /// Plain projection of every field, including internal ones.
    ///
    /// For copying and trusted logs only. Use [`CanonicalError::sanitize`] for
    /// anything leaving the process.
    pub fn to_object(&self) -> RecordSnapshot {
        RecordSnapshot {
            error: self.error.clone(),
            internal_only: self.internal_only,
            internal_message: self.internal_message.clone(),
            level: self.level,
            status_code: self.status_code,
            message_data: self.message_data.clone(),
            reference_data: self.reference_data.clone(),
            options: self.options.clone(),
        }
    }

    /// Rebuild every field from a snapshot.
    pub fn set(&mut self, snapshot: RecordSnapshot) -> &mut Self {
        *self = Self::from(snapshot);
        self
    }

    /// External view using the record's own policy, or the default one.
    #[must_use]
    pub fn sanitize(&self) -> Option<ExternalView> {
        match &self.options.sanitize {
            Some(policy) => presenter::present(self, policy),
            None => presenter::present(self, &VisibilityPolicy::default()),
        }
    }

    /// External view using an explicit policy.
    #[must_use]
    #[inline]
    pub fn sanitize_with(&self, policy: &VisibilityPolicy) -> Option<ExternalView> {
        presenter::present(self, policy)
    }

    /// Structured view for trusted logs, borrowing from this record.
    #[inline]
    pub fn internal_log(&self) -> InternalLog<'_> {
        InternalLog {
            status_code: self.status_code,
            level: self.level,
            message: self.error.message(),
            code: self.error.code(),
            stack: self.error.stack(),
            internal_message: self.internal_message(),
            internal_only: self.internal_only,
            reference_data: self.reference_data.as_ref(),
        }
    }

    /// Callback-style access to [`CanonicalError::internal_log`].
    #[inline]
    pub fn with_internal_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InternalLog<'_>) -> R,
    {
        let log = self.internal_log();
        f(&log)
    }
}

impl From<RecordSnapshot> for CanonicalError {
    fn from(snapshot: RecordSnapshot) -> Self {
        Self {
            error: snapshot.error,
            internal_only: snapshot.internal_only,
            internal_message: snapshot.internal_message,
            level: snapshot.level,
            status_code: snapshot.status_code,
            message_data: snapshot.message_data,
            reference_data: snapshot.reference_data,
            options: snapshot.options,
        }
    }
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.internal_only {
            write!(f, "[{}] internal error ({})", self.level, self.status_code)
        } else {
            write!(
                f,
                "[{}] {} ({})",
                self.level,
                self.error.message(),
                self.status_code
            )
        }
    }
}

impl std::error::Error for CanonicalError {}

/// Borrowed field value returned by [`CanonicalError::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// String field.
    Text(&'a str),
    /// Boolean field.
    Flag(bool),
    /// Severity.
    Level(Level),
    /// Status code.
    Status(StatusCode),
    /// Parameter or reference map.
    Data(&'a DataMap),
}

/// Every field of a record as plain data.
///
/// Produced by [`CanonicalError::to_object`]; consumed by [`CanonicalError::set`]
/// and by the normalizer's copy path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSnapshot {
    /// Underlying fault.
    pub error: Fault,
    /// Internal-only flag.
    #[serde(default)]
    pub internal_only: bool,
    /// Developer-only message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_message: Option<InternalMessage>,
    /// Severity.
    #[serde(default)]
    pub level: Level,
    /// Status code.
    #[serde(default, alias = "httpStatusCode")]
    pub status_code: StatusCode,
    /// Localization parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_data: Option<DataMap>,
    /// Reference data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_data: Option<DataMap>,
    /// Construction options.
    #[serde(default)]
    pub options: ErrorOptions,
}
