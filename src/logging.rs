//! Structured log view of a canonical error for trusted sinks.
//!
//! # Properties
//!
//! - Borrows from the `CanonicalError` with an explicit lifetime
//! - Cannot outlive the record that created it
//! - No heap allocation in accessors
//! - `write_to` truncates every field so one oversized message cannot flood a log
//!
//! Unlike the presenter, this view DOES include the internal message and the
//! stack. It exists for developer-facing logs and must never be returned to an
//! external caller.

use crate::codes::StatusCode;
use crate::models::{DataMap, Level};
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Structured log entry borrowing from a record.
///
/// # Example
///
/// ```rust
/// # use remie::{normalize, ErrorInput, ErrorOptions};
/// let err = normalize(
///     ErrorInput::text("Payment declined"),
///     &ErrorOptions::new().with_internal_message("issuer returned 05"),
///     None,
/// )
/// .unwrap();
///
/// let mut line = String::new();
/// err.internal_log().write_to(&mut line).unwrap();
/// assert_eq!(
///     line,
///     "[500] error message='Payment declined' internal='issuer returned 05'"
/// );
/// ```
#[derive(Debug)]
pub struct InternalLog<'a> {
    pub(crate) status_code: StatusCode,
    pub(crate) level: Level,
    pub(crate) message: &'a str,
    pub(crate) code: Option<&'a str>,
    pub(crate) stack: Option<&'a str>,
    pub(crate) internal_message: Option<&'a str>,
    pub(crate) internal_only: bool,
    pub(crate) reference_data: Option<&'a DataMap>,
}

impl<'a> InternalLog<'a> {
    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Materializes the internal message and stack into a `String`. Only
    /// available with the `trusted_debug` feature in debug builds.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut output);
        if let Some(stack) = self.stack {
            output.push_str(&format!("\n{}", truncate_with_indicator(stack)));
        }
        output
    }

    /// Write a single structured line to a formatter.
    ///
    /// Fields are truncated at a fixed length on a UTF-8 boundary. The stack is
    /// left out of the line; read it through [`InternalLog::stack`].
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] {}{} message='{}'",
            self.status_code,
            self.level,
            if self.internal_only { " [INTERNAL]" } else { "" },
            truncate_with_indicator(self.message)
        )?;

        if let Some(code) = self.code {
            write!(f, " code='{}'", truncate_with_indicator(code))?;
        }

        if let Some(internal) = self.internal_message {
            write!(f, " internal='{}'", truncate_with_indicator(internal))?;
        }

        if let Some(reference) = self.reference_data {
            for (key, value) in reference {
                let rendered = value.to_string();
                write!(
                    f,
                    " {}='{}'",
                    truncate_with_indicator(key),
                    truncate_with_indicator(&rendered)
                )?;
            }
        }

        Ok(())
    }

    /// Status code of the record.
    #[inline]
    pub const fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Severity of the record.
    #[inline]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Fault message, untruncated.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Lowercase fault code, if any.
    #[inline]
    pub const fn code(&self) -> Option<&'a str> {
        self.code
    }

    /// Stack or cause chain, if any.
    #[inline]
    pub const fn stack(&self) -> Option<&'a str> {
        self.stack
    }

    /// Developer-only message, if any.
    #[inline]
    pub const fn internal_message(&self) -> Option<&'a str> {
        self.internal_message
    }

    /// Whether the record is internal-only.
    #[inline]
    pub const fn is_internal_only(&self) -> bool {
        self.internal_only
    }

    /// Reference data attached to the record.
    ///
    /// Not truncated here; serialization limits are the sink's responsibility.
    #[inline]
    pub const fn reference_data(&self) -> Option<&'a DataMap> {
        self.reference_data
    }
}

/// Truncate a string for display to prevent log flooding by oversized messages.
///
/// Returns a `Cow<str>` to avoid allocation when no truncation is needed.
pub(crate) fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    // Last valid UTF-8 boundary at or before the limit
    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn log_with<'a>(message: &'a str, reference: Option<&'a DataMap>) -> InternalLog<'a> {
        InternalLog {
            status_code: StatusCode::NOT_FOUND,
            level: Level::Warn,
            message,
            code: Some("server.400.notfound"),
            stack: Some("at handler()"),
            internal_message: Some("route table miss"),
            internal_only: true,
            reference_data: reference,
        }
    }

    #[test]
    fn write_to_includes_internal_fields() {
        let reference = json!({ "path": "/admin" });
        let log = log_with("Not found", reference.as_object());
        let mut out = String::new();
        log.write_to(&mut out).unwrap();

        assert_eq!(
            out,
            "[404] warn [INTERNAL] message='Not found' code='server.400.notfound' \
             internal='route table miss' path='\"/admin\"'"
        );
        assert!(!out.contains("at handler()"));
    }

    #[test]
    fn write_to_bounds_huge_messages() {
        let huge = "x".repeat(10 * MAX_FIELD_OUTPUT_LEN);
        let log = log_with(&huge, None);
        let mut out = String::new();
        log.write_to(&mut out).unwrap();
        assert!(out.len() < 3 * MAX_FIELD_OUTPUT_LEN);
        assert!(out.contains(TRUNCATION_INDICATOR));
    }

    #[test]
    fn truncate_ascii() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 10);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn no_truncate_when_under_limit() {
        let truncated = truncate_with_indicator("short string");
        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated, "short string");
    }

    #[test]
    fn truncate_utf8_boundary() {
        let s = "й".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated.len(), MAX_FIELD_OUTPUT_LEN);
    }

    #[test]
    fn accessors_borrow_fields() {
        let log = log_with("m", None);
        assert_eq!(log.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(log.level(), Level::Warn);
        assert_eq!(log.stack(), Some("at handler()"));
        assert_eq!(log.internal_message(), Some("route table miss"));
        assert!(log.is_internal_only());
        assert!(log.reference_data().is_none());
    }
}
