//! Redacted external views of canonical errors.
//!
//! The presenter is the single path by which a record crosses the trust
//! boundary. It never emits the internal message, the internal-only flag, or the
//! retained construction options, whatever the policy says.
//!
//! # Policy Semantics
//!
//! Every field is included by default. A policy can switch a field off; it can
//! never switch on something the record does not carry. The nested fault policy
//! includes `message` and `code` by default, while `stack` is opt-in:
//!
//! ```rust
//! use remie::{normalize, ErrorInput, ErrorOptions, FaultPolicy, VisibilityPolicy};
//!
//! let record = normalize(ErrorInput::text("Out of cheese"), &ErrorOptions::new(), None).unwrap();
//!
//! let view = record.sanitize_with(&VisibilityPolicy::default()).unwrap();
//! assert_eq!(view.error.as_ref().unwrap().message.as_deref(), Some("Out of cheese"));
//!
//! let terse = VisibilityPolicy::default().with_level(false).with_status_code(false);
//! let view = record.sanitize_with(&terse).unwrap();
//! assert!(view.level.is_none() && view.status_code.is_none());
//! ```

use crate::codes::StatusCode;
use crate::models::{CanonicalError, DataMap, Fault, Level};
use serde::{Deserialize, Serialize};

/// Per-field inclusion policy for [`present`].
///
/// Deserializes from the camelCase keys used by the rest of the crate; unknown
/// keys are ignored. `httpStatusCode` is accepted for `statusCode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityPolicy {
    /// Suppress the whole view regardless of the record's own flag.
    pub internal_only: bool,
    /// Fault projection: a toggle or a per-field policy.
    pub error: FaultVisibility,
    /// Include the severity.
    pub level: bool,
    /// Include the status code.
    #[serde(alias = "httpStatusCode")]
    pub status_code: bool,
    /// Include localization parameters.
    pub message_data: bool,
    /// Include reference data.
    pub reference_data: bool,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            internal_only: false,
            error: FaultVisibility::default(),
            level: true,
            status_code: true,
            message_data: true,
            reference_data: true,
        }
    }
}

impl VisibilityPolicy {
    /// Policy that suppresses every view.
    pub fn suppress_all() -> Self {
        Self {
            internal_only: true,
            ..Self::default()
        }
    }

    /// Set the fault projection.
    #[inline]
    pub fn with_error(mut self, error: impl Into<FaultVisibility>) -> Self {
        self.error = error.into();
        self
    }

    /// Toggle the severity.
    #[inline]
    pub fn with_level(mut self, include: bool) -> Self {
        self.level = include;
        self
    }

    /// Toggle the status code.
    #[inline]
    pub fn with_status_code(mut self, include: bool) -> Self {
        self.status_code = include;
        self
    }

    /// Toggle localization parameters.
    #[inline]
    pub fn with_message_data(mut self, include: bool) -> Self {
        self.message_data = include;
        self
    }

    /// Toggle reference data.
    #[inline]
    pub fn with_reference_data(mut self, include: bool) -> Self {
        self.reference_data = include;
        self
    }
}

/// Fault projection: `false` drops the fault, `true` uses the default field
/// policy, an object selects fields individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaultVisibility {
    /// Whole-fault toggle.
    Toggle(bool),
    /// Per-field selection.
    Fields(FaultPolicy),
}

impl Default for FaultVisibility {
    fn default() -> Self {
        Self::Fields(FaultPolicy::default())
    }
}

impl From<bool> for FaultVisibility {
    fn from(include: bool) -> Self {
        Self::Toggle(include)
    }
}

impl From<FaultPolicy> for FaultVisibility {
    fn from(policy: FaultPolicy) -> Self {
        Self::Fields(policy)
    }
}

impl FaultVisibility {
    /// Field policy in effect, or `None` when the fault is switched off.
    #[inline]
    fn policy(&self) -> Option<FaultPolicy> {
        match self {
            Self::Toggle(false) => None,
            Self::Toggle(true) => Some(FaultPolicy::default()),
            Self::Fields(policy) => Some(*policy),
        }
    }
}

/// Per-field selection inside the fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultPolicy {
    /// Include the message (default on).
    pub message: bool,
    /// Include the code (default on).
    pub code: bool,
    /// Include the stack (default off).
    pub stack: bool,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self {
            message: true,
            code: true,
            stack: false,
        }
    }
}

impl FaultPolicy {
    /// Default selection plus the stack.
    pub fn with_stack() -> Self {
        Self {
            stack: true,
            ..Self::default()
        }
    }
}

/// Projection of a record that is safe to return to an external caller.
///
/// Absent fields are skipped when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalView {
    /// Projected fault.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExternalFault>,
    /// Severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// Status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<StatusCode>,
    /// Localization parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_data: Option<DataMap>,
    /// Reference data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_data: Option<DataMap>,
}

impl ExternalView {
    /// Render as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // Only string keys and plain values: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Projected fault fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalFault {
    /// Message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Lowercase code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Stack trace, only when explicitly requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Produce the external view of `record` under `policy`.
///
/// Returns `None` when the record or the policy is internal-only. Never panics.
#[must_use]
pub fn present(record: &CanonicalError, policy: &VisibilityPolicy) -> Option<ExternalView> {
    if record.internal_only || policy.internal_only {
        tracing::debug!(
            status_code = record.status_code.value(),
            "withholding internal-only error from external view"
        );
        return None;
    }

    Some(ExternalView {
        error: policy
            .error
            .policy()
            .map(|fault_policy| project_fault(&record.error, fault_policy)),
        level: policy.level.then_some(record.level),
        status_code: policy.status_code.then_some(record.status_code),
        message_data: record
            .message_data
            .as_ref()
            .filter(|_| policy.message_data)
            .cloned(),
        reference_data: record
            .reference_data
            .as_ref()
            .filter(|_| policy.reference_data)
            .cloned(),
    })
}

fn project_fault(fault: &Fault, policy: FaultPolicy) -> ExternalFault {
    ExternalFault {
        message: Some(fault.message())
            .filter(|m| policy.message && !m.is_empty())
            .map(str::to_owned),
        code: fault.code().filter(|_| policy.code).map(str::to_owned),
        stack: fault.stack().filter(|_| policy.stack).map(str::to_owned),
    }
}
