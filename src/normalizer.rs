//! Classification of arbitrary error inputs into canonical records.
//!
//! # Pipeline
//!
//! 1. **Classify** the input once into an [`InputKind`].
//! 2. **Build** a draft along the kind-specific path (prior record, system
//!    fault, locale key, plain string, opaque payload).
//! 3. **Overlay** the caller's options with a single precedence rule:
//!    explicit option > value derived from the input > configured default.
//! 4. **Notify** observers when the finished record carries an internal message.
//!
//! Nothing in this pipeline returns an error or panics: unexpected input
//! degrades to a best-effort record, because this code runs on the caller's
//! error path.
//!
//! ```rust
//! use remie::{ErrorInput, ErrorOptions, Level, Normalizer, StaticLocalizer};
//! use serde_json::json;
//!
//! let normalizer = Normalizer::new().with_localizer(StaticLocalizer::new(json!({
//!     "server": { "400": { "forbidden": "The page is forbidden" } }
//! })));
//!
//! let err = normalizer
//!     .create(ErrorInput::text("server.400.forbidden"), &ErrorOptions::new())
//!     .unwrap();
//! assert_eq!(err.error().message(), "The page is forbidden");
//! assert_eq!(err.error().code(), Some("server.400.forbidden"));
//! assert_eq!(err.status_code().value(), 403);
//! assert_eq!(err.level(), Level::Error);
//! ```

use crate::codes::{guess_status_code, StatusCode};
use crate::config::NormalizerConfig;
use crate::localizer::Localizer;
use crate::models::{
    CanonicalError, DataMap, ErrorOptions, Fault, InternalMessage, Level, RecordSnapshot,
};
use crate::observer::{InternalMessageEvent, InternalMessageObserver, ObserverRegistry};
use crate::presenter::{self, ExternalView};
use serde_json::Value;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io;

// ============================================================================
// Input Classification
// ============================================================================

/// Shape of an error input, decided once before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// No input at all.
    Empty,
    /// A record produced earlier.
    Prior,
    /// A Rust error value.
    SystemFault,
    /// Text: a locale key or a literal message.
    Text,
    /// Anything else; handled best-effort.
    Opaque,
}

/// Error-like value accepted by the normalizer.
///
/// ```rust
/// use remie::{ErrorInput, InputKind};
/// use serde_json::json;
///
/// assert_eq!(ErrorInput::from("disk full").kind(), InputKind::Text);
/// assert_eq!(ErrorInput::from(json!(null)).kind(), InputKind::Empty);
/// assert_eq!(ErrorInput::from(json!({ "retry": 3 })).kind(), InputKind::Opaque);
/// assert_eq!(ErrorInput::from(None::<&str>).kind(), InputKind::Empty);
/// ```
#[derive(Debug, Clone)]
pub enum ErrorInput<'a> {
    /// No input.
    Absent,
    /// Existing record to copy. The source is never modified.
    Prior(&'a CanonicalError),
    /// Captured Rust error.
    SystemFault(SystemFault),
    /// Locale key or literal message.
    Text(Cow<'a, str>),
    /// Arbitrary structured payload.
    Opaque(Value),
}

impl<'a> ErrorInput<'a> {
    /// Text input.
    #[inline]
    pub fn text(text: impl Into<Cow<'a, str>>) -> Self {
        Self::Text(text.into())
    }

    /// Capture a Rust error.
    #[inline]
    pub fn system(error: &(dyn Error + 'static)) -> Self {
        Self::SystemFault(SystemFault::from_error(error))
    }

    /// Classify a dynamic value: `null` is absent, strings are text, anything
    /// else is opaque.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::String(s) => Self::Text(Cow::Owned(s)),
            other => Self::Opaque(other),
        }
    }

    /// Classification of this input.
    #[inline]
    pub const fn kind(&self) -> InputKind {
        match self {
            Self::Absent => InputKind::Empty,
            Self::Prior(_) => InputKind::Prior,
            Self::SystemFault(_) => InputKind::SystemFault,
            Self::Text(_) => InputKind::Text,
            Self::Opaque(_) => InputKind::Opaque,
        }
    }
}

impl<'a> From<&'a str> for ErrorInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl From<String> for ErrorInput<'_> {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

impl<'a> From<&'a CanonicalError> for ErrorInput<'a> {
    fn from(value: &'a CanonicalError) -> Self {
        Self::Prior(value)
    }
}

impl From<SystemFault> for ErrorInput<'_> {
    fn from(value: SystemFault) -> Self {
        Self::SystemFault(value)
    }
}

impl From<io::Error> for ErrorInput<'_> {
    fn from(value: io::Error) -> Self {
        Self::SystemFault(SystemFault::from(&value))
    }
}

impl From<Value> for ErrorInput<'_> {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl<'a, T: Into<ErrorInput<'a>>> From<Option<T>> for ErrorInput<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

// ============================================================================
// System Faults
// ============================================================================

/// Owned capture of a Rust error: its message, an optional code, and its
/// `source()` chain rendered as the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFault {
    message: String,
    code: Option<String>,
    stack: Option<String>,
}

impl SystemFault {
    /// Capture `error`'s message and cause chain.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        Self {
            message: error.to_string(),
            code: None,
            stack: render_source_chain(error),
        }
    }

    /// Fault with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            stack: None,
        }
    }

    /// Attach the error's own code (stored lowercase on the record).
    #[inline]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Replace the captured stack.
    #[inline]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    fn into_fault(self) -> Fault {
        let fault = Fault::new(self.message).with_code_opt(self.code);
        match self.stack {
            Some(stack) => fault.with_stack(stack),
            None => fault,
        }
    }
}

impl From<&io::Error> for SystemFault {
    fn from(error: &io::Error) -> Self {
        // ErrorKind's Debug form is its variant name, e.g. `NotFound`
        Self::from_error(error).with_code(format!("{:?}", error.kind()))
    }
}

fn render_source_chain(error: &(dyn Error + 'static)) -> Option<String> {
    let mut stack = String::new();
    let mut current = error.source();
    while let Some(cause) = current {
        if !stack.is_empty() {
            stack.push('\n');
        }
        stack.push_str("caused by: ");
        stack.push_str(&cause.to_string());
        current = cause.source();
    }
    (!stack.is_empty()).then_some(stack)
}

// ============================================================================
// Draft Records
// ============================================================================

/// Result of a kind-specific build, before options are overlaid.
///
/// `None` means "the input said nothing about this field".
#[derive(Debug, Default)]
struct Draft {
    error: Fault,
    internal_only: Option<bool>,
    internal_message: Option<InternalMessage>,
    level: Option<Level>,
    status_code: Option<StatusCode>,
    message_data: Option<DataMap>,
    reference_data: Option<DataMap>,
}

impl Draft {
    fn from_fault(error: Fault) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }

    fn from_snapshot(snapshot: RecordSnapshot) -> Self {
        Self {
            error: snapshot.error,
            internal_only: Some(snapshot.internal_only),
            internal_message: snapshot.internal_message,
            level: Some(snapshot.level),
            status_code: Some(snapshot.status_code),
            message_data: snapshot.message_data,
            reference_data: snapshot.reference_data,
        }
    }

    fn from_locale(key: &str, options: &ErrorOptions, localizer: Option<&dyn Localizer>) -> Self {
        let params = options.message_data.as_ref();
        let message = match localizer {
            Some(localizer) => localizer.translate(key, params),
            None => key.to_owned(),
        };
        Self {
            error: Fault::new(message).with_code(key),
            status_code: Some(guess_status_code(Some(key))),
            message_data: params.cloned(),
            ..Self::default()
        }
    }

    fn from_string(text: &str, options: &ErrorOptions) -> Self {
        Self::from_fault(Fault::new(text).with_code_opt(options.code.as_deref()))
    }

    fn from_opaque(value: Value, config: &NormalizerConfig) -> Self {
        tracing::warn!(
            payload_kind = json_kind(&value),
            "normalizing unrecognized error input; result is best-effort"
        );

        if value.get("error").is_some_and(Value::is_object) {
            match serde_json::from_value::<RecordSnapshot>(value.clone()) {
                Ok(snapshot) => return Self::from_snapshot(snapshot),
                Err(e) => tracing::debug!(error = %e, "payload is not a full record; salvaging fields"),
            }
        }

        let nested = value.get("error").filter(|e| e.is_object());
        let field = |name: &str| {
            nested
                .and_then(|e| str_field(e, name))
                .or_else(|| str_field(&value, name))
        };

        let fault = match &value {
            Value::Object(_) => {
                let message = field("message").unwrap_or(config.default_message.as_str());
                let mut fault = Fault::new(message).with_code_opt(field("code"));
                if let Some(stack) = field("stack") {
                    fault = fault.with_stack(stack);
                }
                fault
            }
            Value::Null => Fault::new(config.default_message.as_str()),
            Value::String(s) => Fault::new(s.as_str()),
            other => Fault::new(other.to_string()),
        };

        let mut draft = Self::from_fault(fault);
        if value.is_object() {
            draft.internal_only = value.get("internalOnly").and_then(Value::as_bool);
            draft.internal_message = str_field(&value, "internalMessage").map(InternalMessage::from);
            draft.level = str_field(&value, "level").and_then(|s| s.parse::<Level>().ok());
            draft.status_code = ["statusCode", "httpStatusCode"]
                .iter()
                .find_map(|key| value.get(*key))
                .and_then(salvage_status);
            draft.message_data = value.get("messageData").and_then(Value::as_object).cloned();
            draft.reference_data = value.get("referenceData").and_then(Value::as_object).cloned();
        }
        draft
    }

    /// Overlay options: explicit option > draft value > configured default.
    fn finish(self, options: &ErrorOptions, config: &NormalizerConfig) -> CanonicalError {
        CanonicalError {
            error: self.error,
            internal_only: options
                .internal_only
                .or(self.internal_only)
                .unwrap_or(false),
            internal_message: options.internal_message.clone().or(self.internal_message),
            level: options.level.or(self.level).unwrap_or(config.default_level),
            status_code: validated_status(options.status_code)
                .or(self.status_code)
                .unwrap_or(config.default_status_code),
            message_data: options.message_data.clone().or(self.message_data),
            reference_data: options.reference_data.clone().or(self.reference_data),
            options: options.clone(),
        }
    }
}

fn validated_status(raw: Option<u16>) -> Option<StatusCode> {
    let raw = raw?;
    match StatusCode::checked_new(raw) {
        Ok(code) => Some(code),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring invalid status code option");
            None
        }
    }
}

fn str_field<'v>(node: &'v Value, name: &str) -> Option<&'v str> {
    node.get(name).and_then(Value::as_str)
}

fn salvage_status(raw: &Value) -> Option<StatusCode> {
    let code = raw
        .as_u64()
        .and_then(|n| u16::try_from(n).ok())
        .and_then(|n| StatusCode::checked_new(n).ok());
    if code.is_none() {
        tracing::warn!(status_code = %raw, "ignoring invalid status code in payload");
    }
    code
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Borrowed collaborators for one normalization call.
struct Engine<'n> {
    localizer: Option<&'n dyn Localizer>,
    config: &'n NormalizerConfig,
    observers: Option<&'n ObserverRegistry>,
}

impl Engine<'_> {
    fn normalize(&self, input: ErrorInput<'_>, options: &ErrorOptions) -> Option<CanonicalError> {
        let kind = input.kind();
        tracing::debug!(?kind, "classifying error input");

        let draft = match input {
            ErrorInput::Absent => {
                if let Some(message) = options.effective_internal_message() {
                    self.notify(None, options, message);
                }
                return None;
            }
            ErrorInput::Prior(record) => Draft::from_snapshot(record.to_object()),
            ErrorInput::SystemFault(fault) => Draft::from_fault(fault.into_fault()),
            ErrorInput::Text(text) => match self.localizer {
                Some(localizer) if localizer.exists(&text) => {
                    Draft::from_locale(&text, options, Some(localizer))
                }
                _ => Draft::from_string(&text, options),
            },
            ErrorInput::Opaque(value) => Draft::from_opaque(value, self.config),
        };

        Some(self.finish(draft, options))
    }

    fn finish(&self, draft: Draft, options: &ErrorOptions) -> CanonicalError {
        let record = draft.finish(options, self.config);
        if let Some(message) = record.internal_message.as_ref().filter(|m| !m.is_empty()) {
            self.notify(Some(&record), options, message);
        }
        record
    }

    fn notify(&self, record: Option<&CanonicalError>, options: &ErrorOptions, message: &InternalMessage) {
        if let Some(observers) = self.observers {
            observers.notify(&InternalMessageEvent::new(record, options, message.as_str()));
        }
    }
}

// ============================================================================
// Public Entry Points
// ============================================================================

/// Normalize `input` with default configuration and no observers.
///
/// Returns `None` only for [`ErrorInput::Absent`].
#[must_use]
pub fn normalize(
    input: ErrorInput<'_>,
    options: &ErrorOptions,
    localizer: Option<&dyn Localizer>,
) -> Option<CanonicalError> {
    let config = NormalizerConfig::default();
    Engine {
        localizer,
        config: &config,
        observers: None,
    }
    .normalize(input, options)
}

/// Build a record from a captured Rust error.
pub fn build_from_system_error(fault: SystemFault, options: &ErrorOptions) -> CanonicalError {
    Draft::from_fault(fault.into_fault()).finish(options, &NormalizerConfig::default())
}

/// Build a record from a locale key.
///
/// Without a localizer the key itself becomes the message.
pub fn build_from_locale(
    key: &str,
    options: &ErrorOptions,
    localizer: Option<&dyn Localizer>,
) -> CanonicalError {
    Draft::from_locale(key, options, localizer).finish(options, &NormalizerConfig::default())
}

/// Build a record from a literal message.
pub fn build_from_string(text: &str, options: &ErrorOptions) -> CanonicalError {
    Draft::from_string(text, options).finish(options, &NormalizerConfig::default())
}

/// Error factory owning a localizer, observers and defaults.
///
/// # Example
///
/// ```rust
/// use remie::{ErrorInput, ErrorOptions, Normalizer, TracingObserver};
///
/// let mut normalizer = Normalizer::new();
/// normalizer.on_internal_message(TracingObserver);
///
/// let err = normalizer
///     .create_internal(ErrorInput::text("Ledger out of balance"), &ErrorOptions::new())
///     .unwrap();
/// assert!(err.internal_only());
/// assert!(normalizer.present(&err).is_none());
/// ```
#[derive(Default)]
pub struct Normalizer {
    localizer: Option<Box<dyn Localizer>>,
    observers: ObserverRegistry,
    config: NormalizerConfig,
}

impl Normalizer {
    /// Normalizer with default configuration, no localizer and no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a localizer.
    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Some(Box::new(localizer));
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: NormalizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the configuration in place.
    pub fn set(&mut self, config: NormalizerConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Current configuration.
    #[inline]
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Attached localizer, if any.
    #[inline]
    pub fn localizer(&self) -> Option<&dyn Localizer> {
        self.localizer.as_deref()
    }

    /// Register an internal-message observer.
    pub fn on_internal_message(
        &mut self,
        observer: impl InternalMessageObserver + 'static,
    ) -> &mut Self {
        self.observers.register(observer);
        self
    }

    /// Deliver an internal message to the registered observers directly,
    /// with or without a record. Empty messages are not delivered.
    pub fn handle(&self, record: Option<&CanonicalError>, options: &ErrorOptions, message: &str) {
        if message.is_empty() {
            return;
        }
        self.observers
            .notify(&InternalMessageEvent::new(record, options, message));
    }

    /// Registered observers.
    #[inline]
    pub const fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    fn engine(&self) -> Engine<'_> {
        Engine {
            localizer: self.localizer(),
            config: &self.config,
            observers: Some(&self.observers),
        }
    }

    /// Normalize `input`. Returns `None` only for [`ErrorInput::Absent`].
    #[must_use]
    pub fn create(&self, input: ErrorInput<'_>, options: &ErrorOptions) -> Option<CanonicalError> {
        self.engine().normalize(input, options)
    }

    /// Normalize `input` as an internal-only record.
    ///
    /// The caller's options are left untouched; a copy with the flag set is used.
    #[must_use]
    pub fn create_internal(
        &self,
        input: ErrorInput<'_>,
        options: &ErrorOptions,
    ) -> Option<CanonicalError> {
        let internal = options.clone().with_internal_only(true);
        self.engine().normalize(input, &internal)
    }

    /// Independent copy of `record`, with `options` overlaid.
    pub fn copy(&self, record: &CanonicalError, options: &ErrorOptions) -> CanonicalError {
        self.engine()
            .finish(Draft::from_snapshot(record.to_object()), options)
    }

    /// Generic server error: the default locale key when the localizer knows
    /// it, otherwise the default message.
    pub fn generic(&self, options: &ErrorOptions) -> CanonicalError {
        let engine = self.engine();
        let key = self.config.default_locale.as_str();
        let draft = match self.localizer() {
            Some(localizer) if localizer.exists(key) => {
                Draft::from_locale(key, options, Some(localizer))
            }
            _ => Draft::from_string(&self.config.default_message, options),
        };
        engine.finish(draft, options)
    }

    /// External view using the record's policy, else this normalizer's default.
    #[must_use]
    pub fn present(&self, record: &CanonicalError) -> Option<ExternalView> {
        let policy = record
            .options()
            .sanitize
            .as_ref()
            .unwrap_or(&self.config.sanitize);
        presenter::present(record, policy)
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("localizer", &self.localizer.as_ref().map(|_| "<PRESENT>"))
            .field("observers", &self.observers)
            .field("config", &self.config)
            .finish()
    }
}
