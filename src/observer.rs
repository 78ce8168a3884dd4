//! Synchronous notification channel for developer-facing internal messages.
//!
//! A [`Normalizer`](crate::Normalizer) owns an [`ObserverRegistry`]. Whenever it
//! builds a record carrying a non-empty internal message, or is handed an absent
//! input together with one, it notifies every registered observer in
//! registration order. With no observers registered, notification is a no-op.
//!
//! ```rust
//! use remie::{ErrorInput, ErrorOptions, Normalizer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let mut normalizer = Normalizer::new();
//! normalizer.on_internal_message(move |event: &remie::InternalMessageEvent<'_>| {
//!     sink.borrow_mut().push(event.message().to_owned());
//! });
//!
//! let _ = normalizer.create(
//!     ErrorInput::text("Login failed"),
//!     &ErrorOptions::new().with_internal_message("password hash mismatch"),
//! );
//! assert_eq!(seen.borrow().as_slice(), ["password hash mismatch"]);
//! ```

use crate::logging::truncate_with_indicator;
use crate::models::{CanonicalError, ErrorOptions};
use smallvec::SmallVec;
use std::fmt;

/// Name of the only event this crate emits.
pub const ON_CREATE_INTERNAL_MESSAGE: &str = "create-internal-message";

/// Payload delivered to observers.
///
/// Borrows from the normalization call; observers that need to keep data must
/// copy it out.
#[derive(Debug, Clone, Copy)]
pub struct InternalMessageEvent<'a> {
    record: Option<&'a CanonicalError>,
    options: &'a ErrorOptions,
    message: &'a str,
}

impl<'a> InternalMessageEvent<'a> {
    #[inline]
    pub(crate) fn new(
        record: Option<&'a CanonicalError>,
        options: &'a ErrorOptions,
        message: &'a str,
    ) -> Self {
        Self {
            record,
            options,
            message,
        }
    }

    /// Event name, always [`ON_CREATE_INTERNAL_MESSAGE`].
    #[inline]
    pub const fn name(&self) -> &'static str {
        ON_CREATE_INTERNAL_MESSAGE
    }

    /// The record that was built, or `None` for an absent input.
    #[inline]
    pub const fn record(&self) -> Option<&'a CanonicalError> {
        self.record
    }

    /// Options passed to the normalization call.
    #[inline]
    pub const fn options(&self) -> &'a ErrorOptions {
        self.options
    }

    /// The internal message.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }
}

/// Receiver of internal-message events.
///
/// Implemented for every `Fn(&InternalMessageEvent<'_>)` closure.
pub trait InternalMessageObserver {
    /// Handle one event. Must not assume any other observer ran first.
    fn on_internal_message(&self, event: &InternalMessageEvent<'_>);
}

impl<F> InternalMessageObserver for F
where
    F: Fn(&InternalMessageEvent<'_>),
{
    fn on_internal_message(&self, event: &InternalMessageEvent<'_>) {
        self(event)
    }
}

/// Ordered list of observers owned by a normalizer.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: SmallVec<[Box<dyn InternalMessageObserver>; 2]>,
}

impl ObserverRegistry {
    /// Empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer.
    #[inline]
    pub fn register(&mut self, observer: impl InternalMessageObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Number of registered observers.
    #[inline]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver an event to every observer, in registration order.
    pub fn notify(&self, event: &InternalMessageEvent<'_>) {
        for observer in &self.observers {
            observer.on_internal_message(event);
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that forwards internal messages to `tracing` at `WARN`.
///
/// The message is truncated to a bounded length before it reaches the
/// subscriber. Register it only where the tracing output stays internal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl InternalMessageObserver for TracingObserver {
    fn on_internal_message(&self, event: &InternalMessageEvent<'_>) {
        let message = truncate_with_indicator(event.message());
        match event.record() {
            Some(record) => tracing::warn!(
                event_name = event.name(),
                status_code = record.status_code().value(),
                severity = record.level().as_str(),
                code = record.error().code().unwrap_or(""),
                internal_message = %message,
                "internal error message created"
            ),
            None => tracing::warn!(
                event_name = event.name(),
                internal_message = %message,
                "internal message without error"
            ),
        }
    }
}
