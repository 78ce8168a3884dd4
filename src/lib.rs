//! # Remie
//!
//! Normalize heterogeneous error inputs into one canonical record, and present
//! that record safely to external callers.
//!
//! ## Design Philosophy
//!
//! 1. **One record shape** regardless of where an error came from
//! 2. **Internal context stays internal**: internal messages and internal-only
//!    records never reach the external view
//! 3. **Never fail on the error path**: unexpected input degrades to a
//!    best-effort record instead of a second error
//! 4. **Explicit options win**, then what the input carries, then defaults
//!
//! ## Trust Boundary
//!
//! - [`CanonicalError::sanitize`] and [`present`] produce the only view meant
//!   for clients. Stacks are hidden unless a policy opts in.
//! - [`CanonicalError::to_object`] and [`CanonicalError::internal_log`] expose
//!   everything and are for trusted code only.
//! - `Display` on a record never renders the internal message.
//!
//! ## Quick Start
//!
//! ```rust
//! use remie::{ErrorInput, ErrorOptions, Normalizer, StaticLocalizer};
//! use serde_json::json;
//!
//! let normalizer = Normalizer::new().with_localizer(StaticLocalizer::new(json!({
//!     "server": { "400": { "notfound": "The page {{- page}} could not be found" } }
//! })));
//!
//! let params = json!({ "page": "/admin" });
//! let err = normalizer
//!     .create(
//!         ErrorInput::text("server.400.notfound"),
//!         &ErrorOptions::new()
//!             .with_message_data(params.as_object().cloned().unwrap_or_default())
//!             .with_internal_message("route table has no /admin entry"),
//!     )
//!     .unwrap();
//!
//! let body = err.sanitize().unwrap().to_json();
//! assert_eq!(body["statusCode"], 404);
//! assert_eq!(body["error"]["message"], "The page /admin could not be found");
//! assert!(body.get("internalMessage").is_none());
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: multi-line debug formatting of internal logs (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod config;
pub mod localizer;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod observer;
pub mod presenter;

pub use codes::*;
pub use config::*;
pub use localizer::*;
pub use logging::*;
pub use models::*;
pub use normalizer::*;
pub use observer::*;
pub use presenter::*;
