//! Localization capability consumed by the normalizer.
//!
//! The normalizer only ever asks two questions of a localizer: does a key exist,
//! and what does it render to with a set of parameters. Any backend can sit
//! behind [`Localizer`]. [`StaticLocalizer`] is a small in-memory catalog for
//! callers without one.

use crate::models::DataMap;
use serde_json::Value;

/// Read-only key lookup and rendering.
pub trait Localizer {
    /// Whether `key` names a known message.
    fn exists(&self, key: &str) -> bool;

    /// Render `key` with interpolation parameters.
    ///
    /// Implementations should return the key itself when it is unknown rather
    /// than fail.
    fn translate(&self, key: &str, params: Option<&DataMap>) -> String;
}

impl<L: Localizer + ?Sized> Localizer for &L {
    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }

    fn translate(&self, key: &str, params: Option<&DataMap>) -> String {
        (**self).translate(key, params)
    }
}

impl<L: Localizer + ?Sized> Localizer for Box<L> {
    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }

    fn translate(&self, key: &str, params: Option<&DataMap>) -> String {
        (**self).translate(key, params)
    }
}

/// In-memory catalog over a nested resource tree.
///
/// Keys are dot-delimited paths into the tree; leaves are message templates.
/// Templates interpolate `{{name}}` and `{{- name}}` from the parameters; a
/// placeholder without a matching parameter is left as written.
///
/// ```rust
/// use remie::{Localizer, StaticLocalizer};
/// use serde_json::json;
///
/// let catalog = StaticLocalizer::new(json!({
///     "server": { "400": { "notFound": "The page {{- page}} could not be found" } }
/// }));
///
/// assert!(catalog.exists("server.400.notFound"));
/// assert!(!catalog.exists("server.400"));
///
/// let params = json!({ "page": "/admin" });
/// assert_eq!(
///     catalog.translate("server.400.notFound", params.as_object()),
///     "The page /admin could not be found"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticLocalizer {
    resources: Value,
}

impl StaticLocalizer {
    /// Build a catalog from a nested JSON tree.
    pub fn new(resources: Value) -> Self {
        Self { resources }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        key.split('.')
            .try_fold(&self.resources, |node, segment| node.get(segment))
            .and_then(Value::as_str)
    }
}

impl Localizer for StaticLocalizer {
    fn exists(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn translate(&self, key: &str, params: Option<&DataMap>) -> String {
        match self.lookup(key) {
            Some(template) => interpolate(template, params),
            None => key.to_owned(),
        }
    }
}

/// Substitute `{{name}}` / `{{- name}}` placeholders.
fn interpolate(template: &str, params: Option<&DataMap>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = after_open[..end].trim().trim_start_matches('-').trim();
        match params.and_then(|p| p.get(name)) {
            Some(Value::String(s)) => out.push_str(s),
            Some(other) => out.push_str(&other.to_string()),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}
