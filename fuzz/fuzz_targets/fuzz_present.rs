#![no_main]

use libfuzzer_sys::fuzz_target;
use remie::{normalize, ErrorInput, ErrorOptions, VisibilityPolicy};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(policy) = serde_json::from_str::<VisibilityPolicy>(text) else {
        return;
    };

    let secret = "fuzz-internal-secret";
    if text.contains(secret) {
        return;
    }
    let err = normalize(
        ErrorInput::text(text),
        &ErrorOptions::new().with_internal_message(secret),
        None,
    )
    .expect("text input always yields a record");

    if let Some(view) = err.sanitize_with(&policy) {
        let rendered = view.to_json().to_string();
        assert!(!rendered.contains(secret));
    } else {
        assert!(policy.internal_only);
    }

    let mut line = String::new();
    let _ = err.internal_log().write_to(&mut line);
});
