#![no_main]

use libfuzzer_sys::fuzz_target;
use remie::{guess_status_code, normalize, ErrorInput, ErrorOptions, StaticLocalizer};
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let catalog = StaticLocalizer::new(json!({
        "server": { "400": { "notfound": "The page {{- page}} could not be found" } }
    }));

    let code = guess_status_code(Some(text)).value();
    assert!((100..=599).contains(&code));

    let err = normalize(ErrorInput::text(text), &ErrorOptions::new(), Some(&catalog))
        .expect("text input always yields a record");
    assert!((100..=599).contains(&err.status_code().value()));

    // Arbitrary JSON goes through the opaque path
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        let _ = normalize(ErrorInput::from(value), &ErrorOptions::new(), None);
    }

    // Arbitrary JSON options must never break normalization
    if let Ok(options) = serde_json::from_str::<ErrorOptions>(text) {
        let _ = normalize(ErrorInput::text("fuzz"), &options, Some(&catalog));
    }
});
