//! Property-based tests for remie
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use proptest::prelude::*;
use remie::{
    guess_status_code, normalize, ErrorInput, ErrorOptions, Level, Localizer, StaticLocalizer,
    StatusCode, VisibilityPolicy,
};
use serde_json::json;

fn catalog() -> StaticLocalizer {
    StaticLocalizer::new(json!({
        "server": {
            "400": {
                "forbidden": "The page is forbidden",
                "notfound": "The page could not be found",
                "unauthorized": "You are not authorized to access this page"
            },
            "409": { "conflict": "The resource changed underneath you" },
            "500": { "generic": "Internal server error!" }
        },
        "billing": { "card": { "declined": "Your card was declined" } }
    }))
}

fn level_strategy() -> impl Strategy<Value = Level> {
    prop::sample::select(Level::ALL.to_vec())
}

// ============================================================================
// TEXT CLASSIFICATION PROPERTIES
// ============================================================================

proptest! {
    /// Unrecognized text becomes the message verbatim, with the default status
    #[test]
    fn unrecognized_text_is_message(s in "\\PC{0,200}") {
        let catalog = catalog();
        prop_assume!(!catalog.exists(&s));

        let err = normalize(ErrorInput::text(s.as_str()), &ErrorOptions::new(), Some(&catalog))
            .unwrap();

        prop_assert_eq!(err.error().message(), s.as_str());
        prop_assert_eq!(err.error().code(), None);
        prop_assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        prop_assert_eq!(err.level(), Level::Error);
    }

    /// Recognized keys carry their lowercase form as the code and a derived status
    #[test]
    fn recognized_key_sets_code_and_status(
        key in prop::sample::select(vec![
            "server.400.forbidden",
            "server.400.notfound",
            "server.400.unauthorized",
            "server.409.conflict",
            "billing.card.declined",
        ])
    ) {
        let catalog = catalog();
        let err = normalize(ErrorInput::text(key), &ErrorOptions::new(), Some(&catalog)).unwrap();

        let expected = key.to_lowercase();
        prop_assert_eq!(err.error().code(), Some(expected.as_str()));
        prop_assert_eq!(err.status_code(), guess_status_code(Some(key)));
        prop_assert_eq!(err.error().message(), catalog.translate(key, None));
    }

    /// Explicit status options win when valid and fall back when not
    #[test]
    fn status_option_is_validated(code in any::<u16>()) {
        let err = normalize(
            ErrorInput::text("x"),
            &ErrorOptions::new().with_status_code(code),
            None,
        )
        .unwrap();

        if (100..=599).contains(&code) {
            prop_assert_eq!(err.status_code().value(), code);
        } else {
            prop_assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

// ============================================================================
// STATUS GUESSING PROPERTIES
// ============================================================================

proptest! {
    /// Guessing never produces an out-of-range code
    #[test]
    fn guess_is_always_valid(key in "\\PC{0,60}") {
        let code = guess_status_code(Some(&key)).value();
        prop_assert!((100..=599).contains(&code));
    }

    /// server.<n>.* keys yield n when n is in range
    #[test]
    fn server_prefix_parses_status(n in 100u16..=599, tail in "[a-z]{1,12}") {
        let key = format!("server.{n}.{tail}");
        prop_assume!(!["forbidden", "notfound", "unauthorized"].contains(&tail.as_str()) || n != 400);
        prop_assert_eq!(guess_status_code(Some(&key)).value(), n);
    }

    /// Keys outside the server category fall back to 500
    #[test]
    fn other_prefix_falls_back(head in "[a-rt-z][a-z]{0,8}", n in 100u16..=599) {
        let key = format!("{head}.{n}.whatever");
        prop_assert_eq!(guess_status_code(Some(&key)), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// ============================================================================
// RE-NORMALIZATION PROPERTIES
// ============================================================================

proptest! {
    /// Normalizing a record again preserves its canonical fields
    #[test]
    fn renormalization_is_stable(
        message in "\\PC{0,100}",
        code in proptest::option::of("[A-Za-z_]{1,16}"),
        status in 100u16..=599,
        level in level_strategy(),
        internal_only in any::<bool>(),
    ) {
        let mut options = ErrorOptions::new()
            .with_status_code(status)
            .with_level(level)
            .with_internal_only(internal_only);
        if let Some(code) = &code {
            options = options.with_code(code.clone());
        }

        let first = normalize(ErrorInput::text(message.as_str()), &options, None).unwrap();
        let second = normalize(ErrorInput::Prior(&first), &ErrorOptions::new(), None).unwrap();

        prop_assert_eq!(second.error(), first.error());
        prop_assert_eq!(second.status_code(), first.status_code());
        prop_assert_eq!(second.level(), first.level());
        prop_assert_eq!(second.internal_only(), first.internal_only());
    }
}

// ============================================================================
// PRESENTER PROPERTIES
// ============================================================================

proptest! {
    /// The external view never carries the internal message
    #[test]
    fn view_never_contains_internal_message(
        message in "[a-z ]{1,40}",
        secret in "[A-Z0-9]{12,24}",
    ) {
        let err = normalize(
            ErrorInput::text(message.as_str()),
            &ErrorOptions::new().with_internal_message(secret.clone()),
            None,
        )
        .unwrap();

        let rendered = err.sanitize().unwrap().to_json().to_string();
        prop_assert!(!rendered.contains(&secret));
        prop_assert!(!rendered.contains("internalMessage"));
        prop_assert!(!rendered.contains("internalOnly"));
        let shown = err.to_string();
        prop_assert!(!shown.contains(&secret));
        let debugged = format!("{:?}", err);
        prop_assert!(!debugged.contains(&secret));
    }

    /// Internal-only records never present, whatever the policy
    #[test]
    fn internal_only_never_presents(
        message in "\\PC{0,100}",
        level in any::<bool>(),
        status in any::<bool>(),
        fault in any::<bool>(),
    ) {
        let err = normalize(
            ErrorInput::text(message.as_str()),
            &ErrorOptions::new().with_internal_only(true),
            None,
        )
        .unwrap();

        let policy = VisibilityPolicy::default()
            .with_level(level)
            .with_status_code(status)
            .with_error(fault);
        prop_assert!(err.sanitize_with(&policy).is_none());
        prop_assert!(err.sanitize().is_none());
    }
}

// ============================================================================
// LOGGING PROPERTIES
// ============================================================================

proptest! {
    /// Log lines stay valid UTF-8 and bounded
    #[test]
    fn internal_log_is_bounded(
        message in "\\PC{0,5000}",
        internal in "\\PC{0,5000}",
    ) {
        let err = normalize(
            ErrorInput::text(message.as_str()),
            &ErrorOptions::new().with_internal_message(internal),
            None,
        )
        .unwrap();

        let mut buffer = String::new();
        err.internal_log().write_to(&mut buffer).unwrap();

        prop_assert!(std::str::from_utf8(buffer.as_bytes()).is_ok());
        // Two fields at most 1024 bytes each plus fixed formatting
        prop_assert!(buffer.len() < 2 * 1024 + 128);
    }

    /// Display and Debug never panic
    #[test]
    fn display_never_panics(message in "\\PC{0,1000}") {
        let err = normalize(ErrorInput::text(message.as_str()), &ErrorOptions::new(), None)
            .unwrap();
        let _ = format!("{err}");
        let _ = format!("{err:?}");
    }
}

// ============================================================================
// OPAQUE INPUT PROPERTIES
// ============================================================================

proptest! {
    /// Arbitrary JSON never fails to normalize
    #[test]
    fn opaque_json_normalizes(n in any::<i64>(), s in "\\PC{0,50}", flag in any::<bool>()) {
        let payloads = [
            json!(n),
            json!(flag),
            json!([s.clone(), n]),
            json!({ "message": s.clone(), "code": s.clone() }),
            json!({ "error": { "message": s.clone() }, "statusCode": n }),
        ];

        for payload in payloads {
            let err = normalize(ErrorInput::from(payload), &ErrorOptions::new(), None).unwrap();
            let code = err.status_code().value();
            prop_assert!((100..=599).contains(&code));
        }
    }
}

// ============================================================================
// CONCURRENT PROPERTIES
// ============================================================================

proptest! {
    /// Normalization has no shared state across threads
    #[test]
    fn concurrent_normalization(
        thread_count in 1usize..8,
        errors_per_thread in 1usize..50,
    ) {
        let handles: Vec<_> = (0..thread_count)
            .map(|t| {
                std::thread::spawn(move || {
                    let catalog = catalog();
                    for i in 0..errors_per_thread {
                        let err = normalize(
                            ErrorInput::from(format!("thread_{t}_error_{i}")),
                            &ErrorOptions::new(),
                            Some(&catalog),
                        )
                        .unwrap();
                        assert_eq!(err.error().message(), format!("thread_{t}_error_{i}"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
