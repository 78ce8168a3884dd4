//! End-to-end scenarios through the public API.

use remie::{
    normalize, ErrorInput, ErrorOptions, FaultPolicy, InternalMessageEvent, Level, Normalizer,
    NormalizerConfig, StaticLocalizer, StatusCode, SystemFault, TracingObserver,
    VisibilityPolicy, ON_CREATE_INTERNAL_MESSAGE,
};
use serde_json::json;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn catalog() -> StaticLocalizer {
    StaticLocalizer::new(json!({
        "server": {
            "400": {
                "forbidden": "The page is forbidden",
                "notfound": "The page {{- page}} could not be found",
                "unauthorized": "You are not authorized to access this page"
            },
            "500": { "generic": "Internal server error!" }
        }
    }))
}

type Seen = Rc<RefCell<Vec<(String, Option<u16>)>>>;

fn observed_normalizer() -> (Normalizer, Seen) {
    let seen: Seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut normalizer = Normalizer::new().with_localizer(catalog());
    normalizer
        .on_internal_message(move |event: &InternalMessageEvent<'_>| {
            assert_eq!(event.name(), ON_CREATE_INTERNAL_MESSAGE);
            sink.borrow_mut().push((
                event.message().to_owned(),
                event.record().map(|r| r.status_code().value()),
            ));
        })
        .on_internal_message(TracingObserver);
    (normalizer, seen)
}

#[derive(Debug)]
struct Boom;

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("boom")
    }
}

impl std::error::Error for Boom {}

// ============================================================================
// ABSENT INPUT
// ============================================================================

#[test]
fn absent_input_yields_nothing() {
    init_tracing();
    let (normalizer, seen) = observed_normalizer();
    assert!(normalizer.create(ErrorInput::Absent, &ErrorOptions::new()).is_none());
    assert!(seen.borrow().is_empty());
}

#[test]
fn absent_input_with_internal_message_notifies_once() {
    init_tracing();
    let (normalizer, seen) = observed_normalizer();
    let options = ErrorOptions::new().with_internal_message("x");
    assert!(normalizer.create(ErrorInput::Absent, &options).is_none());
    assert_eq!(*seen.borrow(), vec![("x".to_owned(), None)]);
}

// ============================================================================
// LOCALE AND STRING INPUT
// ============================================================================

#[test]
fn forbidden_key_is_localized() {
    let (normalizer, _) = observed_normalizer();
    let err = normalizer
        .create(ErrorInput::text("server.400.forbidden"), &ErrorOptions::new())
        .unwrap();

    assert_eq!(err.error().code(), Some("server.400.forbidden"));
    assert_eq!(err.error().message(), "The page is forbidden");
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.level(), Level::Error);
    assert!(!err.internal_only());
}

#[test]
fn locale_parameters_are_kept_and_presented() {
    let (normalizer, _) = observed_normalizer();
    let params = json!({ "page": "/reports" });
    let err = normalizer
        .create(
            ErrorInput::text("server.400.notfound"),
            &ErrorOptions::new().with_message_data(params.as_object().cloned().unwrap()),
        )
        .unwrap();

    let body = err.sanitize().unwrap().to_json();
    assert_eq!(
        body,
        json!({
            "error": {
                "message": "The page /reports could not be found",
                "code": "server.400.notfound"
            },
            "level": "error",
            "statusCode": 404,
            "messageData": { "page": "/reports" }
        })
    );
}

#[test]
fn plain_string_is_the_message() {
    let err = normalize(ErrorInput::text("Card expired"), &ErrorOptions::new(), None).unwrap();
    assert_eq!(err.error().message(), "Card expired");
    assert_eq!(err.error().code(), None);
    assert_eq!(err.status_code().value(), 500);
}

#[test]
fn internal_message_fires_with_record() {
    let (normalizer, seen) = observed_normalizer();
    let err = normalizer
        .create(
            ErrorInput::text("server.400.unauthorized"),
            &ErrorOptions::new().with_internal_message("token expired 3h ago"),
        )
        .unwrap();

    assert_eq!(err.internal_message(), Some("token expired 3h ago"));
    assert_eq!(*seen.borrow(), vec![("token expired 3h ago".to_owned(), Some(401))]);
    assert!(!err.sanitize().unwrap().to_json().to_string().contains("3h ago"));
}

// ============================================================================
// SYSTEM FAULTS
// ============================================================================

#[test]
fn system_fault_boom() {
    let err = normalize(ErrorInput::system(&Boom), &ErrorOptions::new(), None).unwrap();
    assert_eq!(err.error().message(), "boom");
    assert_eq!(err.error().code(), None);
    assert_eq!(err.error().stack(), None);
    assert_eq!(err.status_code().value(), 500);
    assert_eq!(err.level(), Level::Error);
}

#[test]
fn system_fault_stack_is_opt_in_for_presentation() {
    let fault = SystemFault::new("disk quota exceeded")
        .with_code("EDQUOT")
        .with_stack("at write (store.rs:88)");
    let err = normalize(ErrorInput::from(fault), &ErrorOptions::new(), None).unwrap();

    let default_view = err.sanitize().unwrap();
    let fault_view = default_view.error.unwrap();
    assert_eq!(fault_view.code.as_deref(), Some("edquot"));
    assert_eq!(fault_view.stack, None);

    let with_stack = err
        .sanitize_with(&VisibilityPolicy::default().with_error(FaultPolicy::with_stack()))
        .unwrap();
    assert_eq!(
        with_stack.error.unwrap().stack.as_deref(),
        Some("at write (store.rs:88)")
    );
}

// ============================================================================
// INTERNAL-ONLY RECORDS
// ============================================================================

#[test]
fn internal_only_presents_nothing() {
    let err = normalize(
        ErrorInput::text("boom"),
        &ErrorOptions::new().with_internal_only(true),
        None,
    )
    .unwrap();
    assert!(err.sanitize_with(&VisibilityPolicy::default()).is_none());
}

#[test]
fn create_internal_does_not_touch_caller_options() {
    let (normalizer, _) = observed_normalizer();
    let options = ErrorOptions::new().with_level(Level::Warn);
    let err = normalizer
        .create_internal(ErrorInput::text("replica lag"), &options)
        .unwrap();
    assert!(err.internal_only());
    assert_eq!(err.level(), Level::Warn);
    assert_eq!(options.internal_only, None);
}

// ============================================================================
// COPIES AND SNAPSHOTS
// ============================================================================

#[test]
fn copy_is_independent_of_source() {
    let (normalizer, _) = observed_normalizer();
    let source = normalizer
        .create(
            ErrorInput::text("server.400.forbidden"),
            &ErrorOptions::new().with_reference_data(json!({ "user": 9 }).as_object().cloned().unwrap()),
        )
        .unwrap();

    let mut copy = normalizer.copy(&source, &ErrorOptions::new().with_level(Level::Info));
    assert_eq!(copy.level(), Level::Info);
    assert_eq!(copy.status_code(), source.status_code());
    assert_eq!(copy.reference_data(), source.reference_data());

    let mut snapshot = copy.to_object();
    snapshot.level = Level::Trace;
    copy.set(snapshot);
    assert_eq!(copy.level(), Level::Trace);
    assert_eq!(source.level(), Level::Error);
}

#[test]
fn serialized_snapshot_round_trips_through_opaque_input() {
    let source = normalize(
        ErrorInput::text("Rate limited"),
        &ErrorOptions::new().with_status_code(429).with_level(Level::Warn),
        None,
    )
    .unwrap();

    let wire = serde_json::to_string(&source.to_object()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
    let restored = normalize(ErrorInput::from(value), &ErrorOptions::new(), None).unwrap();

    assert_eq!(restored.error(), source.error());
    assert_eq!(restored.status_code().value(), 429);
    assert_eq!(restored.level(), Level::Warn);
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn generic_error_follows_configuration() {
    let config = NormalizerConfig::from_toml_str(
        r#"
        default_message = "Try again later"
        default_locale = "server.503.unavailable"
        default_status_code = 503

        [sanitize]
        level = false
        "#,
    )
    .unwrap();

    let mut normalizer = Normalizer::new().with_localizer(catalog());
    normalizer.set(config);

    let err = normalizer.generic(&ErrorOptions::new());
    assert_eq!(err.error().message(), "Try again later");
    assert_eq!(err.status_code().value(), 503);

    let view = normalizer.present(&err).unwrap();
    assert!(view.level.is_none());
    assert_eq!(view.status_code.map(StatusCode::value), Some(503));
}

#[test]
fn options_deserialize_from_json_with_aliases() {
    let options: ErrorOptions = serde_json::from_value(json!({
        "httpStatusCode": 418,
        "level": "info",
        "internalMessage": "teapot mode engaged",
        "sanitizeOptions": { "error": { "code": false } },
        "code": "TEAPOT"
    }))
    .unwrap();

    let err = normalize(ErrorInput::text("I'm a teapot"), &options, None).unwrap();
    assert_eq!(err.status_code().value(), 418);
    assert_eq!(err.level(), Level::Info);
    assert_eq!(err.error().code(), Some("teapot"));

    let view = err.sanitize().unwrap();
    assert_eq!(view.error.unwrap().code, None);
}
