use remie::{
    ErrorInput, ErrorOptions, InternalMessageEvent, Normalizer, NormalizerConfig, TracingObserver,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = NormalizerConfig::from_toml_str(
        r#"
        default_message = "Please try again later"

        [sanitize]
        referenceData = false
        "#,
    )
    .unwrap_or_default();

    let mut normalizer = Normalizer::new().with_config(config);
    normalizer
        .on_internal_message(TracingObserver)
        .on_internal_message(|event: &InternalMessageEvent<'_>| {
            if let Some(record) = event.record() {
                println!("[observer] {} -> {}", record, event.message());
            } else {
                println!("[observer] (no error) -> {}", event.message());
            }
        });

    println!("--- Internal Messages Example ---\n");

    let options = ErrorOptions::new()
        .with_internal_message("ledger row 8812 failed checksum")
        .with_reference_data(
            serde_json::json!({ "ledger": "eu-west" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );

    if let Some(err) = normalizer.create(ErrorInput::text("Payment could not be completed"), &options) {
        if let Some(view) = normalizer.present(&err) {
            println!("[response] {}", view.to_json());
        }

        let mut line = String::new();
        if err.internal_log().write_to(&mut line).is_ok() {
            println!("[trusted log] {line}");
        }
    }

    // Internal-only records never produce a response body
    if let Some(err) = normalizer.create_internal(ErrorInput::text("Cache warmup aborted"), &options) {
        println!("[internal only] response: {:?}", normalizer.present(&err));
    }

    // A message with no error still reaches the observers
    let _ = normalizer.create(
        ErrorInput::Absent,
        &ErrorOptions::new().with_internal_message("retry budget at 10%"),
    );
}
