use remie::{ErrorInput, ErrorOptions, Normalizer, StaticLocalizer};
use serde_json::json;

fn main() {
    let catalog = StaticLocalizer::new(json!({
        "server": {
            "400": {
                "forbidden": "The page is forbidden",
                "notfound": "The page {{- page}} could not be found",
                "unauthorized": "You are not authorized to access this page"
            },
            "409": { "conflict": "{{resource}} was modified by someone else" },
            "500": { "generic": "Something went wrong on our side" }
        }
    }));
    let normalizer = Normalizer::new().with_localizer(catalog);

    println!("--- Translations Example ---\n");

    let inputs = [
        ("server.400.forbidden", json!({})),
        ("server.400.notfound", json!({ "page": "/reports/q3" })),
        ("server.409.conflict", json!({ "resource": "Invoice 88" })),
        ("not a locale key", json!({})),
    ];

    for (input, params) in inputs {
        let options = ErrorOptions::new()
            .with_message_data(params.as_object().cloned().unwrap_or_default());
        if let Some(err) = normalizer.create(ErrorInput::text(input), &options) {
            println!(
                "{input:>22} -> {} {:?} code={:?}",
                err.status_code(),
                err.error().message(),
                err.error().code()
            );
        }
    }

    let generic = normalizer.generic(&ErrorOptions::new());
    println!("\n{:>22} -> {} {:?}", "generic()", generic.status_code(), generic.error().message());
}
