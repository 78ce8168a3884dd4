use remie::{ErrorInput, ErrorOptions, Level, Normalizer, SystemFault};
use std::io;

fn read_settings(path: &str) -> io::Result<String> {
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{path}: no such file or directory"),
    ))
}

fn main() {
    let normalizer = Normalizer::new();

    println!("--- Basic Usage Example ---\n");

    // 1. A plain message with a caller-chosen code and status
    let options = ErrorOptions::new()
        .with_code("CARD_EXPIRED")
        .with_status_code(402)
        .with_level(Level::Warn);
    if let Some(err) = normalizer.create(ErrorInput::text("Your card has expired"), &options) {
        println!("1. [RECORD] {err}");
        if let Some(view) = err.sanitize() {
            println!("   [RESPONSE] {}", view.to_json());
        }
    }

    // 2. A system error: the message comes from the error, the cause chain
    //    becomes the stack, which stays out of the response by default
    if let Err(io_err) = read_settings("/etc/app/settings.toml") {
        if let Some(err) = normalizer.create(ErrorInput::from(io_err), &ErrorOptions::new()) {
            println!("\n2. [RECORD] {err}");
            println!("   code: {:?}", err.error().code());
            if let Some(view) = err.sanitize() {
                println!("   [RESPONSE] {}", view.to_json());
            }
        }
    }

    // 3. A wrapped fault with its own code
    let fault = SystemFault::new("connection reset by peer").with_code("ECONNRESET");
    if let Some(err) = normalizer.create(ErrorInput::from(fault), &ErrorOptions::new()) {
        println!("\n3. [RECORD] {err}  code={:?}", err.error().code());
    }

    // 4. No error at all
    let nothing = normalizer.create(ErrorInput::Absent, &ErrorOptions::new());
    println!("\n4. [ABSENT] {nothing:?}");
}
