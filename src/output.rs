use serde::Serialize;

/// Pretty JSON on stdout; non-ASCII text is kept as-is.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_error(message: &str) {
    let envelope = serde_json::json!({
        "success": false,
        "error": message,
    });
    if print_json(&envelope).is_err() {
        eprintln!("Error: {}", message);
    }
}
