use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a JSON document; pretty in both modes since replies are JSON already
pub fn output_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "ok": false,
                "error": { "message": message }
            });

            if let Some(code) = error_code {
                response["error"]["code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => match error_code {
            Some(code) => eprintln!("Error [{}]: {}", code, message),
            None => eprintln!("Error: {}", message),
        },
    }
    Ok(())
}

/// Drop one trailing line ending, as added by `echo` or a heredoc
pub fn strip_line_ending(body: &str) -> &str {
    body.strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body)
}
