use serde::Serialize;

use crate::config::Config;

/// Format a result as minified JSON.
pub fn format_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

/// Format a result as pretty-printed JSON.
pub fn format_pretty<T: Serialize>(result: &T) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

/// Format a result according to the configured output format.
pub fn format_result<T: Serialize>(config: &Config, result: &T) -> String {
    if config.settings.output.format == "pretty" {
        format_pretty(result)
    } else {
        format_json(result)
    }
}

/// Format an error as JSON.
pub fn format_error(err: &dyn std::fmt::Display) -> String {
    format!(
        "{{\"error\":\"{}\"}}",
        err.to_string().replace('"', "\\\"").replace('\n', " - ")
    )
}
