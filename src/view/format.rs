use crate::report::types::Body;

/// `"999 ms"` below one second, `"1.00 s"` from there on, `"-"` when unknown.
pub fn format_duration(ms: Option<u64>) -> String {
    match ms {
        None => "-".to_string(),
        Some(ms) if ms < 1000 => format!("{} ms", ms),
        Some(ms) => format!("{:.2} s", ms as f64 / 1000.0),
    }
}

/// `"1023 B"` below one kilobyte, `"1.00 KB"` from there on, `"-"` for zero.
pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        None | Some(0) => "-".to_string(),
        Some(b) if b < 1024 => format!("{} B", b),
        Some(b) => format!("{:.2} KB", b as f64 / 1024.0),
    }
}

/// Render a request or response body for display.
///
/// Structured bodies are printed with a two-space indent when `pretty` is set
/// and compactly otherwise. Text bodies are pretty-printed only if they parse
/// as JSON; plain text comes back unchanged.
pub fn format_body(body: Option<&Body>, pretty: bool) -> String {
    match body {
        None => String::new(),
        Some(Body::Structured(value)) => {
            let rendered = if pretty {
                serde_json::to_string_pretty(value)
            } else {
                serde_json::to_string(value)
            };
            rendered.unwrap_or_else(|_| value.to_string())
        }
        Some(Body::RawText(text)) => {
            if pretty {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
                    if let Ok(rendered) = serde_json::to_string_pretty(&value) {
                        return rendered;
                    }
                }
            }
            text.clone()
        }
    }
}

/// Display colour of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Success,
    Neutral,
}

pub fn classify_log(line: &str) -> LogLevel {
    let lower = line.to_lowercase();
    if lower.contains("error") || lower.contains("fail") {
        LogLevel::Error
    } else if lower.contains("success") || lower.contains("pass") {
        LogLevel::Success
    } else {
        LogLevel::Neutral
    }
}

pub fn format_environment(env: &str) -> String {
    match env {
        "dev" => "Development".to_string(),
        "staging" => "Staging".to_string(),
        "production" => "Production".to_string(),
        other => other.to_string(),
    }
}

pub fn status_code_is_error(code: u16) -> bool {
    code >= 400
}

/// Pass rate as a percentage with two decimals, `0.0` for an empty plan.
pub fn success_rate(success: Option<u64>, total: Option<u64>) -> f64 {
    match total {
        None | Some(0) => 0.0,
        Some(total) => {
            let success = success.unwrap_or(0) as f64;
            (success * 10000.0 / total as f64).round() / 100.0
        }
    }
}
