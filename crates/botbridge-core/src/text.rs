//! Text utilities: chunking, truncation, input summaries.

use serde_json::Value;

/// Split text into chunks of at most `max_len` characters.
///
/// Chunk boundaries respect `char` boundaries, never byte offsets, so
/// multi-byte text survives intact. Concatenating the chunks reproduces
/// the input exactly.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || text.is_empty() {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;
    for ch in text.chars() {
        if count == max_len {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Truncate text to `max_len` characters, appending an ellipsis when cut.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Render a tool-input object as a compact `key=value` summary.
///
/// Only scalar values are included; nested objects and arrays are skipped.
pub fn format_input_summary(input: &Value) -> String {
    let Value::Object(map) = input else {
        return String::new();
    };

    let mut parts = Vec::new();
    for (key, value) in map {
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            _ => continue,
        };
        parts.push(format!("{key}={rendered}"));
    }
    parts.join(" ")
}
