use serde_json::{Map, Value};

/// Extract every human-readable message from one trajectory document.
///
/// Agent harnesses write trajectory files in several overlapping layouts, so
/// five independent shape matchers run in a fixed order and their results are
/// concatenated. A document may match more than one shape; duplicates are
/// left to the log sink. Non-object documents yield nothing.
pub fn extract_messages(document: &Value) -> Vec<String> {
    let Some(doc) = document.as_object() else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    messages.extend(response_envelope(doc));
    messages.extend(bare_output(doc));
    messages.extend(assistant_role(doc));
    messages.extend(flat_fields(doc));
    messages.extend(nested_result(doc));
    messages
}

/// Shape 1: `response.output[]` envelope with message items.
fn response_envelope(doc: &Map<String, Value>) -> Vec<String> {
    let Some(output) = doc.get("response").and_then(|r| r.get("output")) else {
        return Vec::new();
    };
    output_message_texts(output, false)
}

/// Shape 2: `output[]` at the document root. Unlike the envelope shape, a
/// message item whose `content` is a plain string also contributes.
fn bare_output(doc: &Map<String, Value>) -> Vec<String> {
    let Some(output) = doc.get("output") else {
        return Vec::new();
    };
    output_message_texts(output, true)
}

/// Shape 3: a single `{role: "assistant", content: ...}` message.
fn assistant_role(doc: &Map<String, Value>) -> Vec<String> {
    if doc.get("role").and_then(Value::as_str) != Some("assistant") {
        return Vec::new();
    }

    let mut messages = Vec::new();
    match doc.get("content") {
        Some(Value::String(text)) => push_trimmed(&mut messages, text),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(text) => push_trimmed(&mut messages, text),
                    Value::Object(obj) => {
                        if let Some(text) = obj.get("text").and_then(Value::as_str) {
                            push_trimmed(&mut messages, text);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    messages
}

/// Shape 4: flat scalar fields at the top level.
fn flat_fields(doc: &Map<String, Value>) -> Vec<String> {
    const FIELDS: [&str; 5] = ["text", "result", "message", "content", "response_text"];

    let mut messages = Vec::new();
    for field in FIELDS {
        match doc.get(field) {
            Some(Value::String(text)) => push_trimmed(&mut messages, text),
            Some(Value::Object(obj)) => {
                if let Some(text) = obj.get("text").and_then(Value::as_str) {
                    push_trimmed(&mut messages, text);
                }
            }
            _ => {}
        }
    }
    messages
}

/// Shape 5: nested `result.text` / `result.output` fields.
fn nested_result(doc: &Map<String, Value>) -> Vec<String> {
    let Some(result) = doc.get("result").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    if let Some(text) = result.get("text").and_then(Value::as_str) {
        push_trimmed(&mut messages, text);
    }
    if let Some(Value::String(output)) = result.get("output") {
        push_trimmed(&mut messages, output);
    }
    messages
}

/// Walk `output[]` message items and collect their content texts.
fn output_message_texts(output: &Value, allow_string_content: bool) -> Vec<String> {
    let Some(items) = output.as_array() else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    for item in items {
        if item.get("type").and_then(Value::as_str) != Some("message") {
            continue;
        }

        match item.get("content") {
            Some(Value::Array(entries)) => {
                // Entries tagged "output_text" carry their text in the same
                // field as untagged entries, so one lookup covers both.
                for entry in entries {
                    if let Some(text) = entry.get("text").and_then(Value::as_str) {
                        push_trimmed(&mut messages, text);
                    }
                }
            }
            Some(Value::String(text)) if allow_string_content => {
                push_trimmed(&mut messages, text);
            }
            _ => {}
        }
    }
    messages
}

fn push_trimmed(messages: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        messages.push(text.to_string());
    }
}
