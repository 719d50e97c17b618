//! Builders for trajectory documents in the shapes agents actually write.

use serde_json::{json, Value};

/// Response-envelope document with one output_text message.
pub fn envelope_document(text: &str) -> Value {
    json!({
        "response": {
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": text}]
            }]
        }
    })
}

/// Bare-output document with one message item.
pub fn output_document(text: &str) -> Value {
    json!({
        "output": [{
            "type": "message",
            "content": [{"text": text}]
        }]
    })
}

/// Assistant-role document with string content.
pub fn assistant_document(text: &str) -> Value {
    json!({"role": "assistant", "content": text})
}

/// Document carrying only a flat `result` field.
pub fn result_document(text: &str) -> Value {
    json!({"result": text})
}

/// `computer_call_output` document referencing a screenshot file.
pub fn computer_call_document(screenshot_path: &str) -> Value {
    json!({
        "type": "computer_call_output",
        "call_id": "call-1",
        "screenshot_path": screenshot_path
    })
}

/// `computer_call_output` document with an inline base64 data URL.
pub fn inline_screenshot_document(base64_payload: &str) -> Value {
    json!({
        "type": "computer_call_output",
        "call_id": "call-2",
        "image": format!("data:image/png;base64,{}", base64_payload)
    })
}

/// Document with a nested trajectory carrying screenshots at two depths.
pub fn nested_trajectory_document(first: &str, second: &str) -> Value {
    json!({
        "trajectory": {
            "steps": [
                {"action": "click", "screenshot": first},
                {"action": "type", "detail": {"image_path": second}}
            ]
        }
    })
}

/// Document matching none of the known shapes.
pub fn shapeless_document() -> Value {
    json!({"output_text": null, "step": 7, "elapsed_ms": 41})
}
