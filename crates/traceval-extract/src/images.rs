use serde_json::Value;
use std::collections::HashSet;

/// Reference to a screenshot found inside a trajectory document.
///
/// `File` carries a path as written by the agent (absolute, or relative to
/// the trajectory root); `Inline` carries a full base64 data URL. Resolution
/// to bytes happens in the runtime layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    File(String),
    Inline(String),
}

impl ImageRef {
    /// Classify a raw string reference by its `data:image` prefix.
    pub fn from_raw(raw: &str) -> ImageRef {
        if raw.starts_with("data:image") {
            ImageRef::Inline(raw.to_string())
        } else {
            ImageRef::File(raw.to_string())
        }
    }
}

const TRAJECTORY_IMAGE_KEYS: [&str; 4] = ["screenshot", "image", "screenshot_path", "image_path"];

/// Extract every screenshot reference from one trajectory document.
///
/// Runs independently of text extraction over three paths: message content
/// entries under `output[]`, `computer_call_output` documents, and recursive
/// descent under a `trajectory` key. Duplicate references within one document
/// are dropped, keeping the first occurrence, so each (file, reference) pair
/// is stored at most once downstream.
pub fn extract_images(document: &Value) -> Vec<ImageRef> {
    let Some(doc) = document.as_object() else {
        return Vec::new();
    };

    let mut refs = Vec::new();

    // Path (a): images embedded in output message content.
    if let Some(items) = doc.get("output").and_then(Value::as_array) {
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("message") {
                continue;
            }
            let Some(entries) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for entry in entries {
                let image_url = entry
                    .get("image_url")
                    .or_else(|| entry.get("image"))
                    .and_then(Value::as_str);
                if let Some(raw) = image_url {
                    refs.push(ImageRef::from_raw(raw));
                }
            }
        }
    }

    // Path (b): computer_call_output screenshots.
    if doc.get("type").and_then(Value::as_str) == Some("computer_call_output") {
        let file_ref = doc
            .get("screenshot_path")
            .or_else(|| doc.get("image_path"))
            .and_then(Value::as_str);
        if let Some(path) = file_ref {
            refs.push(ImageRef::File(path.to_string()));
        }

        let inline = doc
            .get("image")
            .or_else(|| doc.get("screenshot"))
            .and_then(Value::as_str);
        if let Some(raw) = inline {
            if raw.starts_with("data:image") {
                refs.push(ImageRef::Inline(raw.to_string()));
            }
        }
    }

    // Path (c): nested trajectory payloads.
    if let Some(trajectory) = doc.get("trajectory") {
        descend_trajectory(trajectory, &mut refs);
    }

    dedupe(refs)
}

/// Recursively scan nested trajectory data for image-bearing keys.
fn descend_trajectory(value: &Value, refs: &mut Vec<ImageRef>) {
    match value {
        Value::Object(obj) => {
            for key in TRAJECTORY_IMAGE_KEYS {
                if let Some(raw) = obj.get(key).and_then(Value::as_str) {
                    refs.push(ImageRef::from_raw(raw));
                }
            }
            for nested in obj.values() {
                if nested.is_object() || nested.is_array() {
                    descend_trajectory(nested, refs);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if item.is_object() || item.is_array() {
                    descend_trajectory(item, refs);
                }
            }
        }
        _ => {}
    }
}

fn dedupe(refs: Vec<ImageRef>) -> Vec<ImageRef> {
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter(|image_ref| seen.insert(image_ref.clone()))
        .collect()
}
