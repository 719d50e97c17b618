use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One progress update reported during a task run.
///
/// Entries are ordered by arrival; only the last one is consulted when
/// inferring completion. The `progress` value arrives as a JSON number or a
/// numeric string depending on which storage backend produced it; anything
/// else is treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Value>,
}

impl ProgressEntry {
    pub fn new(status: impl Into<String>, progress: Option<Value>) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }

    /// Completion ratio in [0, 1], or None when `progress` is absent or not
    /// numeric. Raw values above 1 are read as percentages.
    pub fn ratio(&self) -> Option<f64> {
        let raw = match self.progress.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };

        if raw <= 1.0 {
            Some(raw.clamp(0.0, 1.0))
        } else {
            Some((raw / 100.0).min(1.0))
        }
    }

    /// Whether this entry's status marks the task as finished.
    pub fn is_terminal(&self) -> bool {
        status_is_terminal(&self.status)
    }
}

/// A status string counts as terminal when it contains "done" or "complete",
/// or equals "success" (case-insensitive).
pub fn status_is_terminal(status: &str) -> bool {
    let status = status.to_lowercase();
    status.contains("done") || status.contains("complete") || status == "success"
}
