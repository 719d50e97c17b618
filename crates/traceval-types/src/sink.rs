use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity level for log sink entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Debug,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

/// Raw image bytes ready for storage, with the filename they were resolved
/// under.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotBlob {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Persistence collaborator for leveled log entries.
///
/// The pipeline only appends: it never asks a sink to delete or overwrite.
/// Transient backend failures surface as errors and are logged-and-ignored
/// at the call site; they must not disrupt file processing.
pub trait LogSink: Send + Sync {
    fn write_log(
        &self,
        task_id: Option<i64>,
        level: LogLevel,
        message: &str,
        meta: Value,
    ) -> Result<()>;
}

/// Persistence collaborator for screenshot blobs.
///
/// Returns an opaque identifier for the stored image. Filename collisions
/// are the sink's concern.
pub trait ScreenshotSink: Send + Sync {
    fn store_screenshot(
        &self,
        task_id: Option<i64>,
        image_data: &[u8],
        filename: &str,
    ) -> Result<String>;
}
