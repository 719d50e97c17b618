use anyhow::Result;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use traceval_types::{LogLevel, LogSink, ScreenshotSink};

/// One recorded log sink write.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub task_id: Option<i64>,
    pub level: LogLevel,
    pub message: String,
    pub meta: Value,
}

/// Log sink that appends every write to an in-memory list.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    entries: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogRecord> {
        self.entries.lock().unwrap().clone()
    }

    pub fn entries_with_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.entries()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    /// Messages of info-level `agent_response` entries, in write order.
    pub fn agent_responses(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|record| {
                record.level == LogLevel::Info
                    && record.meta.get("type").and_then(Value::as_str) == Some("agent_response")
            })
            .map(|record| record.message)
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn write_log(
        &self,
        task_id: Option<i64>,
        level: LogLevel,
        message: &str,
        meta: Value,
    ) -> Result<()> {
        self.entries.lock().unwrap().push(LogRecord {
            task_id,
            level,
            message: message.to_string(),
            meta,
        });
        Ok(())
    }
}

/// One recorded screenshot sink write.
#[derive(Debug, Clone)]
pub struct StoredScreenshot {
    pub id: String,
    pub task_id: Option<i64>,
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Screenshot sink that keeps every stored blob in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryScreenshotSink {
    stored: Arc<Mutex<Vec<StoredScreenshot>>>,
}

impl MemoryScreenshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<StoredScreenshot> {
        self.stored.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

impl ScreenshotSink for MemoryScreenshotSink {
    fn store_screenshot(
        &self,
        task_id: Option<i64>,
        image_data: &[u8],
        filename: &str,
    ) -> Result<String> {
        let mut stored = self.stored.lock().unwrap();
        let id = format!("shot-{}", stored.len() + 1);
        stored.push(StoredScreenshot {
            id: id.clone(),
            task_id,
            bytes: image_data.to_vec(),
            filename: filename.to_string(),
        });
        Ok(id)
    }
}
