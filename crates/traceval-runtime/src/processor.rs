use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use traceval_extract::{extract_images, extract_messages, ImageRef};
use traceval_types::{LogLevel, LogSink, ScreenshotBlob, ScreenshotSink};

/// Per-file trajectory processing: parse, extract, route to sinks.
///
/// Each distinct absolute path is processed at most once for the lifetime of
/// one processor, whatever happens while processing it - a bad file is never
/// retried. The processed set is shared with the watcher's worker thread, so
/// it sits behind a mutex.
pub struct TrajectoryProcessor {
    root: PathBuf,
    task_id: Option<i64>,
    logs: Arc<dyn LogSink>,
    screenshots: Arc<dyn ScreenshotSink>,
    processed: Mutex<HashSet<PathBuf>>,
}

impl TrajectoryProcessor {
    pub fn new(
        root: PathBuf,
        task_id: Option<i64>,
        logs: Arc<dyn LogSink>,
        screenshots: Arc<dyn ScreenshotSink>,
    ) -> Self {
        Self {
            root,
            task_id,
            logs,
            screenshots,
            processed: Mutex::new(HashSet::new()),
        }
    }

    pub fn trajectory_root(&self) -> &Path {
        &self.root
    }

    /// Number of distinct paths processed so far.
    pub fn processed_count(&self) -> usize {
        self.processed.lock().unwrap().len()
    }

    /// Synchronously process every `*.json` file already under the root.
    pub fn process_existing(&self) {
        for entry in walkdir::WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_trajectory_file(path) {
                self.process_file(path);
            }
        }
    }

    /// Process one trajectory file, once.
    ///
    /// Every failure is logged and swallowed here so a single bad file can
    /// never take down the watch loop.
    pub fn process_file(&self, path: &Path) {
        {
            let mut processed = self.processed.lock().unwrap();
            if !processed.insert(path.to_path_buf()) {
                return;
            }
        }

        if let Err(err) = self.ingest(path) {
            warn!("failed to process trajectory file {}: {}", path.display(), err);
        }
    }

    fn ingest(&self, path: &Path) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let document: Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(err) => {
                // Stays in the processed set: re-reading an unparsable file
                // on every modify event would loop forever.
                warn!("unparsable trajectory file {}: {}", path.display(), err);
                return Ok(());
            }
        };

        let messages = extract_messages(&document);
        for message in &messages {
            let meta = json!({
                "type": "agent_response",
                "source": "trajectory",
                "file": file_name,
            });
            if let Err(err) = self
                .logs
                .write_log(self.task_id, LogLevel::Info, message, meta)
            {
                warn!("log sink rejected message from {}: {}", file_name, err);
            }
        }

        for image_ref in extract_images(&document) {
            match resolve_image_ref(&image_ref, &self.root) {
                Ok(blob) => {
                    match self
                        .screenshots
                        .store_screenshot(self.task_id, &blob.bytes, &blob.filename)
                    {
                        Ok(id) => debug!("stored screenshot {} ({} bytes)", id, blob.bytes.len()),
                        Err(err) => {
                            warn!("screenshot sink rejected {}: {}", blob.filename, err)
                        }
                    }
                }
                Err(err) => {
                    debug!("skipping image reference in {}: {}", file_name, err);
                }
            }
        }

        // One summary entry per file. The raw document is only attached when
        // nothing textual was found, so high-signal files are not logged twice.
        let summary = if messages.is_empty() {
            self.logs.write_log(
                self.task_id,
                LogLevel::Debug,
                &format!("Trajectory processed: {}", file_name),
                json!({
                    "trajectory_file": path.display().to_string(),
                    "data": document,
                }),
            )
        } else {
            self.logs.write_log(
                self.task_id,
                LogLevel::Debug,
                &format!(
                    "Trajectory processed: {} ({} messages extracted)",
                    file_name,
                    messages.len()
                ),
                json!({
                    "trajectory_file": path.display().to_string(),
                    "messages_count": messages.len(),
                }),
            )
        };
        if let Err(err) = summary {
            warn!("log sink rejected summary for {}: {}", file_name, err);
        }

        Ok(())
    }
}

pub(crate) fn is_trajectory_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// Resolve an extracted image reference to raw bytes and a filename.
///
/// File references are tried as written, then relative to the trajectory
/// root. Inline references decode the part after the first comma of the data
/// URL. Decoded inline blobs get a generated timestamped filename.
pub fn resolve_image_ref(image_ref: &ImageRef, root: &Path) -> Result<ScreenshotBlob> {
    match image_ref {
        ImageRef::Inline(data_url) => {
            let encoded = data_url
                .split_once(',')
                .map(|(_, payload)| payload)
                .unwrap_or(data_url);
            let bytes = BASE64.decode(encoded.trim())?;
            let filename = format!(
                "screenshot_{}.png",
                Utc::now().format("%Y%m%dT%H%M%S%.6f")
            );
            Ok(ScreenshotBlob { bytes, filename })
        }
        ImageRef::File(raw) => {
            let direct = PathBuf::from(raw);
            let path = if direct.exists() {
                direct
            } else {
                let joined = root.join(raw);
                if joined.exists() {
                    joined
                } else {
                    return Err(Error::MissingFile(joined));
                }
            };

            let bytes = std::fs::read(&path)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "screenshot.png".to_string());
            Ok(ScreenshotBlob { bytes, filename })
        }
    }
}
