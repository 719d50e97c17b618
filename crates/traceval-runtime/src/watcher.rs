use crate::processor::{is_trajectory_file, TrajectoryProcessor};
use anyhow::Result;
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use traceval_types::{LogSink, ScreenshotSink};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Watches a trajectory directory and feeds every `*.json` file through the
/// processor exactly once per path.
///
/// Construction synchronously processes all pre-existing files, then hands
/// filesystem events to a dedicated worker thread. The watch subscription
/// and the processed-path set live and die with this value; two watchers in
/// one process never share state.
pub struct TrajectoryWatcher {
    _watcher: PollWatcher,
    processor: Arc<TrajectoryProcessor>,
}

impl TrajectoryWatcher {
    pub fn new(
        trajectory_root: PathBuf,
        task_id: Option<i64>,
        logs: Arc<dyn LogSink>,
        screenshots: Arc<dyn ScreenshotSink>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&trajectory_root)?;
        let root = trajectory_root
            .canonicalize()
            .unwrap_or(trajectory_root);

        let processor = Arc::new(TrajectoryProcessor::new(
            root.clone(),
            task_id,
            logs,
            screenshots,
        ));

        // Catch up on whatever the agent already wrote before subscribing.
        processor.process_existing();

        let (tx_fs, rx_fs) = channel();
        let config = notify::Config::default().with_poll_interval(POLL_INTERVAL);

        let mut watcher = PollWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx_fs.send(event);
                }
            },
            config,
        )?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        let worker = Arc::clone(&processor);
        std::thread::Builder::new()
            .name("trajectory-watcher-worker".to_string())
            .spawn(move || {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    while let Ok(event) = rx_fs.recv() {
                        handle_fs_event(&event, &worker);
                    }
                }));

                if let Err(panic_err) = result {
                    let panic_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_err.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Worker thread panicked with unknown error".to_string()
                    };
                    error!("FATAL: trajectory watcher worker panicked: {}", panic_msg);
                }
            })?;

        Ok(Self {
            _watcher: watcher,
            processor,
        })
    }

    /// Number of distinct trajectory files processed so far.
    pub fn processed_count(&self) -> usize {
        self.processor.processed_count()
    }
}

fn handle_fs_event(event: &Event, processor: &TrajectoryProcessor) {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            for path in &event.paths {
                if is_trajectory_file(path) {
                    processor.process_file(path);
                }
            }
        }
        _ => {}
    }
}
