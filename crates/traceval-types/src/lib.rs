pub mod metrics;
pub mod progress;
pub mod report;
pub mod sink;

pub use metrics::MetricsSnapshot;
pub use progress::{status_is_terminal, ProgressEntry};
pub use report::{clamp01, round4, ScoreReport};
pub use sink::{LogLevel, LogSink, ScreenshotBlob, ScreenshotSink};
