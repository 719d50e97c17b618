pub mod error;
pub mod processor;
pub mod watcher;

pub use error::Error;
pub use processor::{resolve_image_ref, TrajectoryProcessor};
pub use watcher::TrajectoryWatcher;
