//! Testing utilities shared across traceval crates.
//!
//! Provides in-memory sink implementations that record every write for
//! assertion, plus builders for trajectory documents in the known shapes.

pub mod fixtures;
pub mod sinks;

pub use sinks::{LogRecord, MemoryLogSink, MemoryScreenshotSink, StoredScreenshot};
