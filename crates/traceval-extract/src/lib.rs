// Extraction layer - pulls human-readable messages and screenshot references
// out of loosely-schematized trajectory documents. Pure functions only; file
// IO and sink routing live in traceval-runtime.

pub mod images;
pub mod messages;

pub use images::{extract_images, ImageRef};
pub use messages::extract_messages;
