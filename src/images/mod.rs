//! Logo and receipt upload handling
//!
//! Uploads are identified by their leading bytes rather than by file name or
//! declared MIME type, checked against a size cap, then optionally shrunk.

pub mod format;
pub mod optimizer;

pub use format::{detect_format, validate_upload, ImageFormat};
pub use optimizer::{ImageOptimizer, OptimizedImage};
