//! Result type aliases for Quill.

use crate::QuillError;

/// A specialized `Result` type for Quill operations.
pub type QuillResult<T> = Result<T, QuillError>;
