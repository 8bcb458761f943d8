//! Custom Axum extractors.

mod credentials;
mod json_body;
mod pagination;

pub use credentials::*;
pub use json_body::*;
pub use pagination::*;
