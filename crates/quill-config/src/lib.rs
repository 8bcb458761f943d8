//! # Quill Config
//!
//! Configuration management for the Quill feed service.
//! Supports layered configuration from files and environment variables,
//! validated at load time.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
