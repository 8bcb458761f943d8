//! # Quill Server Library
//!
//! Wiring, observability setup and startup helpers for the feed server
//! binary.

pub mod app;
pub mod startup;
pub mod telemetry;
