//! REST API controllers.

pub mod health_controller;
pub mod post_controller;

pub use health_controller::*;
