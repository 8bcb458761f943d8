//! Domain entities for the feed.

pub mod post;

pub use post::*;
