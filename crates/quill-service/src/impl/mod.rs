//! Service implementations.
//!
//! Trait definitions live in the parent module (`listing_service.rs`,
//! `post_command_service.rs`).

pub mod creation_coordinator;
pub mod listing_handler;

pub use creation_coordinator::CreationCoordinator;
pub use listing_handler::ListingRequestHandler;
