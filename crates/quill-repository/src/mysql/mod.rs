//! MySQL implementations of the store contracts.

mod identity_provider;
mod post_repository;

pub use identity_provider::MySqlIdentityProvider;
pub use post_repository::MySqlPostRepository;
