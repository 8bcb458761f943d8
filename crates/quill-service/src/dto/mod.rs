//! Data Transfer Objects (DTOs).

mod post_dto;

pub use post_dto::*;
