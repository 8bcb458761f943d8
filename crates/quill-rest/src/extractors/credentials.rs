//! HTTP Basic credentials extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use quill_service::Credentials;
use std::convert::Infallible;

/// Credentials from an `Authorization: Basic` header, if one is present
/// and well formed.
///
/// Never rejects: deciding what a missing or malformed header means is left
/// to the auth gate behind the command service.
#[derive(Debug, Clone)]
pub struct BasicCredentials(pub Option<Credentials>);

#[async_trait]
impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let credentials = TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(Authorization(basic))| {
                Credentials::new(basic.username(), basic.password())
            });

        Ok(Self(credentials))
    }
}
