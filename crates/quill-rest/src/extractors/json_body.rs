//! Deferred JSON body extractor.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use quill_core::QuillError;
use serde::de::DeserializeOwned;
use std::convert::Infallible;

/// A JSON body whose parse failure is held instead of rejected.
///
/// Write handlers check credentials before reporting a malformed body, so the
/// rejection has to survive until the handler decides the order.
#[derive(Debug)]
pub struct JsonBody<T>(pub Result<T, QuillError>);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| value)
            .map_err(|rejection| {
                QuillError::validation(format!("Invalid request body: {}", rejection.body_text()))
            });

        Ok(Self(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Note {
        content: String,
    }

    async fn extract(body: &'static str) -> Result<Note, QuillError> {
        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let JsonBody(note) = JsonBody::<Note>::from_request(request, &()).await.unwrap();
        note
    }

    #[tokio::test]
    async fn test_parses_valid_body() {
        assert_eq!(extract(r#"{"content":"hi"}"#).await.unwrap().content, "hi");
    }

    #[tokio::test]
    async fn test_holds_parse_failure() {
        let err = extract(r#"{"content":"#).await.unwrap_err();
        assert!(matches!(err, QuillError::Validation(_)));
        assert!(extract(r"{}").await.is_err());
    }
}
