//! OpenAPI documentation configuration.

use crate::controllers::health_controller::{HealthResponse, ReadinessResponse};
use quill_core::{ErrorResponse, Post, PostId, PostWithUser, UserId};
use quill_service::{
    CreatePostRequest, PlainPostListResponse, PostDetailResponse, PostListResponse,
    PostMutationResponse, ResponseSource, UpdatePostRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Quill feed API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill Feed API",
        version = "1.0.0",
        description = "Cache-aside microblog feed",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::post_controller::list_posts,
        crate::controllers::post_controller::list_plain_posts,
        crate::controllers::post_controller::get_post,
        crate::controllers::post_controller::create_post,
        crate::controllers::post_controller::update_post,
        crate::controllers::post_controller::delete_post,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            PostId,
            UserId,
            Post,
            PostWithUser,
            ErrorResponse,
            ResponseSource,
            PostListResponse,
            PlainPostListResponse,
            PostDetailResponse,
            CreatePostRequest,
            UpdatePostRequest,
            PostMutationResponse,
            HealthResponse,
            ReadinessResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "posts", description = "Feed endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the Basic scheme used by the admin write endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Basic)
                        .description(Some("Admin credentials for write endpoints"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_feed_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/posts"));
        assert!(paths.contains_key("/api/v1/posts/plain"));
        assert!(paths.contains_key("/api/v1/posts/{id}"));
    }

    #[test]
    fn test_paths_match_mount_points() {
        let doc = ApiDoc::openapi();
        assert!(doc.servers.is_none());
        for path in ["/health", "/ready", "/live"] {
            assert!(doc.paths.paths.contains_key(path), "{path} not at root");
        }
        assert!(!doc.paths.paths.keys().any(|p| p.starts_with("/posts")));
    }

    #[test]
    fn test_basic_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("basic_auth"));
    }
}
