//! Feed controller.

use crate::{
    extractors::{BasicCredentials, JsonBody, PaginationQuery},
    responses::{created, no_content, ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use quill_core::{PostId, QuillError};
use quill_service::{
    CreatePostRequest, Credentials, PlainPostListResponse, PostDetailResponse, PostListResponse,
    PostMutationResponse, UpdatePostRequest,
};
use tracing::debug;

/// Creates the post router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/plain", get(list_plain_posts))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

/// List the feed with author names.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(
        ("page" = Option<String>, Query, description = "Page number, 1-indexed (default 1)"),
        ("limit" = Option<String>, Query, description = "Page size (default 10, max 100)")
    ),
    responses(
        (status = 200, description = "One page of the feed", body = PostListResponse),
        (status = 500, description = "Primary store failure", body = quill_core::ErrorResponse)
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PostListResponse> {
    let page = pagination.page_request(&state.pagination);
    debug!(page = page.page, limit = page.limit, "List posts request");

    ok(state.listing.list_posts(page).await?)
}

/// List the feed without author names.
#[utoipa::path(
    get,
    path = "/api/v1/posts/plain",
    tag = "posts",
    params(
        ("page" = Option<String>, Query, description = "Page number, 1-indexed (default 1)"),
        ("limit" = Option<String>, Query, description = "Page size (default 10, max 100)")
    ),
    responses(
        (status = 200, description = "One page of the feed", body = PlainPostListResponse),
        (status = 500, description = "Primary store failure", body = quill_core::ErrorResponse)
    )
)]
pub async fn list_plain_posts(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PlainPostListResponse> {
    let page = pagination.page_request(&state.pagination);
    debug!(page = page.page, limit = page.limit, "List plain posts request");

    ok(state.listing.list_plain_posts(page).await?)
}

/// Get a single post.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostDetailResponse),
        (status = 400, description = "Malformed id", body = quill_core::ErrorResponse),
        (status = 404, description = "No such post", body = quill_core::ErrorResponse)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PostDetailResponse> {
    debug!("Get post request: {}", id);

    let post_id = parse_post_id(&id)?;
    ok(state.listing.get_post(post_id).await?)
}

/// Create a post (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    security(("basic_auth" = [])),
    responses(
        (status = 201, description = "Post created", body = PostMutationResponse),
        (status = 400, description = "Invalid body or empty content", body = quill_core::ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = quill_core::ErrorResponse),
        (status = 500, description = "Primary store failure", body = quill_core::ErrorResponse)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
    JsonBody(body): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostMutationResponse>), AppError> {
    debug!("Create post request");

    let request = admitted(&state, credentials.as_ref(), body).await?;
    let response = state.commands.create_post(credentials, request).await?;
    Ok(created(response))
}

/// Replace a post's content (admin only).
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    request_body = UpdatePostRequest,
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Post updated", body = PostMutationResponse),
        (status = 400, description = "Malformed id, invalid body or empty content", body = quill_core::ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = quill_core::ErrorResponse),
        (status = 404, description = "No such post", body = quill_core::ErrorResponse)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdatePostRequest>,
) -> ApiResult<PostMutationResponse> {
    debug!("Update post request: {}", id);

    let parsed = parse_post_id(&id).and_then(|post_id| body.map(|request| (post_id, request)));
    let (post_id, request) = admitted(&state, credentials.as_ref(), parsed).await?;

    ok(state
        .commands
        .update_post(credentials, post_id, request)
        .await?)
}

/// Delete a post (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    security(("basic_auth" = [])),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Malformed id", body = quill_core::ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = quill_core::ErrorResponse),
        (status = 404, description = "No such post", body = quill_core::ErrorResponse)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete post request: {}", id);

    let post_id = admitted(&state, credentials.as_ref(), parse_post_id(&id)).await?;
    state.commands.delete_post(credentials, post_id).await?;

    Ok(no_content())
}

/// Unwraps a parsed request, or reports why it could not be parsed.
///
/// A malformed request is only reported as such to an authorized caller;
/// everyone else gets the auth failure.
async fn admitted<T>(
    state: &AppState,
    credentials: Option<&Credentials>,
    parsed: Result<T, QuillError>,
) -> Result<T, AppError> {
    match parsed {
        Ok(value) => Ok(value),
        Err(err) => {
            state.commands.authorize(credentials).await?;
            Err(AppError(err))
        }
    }
}

fn parse_post_id(id: &str) -> Result<PostId, QuillError> {
    PostId::parse(id).map_err(|_| QuillError::validation(format!("Invalid post id: {}", id)))
}
