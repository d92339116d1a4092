use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::segments::{CreateSegmentRequest, RepositionSegmentRequest, UpdateSegmentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Segment,
    response::ApiResponse,
    services::{permission_service, segment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_segment))
        .route("/{id}", put(update_segment))
        .route("/{id}/position", patch(reposition_segment))
        .route("/{id}", delete(delete_segment))
        .route("/{id}/guests/{guest_id}", post(attach_guest))
        .route("/{id}/guests/{guest_id}", delete(detach_guest))
}

#[utoipa::path(
    post,
    path = "/api/segments",
    request_body = CreateSegmentRequest,
    responses(
        (status = 200, description = "Segment appended to its show", body = ApiResponse<Segment>),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Segments"
)]
pub async fn create_segment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSegmentRequest>,
) -> AppResult<Json<ApiResponse<Segment>>> {
    permission_service::ensure_can(&state, user.user_id, "can_create_segments").await?;
    let resp = segment_service::create_segment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/segments/{id}",
    params(
        ("id" = Uuid, Path, description = "Segment ID")
    ),
    request_body = UpdateSegmentRequest,
    responses(
        (status = 200, description = "Segment updated", body = ApiResponse<Segment>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Segments"
)]
pub async fn update_segment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSegmentRequest>,
) -> AppResult<Json<ApiResponse<Segment>>> {
    permission_service::ensure_can(&state, user.user_id, "can_edit_segments").await?;
    let resp = segment_service::update_segment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/segments/{id}/position",
    params(
        ("id" = Uuid, Path, description = "Segment ID")
    ),
    request_body = RepositionSegmentRequest,
    responses(
        (status = 200, description = "Segment moved", body = ApiResponse<Segment>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Segments"
)]
pub async fn reposition_segment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RepositionSegmentRequest>,
) -> AppResult<Json<ApiResponse<Segment>>> {
    permission_service::ensure_can(&state, user.user_id, "can_reorder_segments").await?;
    let resp = segment_service::reposition_segment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/segments/{id}",
    params(
        ("id" = Uuid, Path, description = "Segment ID")
    ),
    responses(
        (status = 200, description = "Segment deleted, positions closed up"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Segments"
)]
pub async fn delete_segment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    permission_service::ensure_can(&state, user.user_id, "can_delete_segments").await?;
    let resp = segment_service::delete_segment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/segments/{id}/guests/{guest_id}",
    params(
        ("id" = Uuid, Path, description = "Segment ID"),
        ("guest_id" = Uuid, Path, description = "Guest ID")
    ),
    responses(
        (status = 200, description = "Guest attached"),
        (status = 404, description = "Segment or guest missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Segments"
)]
pub async fn attach_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, guest_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    permission_service::ensure_can(&state, user.user_id, "can_assign_guests").await?;
    let resp = segment_service::attach_guest(&state, &user, id, guest_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/segments/{id}/guests/{guest_id}",
    params(
        ("id" = Uuid, Path, description = "Segment ID"),
        ("guest_id" = Uuid, Path, description = "Guest ID")
    ),
    responses(
        (status = 200, description = "Guest detached"),
        (status = 404, description = "Link missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Segments"
)]
pub async fn detach_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, guest_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    permission_service::ensure_can(&state, user.user_id, "can_assign_guests").await?;
    let resp = segment_service::detach_guest(&state, &user, id, guest_id).await?;
    Ok(Json(resp))
}
