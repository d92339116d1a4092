use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::segments::SegmentList,
    dto::shows::{CreateShowRequest, ShowList, ShowWithSegments, UpdateShowRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Show,
    response::ApiResponse,
    routes::params::ShowListQuery,
    services::{permission_service, segment_service, show_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_show))
        .route("/", get(list_shows))
        .route("/{id}", get(get_show))
        .route("/{id}", put(update_show))
        .route("/{id}", delete(delete_show))
        .route("/{id}/segments", get(list_show_segments))
        .route("/{id}/presenters/{presenter_id}", post(add_presenter))
        .route("/{id}/presenters/{presenter_id}", delete(remove_presenter))
}

#[utoipa::path(
    post,
    path = "/api/shows",
    request_body = CreateShowRequest,
    responses(
        (status = 200, description = "Show created", body = ApiResponse<Show>),
        (status = 404, description = "Emission not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn create_show(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateShowRequest>,
) -> AppResult<Json<ApiResponse<Show>>> {
    permission_service::ensure_can(&state, user.user_id, "can_create_showplan").await?;
    let resp = show_service::create_show(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shows",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("emission_id" = Option<Uuid>, Query, description = "Filter by emission"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Shows", body = ApiResponse<ShowList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn list_shows(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ShowListQuery>,
) -> AppResult<Json<ApiResponse<ShowList>>> {
    permission_service::ensure_can(&state, user.user_id, "can_view_showplans").await?;
    let resp = show_service::list_shows(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shows/{id}",
    params(
        ("id" = Uuid, Path, description = "Show ID")
    ),
    responses(
        (status = 200, description = "Show with ordered segments", body = ApiResponse<ShowWithSegments>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn get_show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShowWithSegments>>> {
    permission_service::ensure_can(&state, user.user_id, "can_view_showplans").await?;
    let resp = show_service::get_show(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/shows/{id}",
    params(
        ("id" = Uuid, Path, description = "Show ID")
    ),
    request_body = UpdateShowRequest,
    responses(
        (status = 200, description = "Show updated", body = ApiResponse<Show>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn update_show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShowRequest>,
) -> AppResult<Json<ApiResponse<Show>>> {
    permission_service::ensure_can(&state, user.user_id, "can_edit_showplans").await?;
    let resp = show_service::update_show(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/shows/{id}",
    params(
        ("id" = Uuid, Path, description = "Show ID")
    ),
    responses(
        (status = 200, description = "Show and its segments deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn delete_show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    permission_service::ensure_can(&state, user.user_id, "can_delete_showplans").await?;
    let resp = show_service::delete_show(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shows/{id}/segments",
    params(
        ("id" = Uuid, Path, description = "Show ID")
    ),
    responses(
        (status = 200, description = "Segments in position order", body = ApiResponse<SegmentList>),
        (status = 404, description = "Show not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn list_show_segments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SegmentList>>> {
    permission_service::ensure_can(&state, user.user_id, "can_view_segments").await?;
    let resp = segment_service::list_show_segments(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shows/{id}/presenters/{presenter_id}",
    params(
        ("id" = Uuid, Path, description = "Show ID"),
        ("presenter_id" = Uuid, Path, description = "Presenter ID")
    ),
    responses(
        (status = 200, description = "Presenter added"),
        (status = 404, description = "Show or presenter missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn add_presenter(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, presenter_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    permission_service::ensure_can(&state, user.user_id, "can_assign_presenters").await?;
    let resp = show_service::add_presenter(&state, &user, id, presenter_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/shows/{id}/presenters/{presenter_id}",
    params(
        ("id" = Uuid, Path, description = "Show ID"),
        ("presenter_id" = Uuid, Path, description = "Presenter ID")
    ),
    responses(
        (status = 200, description = "Presenter removed"),
        (status = 404, description = "Link missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn remove_presenter(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, presenter_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    permission_service::ensure_can(&state, user.user_id, "can_assign_presenters").await?;
    let resp = show_service::remove_presenter(&state, &user, id, presenter_id).await?;
    Ok(Json(resp))
}
