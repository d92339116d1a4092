use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Presenter,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::permission_service::ensure_can,
    state::AppState,
};

const PRESENTER_COLUMNS: &str = "id, user_id, stage_name, bio, created_at";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePresenterRequest {
    pub user_id: Uuid,
    pub stage_name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePresenterRequest {
    pub stage_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct PresenterList {
    pub items: Vec<Presenter>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_presenter))
        .route("/", axum::routing::get(list_presenters))
        .route("/{id}", axum::routing::get(get_presenter))
        .route("/{id}", axum::routing::put(update_presenter))
        .route("/{id}", axum::routing::delete(delete_presenter))
}

#[utoipa::path(
    get,
    path = "/api/presenters",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List presenters", body = ApiResponse<PresenterList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Presenters"
)]
pub async fn list_presenters(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PresenterList>>> {
    ensure_can(&state, user.user_id, "can_view_presenters").await?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, Presenter>(&format!(
        "SELECT {PRESENTER_COLUMNS} FROM presenters WHERE is_deleted = FALSE \
         ORDER BY stage_name LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT count(*) FROM presenters WHERE is_deleted = FALSE")
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(Json(ApiResponse::success(
        "Presenters",
        PresenterList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/presenters/{id}",
    params(
        ("id" = Uuid, Path, description = "Presenter ID")
    ),
    responses(
        (status = 200, description = "Get presenter", body = ApiResponse<Presenter>),
        (status = 404, description = "Presenter not found or soft-deleted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Presenters"
)]
pub async fn get_presenter(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Presenter>>> {
    ensure_can(&state, user.user_id, "can_view_presenters").await?;

    let result = sqlx::query_as::<_, Presenter>(&format!(
        "SELECT {PRESENTER_COLUMNS} FROM presenters WHERE id = $1 AND is_deleted = FALSE"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let presenter = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Presenter", presenter, None)))
}

#[utoipa::path(
    post,
    path = "/api/presenters",
    request_body = CreatePresenterRequest,
    responses(
        (status = 200, description = "Create presenter", body = ApiResponse<Presenter>),
        (status = 404, description = "User not found"),
        (status = 409, description = "User already has a presenter profile"),
    ),
    security(("bearer_auth" = [])),
    tag = "Presenters"
)]
pub async fn create_presenter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePresenterRequest>,
) -> AppResult<Json<ApiResponse<Presenter>>> {
    ensure_can(&state, user.user_id, "can_create_presenters").await?;

    let owner: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE id = $1 AND is_deleted = FALSE")
            .bind(payload.user_id)
            .fetch_optional(&state.pool)
            .await?;
    if owner.is_none() {
        return Err(AppError::NotFound);
    }

    let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM presenters WHERE user_id = $1")
        .bind(payload.user_id)
        .fetch_optional(&state.pool)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "user already has a presenter profile".into(),
        ));
    }

    let id = Uuid::new_v4();
    let presenter = sqlx::query_as::<_, Presenter>(&format!(
        "INSERT INTO presenters (id, user_id, stage_name, bio) \
         VALUES ($1, $2, $3, $4) RETURNING {PRESENTER_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.user_id)
    .bind(payload.stage_name)
    .bind(payload.bio)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "presenter_create",
        Some("presenters"),
        Some(presenter.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Presenter created",
        presenter,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/presenters/{id}",
    params(
        ("id" = Uuid, Path, description = "Presenter ID")
    ),
    request_body = UpdatePresenterRequest,
    responses(
        (status = 200, description = "Updated presenter", body = ApiResponse<Presenter>),
        (status = 404, description = "Presenter not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Presenters"
)]
pub async fn update_presenter(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePresenterRequest>,
) -> AppResult<Json<ApiResponse<Presenter>>> {
    ensure_can(&state, user.user_id, "can_edit_presenters").await?;

    let existing = sqlx::query_as::<_, Presenter>(&format!(
        "SELECT {PRESENTER_COLUMNS} FROM presenters WHERE id = $1 AND is_deleted = FALSE"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let stage_name = payload.stage_name.unwrap_or(existing.stage_name);
    let bio = payload.bio.or(existing.bio);

    let presenter = sqlx::query_as::<_, Presenter>(&format!(
        "UPDATE presenters SET stage_name = $2, bio = $3 \
         WHERE id = $1 RETURNING {PRESENTER_COLUMNS}"
    ))
    .bind(id)
    .bind(stage_name)
    .bind(bio)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "presenter_update",
        Some("presenters"),
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Updated",
        presenter,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/presenters/{id}",
    params(
        ("id" = Uuid, Path, description = "Presenter ID")
    ),
    responses(
        (status = 200, description = "Presenter soft-deleted"),
        (status = 404, description = "Presenter not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Presenters"
)]
pub async fn delete_presenter(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_can(&state, user.user_id, "can_delete_presenters").await?;

    let result = sqlx::query(
        "UPDATE presenters SET is_deleted = TRUE, deleted_at = now() \
         WHERE id = $1 AND is_deleted = FALSE",
    )
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "presenter_delete",
        Some("presenters"),
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
