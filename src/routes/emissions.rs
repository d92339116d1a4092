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
    models::Emission,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::permission_service::ensure_can,
    state::AppState,
};

const EMISSION_COLUMNS: &str = "id, title, description, schedule, created_at";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmissionRequest {
    pub title: String,
    pub description: Option<String>,
    pub schedule: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub schedule: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct EmissionList {
    pub items: Vec<Emission>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_emission))
        .route("/", axum::routing::get(list_emissions))
        .route("/{id}", axum::routing::get(get_emission))
        .route("/{id}", axum::routing::put(update_emission))
        .route("/{id}", axum::routing::delete(delete_emission))
}

#[utoipa::path(
    get,
    path = "/api/emissions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List emissions", body = ApiResponse<EmissionList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Emissions"
)]
pub async fn list_emissions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<EmissionList>>> {
    ensure_can(&state, user.user_id, "can_view_emissions").await?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, Emission>(&format!(
        "SELECT {EMISSION_COLUMNS} FROM emissions WHERE is_deleted = FALSE \
         ORDER BY title LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT count(*) FROM emissions WHERE is_deleted = FALSE")
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(Json(ApiResponse::success(
        "Emissions",
        EmissionList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/emissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Emission ID")
    ),
    responses(
        (status = 200, description = "Get emission", body = ApiResponse<Emission>),
        (status = 404, description = "Emission not found or soft-deleted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Emissions"
)]
pub async fn get_emission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Emission>>> {
    ensure_can(&state, user.user_id, "can_view_emissions").await?;

    let result = sqlx::query_as::<_, Emission>(&format!(
        "SELECT {EMISSION_COLUMNS} FROM emissions WHERE id = $1 AND is_deleted = FALSE"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let emission = match result {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Emission", emission, None)))
}

#[utoipa::path(
    post,
    path = "/api/emissions",
    request_body = CreateEmissionRequest,
    responses(
        (status = 200, description = "Create emission", body = ApiResponse<Emission>)
    ),
    security(("bearer_auth" = [])),
    tag = "Emissions"
)]
pub async fn create_emission(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEmissionRequest>,
) -> AppResult<Json<ApiResponse<Emission>>> {
    ensure_can(&state, user.user_id, "can_create_emissions").await?;

    let id = Uuid::new_v4();
    let emission = sqlx::query_as::<_, Emission>(&format!(
        "INSERT INTO emissions (id, title, description, schedule) \
         VALUES ($1, $2, $3, $4) RETURNING {EMISSION_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.schedule)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "emission_create",
        Some("emissions"),
        Some(emission.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Emission created",
        emission,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/emissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Emission ID")
    ),
    request_body = UpdateEmissionRequest,
    responses(
        (status = 200, description = "Updated emission", body = ApiResponse<Emission>),
        (status = 404, description = "Emission not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Emissions"
)]
pub async fn update_emission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmissionRequest>,
) -> AppResult<Json<ApiResponse<Emission>>> {
    ensure_can(&state, user.user_id, "can_edit_emissions").await?;

    let existing = sqlx::query_as::<_, Emission>(&format!(
        "SELECT {EMISSION_COLUMNS} FROM emissions WHERE id = $1 AND is_deleted = FALSE"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let existing = match existing {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };

    let title = payload.title.unwrap_or(existing.title);
    let description = payload.description.or(existing.description);
    let schedule = payload.schedule.or(existing.schedule);

    let emission = sqlx::query_as::<_, Emission>(&format!(
        "UPDATE emissions SET title = $2, description = $3, schedule = $4 \
         WHERE id = $1 RETURNING {EMISSION_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(schedule)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "emission_update",
        Some("emissions"),
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Updated",
        emission,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/emissions/{id}",
    params(
        ("id" = Uuid, Path, description = "Emission ID")
    ),
    responses(
        (status = 200, description = "Emission soft-deleted; its shows remain"),
        (status = 404, description = "Emission not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Emissions"
)]
pub async fn delete_emission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_can(&state, user.user_id, "can_delete_emissions").await?;

    let result = sqlx::query(
        "UPDATE emissions SET is_deleted = TRUE, deleted_at = now() \
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
        "emission_delete",
        Some("emissions"),
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
