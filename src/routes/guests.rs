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
    models::Guest,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::permission_service::ensure_can,
    state::AppState,
};

const GUEST_COLUMNS: &str = "id, full_name, contact, notes, created_at";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGuestRequest {
    pub full_name: String,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGuestRequest {
    pub full_name: Option<String>,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct GuestList {
    pub items: Vec<Guest>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_guest))
        .route("/", axum::routing::get(list_guests))
        .route("/{id}", axum::routing::get(get_guest))
        .route("/{id}", axum::routing::put(update_guest))
        .route("/{id}", axum::routing::delete(delete_guest))
}

#[utoipa::path(
    get,
    path = "/api/guests",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List guests", body = ApiResponse<GuestList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn list_guests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<GuestList>>> {
    ensure_can(&state, user.user_id, "can_view_guests").await?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE is_deleted = FALSE \
         ORDER BY created_at LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT count(*) FROM guests WHERE is_deleted = FALSE")
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(Json(ApiResponse::success(
        "Guests",
        GuestList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/guests/{id}",
    params(
        ("id" = Uuid, Path, description = "Guest ID")
    ),
    responses(
        (status = 200, description = "Get guest", body = ApiResponse<Guest>),
        (status = 404, description = "Guest not found or soft-deleted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn get_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Guest>>> {
    ensure_can(&state, user.user_id, "can_view_guests").await?;

    let result = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1 AND is_deleted = FALSE"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let guest = match result {
        Some(g) => g,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Guest", guest, None)))
}

#[utoipa::path(
    post,
    path = "/api/guests",
    request_body = CreateGuestRequest,
    responses(
        (status = 200, description = "Create guest", body = ApiResponse<Guest>)
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn create_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateGuestRequest>,
) -> AppResult<Json<ApiResponse<Guest>>> {
    ensure_can(&state, user.user_id, "can_create_guests").await?;

    let id = Uuid::new_v4();
    let guest = sqlx::query_as::<_, Guest>(&format!(
        "INSERT INTO guests (id, full_name, contact, notes) \
         VALUES ($1, $2, $3, $4) RETURNING {GUEST_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.full_name)
    .bind(payload.contact)
    .bind(payload.notes)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "guest_create",
        Some("guests"),
        Some(guest.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Guest created",
        guest,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/guests/{id}",
    params(
        ("id" = Uuid, Path, description = "Guest ID")
    ),
    request_body = UpdateGuestRequest,
    responses(
        (status = 200, description = "Updated guest", body = ApiResponse<Guest>),
        (status = 404, description = "Guest not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn update_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGuestRequest>,
) -> AppResult<Json<ApiResponse<Guest>>> {
    ensure_can(&state, user.user_id, "can_edit_guests").await?;

    let existing = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1 AND is_deleted = FALSE"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let existing = match existing {
        Some(g) => g,
        None => return Err(AppError::NotFound),
    };

    let full_name = payload.full_name.unwrap_or(existing.full_name);
    let contact = payload.contact.or(existing.contact);
    let notes = payload.notes.or(existing.notes);

    let guest = sqlx::query_as::<_, Guest>(&format!(
        "UPDATE guests SET full_name = $2, contact = $3, notes = $4 \
         WHERE id = $1 RETURNING {GUEST_COLUMNS}"
    ))
    .bind(id)
    .bind(full_name)
    .bind(contact)
    .bind(notes)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "guest_update",
        Some("guests"),
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Json(ApiResponse::success(
        "Updated",
        guest,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/guests/{id}",
    params(
        ("id" = Uuid, Path, description = "Guest ID")
    ),
    responses(
        (status = 200, description = "Guest soft-deleted"),
        (status = 404, description = "Guest not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn delete_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_can(&state, user.user_id, "can_delete_guests").await?;

    let result = sqlx::query(
        "UPDATE guests SET is_deleted = TRUE, deleted_at = now() \
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
        "guest_delete",
        Some("guests"),
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
