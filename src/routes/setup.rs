//! Unauthenticated bootstrap endpoints. `create-admin` refuses with 403 the
//! moment any non-deleted user holds the Admin role, so the surface closes
//! itself after first use.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::User,
    response::{ApiResponse, Meta},
    services::setup_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check-admin", get(check_admin))
        .route("/create-admin", post(create_admin))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStatus {
    pub admin_exists: bool,
}

#[utoipa::path(
    get,
    path = "/setup/check-admin",
    responses(
        (status = 200, description = "Whether an active admin exists", body = ApiResponse<AdminStatus>)
    ),
    tag = "Setup"
)]
pub async fn check_admin(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AdminStatus>>> {
    let admin_exists = setup_service::admin_exists(&state).await?;
    Ok(Json(ApiResponse::success(
        "Setup status",
        AdminStatus { admin_exists },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/setup/create-admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 200, description = "Admin created", body = ApiResponse<User>),
        (status = 403, description = "An admin already exists")
    ),
    tag = "Setup"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = setup_service::create_admin_via_setup(&state, payload).await?;
    Ok(Json(resp))
}
