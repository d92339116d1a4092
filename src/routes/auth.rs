use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::auth::{InviteRegisterRequest, InviteRequest, LoginRequest, LoginResponse, RegisterRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{InviteToken, User},
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/invite", post(invite))
        .route("/register/invite/{token}", post(register_via_invite))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register user", body = ApiResponse<User>),
        (status = 409, description = "Username or email taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/invite",
    request_body = InviteRequest,
    responses(
        (status = 200, description = "Create invite", body = ApiResponse<InviteToken>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn invite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InviteRequest>,
) -> AppResult<Json<ApiResponse<InviteToken>>> {
    let resp = auth_service::create_invite(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/register/invite/{token}",
    params(
        ("token" = Uuid, Path, description = "Invite token")
    ),
    request_body = InviteRegisterRequest,
    responses(
        (status = 200, description = "Register via invite", body = ApiResponse<User>),
        (status = 400, description = "Invite used or expired"),
        (status = 404, description = "Unknown invite")
    ),
    tag = "Auth"
)]
pub async fn register_via_invite(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(payload): Json<InviteRegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::register_via_invite(&state, token, payload).await?;
    Ok(Json(resp))
}
