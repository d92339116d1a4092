use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::Role,
    response::ApiResponse,
    services::role_service::{self, RoleList},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_role))
        .route("/", get(list_roles))
        .route("/{id}", get(get_role))
        .route("/{id}", delete(delete_role))
        .route("/assign/{user_id}", post(assign_roles))
        .route("/unassign/{user_id}", post(unassign_roles))
        .route("/users/{user_id}", get(user_roles))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleIdsRequest {
    pub role_ids: Vec<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = ApiResponse<Role>),
        (status = 409, description = "Name taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRoleRequest>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let resp = role_service::create_role(&state, &user, payload.name).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "Roles", body = ApiResponse<RoleList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<RoleList>>> {
    let resp = role_service::list_roles(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role", body = ApiResponse<Role>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn get_role(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let resp = role_service::get_role(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = role_service::delete_role(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/roles/assign/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = RoleIdsRequest,
    responses(
        (status = 200, description = "Roles after assignment", body = ApiResponse<RoleList>),
        (status = 400, description = "User is deleted"),
        (status = 404, description = "User or role missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn assign_roles(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleIdsRequest>,
) -> AppResult<Json<ApiResponse<RoleList>>> {
    let resp = role_service::assign_roles_to_user(&state, &user, user_id, payload.role_ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/roles/unassign/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = RoleIdsRequest,
    responses(
        (status = 200, description = "Roles after removal", body = ApiResponse<RoleList>),
        (status = 404, description = "User missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn unassign_roles(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleIdsRequest>,
) -> AppResult<Json<ApiResponse<RoleList>>> {
    let resp =
        role_service::unassign_roles_from_user(&state, &user, user_id, payload.role_ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/roles/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Roles held by user", body = ApiResponse<RoleList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn user_roles(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RoleList>>> {
    let resp = role_service::user_roles(&state, user_id).await?;
    Ok(Json(resp))
}
