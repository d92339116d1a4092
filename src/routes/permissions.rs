use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::permissions::{
        CreateTemplateRequest, TemplateList, UpdatePermissionsRequest, UserPermissionsResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::RoleTemplate,
    response::ApiResponse,
    services::permission_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}", get(get_user_permissions))
        .route("/users/{user_id}", put(update_user_permissions))
        .route("/users/{user_id}/initialize", post(initialize_user_permissions))
        .route("/templates", post(create_template))
        .route("/templates", get(list_templates))
        .route("/templates/{id}", get(get_template))
        .route("/templates/{id}", delete(delete_template))
        .route("/templates/{id}/apply/{user_id}", post(apply_template))
}

#[utoipa::path(
    get,
    path = "/api/permissions/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Full permission map", body = ApiResponse<UserPermissionsResponse>),
        (status = 404, description = "No permissions row for user")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn get_user_permissions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserPermissionsResponse>>> {
    // Anyone can read their own map; reading someone else's needs the flag.
    if user.user_id != user_id {
        permission_service::ensure_can(&state, user.user_id, "can_view_users").await?;
    }
    let resp = permission_service::get_user_permissions(&state, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/permissions/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Permissions updated", body = ApiResponse<UserPermissionsResponse>),
        (status = 400, description = "Unknown permission key"),
        (status = 403, description = "Actor lacks can_edit_users / can_manage_roles"),
        (status = 404, description = "No permissions row for user")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn update_user_permissions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionsRequest>,
) -> AppResult<Json<ApiResponse<UserPermissionsResponse>>> {
    let resp =
        permission_service::update_user_permissions(&state, &user, user_id, payload.permissions)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/permissions/users/{user_id}/initialize",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Row created or already present", body = ApiResponse<UserPermissionsResponse>),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn initialize_user_permissions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserPermissionsResponse>>> {
    permission_service::ensure_can(&state, user.user_id, "can_edit_users").await?;
    let resp = permission_service::initialize_user_permissions(&state, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/permissions/templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 200, description = "Template created", body = ApiResponse<RoleTemplate>),
        (status = 400, description = "Unknown permission key"),
        (status = 409, description = "Name taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn create_template(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTemplateRequest>,
) -> AppResult<Json<ApiResponse<RoleTemplate>>> {
    let resp = permission_service::create_template(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/permissions/templates",
    responses(
        (status = 200, description = "Templates", body = ApiResponse<TemplateList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<TemplateList>>> {
    let resp = permission_service::list_templates(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/permissions/templates/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template", body = ApiResponse<RoleTemplate>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn get_template(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RoleTemplate>>> {
    let resp = permission_service::get_template(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/permissions/templates/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn delete_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = permission_service::delete_template(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/permissions/templates/{id}/apply/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Template ID"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Template applied", body = ApiResponse<UserPermissionsResponse>),
        (status = 404, description = "Template or permissions row missing")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn apply_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<UserPermissionsResponse>>> {
    let resp = permission_service::apply_role_template(&state, &user, user_id, id).await?;
    Ok(Json(resp))
}
