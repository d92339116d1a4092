use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::ArchivedAuditLog,
    response::ApiResponse,
    routes::params::Pagination,
    services::audit_service::{self, ArchivedAuditLogList, AuditLogList},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/archived", get(list_archived))
        .route("/{id}/archive", post(archive_audit_log))
}

#[utoipa::path(
    get,
    path = "/api/audit",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Live audit trail, newest first", body = ApiResponse<AuditLogList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Audit"
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<AuditLogList>>> {
    let resp = audit_service::list_audit_logs(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/audit/archived",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Archived audit rows", body = ApiResponse<ArchivedAuditLogList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Audit"
)]
pub async fn list_archived(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ArchivedAuditLogList>>> {
    let resp = audit_service::list_archived_audit_logs(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/audit/{id}/archive",
    params(
        ("id" = Uuid, Path, description = "Audit log ID")
    ),
    responses(
        (status = 200, description = "Row moved to the archive table", body = ApiResponse<ArchivedAuditLog>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Audit"
)]
pub async fn archive_audit_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ArchivedAuditLog>>> {
    let resp = audit_service::archive_audit_log(&state, &user, id).await?;
    Ok(Json(resp))
}
