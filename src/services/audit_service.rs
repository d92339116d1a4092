//! Reading the audit trail and moving rows into the archive table. The
//! write side lives in `crate::audit` and is always best-effort; archival
//! here is the opposite, all-or-nothing inside one transaction.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{
        archived_audit_logs::{ActiveModel as ArchivedActive, Column as ArchivedCol, Model as ArchivedModel},
        audit_logs::{Column as AuditCol, Model as AuditModel},
        ArchivedAuditLogs, AuditLogs,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ArchivedAuditLog, AuditLog},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::permission_service::ensure_can,
    state::AppState,
};

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct AuditLogList {
    pub items: Vec<AuditLog>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ArchivedAuditLogList {
    pub items: Vec<ArchivedAuditLog>,
}

pub async fn list_audit_logs(
    state: &AppState,
    actor: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<AuditLogList>> {
    ensure_can(state, actor.user_id, "can_view_audit_logs").await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = AuditLogs::find().order_by_desc(AuditCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(audit_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Audit logs",
        AuditLogList { items },
        Some(meta),
    ))
}

pub async fn list_archived_audit_logs(
    state: &AppState,
    actor: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ArchivedAuditLogList>> {
    ensure_can(state, actor.user_id, "can_view_audit_logs").await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = ArchivedAuditLogs::find().order_by_desc(ArchivedCol::ArchivedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(archived_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Archived audit logs",
        ArchivedAuditLogList { items },
        Some(meta),
    ))
}

/// Move one row from the live table to the archive. Copy and delete share
/// a transaction, so a failure leaves the live row in place.
pub async fn archive_audit_log(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ArchivedAuditLog>> {
    ensure_can(state, actor.user_id, "can_archive_audit_logs").await?;

    let txn = state.orm.begin().await?;

    let row = AuditLogs::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let archived = ArchivedActive {
        id: Set(row.id),
        user_id: Set(row.user_id),
        action: Set(row.action.clone()),
        table_name: Set(row.table_name.clone()),
        record_id: Set(row.record_id),
        metadata: Set(row.metadata.clone()),
        created_at: Set(row.created_at),
        archived_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    AuditLogs::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Audit log archived",
        archived_from_entity(archived),
        Some(Meta::empty()),
    ))
}

fn audit_from_entity(model: AuditModel) -> AuditLog {
    AuditLog {
        id: model.id,
        user_id: model.user_id,
        action: model.action,
        table_name: model.table_name,
        record_id: model.record_id,
        metadata: model.metadata,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn archived_from_entity(model: ArchivedModel) -> ArchivedAuditLog {
    ArchivedAuditLog {
        id: model.id,
        user_id: model.user_id,
        action: model.action,
        table_name: model.table_name,
        record_id: model.record_id,
        metadata: model.metadata,
        created_at: model.created_at.with_timezone(&Utc),
        archived_at: model.archived_at.with_timezone(&Utc),
    }
}
