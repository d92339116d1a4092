//! Per-user capability flags: reads, idempotent initialization, guarded
//! partial updates, and role-template application.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::permissions::{CreateTemplateRequest, TemplateList, UserPermissionsResponse},
    entity::{
        role_templates::{ActiveModel as TemplateActive, Column as TemplateCol, Model as TemplateModel},
        user_permissions::{ActiveModel as PermsActive, Model as PermsModel},
        users::Column as UserCol,
        RoleTemplates, UserPermissions, Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::RoleTemplate,
    permissions::{self, flag_enabled},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Route guard: forbidden when the user has no permissions row or the flag
/// is off. Admin accounts pass because the bootstrap grants every flag.
pub async fn ensure_can(state: &AppState, user_id: Uuid, key: &str) -> AppResult<()> {
    debug_assert!(permissions::is_valid_key(key), "unknown flag {key}");
    let row = UserPermissions::find_by_id(user_id).one(&state.orm).await?;
    match row {
        Some(row) if flag_enabled(&row.flags, key) => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

pub async fn get_user_permissions(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<ApiResponse<UserPermissionsResponse>> {
    let row = UserPermissions::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "User permissions",
        response_from_row(row),
        Some(Meta::empty()),
    ))
}

/// Create the all-false row for a user, or return the existing row
/// unchanged. Every signup path calls this exactly once.
pub async fn initialize_user_permissions(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<ApiResponse<UserPermissionsResponse>> {
    let user = Users::find_by_id(user_id)
        .filter(UserCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?;
    if user.is_none() {
        return Err(AppError::NotFound);
    }

    if let Some(existing) = UserPermissions::find_by_id(user_id).one(&state.orm).await? {
        return Ok(ApiResponse::success(
            "Permissions already initialized",
            response_from_row(existing),
            Some(Meta::empty()),
        ));
    }

    let row = PermsActive {
        user_id: Set(user_id),
        flags: Set(Value::Object(permissions::default_flags())),
        updated_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Permissions initialized",
        response_from_row(row),
        Some(Meta::empty()),
    ))
}

/// Partial update of a user's flags. The actor needs `can_edit_users` or
/// `can_manage_roles`; one unknown key rejects the whole request and leaves
/// the row untouched.
pub async fn update_user_permissions(
    state: &AppState,
    actor: &AuthUser,
    user_id: Uuid,
    changes: HashMap<String, bool>,
) -> AppResult<ApiResponse<UserPermissionsResponse>> {
    let actor_row = UserPermissions::find_by_id(actor.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Forbidden)?;
    if !flag_enabled(&actor_row.flags, "can_edit_users")
        && !flag_enabled(&actor_row.flags, "can_manage_roles")
    {
        return Err(AppError::Forbidden);
    }

    for key in changes.keys() {
        if !permissions::is_valid_key(key) {
            return Err(AppError::BadRequest(format!(
                "unknown permission key: {key}"
            )));
        }
    }

    let target = UserPermissions::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut flags = permissions::normalize_flags(&target.flags);
    for (key, value) in &changes {
        flags.insert(key.clone(), Value::Bool(*value));
    }

    let mut active: PermsActive = target.into();
    active.flags = Set(Value::Object(flags));
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "permissions_update",
        Some("user_permissions"),
        Some(user_id),
        Some(serde_json::json!({ "keys": changes.keys().collect::<Vec<_>>() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Permissions updated",
        response_from_row(row),
        Some(Meta::empty()),
    ))
}

/// Copy every flag a template names onto the user's row. Keys outside the
/// catalog are skipped; the template keeps no link to the user afterwards.
pub async fn apply_role_template(
    state: &AppState,
    actor: &AuthUser,
    user_id: Uuid,
    template_id: Uuid,
) -> AppResult<ApiResponse<UserPermissionsResponse>> {
    let template = RoleTemplates::find_by_id(template_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let target = UserPermissions::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut flags = permissions::normalize_flags(&target.flags);
    if let Value::Object(template_flags) = &template.flags {
        for (key, value) in template_flags {
            if permissions::is_valid_key(key) {
                flags.insert(key.clone(), Value::Bool(value.as_bool().unwrap_or(false)));
            }
        }
    }

    let mut active: PermsActive = target.into();
    active.flags = Set(Value::Object(flags));
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "role_template_apply",
        Some("user_permissions"),
        Some(user_id),
        Some(serde_json::json!({ "template_id": template_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Template applied",
        response_from_row(row),
        Some(Meta::empty()),
    ))
}

pub async fn create_template(
    state: &AppState,
    actor: &AuthUser,
    payload: CreateTemplateRequest,
) -> AppResult<ApiResponse<RoleTemplate>> {
    ensure_can(state, actor.user_id, "can_manage_roles").await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("template name must not be empty".into()));
    }
    for key in payload.flags.keys() {
        if !permissions::is_valid_key(key) {
            return Err(AppError::BadRequest(format!(
                "unknown permission key: {key}"
            )));
        }
    }

    let existing = RoleTemplates::find()
        .filter(TemplateCol::Name.eq(payload.name.as_str()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "template {} already exists",
            payload.name
        )));
    }

    let flags: serde_json::Map<String, Value> = payload
        .flags
        .iter()
        .map(|(k, v)| (k.clone(), Value::Bool(*v)))
        .collect();

    let row = TemplateActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        flags: Set(Value::Object(flags)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Template created",
        template_from_entity(row),
        Some(Meta::empty()),
    ))
}

pub async fn list_templates(state: &AppState) -> AppResult<ApiResponse<TemplateList>> {
    let items = RoleTemplates::find()
        .order_by_asc(TemplateCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(template_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Templates",
        TemplateList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_template(state: &AppState, id: Uuid) -> AppResult<ApiResponse<RoleTemplate>> {
    let row = RoleTemplates::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Template",
        template_from_entity(row),
        Some(Meta::empty()),
    ))
}

pub async fn delete_template(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can(state, actor.user_id, "can_manage_roles").await?;

    let result = RoleTemplates::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Template deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn response_from_row(row: PermsModel) -> UserPermissionsResponse {
    UserPermissionsResponse {
        user_id: row.user_id,
        flags: Value::Object(permissions::normalize_flags(&row.flags)),
        updated_at: row.updated_at.with_timezone(&Utc),
    }
}

fn template_from_entity(model: TemplateModel) -> RoleTemplate {
    RoleTemplate {
        id: model.id,
        name: model.name,
        flags: model.flags,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
