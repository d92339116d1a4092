//! Named roles and the user↔role links. Roles stay coarse ("Admin",
//! "public"); fine-grained authorization lives on the per-user flags.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::{
        roles::{ActiveModel as RoleActive, Column as RoleCol, Model as RoleModel},
        user_roles::{ActiveModel as UserRoleActive, Column as UserRoleCol},
        Roles, UserRoles, Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Role,
    response::{ApiResponse, Meta},
    services::permission_service::ensure_can,
    state::AppState,
};

pub const ADMIN_ROLE: &str = "Admin";
pub const DEFAULT_ROLE: &str = "public";

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct RoleList {
    pub items: Vec<Role>,
}

pub async fn create_role(
    state: &AppState,
    actor: &AuthUser,
    name: String,
) -> AppResult<ApiResponse<Role>> {
    ensure_can(state, actor.user_id, "can_manage_roles").await?;

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("role name must not be empty".into()));
    }

    let existing = Roles::find()
        .filter(RoleCol::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!("role {name} already exists")));
    }

    let row = RoleActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "role_create",
        Some("roles"),
        Some(row.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Role created",
        role_from_entity(row),
        Some(Meta::empty()),
    ))
}

pub async fn list_roles(state: &AppState) -> AppResult<ApiResponse<RoleList>> {
    let items = Roles::find()
        .order_by_asc(RoleCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(role_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Roles",
        RoleList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_role(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Role>> {
    let row = Roles::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Role",
        role_from_entity(row),
        Some(Meta::empty()),
    ))
}

pub async fn delete_role(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can(state, actor.user_id, "can_manage_roles").await?;

    let result = Roles::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "role_delete",
        Some("roles"),
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Role deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Link roles to a user. Every id must exist, the user must not be
/// soft-deleted, and roles already held are skipped.
pub async fn assign_roles_to_user(
    state: &AppState,
    actor: &AuthUser,
    user_id: Uuid,
    role_ids: Vec<Uuid>,
) -> AppResult<ApiResponse<RoleList>> {
    ensure_can(state, actor.user_id, "can_manage_roles").await?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.is_deleted {
        return Err(AppError::BadRequest("user is deleted".into()));
    }

    let requested: HashSet<Uuid> = role_ids.into_iter().collect();
    let found = Roles::find()
        .filter(RoleCol::Id.is_in(requested.iter().copied()))
        .all(&state.orm)
        .await?;
    if found.len() != requested.len() {
        return Err(AppError::NotFound);
    }

    let held: HashSet<Uuid> = UserRoles::find()
        .filter(UserRoleCol::UserId.eq(user_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|link| link.role_id)
        .collect();

    let missing: Vec<UserRoleActive> = requested
        .difference(&held)
        .map(|role_id| UserRoleActive {
            user_id: Set(user_id),
            role_id: Set(*role_id),
        })
        .collect();
    if !missing.is_empty() {
        UserRoles::insert_many(missing).exec(&state.orm).await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "roles_assign",
        Some("user_roles"),
        Some(user_id),
        Some(serde_json::json!({ "role_ids": requested })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    user_roles(state, user_id).await
}

pub async fn unassign_roles_from_user(
    state: &AppState,
    actor: &AuthUser,
    user_id: Uuid,
    role_ids: Vec<Uuid>,
) -> AppResult<ApiResponse<RoleList>> {
    ensure_can(state, actor.user_id, "can_manage_roles").await?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.is_deleted {
        return Err(AppError::BadRequest("user is deleted".into()));
    }

    UserRoles::delete_many()
        .filter(UserRoleCol::UserId.eq(user_id))
        .filter(UserRoleCol::RoleId.is_in(role_ids.clone()))
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "roles_unassign",
        Some("user_roles"),
        Some(user_id),
        Some(serde_json::json!({ "role_ids": role_ids })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    user_roles(state, user_id).await
}

pub async fn user_roles(state: &AppState, user_id: Uuid) -> AppResult<ApiResponse<RoleList>> {
    let links = UserRoles::find()
        .filter(UserRoleCol::UserId.eq(user_id))
        .all(&state.orm)
        .await?;
    let ids: Vec<Uuid> = links.into_iter().map(|l| l.role_id).collect();

    let items = Roles::find()
        .filter(RoleCol::Id.is_in(ids))
        .order_by_asc(RoleCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(role_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "User roles",
        RoleList { items },
        Some(Meta::empty()),
    ))
}

/// Ensure the role named `name` exists and return it. Runs lazily on every
/// signup, so it must be idempotent.
pub async fn ensure_role_exists(state: &AppState, name: &str) -> AppResult<RoleModel> {
    if let Some(existing) = Roles::find()
        .filter(RoleCol::Name.eq(name))
        .one(&state.orm)
        .await?
    {
        return Ok(existing);
    }

    let row = RoleActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(row)
}

/// Attach the "public" role, creating it first when missing. Idempotent.
pub async fn assign_default_role_to_user(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let role = ensure_role_exists(state, DEFAULT_ROLE).await?;

    let link = UserRoles::find()
        .filter(UserRoleCol::UserId.eq(user_id))
        .filter(UserRoleCol::RoleId.eq(role.id))
        .one(&state.orm)
        .await?;
    if link.is_none() {
        UserRoleActive {
            user_id: Set(user_id),
            role_id: Set(role.id),
        }
        .insert(&state.orm)
        .await?;
    }

    Ok(())
}

/// True when the user holds the Admin role; drives the coarse JWT marker.
pub async fn user_is_admin(state: &AppState, user_id: Uuid) -> AppResult<bool> {
    let admin = Roles::find()
        .filter(RoleCol::Name.eq(ADMIN_ROLE))
        .one(&state.orm)
        .await?;
    let Some(admin) = admin else {
        return Ok(false);
    };

    let link = UserRoles::find()
        .filter(UserRoleCol::UserId.eq(user_id))
        .filter(UserRoleCol::RoleId.eq(admin.id))
        .one(&state.orm)
        .await?;
    Ok(link.is_some())
}

fn role_from_entity(model: RoleModel) -> Role {
    Role {
        id: model.id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
