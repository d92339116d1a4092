//! Admin bootstrap: an invariant enforced at startup and exposed through
//! the unauthenticated `/setup` endpoints, which disable themselves once
//! any non-deleted user holds the Admin role.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    entity::{
        user_permissions::ActiveModel as PermsActive,
        user_roles::{ActiveModel as UserRoleActive, Column as UserRoleCol},
        users::Column as UserCol,
        UserPermissions, UserRoles, Users,
    },
    error::{AppError, AppResult},
    models::User,
    permissions,
    response::{ApiResponse, Meta},
    routes::setup::CreateAdminRequest,
    services::{auth_service, role_service},
    state::AppState,
};

const USER_COLUMNS: &str = "id, username, email, display_name, is_active, is_deleted, created_at";

pub async fn admin_exists(state: &AppState) -> AppResult<bool> {
    let Some(admin_role) = crate::entity::Roles::find()
        .filter(crate::entity::roles::Column::Name.eq(role_service::ADMIN_ROLE))
        .one(&state.orm)
        .await?
    else {
        return Ok(false);
    };

    let holder_ids: Vec<Uuid> = UserRoles::find()
        .filter(UserRoleCol::RoleId.eq(admin_role.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|link| link.user_id)
        .collect();
    if holder_ids.is_empty() {
        return Ok(false);
    }

    let active = Users::find()
        .filter(UserCol::Id.is_in(holder_ids))
        .filter(UserCol::IsDeleted.eq(false))
        .count(&state.orm)
        .await?;
    Ok(active > 0)
}

/// Startup bootstrap. When no active admin exists, promote the configured
/// account (creating it first when missing) with the Admin role and every
/// permission flag set. Safe to run on every restart.
pub async fn create_default_admin(state: &AppState, config: &AppConfig) -> AppResult<bool> {
    if admin_exists(state).await? {
        return Ok(false);
    }

    let user_id = promote_admin(
        state,
        &config.admin_username,
        &config.admin_email,
        &config.admin_password,
    )
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "admin_bootstrap",
        Some("users"),
        Some(user_id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    tracing::info!(%user_id, "default admin bootstrapped");
    Ok(true)
}

/// Emergency, unauthenticated admin creation. Refuses once any admin
/// exists.
pub async fn create_admin_via_setup(
    state: &AppState,
    payload: CreateAdminRequest,
) -> AppResult<ApiResponse<User>> {
    if admin_exists(state).await? {
        return Err(AppError::Forbidden);
    }

    let user_id = promote_admin(state, &payload.username, &payload.email, &payload.password).await?;

    let user: User = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "admin_setup_create",
        Some("users"),
        Some(user_id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Admin created", user, Some(Meta::empty())))
}

async fn promote_admin(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
            .bind(username)
            .bind(email)
            .fetch_optional(&state.pool)
            .await?;

    let user_id = match existing {
        Some((id,)) => {
            // Upgrade path: revive the account if it was disabled.
            sqlx::query(
                "UPDATE users SET is_active = TRUE, is_deleted = FALSE, deleted_at = NULL WHERE id = $1",
            )
            .bind(id)
            .execute(&state.pool)
            .await?;
            id
        }
        None => {
            let password_hash = auth_service::hash_password(password)?;
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .execute(&state.pool)
            .await?;
            id
        }
    };

    let admin_role = role_service::ensure_role_exists(state, role_service::ADMIN_ROLE).await?;
    let link = UserRoles::find()
        .filter(UserRoleCol::UserId.eq(user_id))
        .filter(UserRoleCol::RoleId.eq(admin_role.id))
        .one(&state.orm)
        .await?;
    if link.is_none() {
        UserRoleActive {
            user_id: Set(user_id),
            role_id: Set(admin_role.id),
        }
        .insert(&state.orm)
        .await?;
    }

    let all_granted = Value::Object(permissions::all_granted_flags());
    match UserPermissions::find_by_id(user_id).one(&state.orm).await? {
        Some(row) => {
            let mut active: PermsActive = row.into();
            active.flags = Set(all_granted);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?;
        }
        None => {
            PermsActive {
                user_id: Set(user_id),
                flags: Set(all_granted),
                updated_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?;
        }
    }

    Ok(user_id)
}
