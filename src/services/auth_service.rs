use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{Claims, InviteRegisterRequest, InviteRequest, LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        invite_tokens::{ActiveModel as InviteActive, Column as InviteCol, Model as InviteModel},
        InviteTokens,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{InviteToken, User},
    response::{ApiResponse, Meta},
    services::{permission_service, role_service},
    state::AppState,
};

const USER_COLUMNS: &str = "id, username, email, display_name, is_active, is_deleted, created_at";

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        username,
        email,
        password,
        display_name,
    } = payload;

    let user = insert_user(state, &username, &email, &password, display_name).await?;

    // New accounts always get an all-false permissions row and the public
    // role; a missing permissions row reads as 404 everywhere else.
    permission_service::initialize_user_permissions(state, user.id).await?;
    role_service::assign_default_role_to_user(state, user.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(user.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;

    let row: Option<(Uuid, String, bool, bool)> = sqlx::query_as(
        "SELECT id, password_hash, is_active, is_deleted FROM users WHERE username = $1 OR email = $1",
    )
    .bind(username.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let (user_id, stored_hash, is_active, is_deleted) = match row {
        Some(r) => r,
        None => return Err(AppError::BadRequest("Invalid username or password".into())),
    };
    if is_deleted || !is_active {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let parsed_hash = PasswordHash::new(&stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let role = if role_service::user_is_admin(state, user_id).await? {
        "admin"
    } else {
        "user"
    };

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "user_login",
        Some("users"),
        Some(user_id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Issue a single-use invite for an email address, valid for seven days.
pub async fn create_invite(
    state: &AppState,
    actor: &AuthUser,
    payload: InviteRequest,
) -> AppResult<ApiResponse<InviteToken>> {
    permission_service::ensure_can(state, actor.user_id, "can_invite_users").await?;

    let now = Utc::now();
    let invite = InviteActive {
        id: Set(Uuid::new_v4()),
        token: Set(Uuid::new_v4()),
        email: Set(payload.email),
        created_by: Set(Some(actor.user_id)),
        expires_at: Set((now + Duration::days(7)).into()),
        used: Set(false),
        created_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "invite_create",
        Some("invite_tokens"),
        Some(invite.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Invite created",
        invite_from_entity(invite),
        Some(Meta::empty()),
    ))
}

/// Signup through an invite token: the token must exist, be unused, and be
/// unexpired. The email comes from the invite, which is burned on success.
pub async fn register_via_invite(
    state: &AppState,
    token: Uuid,
    payload: InviteRegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let invite = InviteTokens::find()
        .filter(InviteCol::Token.eq(token))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if invite.used {
        return Err(AppError::BadRequest("invite already used".into()));
    }
    if invite.expires_at.with_timezone(&Utc) < Utc::now() {
        return Err(AppError::BadRequest("invite expired".into()));
    }

    let email = invite.email.clone();
    let user = insert_user(
        state,
        &payload.username,
        &email,
        &payload.password,
        payload.display_name,
    )
    .await?;

    let mut active: InviteActive = invite.into();
    active.used = Set(true);
    active.update(&state.orm).await?;

    permission_service::initialize_user_permissions(state, user.id).await?;
    role_service::assign_default_role_to_user(state, user.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register_invite",
        Some("users"),
        Some(user.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User created", user, None))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

async fn insert_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
    display_name: Option<String>,
) -> AppResult<User> {
    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
            .bind(username)
            .bind(email)
            .fetch_optional(&state.pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::Conflict(
            "username or email is already taken".into(),
        ));
    }

    let password_hash = hash_password(password)?;
    let id = Uuid::new_v4();

    let user: User = sqlx::query_as(&format!(
        "INSERT INTO users (id, username, email, password_hash, display_name) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .fetch_one(&state.pool)
    .await?;

    Ok(user)
}

fn invite_from_entity(model: InviteModel) -> InviteToken {
    InviteToken {
        id: model.id,
        token: model.token,
        email: model.email,
        created_by: model.created_by,
        expires_at: model.expires_at.with_timezone(&Utc),
        used: model.used,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
