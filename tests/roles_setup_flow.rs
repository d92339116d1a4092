use axum::extract::{Path, State};
use axum::Json;
use radioplan_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{user_permissions::ActiveModel as PermsActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    permissions,
    routes::guests::{self, CreateGuestRequest},
    services::{role_service, setup_service},
    state::AppState,
};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Statement};
use uuid::Uuid;

// Integration flow: role names are unique, assignment is all-or-nothing and
// idempotent, the startup admin bootstrap runs once, and a soft-deleted
// guest disappears from reads.
#[tokio::test]
async fn roles_and_setup_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    // A manager with every flag granted acts throughout.
    let manager_id = create_user(&state, "manager", "manager@example.com").await?;
    grant_all(&state, manager_id).await?;
    let manager = AuthUser {
        user_id: manager_id,
        role: "user".into(),
    };

    let member_id = create_user(&state, "member", "member@example.com").await?;

    // Role names are unique; the second create conflicts.
    let editors = role_service::create_role(&state, &manager, "editors".into())
        .await?
        .data
        .unwrap();
    let err = role_service::create_role(&state, &manager, "editors".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Assignment with one unknown role id fails as a whole.
    let err = role_service::assign_roles_to_user(
        &state,
        &manager,
        member_id,
        vec![editors.id, Uuid::new_v4()],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let held = role_service::user_roles(&state, member_id)
        .await?
        .data
        .unwrap();
    assert!(held.items.is_empty());

    // Assigning the same role twice leaves a single link.
    role_service::assign_roles_to_user(&state, &manager, member_id, vec![editors.id]).await?;
    let held = role_service::assign_roles_to_user(&state, &manager, member_id, vec![editors.id])
        .await?
        .data
        .unwrap();
    assert_eq!(held.items.len(), 1);
    assert_eq!(held.items[0].name, "editors");

    role_service::unassign_roles_from_user(&state, &manager, member_id, vec![editors.id]).await?;
    let held = role_service::user_roles(&state, member_id)
        .await?
        .data
        .unwrap();
    assert!(held.items.is_empty());

    // Admin bootstrap: the first run promotes, the second is a no-op, and
    // exactly one active admin exists afterwards.
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        admin_username: "admin".into(),
        admin_email: "admin@example.com".into(),
        admin_password: "bootstrap-secret".into(),
    };
    assert!(!setup_service::admin_exists(&state).await?);
    assert!(setup_service::create_default_admin(&state, &config).await?);
    assert!(!setup_service::create_default_admin(&state, &config).await?);
    assert!(setup_service::admin_exists(&state).await?);

    let admins: (i64,) = sqlx::query_as(
        "SELECT count(*) FROM user_roles ur \
         JOIN roles r ON r.id = ur.role_id \
         JOIN users u ON u.id = ur.user_id \
         WHERE r.name = $1 AND u.is_deleted = FALSE",
    )
    .bind(role_service::ADMIN_ROLE)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(admins.0, 1);

    // The bootstrapped admin holds every permission flag.
    let (admin_id,): (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = 'admin'")
        .fetch_one(&state.pool)
        .await?;
    for key in ["can_manage_roles", "can_delete_archives", "can_view_guests"] {
        radioplan_api::services::permission_service::ensure_can(&state, admin_id, key).await?;
    }

    // Guest soft delete: the row survives in the table but reads are 404.
    let guest = guests::create_guest(
        State(state.clone()),
        manager.clone(),
        Json(CreateGuestRequest {
            full_name: "Ada Lovelace".into(),
            contact: Some("ada@example.com".into()),
            notes: None,
        }),
    )
    .await?
    .0
    .data
    .unwrap();

    guests::get_guest(State(state.clone()), manager.clone(), Path(guest.id)).await?;
    guests::delete_guest(State(state.clone()), manager.clone(), Path(guest.id)).await?;

    let err = guests::get_guest(State(state.clone()), manager.clone(), Path(guest.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    // Deleting twice is also a 404.
    let err = guests::delete_guest(State(state.clone()), manager.clone(), Path(guest.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let survivors: (i64,) = sqlx::query_as("SELECT count(*) FROM guests WHERE id = $1")
        .bind(guest.id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(survivors.0, 1);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE segment_guests, segments, show_presenters, shows, emissions, presenters, \
         guests, invite_tokens, user_roles, roles, role_templates, user_permissions, \
         archived_audit_logs, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, username: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        display_name: Set(None),
        is_active: Set(true),
        is_deleted: Set(false),
        deleted_at: Set(None),
        created_at: sea_orm::ActiveValue::NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn grant_all(state: &AppState, user_id: Uuid) -> anyhow::Result<()> {
    PermsActive {
        user_id: Set(user_id),
        flags: Set(serde_json::Value::Object(permissions::all_granted_flags())),
        updated_at: Set(chrono::Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}
