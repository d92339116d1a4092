use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use radioplan_api::{config::AppConfig, db::create_pool, permissions};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let producer_id = ensure_user(&pool, "producer", "producer@example.com", "producer123").await?;
    grant_all_flags(&pool, producer_id).await?;

    let emission_id = seed_emission(&pool, "Morning Drive", "Weekday breakfast show").await?;
    let show_id = seed_show(&pool, emission_id, producer_id, "Morning Drive - Monday").await?;
    seed_segments(&pool, show_id).await?;

    println!("Seed completed. Producer ID: {producer_id}, Show ID: {show_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
    {
        println!("User {username} already present");
        return Ok(id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

    println!("Created user {username}");
    Ok(id)
}

async fn grant_all_flags(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let flags = serde_json::Value::Object(permissions::all_granted_flags());
    sqlx::query(
        r#"
        INSERT INTO user_permissions (user_id, flags)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET flags = EXCLUDED.flags, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(flags)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_emission(
    pool: &sqlx::PgPool,
    title: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM emissions WHERE title = $1 AND is_deleted = FALSE",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO emissions (id, title, description) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(title)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn seed_show(
    pool: &sqlx::PgPool,
    emission_id: Uuid,
    created_by: Uuid,
    title: &str,
) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM shows WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO shows (id, emission_id, title, created_by) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(emission_id)
    .bind(title)
    .bind(created_by)
    .execute(pool)
    .await?;
    Ok(id)
}

async fn seed_segments(pool: &sqlx::PgPool, show_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT count(*) FROM segments WHERE show_id = $1")
        .bind(show_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        return Ok(());
    }

    let segments = vec![
        ("Headlines", 300),
        ("Interview", 900),
        ("Music block", 1200),
    ];

    for (position, (title, duration)) in segments.into_iter().enumerate() {
        sqlx::query(
            "INSERT INTO segments (id, show_id, title, duration_seconds, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(show_id)
        .bind(title)
        .bind(duration)
        .bind((position + 1) as i32)
        .execute(pool)
        .await?;
    }

    println!("Seeded segments for show {show_id}");
    Ok(())
}
