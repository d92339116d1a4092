use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Insert one audit row. Callers must never let a failure here abort the
/// primary operation: every call site wraps this in
/// `if let Err(e) = log_audit(..) { tracing::warn!(..) }`.
pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: &str,
    table_name: Option<&str>,
    record_id: Option<Uuid>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, table_name, record_id, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action)
    .bind(table_name)
    .bind(record_id)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}
