use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::auth::{dto::AccountSummary, role::Role};

/// Full account row, password hash included. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Find an account by email in the table for the given role.
pub async fn find_by_email(db: &PgPool, role: Role, email: &str) -> sqlx::Result<Option<Account>> {
    // role.table() only ever yields the two fixed identifiers, so
    // formatting it into the statement is safe.
    let sql = format!(
        "SELECT id, email, password_hash, name, created_at FROM {} WHERE email = $1",
        role.table()
    );
    sqlx::query_as::<_, Account>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await
}

/// Insert a new account; `None` means the email was already taken.
pub async fn insert(
    db: &PgPool,
    role: Role,
    email: &str,
    password_hash: &str,
    name: Option<&str>,
) -> sqlx::Result<Option<AccountSummary>> {
    let sql = format!(
        r#"
        INSERT INTO {} (email, password_hash, name, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (email) DO NOTHING
        RETURNING id, email, name
        "#,
        role.table()
    );
    sqlx::query_as::<_, AccountSummary>(&sql)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_optional(db)
        .await
}
