use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::users::repo_types::{NewUser, User, UserChanges};

const USER_COLUMNS: &str =
    "id, name, email, address, age, phone_number, created_at, updated_at, deleted_at";

/// Storage access for users. Every read skips soft-deleted rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All live users, newest first.
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    /// Returns `None` when no live row has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> anyhow::Result<Option<User>>;
    /// Marks the row deleted. Returns `false` when no live row has this id.
    async fn soft_delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn close(&self);
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user")?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, address, age, phone_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.email)
        .bind(new.address)
        .bind(new.age)
        .bind(new.phone_number)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name         = COALESCE($2, name),
                   email        = COALESCE($3, email),
                   address      = COALESCE($4, address),
                   age          = COALESCE($5, age),
                   phone_number = COALESCE($6, phone_number),
                   updated_at   = $7
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.address)
        .bind(changes.age)
        .bind(changes.phone_number)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(user)
    }

    async fn soft_delete(&self, id: i64) -> anyhow::Result<bool> {
        let now = OffsetDateTime::now_utc();
        let result = sqlx::query(
            r#"
            UPDATE users
               SET deleted_at = $2, updated_at = $2
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.db)
        .await
        .context("soft delete user")?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.db.close().await;
    }
}
