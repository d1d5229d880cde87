use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use tripway_core::repository::UserRepository;
use tripway_core::user::{normalize_email, NewUser, ProfileUpdate, User, UserCredentials};
use tripway_core::CoreResult;
use tripway_shared::Masked;

use crate::database::{internal, map_db_error};

pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: u64,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

const USER_COLUMNS: &str = "id, name, email, phone, created_at";

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let email = normalize_email(&user.email);
        let result = sqlx::query(
            "INSERT INTO users (name, email, phone, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind(user.name.trim())
        .bind(&email)
        .bind(&user.phone)
        .bind(user.password_hash.expose())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("A user with this email", e))?;

        let id = result.last_insert_id();
        self.get_user(id)
            .await?
            .ok_or_else(|| tripway_core::CoreError::Internal(format!("user {} vanished after insert", id)))
    }

    async fn get_user(&self, id: u64) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        Ok(row.map(User::from))
    }

    async fn find_credentials(&self, email: &str) -> CoreResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {}, password_hash FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        Ok(row.map(|r| UserCredentials {
            user: r.user.into(),
            password_hash: Masked(r.password_hash),
        }))
    }

    async fn update_profile(&self, id: u64, update: &ProfileUpdate) -> CoreResult<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let current = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ? FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?;

        let Some(current) = current else {
            return Ok(None);
        };

        let mut user = User::from(current);
        update.apply(&mut user);

        sqlx::query("UPDATE users SET name = ?, email = ?, phone = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("A user with this email", e))?;

        tx.commit().await.map_err(internal)?;
        Ok(Some(user))
    }
}
